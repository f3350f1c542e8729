use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest_oauth1::{OAuthClientProvider, Secrets, TokenReaderFuture};
use serde_json::Value;

use crate::error::{OAuthLoginError, Result};
use crate::types::{AccessTokenPair, Credentials, RequestToken};

/// Narrow view of the underlying OAuth1 protocol engine. The login flow
/// only ever needs these four capabilities, so the concrete signer can be
/// swapped (notably for a canned engine in tests) without touching flow
/// logic.
#[async_trait(?Send)]
pub trait OAuth1Engine: Send + Sync + std::fmt::Debug {
    /// Obtains a fresh request token for the configured callback.
    async fn fetch_request_token(&self) -> Result<RequestToken>;

    /// Authorization URL the user is redirected to for the given token.
    fn authorization_url(&self, token: &RequestToken) -> String;

    /// Trades a request token plus callback verifier for the permanent
    /// access credential.
    async fn fetch_access_token(
        &self,
        token: &RequestToken,
        verifier: &str,
    ) -> Result<AccessTokenPair>;

    /// Signed GET against an API endpoint, anonymously or on behalf of an
    /// access token. Expects a JSON reply.
    async fn signed_get(&self, url: &str, token: Option<&AccessTokenPair>) -> Result<Value>;
}

/// Twitter's OAuth1 endpoint set; defaults point at production.
#[derive(Debug, Clone)]
pub struct TwitterEndpoints {
    pub request_token_uri: String,
    pub authorize_uri: String,
    pub access_token_uri: String,
    pub verify_credentials_uri: String,
}

impl Default for TwitterEndpoints {
    fn default() -> Self {
        Self {
            request_token_uri: "https://api.twitter.com/oauth/request_token".to_string(),
            authorize_uri: "https://api.twitter.com/oauth/authorize".to_string(),
            access_token_uri: "https://api.twitter.com/oauth/access_token".to_string(),
            verify_credentials_uri: "https://api.twitter.com/1.1/account/verify_credentials.json"
                .to_string(),
        }
    }
}

/// [`OAuth1Engine`] over reqwest-oauth1's HMAC-SHA1 signer.
#[derive(Debug, Clone)]
pub struct SigningEngine {
    http: reqwest::Client,
    credentials: Credentials,
    endpoints: TwitterEndpoints,
}

impl SigningEngine {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_endpoints(credentials, TwitterEndpoints::default())
    }

    pub fn with_endpoints(credentials: Credentials, endpoints: TwitterEndpoints) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &TwitterEndpoints {
        &self.endpoints
    }
}

#[async_trait(?Send)]
impl OAuth1Engine for SigningEngine {
    async fn fetch_request_token(&self) -> Result<RequestToken> {
        let secrets = Secrets::new(
            self.credentials.client_id.as_str(),
            self.credentials.client_secret.as_str(),
        );
        let reply = self
            .http
            .clone()
            .oauth1(secrets)
            .post(&self.endpoints.request_token_uri)
            .query(&[("oauth_callback", self.credentials.redirect_uri.as_str())])
            .send()
            .parse_oauth_token()
            .await
            .map_err(|e| OAuthLoginError::engine(e))?;

        Ok(RequestToken {
            key: reply.oauth_token,
            secret: reply.oauth_token_secret,
        })
    }

    fn authorization_url(&self, token: &RequestToken) -> String {
        format!(
            "{}?oauth_token={}",
            self.endpoints.authorize_uri,
            urlencoding::encode(&token.key)
        )
    }

    async fn fetch_access_token(
        &self,
        token: &RequestToken,
        verifier: &str,
    ) -> Result<AccessTokenPair> {
        let secrets = Secrets::new(
            self.credentials.client_id.as_str(),
            self.credentials.client_secret.as_str(),
        )
        .token(token.key.as_str(), token.secret.as_str());
        let reply = self
            .http
            .clone()
            .oauth1(secrets)
            .post(&self.endpoints.access_token_uri)
            .query(&[("oauth_verifier", verifier)])
            .send()
            .parse_oauth_token()
            .await
            .map_err(|e| OAuthLoginError::engine(e))?;

        Ok(AccessTokenPair {
            token: reply.oauth_token,
            secret: reply.oauth_token_secret,
        })
    }

    async fn signed_get(&self, url: &str, token: Option<&AccessTokenPair>) -> Result<Value> {
        let resp = match token {
            Some(token) => {
                let secrets = Secrets::new(
                    self.credentials.client_id.as_str(),
                    self.credentials.client_secret.as_str(),
                )
                .token(token.token.as_str(), token.secret.as_str());
                self.http.clone().oauth1(secrets).get(url).send().await
            }
            None => {
                let secrets = Secrets::new(
                    self.credentials.client_id.as_str(),
                    self.credentials.client_secret.as_str(),
                );
                self.http.clone().oauth1(secrets).get(url).send().await
            }
        }
        .map_err(|e| OAuthLoginError::engine(e))?;

        let status = resp.status();
        let body = resp.text().await?;
        tracing::debug!(%status, url, "signed GET replied");

        if status != StatusCode::OK {
            return Err(OAuthLoginError::http_status("signed_get", status, &body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{OAuth1Engine, SigningEngine, TwitterEndpoints};
    use crate::types::Credentials;

    fn engine_against(server: &MockServer) -> SigningEngine {
        let endpoints = TwitterEndpoints {
            request_token_uri: format!("{}/oauth/request_token", server.uri()),
            authorize_uri: format!("{}/oauth/authorize", server.uri()),
            access_token_uri: format!("{}/oauth/access_token", server.uri()),
            verify_credentials_uri: format!(
                "{}/1.1/account/verify_credentials.json",
                server.uri()
            ),
        };
        SigningEngine::with_endpoints(
            Credentials::new("ck", "cs", "https://example.com/callback/twitter"),
            endpoints,
        )
    }

    #[test]
    fn authorization_url_escapes_the_token() {
        let engine = SigningEngine::new(Credentials::new("ck", "cs", "https://example.com/cb"));
        let url = engine.authorization_url(&crate::types::RequestToken {
            key: "a b+c".to_string(),
            secret: "s".to_string(),
        });
        assert_eq!(
            url,
            "https://api.twitter.com/oauth/authorize?oauth_token=a%20b%2Bc"
        );
    }

    #[tokio::test]
    async fn fetch_request_token_parses_the_urlencoded_reply() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/request_token"))
            .and(query_param(
                "oauth_callback",
                "https://example.com/callback/twitter",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "oauth_token=req-key&oauth_token_secret=req-secret&oauth_callback_confirmed=true",
            ))
            .mount(&server)
            .await;

        let token = engine_against(&server)
            .fetch_request_token()
            .await
            .expect("request token");

        assert_eq!(token.key, "req-key");
        assert_eq!(token.secret, "req-secret");
    }

    #[tokio::test]
    async fn signed_get_rejects_non_200() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/1.1/account/verify_credentials.json"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid or expired token"))
            .mount(&server)
            .await;

        let engine = engine_against(&server);
        let url = engine.endpoints().verify_credentials_uri.clone();
        let err = engine
            .signed_get(&url, None)
            .await
            .expect_err("401 must fail");

        let message = err.to_string();
        assert!(message.contains("401"));
        assert!(message.contains("Invalid or expired token"));
    }
}
