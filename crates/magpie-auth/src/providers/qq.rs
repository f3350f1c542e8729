use magpie_schema::{Provider, QqUser};
use reqwest::StatusCode;
use serde_json::{Map, Value};

use crate::error::{OAuthLoginError, Result};
use crate::oauth2::{build_login_uri, LoginUriParams};
use crate::types::Credentials;

/// QQ OAuth2 endpoints; defaults point at production. QQ adds a fourth
/// endpoint mapping an access token to an opaque openid.
#[derive(Debug, Clone)]
pub struct QqEndpoints {
    pub authorize_uri: String,
    pub access_token_uri: String,
    pub openid_uri: String,
    pub user_info_uri: String,
}

impl Default for QqEndpoints {
    fn default() -> Self {
        Self {
            authorize_uri: "https://graph.qq.com/oauth2.0/authorize".to_string(),
            access_token_uri: "https://graph.qq.com/oauth2.0/token".to_string(),
            openid_uri: "https://graph.qq.com/oauth2.0/me".to_string(),
            user_info_uri: "https://graph.qq.com/user/get_user_info".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QqLogin {
    http: reqwest::Client,
    credentials: Credentials,
    endpoints: QqEndpoints,
    params: LoginUriParams,
}

impl QqLogin {
    pub const PROVIDER: Provider = Provider::Qq;

    pub fn new(credentials: Credentials) -> Self {
        Self::with_endpoints(credentials, QqEndpoints::default())
    }

    pub fn with_endpoints(credentials: Credentials, endpoints: QqEndpoints) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            endpoints,
            params: LoginUriParams {
                scope: Some("get_user_info".to_string()),
                ..LoginUriParams::default()
            },
        }
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.params.scope = Some(scope.into());
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.params.state = Some(state.into());
        self
    }

    pub fn display(mut self, display: impl Into<String>) -> Self {
        self.params.display = Some(display.into());
        self
    }

    pub fn provider(&self) -> Provider {
        Self::PROVIDER
    }

    pub fn login_uri(&self) -> Result<String> {
        build_login_uri(&self.endpoints.authorize_uri, &self.credentials, &self.params)
    }

    /// QQ's token endpoint wants a GET with everything in the query string
    /// and answers with whatever encoding it feels like; only the bare
    /// token is returned.
    pub async fn get_access_token(&self, code: &str) -> Result<String> {
        let resp = self
            .http
            .get(&self.endpoints.access_token_uri)
            .query(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
            ])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        tracing::debug!(%status, "qq token endpoint replied");

        if status != StatusCode::OK {
            return Err(OAuthLoginError::http_status("get_access_token", status, &body));
        }
        let reply = parse_mixed_reply(&body)?;
        match reply.get("access_token").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => Err(OAuthLoginError::missing_field(
                "get_access_token",
                "access_token",
                &body,
            )),
        }
    }

    /// Maps the access token to the opaque per-app user id every other QQ
    /// call requires.
    pub async fn get_openid(&self, access_token: &str) -> Result<String> {
        let resp = self
            .http
            .get(&self.endpoints.openid_uri)
            .query(&[("access_token", access_token)])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        tracing::debug!(%status, "qq openid endpoint replied");

        if status != StatusCode::OK {
            return Err(OAuthLoginError::http_status("get_openid", status, &body));
        }
        let reply = parse_mixed_reply(&body)?;
        match reply.get("openid").and_then(Value::as_str) {
            Some(openid) if !openid.is_empty() => Ok(openid.to_string()),
            _ => Err(OAuthLoginError::missing_field("get_openid", "openid", &body)),
        }
    }

    pub async fn get_user_info(&self, access_token: &str, openid: &str) -> Result<QqUser> {
        let resp = self
            .http
            .get(&self.endpoints.user_info_uri)
            .query(&[
                ("access_token", access_token),
                ("oauth_consumer_key", self.credentials.client_id.as_str()),
                ("openid", openid),
            ])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        tracing::debug!(%status, "qq profile endpoint replied");

        if status != StatusCode::OK {
            return Err(OAuthLoginError::http_status("get_user_info", status, &body));
        }
        let reply = parse_mixed_reply(&body)?;
        if reply.is_empty() {
            return Err(OAuthLoginError::malformed("get_user_info", "empty reply"));
        }
        Ok(QqUser::new(openid, Value::Object(reply)))
    }
}

/// QQ endpoints answer with raw JSON, JSONP, or a bare query string
/// depending on the endpoint; the declared content-type cannot be trusted,
/// so the body is sniffed. The precedence is load-bearing and matches the
/// provider's observed behavior: JSONP prefix, then leading brace, then
/// `=` past the first byte, then empty.
pub fn parse_mixed_reply(body: &str) -> Result<Map<String, Value>> {
    if body.is_empty() {
        return Ok(Map::new());
    }
    if body.starts_with("callback") {
        let inner = match (body.find('('), body.find(')')) {
            (Some(open), Some(close)) if open < close => &body[open + 1..close],
            _ => {
                return Err(OAuthLoginError::malformed(
                    "parse_mixed_reply",
                    "unbalanced jsonp wrapper",
                ))
            }
        };
        if inner.is_empty() {
            return Ok(Map::new());
        }
        return Ok(serde_json::from_str(inner.trim())?);
    }
    if body.starts_with('{') {
        return Ok(serde_json::from_str(body)?);
    }
    if body.find('=').is_some_and(|at| at > 0) {
        let mut reply = Map::new();
        for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
            // first value wins; later duplicates are discarded
            reply
                .entry(key.into_owned())
                .or_insert_with(|| Value::String(value.into_owned()));
        }
        return Ok(reply);
    }
    Ok(Map::new())
}
