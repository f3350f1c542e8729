use magpie_schema::{Provider, TwitterUser};
use serde_json::Value;

use crate::error::Result;
use crate::oauth1::{OAuth1Engine, SigningEngine, TwitterEndpoints};
use crate::session::{self, Session};
use crate::types::{AccessTokenPair, Credentials, RequestToken};

/// Three-legged OAuth1 login. Construction already talks to the provider:
/// the request token is fetched eagerly so [`TwitterLogin::login_uri`] can
/// answer without further I/O.
#[derive(Debug)]
pub struct TwitterLogin {
    engine: Box<dyn OAuth1Engine>,
    user_info_uri: String,
    request_token: RequestToken,
}

impl TwitterLogin {
    pub const PROVIDER: Provider = Provider::Twitter;

    pub async fn connect(credentials: Credentials) -> Result<Self> {
        let endpoints = TwitterEndpoints::default();
        let user_info_uri = endpoints.verify_credentials_uri.clone();
        let engine = SigningEngine::with_endpoints(credentials, endpoints);
        Self::connect_with(Box::new(engine), user_info_uri).await
    }

    /// Caller-supplied engine; used for endpoint substitution and canned
    /// engines in tests.
    pub async fn connect_with(
        engine: Box<dyn OAuth1Engine>,
        user_info_uri: impl Into<String>,
    ) -> Result<Self> {
        let request_token = engine.fetch_request_token().await?;
        Ok(Self {
            engine,
            user_info_uri: user_info_uri.into(),
            request_token,
        })
    }

    pub fn provider(&self) -> Provider {
        Self::PROVIDER
    }

    pub fn request_token(&self) -> &RequestToken {
        &self.request_token
    }

    pub fn login_uri(&self) -> String {
        self.engine.authorization_url(&self.request_token)
    }

    pub fn save_request_token_to_session(&self, session: &mut Session) -> Result<()> {
        session::save_request_token(session, &self.request_token)
    }

    pub fn request_token_from_session(
        session: &mut Session,
        delete: bool,
    ) -> Result<Option<RequestToken>> {
        session::take_request_token(session, delete)
    }

    pub fn delete_request_token_from_session(session: &mut Session) {
        session::delete_request_token(session)
    }

    /// Trades the request token restored from the session plus the callback
    /// verifier for the permanent access credential.
    pub async fn get_access_token(
        &self,
        request_token: &RequestToken,
        verifier: &str,
    ) -> Result<AccessTokenPair> {
        self.engine.fetch_access_token(request_token, verifier).await
    }

    pub fn api(&self, access_token: AccessTokenPair) -> TwitterApi<'_> {
        TwitterApi {
            login: self,
            access_token: Some(access_token),
        }
    }

    pub fn api_anonymous(&self) -> TwitterApi<'_> {
        TwitterApi {
            login: self,
            access_token: None,
        }
    }

    pub async fn get_user_info(&self, api: &TwitterApi<'_>) -> Result<TwitterUser> {
        let raw = api.verify_credentials().await?;
        Ok(TwitterUser::new(raw))
    }
}

/// Client handle bound to one access credential (or none). All calls go
/// through the login's engine so they carry a valid signature.
pub struct TwitterApi<'a> {
    login: &'a TwitterLogin,
    access_token: Option<AccessTokenPair>,
}

impl TwitterApi<'_> {
    pub async fn verify_credentials(&self) -> Result<Value> {
        self.login
            .engine
            .signed_get(&self.login.user_info_uri, self.access_token.as_ref())
            .await
    }
}
