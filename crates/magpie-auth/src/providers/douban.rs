use magpie_schema::{DoubanUser, Provider};
use reqwest::StatusCode;
use serde_json::{Map, Value};

use crate::error::{OAuthLoginError, Result};
use crate::oauth2::{build_login_uri, exchange_authorization_code, LoginUriParams};
use crate::types::Credentials;

/// Douban OAuth2 endpoints; defaults point at production.
#[derive(Debug, Clone)]
pub struct DoubanEndpoints {
    pub authorize_uri: String,
    pub access_token_uri: String,
    pub user_info_uri: String,
}

impl Default for DoubanEndpoints {
    fn default() -> Self {
        Self {
            authorize_uri: "https://www.douban.com/service/auth2/auth".to_string(),
            access_token_uri: "https://www.douban.com/service/auth2/token".to_string(),
            user_info_uri: "https://api.douban.com/people/@me".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DoubanLogin {
    http: reqwest::Client,
    credentials: Credentials,
    endpoints: DoubanEndpoints,
    params: LoginUriParams,
}

impl DoubanLogin {
    pub const PROVIDER: Provider = Provider::Douban;

    pub fn new(credentials: Credentials) -> Self {
        Self::with_endpoints(credentials, DoubanEndpoints::default())
    }

    pub fn with_endpoints(credentials: Credentials, endpoints: DoubanEndpoints) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            endpoints,
            params: LoginUriParams::default(),
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

    pub async fn get_access_token(&self, code: &str) -> Result<Map<String, Value>> {
        exchange_authorization_code(
            &self.http,
            &self.endpoints.access_token_uri,
            &self.credentials,
            code,
        )
        .await
    }

    /// Fetches the caller's own profile with a Bearer header. Douban's
    /// legacy people API only answers JSON when asked with `alt=json`.
    pub async fn get_user_info(&self, access_token: &str) -> Result<DoubanUser> {
        let resp = self
            .http
            .get(&self.endpoints.user_info_uri)
            .query(&[("alt", "json")])
            .bearer_auth(access_token)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        tracing::debug!(%status, "douban profile endpoint replied");

        if status != StatusCode::OK {
            return Err(OAuthLoginError::http_status("get_user_info", status, &body));
        }
        let raw: Value = serde_json::from_str(&body)?;
        Ok(DoubanUser::new(raw))
    }
}
