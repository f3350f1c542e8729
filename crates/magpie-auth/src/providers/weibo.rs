use magpie_schema::{Provider, WeiboUser};
use reqwest::StatusCode;
use serde_json::{Map, Value};

use crate::error::{OAuthLoginError, Result};
use crate::oauth2::{build_login_uri, exchange_authorization_code, LoginUriParams};
use crate::types::Credentials;

/// Sina Weibo OAuth2 endpoints; defaults point at production.
#[derive(Debug, Clone)]
pub struct WeiboEndpoints {
    pub authorize_uri: String,
    pub access_token_uri: String,
    pub user_info_uri: String,
}

impl Default for WeiboEndpoints {
    fn default() -> Self {
        Self {
            authorize_uri: "https://api.weibo.com/oauth2/authorize".to_string(),
            access_token_uri: "https://api.weibo.com/oauth2/access_token".to_string(),
            user_info_uri: "https://api.weibo.com/2/users/show.json".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeiboLogin {
    http: reqwest::Client,
    credentials: Credentials,
    endpoints: WeiboEndpoints,
    params: LoginUriParams,
}

impl WeiboLogin {
    pub const PROVIDER: Provider = Provider::Weibo;

    pub fn new(credentials: Credentials) -> Self {
        Self::with_endpoints(credentials, WeiboEndpoints::default())
    }

    pub fn with_endpoints(credentials: Credentials, endpoints: WeiboEndpoints) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            endpoints,
            params: LoginUriParams::default(),
        }
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.params.state = Some(state.into());
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

    /// Weibo authenticates profile reads with query parameters, not a
    /// header, and additionally wants the app key as `source`.
    pub async fn get_user_info(&self, access_token: &str, uid: &str) -> Result<WeiboUser> {
        let resp = self
            .http
            .get(&self.endpoints.user_info_uri)
            .query(&[
                ("source", self.credentials.client_id.as_str()),
                ("access_token", access_token),
                ("uid", uid),
            ])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        tracing::debug!(%status, "weibo profile endpoint replied");

        if status != StatusCode::OK {
            return Err(OAuthLoginError::http_status("get_user_info", status, &body));
        }
        let raw: Value = serde_json::from_str(&body)?;
        Ok(WeiboUser::new(raw))
    }
}
