use reqwest::StatusCode;
use serde_json::{Map, Value};
use url::Url;

use crate::error::{OAuthLoginError, Result};
use crate::types::Credentials;

/// Optional authorize-URL knobs shared by every OAuth2 provider. Absent
/// fields are omitted from the query string entirely.
#[derive(Debug, Clone, Default)]
pub struct LoginUriParams {
    pub scope: Option<String>,
    pub state: Option<String>,
    pub display: Option<String>,
}

/// Builds the authorize URL: `client_id`, `response_type=code`, and
/// `redirect_uri` always, plus whichever optional knobs are set.
pub fn build_login_uri(
    authorize_endpoint: &str,
    credentials: &Credentials,
    params: &LoginUriParams,
) -> Result<String> {
    let mut pairs: Vec<(&str, &str)> = vec![
        ("client_id", credentials.client_id.as_str()),
        ("response_type", "code"),
        ("redirect_uri", credentials.redirect_uri.as_str()),
    ];
    if let Some(display) = params.display.as_deref() {
        pairs.push(("display", display));
    }
    if let Some(scope) = params.scope.as_deref() {
        pairs.push(("scope", scope));
    }
    if let Some(state) = params.state.as_deref() {
        pairs.push(("state", state));
    }

    let uri = Url::parse_with_params(authorize_endpoint, &pairs)
        .map_err(|e| OAuthLoginError::malformed("build_login_uri", e))?;
    Ok(uri.into())
}

/// POSTs the authorization code to the token endpoint and returns the
/// decoded reply mapping (`access_token` plus provider-specific extras).
pub async fn exchange_authorization_code(
    http: &reqwest::Client,
    token_endpoint: &str,
    credentials: &Credentials,
    code: &str,
) -> Result<Map<String, Value>> {
    let form = [
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
        ("redirect_uri", credentials.redirect_uri.as_str()),
        ("grant_type", "authorization_code"),
        ("code", code),
    ];

    let resp = http.post(token_endpoint).form(&form).send().await?;
    let status = resp.status();
    let body = resp.text().await?;
    tracing::debug!(%status, endpoint = token_endpoint, "token endpoint replied");

    if status != StatusCode::OK {
        return Err(OAuthLoginError::http_status("get_access_token", status, &body));
    }
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use url::Url;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{build_login_uri, exchange_authorization_code, LoginUriParams};
    use crate::types::Credentials;

    fn credentials() -> Credentials {
        Credentials::new("app-key", "app-secret", "https://example.com/callback")
    }

    #[test]
    fn login_uri_roundtrips_required_params() {
        let uri = build_login_uri(
            "https://provider.example/auth",
            &credentials(),
            &LoginUriParams::default(),
        )
        .expect("build uri");

        let parsed = Url::parse(&uri).expect("parse produced uri");
        let pairs: HashMap<_, _> = parsed.query_pairs().into_owned().collect();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs.get("client_id").map(String::as_str), Some("app-key"));
        assert_eq!(pairs.get("response_type").map(String::as_str), Some("code"));
        assert_eq!(
            pairs.get("redirect_uri").map(String::as_str),
            Some("https://example.com/callback")
        );
    }

    #[test]
    fn login_uri_includes_optional_params_only_when_set() {
        let params = LoginUriParams {
            scope: Some("basic".to_string()),
            state: Some("s1".to_string()),
            display: None,
        };
        let uri = build_login_uri("https://provider.example/auth", &credentials(), &params)
            .expect("build uri");

        let parsed = Url::parse(&uri).expect("parse produced uri");
        let pairs: HashMap<_, _> = parsed.query_pairs().into_owned().collect();
        assert_eq!(pairs.get("scope").map(String::as_str), Some("basic"));
        assert_eq!(pairs.get("state").map(String::as_str), Some("s1"));
        assert!(!pairs.contains_key("display"));
    }

    #[tokio::test]
    async fn exchange_posts_the_grant_and_decodes_json() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("client_id=app-key"))
            .and(body_string_contains("client_secret=app-secret"))
            .and(body_string_contains("code=code-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "at_9",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let reply = exchange_authorization_code(
            &reqwest::Client::new(),
            &format!("{}/token", server.uri()),
            &credentials(),
            "code-123",
        )
        .await
        .expect("exchange should succeed");

        assert_eq!(reply.get("access_token"), Some(&serde_json::json!("at_9")));
        assert_eq!(reply.get("expires_in"), Some(&serde_json::json!(3600)));
    }

    #[tokio::test]
    async fn exchange_surfaces_status_and_body_on_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let err = exchange_authorization_code(
            &reqwest::Client::new(),
            &format!("{}/token", server.uri()),
            &credentials(),
            "stale-code",
        )
        .await
        .expect_err("non-200 must fail");

        let message = err.to_string();
        assert!(message.contains("400"));
        assert!(message.contains("invalid_grant"));
    }
}
