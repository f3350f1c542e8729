use serde::{Deserialize, Serialize};

/// Provider-issued application credentials, fixed for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }
}

/// Ephemeral OAuth1 credential, alive only between the authorize redirect
/// and the callback. Round-trips through the session store as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestToken {
    pub key: String,
    pub secret: String,
}

/// Permanent OAuth1 access credential. Ownership passes to the caller as
/// soon as the exchange returns; this crate keeps no copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenPair {
    pub token: String,
    pub secret: String,
}
