use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Provider;

/// Read-only view over a provider's raw profile payload.
///
/// Each provider returns its own shape; accessors normalize the handful of
/// fields the application actually shows. The untouched payload stays
/// reachable through [`UserRecord::raw`].
pub trait UserRecord {
    fn provider(&self) -> Provider;
    /// Stable provider-side identifier.
    fn uid(&self) -> Option<String>;
    fn screen_name(&self) -> Option<String>;
    fn avatar_url(&self) -> Option<String>;
    /// The profile payload exactly as the provider sent it.
    fn raw(&self) -> &Value;
}

/// Douban's legacy people API (`alt=json`) wraps scalar fields in GData
/// `{"$t": …}` objects; newer payloads drop the wrapper.
fn gdata_text(value: &Value, field: &str) -> Option<String> {
    let node = value.get(field)?;
    node.get("$t")
        .and_then(Value::as_str)
        .or_else(|| node.as_str())
        .map(str::to_owned)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoubanUser {
    raw: Value,
}

impl DoubanUser {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }
}

impl UserRecord for DoubanUser {
    fn provider(&self) -> Provider {
        Provider::Douban
    }

    fn uid(&self) -> Option<String> {
        gdata_text(&self.raw, "uid")
    }

    fn screen_name(&self) -> Option<String> {
        gdata_text(&self.raw, "title")
    }

    fn avatar_url(&self) -> Option<String> {
        gdata_text(&self.raw, "icon")
    }

    fn raw(&self) -> &Value {
        &self.raw
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeiboUser {
    raw: Value,
}

impl WeiboUser {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }
}

impl UserRecord for WeiboUser {
    fn provider(&self) -> Provider {
        Provider::Weibo
    }

    /// `idstr` when present; older payloads only carry the numeric `id`.
    fn uid(&self) -> Option<String> {
        self.raw
            .get("idstr")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .or_else(|| {
                self.raw
                    .get("id")
                    .and_then(Value::as_i64)
                    .map(|id| id.to_string())
            })
    }

    fn screen_name(&self) -> Option<String> {
        self.raw
            .get("screen_name")
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    fn avatar_url(&self) -> Option<String> {
        self.raw
            .get("profile_image_url")
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    fn raw(&self) -> &Value {
        &self.raw
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwitterUser {
    raw: Value,
}

impl TwitterUser {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }
}

impl UserRecord for TwitterUser {
    fn provider(&self) -> Provider {
        Provider::Twitter
    }

    fn uid(&self) -> Option<String> {
        self.raw
            .get("id_str")
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    fn screen_name(&self) -> Option<String> {
        self.raw
            .get("screen_name")
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    fn avatar_url(&self) -> Option<String> {
        self.raw
            .get("profile_image_url_https")
            .or_else(|| self.raw.get("profile_image_url"))
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    fn raw(&self) -> &Value {
        &self.raw
    }
}

/// QQ's profile payload carries no identifier; the openid used for the
/// fetch is the uid and is recorded alongside the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QqUser {
    openid: String,
    raw: Value,
}

impl QqUser {
    pub fn new(openid: impl Into<String>, raw: Value) -> Self {
        Self {
            openid: openid.into(),
            raw,
        }
    }

    pub fn openid(&self) -> &str {
        &self.openid
    }
}

impl UserRecord for QqUser {
    fn provider(&self) -> Provider {
        Provider::Qq
    }

    fn uid(&self) -> Option<String> {
        Some(self.openid.clone())
    }

    fn screen_name(&self) -> Option<String> {
        self.raw
            .get("nickname")
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    fn avatar_url(&self) -> Option<String> {
        self.raw
            .get("figureurl_qq_1")
            .or_else(|| self.raw.get("figureurl"))
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    fn raw(&self) -> &Value {
        &self.raw
    }
}
