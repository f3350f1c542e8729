use std::fmt;

use serde::{Deserialize, Serialize};

pub mod users;

pub use users::{DoubanUser, QqUser, TwitterUser, UserRecord, WeiboUser};

/// Identity provider tag. Callers use it to record which login method a
/// user arrived through; no flow behavior depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Douban,
    Weibo,
    Qq,
    Twitter,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Douban => "douban",
            Provider::Weibo => "weibo",
            Provider::Qq => "qq",
            Provider::Twitter => "twitter",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Provider;

    #[test]
    fn provider_serializes_to_lowercase_tag() {
        let value = serde_json::to_value(Provider::Weibo).expect("serialize provider");
        assert_eq!(value, serde_json::json!("weibo"));
        assert_eq!(Provider::Qq.to_string(), "qq");
    }

    #[test]
    fn provider_roundtrips_json() {
        for tag in [
            Provider::Douban,
            Provider::Weibo,
            Provider::Qq,
            Provider::Twitter,
        ] {
            let serialized = serde_json::to_string(&tag).expect("serialize");
            let parsed: Provider = serde_json::from_str(&serialized).expect("deserialize");
            assert_eq!(parsed, tag);
        }
    }
}
