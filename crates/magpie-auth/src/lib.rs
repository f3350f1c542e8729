pub mod error;
pub mod oauth1;
pub mod oauth2;
pub mod providers;
pub mod session;
pub mod types;

pub use error::{OAuthLoginError, Result};
pub use magpie_schema::Provider;
pub use oauth1::{OAuth1Engine, SigningEngine, TwitterEndpoints};
pub use oauth2::LoginUriParams;
pub use providers::douban::{DoubanEndpoints, DoubanLogin};
pub use providers::qq::{parse_mixed_reply, QqEndpoints, QqLogin};
pub use providers::twitter::{TwitterApi, TwitterLogin};
pub use providers::weibo::{WeiboEndpoints, WeiboLogin};
pub use session::{Session, REQUEST_TOKEN_KEY};
pub use types::{AccessTokenPair, Credentials, RequestToken};
