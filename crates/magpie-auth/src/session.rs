use std::collections::HashMap;

use crate::error::Result;
use crate::types::RequestToken;

/// The single key this crate touches in the caller's session mapping.
pub const REQUEST_TOKEN_KEY: &str = "request_token";

/// Caller-supplied session store. Callers must not access the same session
/// concurrently; this crate only ever reads and writes [`REQUEST_TOKEN_KEY`].
pub type Session = HashMap<String, String>;

pub fn save_request_token(session: &mut Session, token: &RequestToken) -> Result<()> {
    let encoded = serde_json::to_string(token)?;
    session.insert(REQUEST_TOKEN_KEY.to_string(), encoded);
    Ok(())
}

/// Reads the stored request token, removing it unless `delete` is false.
/// A request token is consumed at most once; the deleting read is the
/// normal callback-leg usage.
pub fn take_request_token(session: &mut Session, delete: bool) -> Result<Option<RequestToken>> {
    let raw = match session.get(REQUEST_TOKEN_KEY) {
        Some(raw) => raw.clone(),
        None => return Ok(None),
    };
    if delete {
        delete_request_token(session);
    }
    let token = serde_json::from_str(&raw)?;
    Ok(Some(token))
}

pub fn delete_request_token(session: &mut Session) {
    session.remove(REQUEST_TOKEN_KEY);
}

#[cfg(test)]
mod tests {
    use super::{
        delete_request_token, save_request_token, take_request_token, Session, REQUEST_TOKEN_KEY,
    };
    use crate::types::RequestToken;

    fn token() -> RequestToken {
        RequestToken {
            key: "req-key".to_string(),
            secret: "req-secret".to_string(),
        }
    }

    #[test]
    fn roundtrip_consumes_the_token() {
        let mut session = Session::new();
        save_request_token(&mut session, &token()).expect("save");

        let restored = take_request_token(&mut session, true).expect("take");
        assert_eq!(restored, Some(token()));
        assert!(!session.contains_key(REQUEST_TOKEN_KEY));

        let second = take_request_token(&mut session, true).expect("second take");
        assert_eq!(second, None);
    }

    #[test]
    fn non_deleting_read_retains_the_token() {
        let mut session = Session::new();
        save_request_token(&mut session, &token()).expect("save");

        let restored = take_request_token(&mut session, false).expect("take");
        assert_eq!(restored, Some(token()));
        assert!(session.contains_key(REQUEST_TOKEN_KEY));
    }

    #[test]
    fn delete_is_idempotent_and_leaves_other_keys() {
        let mut session = Session::new();
        session.insert("user_id".to_string(), "42".to_string());
        save_request_token(&mut session, &token()).expect("save");

        delete_request_token(&mut session);
        delete_request_token(&mut session);

        assert!(!session.contains_key(REQUEST_TOKEN_KEY));
        assert_eq!(session.get("user_id").map(String::as_str), Some("42"));
    }

    #[test]
    fn garbage_in_session_is_an_error() {
        let mut session = Session::new();
        session.insert(REQUEST_TOKEN_KEY.to_string(), "{not json".to_string());

        assert!(take_request_token(&mut session, true).is_err());
    }
}
