//! Session Entity
//!
//! Server-side key/value state behind a session cookie.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::value_object::{player_id::PlayerId, user_name::UserName};

/// Session key holding the signed-in player's id
pub const PLAYER_ID_KEY: &str = "player_id";

/// Session key holding the signed-in player's username
pub const PLAYER_USERNAME_KEY: &str = "player_username";

/// Key/value contents of a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionState(BTreeMap<String, Value>);

impl SessionState {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Who is signed in, as recorded in the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub player_id: PlayerId,
    pub player_username: UserName,
}

/// Persisted session
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// Session ID (UUID v4), the payload of the signed cookie token
    pub session_id: Uuid,
    pub state: SessionState,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
    /// `None` for sessions that live until the browser drops the cookie
    pub expires_at_ms: Option<i64>,
}

impl SessionRecord {
    /// Create a record stamped with the current time
    ///
    /// Lifetime is provided by the application layer (config).
    pub fn new(session_id: Uuid, state: SessionState, lifetime: Option<Duration>) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            state,
            created_at_ms: now.timestamp_millis(),
            updated_at_ms: now.timestamp_millis(),
            expires_at_ms: lifetime.map(|ttl| (now + ttl).timestamp_millis()),
        }
    }

    /// Check if session has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at_ms
            .is_some_and(|expires| Utc::now().timestamp_millis() > expires)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serializes_as_plain_object() {
        let mut state = SessionState::default();
        state.insert(PLAYER_ID_KEY, Value::from(3));
        state.insert(PLAYER_USERNAME_KEY, Value::from("alice"));

        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"player_id":3,"player_username":"alice"}"#);

        let back: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_non_permanent_record_never_expires() {
        let record = SessionRecord::new(Uuid::new_v4(), SessionState::default(), None);
        assert!(record.expires_at_ms.is_none());
        assert!(!record.is_expired());
    }

    #[test]
    fn test_expiry() {
        let live = SessionRecord::new(
            Uuid::new_v4(),
            SessionState::default(),
            Some(Duration::hours(1)),
        );
        assert!(!live.is_expired());

        let dead = SessionRecord::new(
            Uuid::new_v4(),
            SessionState::default(),
            Some(Duration::milliseconds(-1)),
        );
        assert!(dead.is_expired());
    }
}
