//! Session Manager
//!
//! Loads the per-request [`Session`] from its signed cookie token and writes
//! it back afterwards. Flows receive the `Session` explicitly and only touch
//! it through `get`/`set`/`clear`.
//!
//! Token format: `<uuid>.<base64url(HMAC-SHA256(uuid))>`.

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::application::config::ClassroomConfig;
use crate::domain::entity::player::Player;
use crate::domain::entity::session::{
    PLAYER_ID_KEY, PLAYER_USERNAME_KEY, SessionIdentity, SessionRecord, SessionState,
};
use crate::domain::repository::SessionRepository;
use crate::error::ClassroomResult;

/// Per-request session handle
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    state: SessionState,
    /// Creation time of the stored record this was loaded from
    created_at_ms: Option<i64>,
    /// A record exists under `id`
    stored: bool,
    /// Record to delete on commit after the id was rotated
    retired: Option<Uuid>,
    /// The client sent a session cookie, valid or not
    presented: bool,
    modified: bool,
}

impl Session {
    fn fresh(presented: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::default(),
            created_at_ms: None,
            stored: false,
            retired: None,
            presented,
            modified: false,
        }
    }

    fn from_record(record: SessionRecord) -> Self {
        Self {
            id: record.session_id,
            state: record.state,
            created_at_ms: Some(record.created_at_ms),
            stored: true,
            retired: None,
            presented: true,
            modified: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Value under `key`; a value of the wrong shape reads as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.state
            .get(key)
            .and_then(|value| T::deserialize(value).ok())
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> ClassroomResult<()> {
        self.state.insert(key, serde_json::to_value(value)?);
        self.modified = true;
        Ok(())
    }

    /// Remove every key
    ///
    /// A session that already has a stored record also gets a new id; the
    /// old record is deleted on commit, so a token handed out before
    /// sign-in never carries an identity.
    pub fn clear(&mut self) {
        self.state.clear();
        if self.stored {
            self.retired = Some(self.id);
            self.id = Uuid::new_v4();
            self.created_at_ms = None;
            self.stored = false;
        }
        self.modified = true;
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// The signed-in player, if any
    pub fn identity(&self) -> Option<SessionIdentity> {
        Some(SessionIdentity {
            player_id: self.get(PLAYER_ID_KEY)?,
            player_username: self.get(PLAYER_USERNAME_KEY)?,
        })
    }

    /// Username of the signed-in player, for page navigation
    pub fn player_username(&self) -> Option<String> {
        self.identity()
            .map(|identity| identity.player_username.into_inner())
    }

    /// Record `player` as the signed-in identity
    pub fn sign_in(&mut self, player: &Player) -> ClassroomResult<()> {
        self.set(PLAYER_ID_KEY, player.id)?;
        self.set(PLAYER_USERNAME_KEY, &player.username)?;
        Ok(())
    }
}

/// What the response must do with the session cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCookie {
    /// Leave the client's cookie as it is
    Keep,
    /// Send this token
    Set(String),
    /// Tell the client to drop its cookie
    Expire,
}

/// Session manager
pub struct SessionManager<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<ClassroomConfig>,
}

impl<S> SessionManager<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<ClassroomConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Resolve the cookie token into a session
    ///
    /// Missing, forged, unknown and expired tokens all yield a fresh empty
    /// session.
    pub async fn load(&self, token: Option<&str>) -> ClassroomResult<Session> {
        let Some(token) = token else {
            return Ok(Session::fresh(false));
        };

        let Some(session_id) = self.parse_token(token) else {
            tracing::debug!("Rejected session token with bad signature");
            return Ok(Session::fresh(true));
        };

        match self.session_repo.find_by_id(session_id).await? {
            Some(record) if record.is_expired() => {
                self.session_repo.delete(session_id).await?;
                tracing::debug!(session_id = %session_id, "Discarded expired session");
                Ok(Session::fresh(true))
            }
            Some(record) => Ok(Session::from_record(record)),
            None => Ok(Session::fresh(true)),
        }
    }

    /// Persist the session and tell the caller what to do with the cookie
    ///
    /// Empty sessions are never stored.
    pub async fn commit(&self, session: Session) -> ClassroomResult<SessionCookie> {
        if let Some(retired) = session.retired {
            self.session_repo.delete(retired).await?;
        }

        if !session.modified {
            return Ok(SessionCookie::Keep);
        }

        if session.state.is_empty() {
            if session.stored {
                self.session_repo.delete(session.id).await?;
            }
            return Ok(if session.presented {
                SessionCookie::Expire
            } else {
                SessionCookie::Keep
            });
        }

        let mut record = SessionRecord::new(
            session.id,
            session.state,
            self.config.session_lifetime_chrono(),
        );
        if let Some(created_at_ms) = session.created_at_ms {
            record.created_at_ms = created_at_ms;
        }
        self.session_repo.save(&record).await?;

        Ok(SessionCookie::Set(self.issue_token(session.id)))
    }

    /// Clean up expired sessions
    pub async fn cleanup_expired(&self) -> ClassroomResult<u64> {
        self.session_repo.cleanup_expired().await
    }

    fn issue_token(&self, session_id: Uuid) -> String {
        platform::crypto::sign(&self.config.session_secret, &session_id.to_string())
    }

    /// Verify the signature and parse the session id
    fn parse_token(&self, token: &str) -> Option<Uuid> {
        platform::crypto::verify_signed(&self.config.session_secret, token)?
            .parse()
            .ok()
    }
}
