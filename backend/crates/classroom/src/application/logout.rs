//! Logout Use Case

use crate::application::session::Session;

/// Logout use case
///
/// Needs no authorization: clearing an empty session is a no-op.
#[derive(Debug, Default)]
pub struct LogoutUseCase;

impl LogoutUseCase {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, session: &mut Session) {
        if let Some(identity) = session.identity() {
            tracing::info!(player_id = %identity.player_id, "Player signed out");
        }
        session.clear();
    }
}
