//! Login Use Case
//!
//! Verifies credentials and records the player in the session.

use std::sync::Arc;

use crate::application::config::ClassroomConfig;
use crate::application::session::Session;
use crate::domain::entity::session::SessionIdentity;
use crate::domain::repository::PlayerRepository;
use crate::domain::value_object::{player_password::RawPassword, user_name::UserName};
use crate::error::{ClassroomResult, ValidationError};

/// Login input, straight from the form
#[derive(Debug, Default)]
pub struct LoginInput {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Login use case
pub struct LoginUseCase<P>
where
    P: PlayerRepository,
{
    player_repo: Arc<P>,
    config: Arc<ClassroomConfig>,
}

impl<P> LoginUseCase<P>
where
    P: PlayerRepository,
{
    pub fn new(player_repo: Arc<P>, config: Arc<ClassroomConfig>) -> Self {
        Self {
            player_repo,
            config,
        }
    }

    /// First step of every login attempt, including just viewing the form
    pub fn begin(&self, session: &mut Session) {
        session.clear();
    }

    pub async fn execute(
        &self,
        session: &mut Session,
        input: LoginInput,
    ) -> ClassroomResult<SessionIdentity> {
        self.begin(session);

        let username =
            UserName::from_input(input.username).ok_or(ValidationError::MissingUsername)?;
        let password =
            RawPassword::from_input(input.password).ok_or(ValidationError::MissingPassword)?;

        let player = self.player_repo.find_by_username(&username).await?;

        let hasher = &self.config.password_hasher;
        let player = match player {
            Some(player) if hasher.verify(password.inner(), &player.password_hash) => player,
            Some(_) => return Err(ValidationError::InvalidCredentials.into()),
            None => {
                hasher.verify_dummy(password.inner());
                return Err(ValidationError::InvalidCredentials.into());
            }
        };

        if player.password_hash.is_legacy() {
            tracing::info!(player_id = %player.id, "Verified a legacy PBKDF2 digest");
        }

        session.sign_in(&player)?;

        tracing::info!(
            player_id = %player.id,
            session_id = %session.id(),
            "Player signed in"
        );

        Ok(SessionIdentity {
            player_id: player.id,
            player_username: player.username,
        })
    }
}
