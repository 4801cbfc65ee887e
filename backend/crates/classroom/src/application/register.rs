//! Register Use Case
//!
//! Creates a new player account.

use std::sync::Arc;

use crate::application::config::ClassroomConfig;
use crate::application::notice::Notice;
use crate::domain::repository::PlayerRepository;
use crate::domain::value_object::{
    player_id::PlayerId, player_password::RawPassword, user_name::UserName,
};
use crate::error::{ClassroomResult, ValidationError};

/// Register input, straight from the form
#[derive(Debug, Default)]
pub struct RegisterInput {
    pub username: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

/// Register output
#[derive(Debug)]
pub struct RegisterOutput {
    pub player_id: PlayerId,
    pub notice: Notice,
}

/// Register use case
pub struct RegisterUseCase<P>
where
    P: PlayerRepository,
{
    player_repo: Arc<P>,
    config: Arc<ClassroomConfig>,
}

impl<P> RegisterUseCase<P>
where
    P: PlayerRepository,
{
    pub fn new(player_repo: Arc<P>, config: Arc<ClassroomConfig>) -> Self {
        Self {
            player_repo,
            config,
        }
    }

    /// Validate, hash and insert
    ///
    /// Checks run in a fixed order and the first failure ends the request
    /// without writing anything.
    pub async fn execute(&self, input: RegisterInput) -> ClassroomResult<RegisterOutput> {
        let username =
            UserName::from_input(input.username).ok_or(ValidationError::MissingUsername)?;

        if self
            .player_repo
            .find_by_username(&username)
            .await?
            .is_some()
        {
            return Err(ValidationError::UsernameTaken.into());
        }

        let password =
            RawPassword::from_input(input.password).ok_or(ValidationError::MissingPassword)?;
        let confirmation = RawPassword::from_input(input.confirm_password)
            .ok_or(ValidationError::MissingConfirmation)?;

        if !password.matches(&confirmation) {
            return Err(ValidationError::PasswordMismatch.into());
        }

        let password_hash = self.config.password_hasher.hash(password.inner())?;

        // The unique index still guards against a concurrent registration
        let player_id = self.player_repo.insert(&username, &password_hash).await?;

        tracing::info!(player_id = %player_id, username = %username, "Player registered");

        Ok(RegisterOutput {
            player_id,
            notice: Notice::AccountCreated,
        })
    }
}
