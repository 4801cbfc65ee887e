//! Player Entity

use crate::domain::value_object::{
    player_id::PlayerId, player_password::HashedPassword, user_name::UserName,
};

/// Registered player
///
/// Created on registration and never modified afterwards.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub username: UserName,
    pub password_hash: HashedPassword,
}
