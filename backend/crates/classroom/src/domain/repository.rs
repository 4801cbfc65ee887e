//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use uuid::Uuid;

use crate::domain::entity::{player::Player, session::SessionRecord, shop_item::ShopItem};
use crate::domain::value_object::{
    player_id::PlayerId, player_password::HashedPassword, user_name::UserName,
};
use crate::error::ClassroomResult;

/// Credential store
#[trait_variant::make(PlayerRepository: Send)]
pub trait LocalPlayerRepository {
    /// Exact-match lookup by username
    async fn find_by_username(&self, username: &UserName) -> ClassroomResult<Option<Player>>;

    /// Insert a player and return the generated id
    ///
    /// A uniqueness violation surfaces as `ValidationError::UsernameTaken`.
    async fn insert(
        &self,
        username: &UserName,
        password_hash: &HashedPassword,
    ) -> ClassroomResult<PlayerId>;
}

/// Shop catalog
#[trait_variant::make(ShopRepository: Send)]
pub trait LocalShopRepository {
    /// Every catalog row, ordered by id
    async fn list_items(&self) -> ClassroomResult<Vec<ShopItem>>;
}

/// Server-side session storage
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Find session by ID
    async fn find_by_id(&self, session_id: Uuid) -> ClassroomResult<Option<SessionRecord>>;

    /// Insert or replace a session
    async fn save(&self, session: &SessionRecord) -> ClassroomResult<()>;

    /// Delete a session; deleting a missing session is not an error
    async fn delete(&self, session_id: Uuid) -> ClassroomResult<()>;

    /// Clean up expired sessions
    async fn cleanup_expired(&self) -> ClassroomResult<u64>;
}
