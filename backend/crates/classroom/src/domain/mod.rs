//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{player::Player, session::SessionRecord, shop_item::ShopItem};
pub use repository::{PlayerRepository, SessionRepository, ShopRepository};
