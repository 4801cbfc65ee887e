//! Entities

pub mod player;
pub mod session;
pub mod shop_item;
