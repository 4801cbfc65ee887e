//! Value Object Module

pub mod player_id;
pub mod player_password;
pub mod user_name;
