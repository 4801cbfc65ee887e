//! Classroom Web Backend
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases and the session manager
//! - `infra/` - SQLite implementations and migrations
//! - `presentation/` - HTTP handlers, form DTOs, views, router
//!
//! ## Features
//! - Player registration and login with username + password
//! - Server-side sessions behind a signed cookie token
//! - Read-only shop listing and a static avatar picker
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, one random salt per digest
//! - Unknown usernames and wrong passwords are indistinguishable
//! - Session ids rotate whenever a stored session is cleared

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::ClassroomConfig;
pub use error::{ClassroomError, ClassroomResult, ValidationError};
pub use infra::sqlite::{MIGRATOR, SqliteClassroomRepository};
pub use presentation::router::{classroom_router, classroom_router_generic};

#[cfg(test)]
mod tests;
