//! Presentation Layer
//!
//! HTTP handlers, form DTOs, views, and router.

pub mod dto;
pub mod handlers;
pub mod router;
pub mod views;

pub use handlers::ClassroomAppState;
pub use router::{classroom_router, classroom_router_generic};
