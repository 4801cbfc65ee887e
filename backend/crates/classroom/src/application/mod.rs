//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod login;
pub mod logout;
pub mod notice;
pub mod register;
pub mod session;
pub mod shop;

// Re-exports
pub use config::ClassroomConfig;
pub use login::{LoginInput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use notice::Notice;
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use session::{Session, SessionCookie, SessionManager};
pub use shop::ShopUseCase;
