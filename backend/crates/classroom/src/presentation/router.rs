//! Classroom Router

use axum::{Router, routing::get};
use std::sync::Arc;

use crate::application::config::ClassroomConfig;
use crate::domain::repository::{PlayerRepository, SessionRepository, ShopRepository};
use crate::infra::sqlite::SqliteClassroomRepository;
use crate::presentation::handlers::{self, ClassroomAppState};

/// Create the Classroom router with the SQLite repository
pub fn classroom_router(repo: SqliteClassroomRepository, config: ClassroomConfig) -> Router {
    classroom_router_generic(repo, config)
}

/// Create a generic Classroom router for any repository implementation
pub fn classroom_router_generic<R>(repo: R, config: ClassroomConfig) -> Router
where
    R: PlayerRepository + ShopRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let state = ClassroomAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    };

    Router::new()
        .route("/", get(handlers::index::<R>))
        .route(
            "/register",
            get(handlers::register_page::<R>).post(handlers::register::<R>),
        )
        .route(
            "/login",
            get(handlers::login_page::<R>).post(handlers::login::<R>),
        )
        .route("/logout", get(handlers::logout::<R>))
        .route("/shop", get(handlers::shop::<R>))
        .route("/avatarshop", get(handlers::avatar_shop::<R>))
        .with_state(state)
}
