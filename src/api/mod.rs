pub mod auth;
pub mod download;
pub mod files;
pub mod shares;

use axum::Router;
use std::sync::Arc;

pub use auth::{AppConfig, AppState};

pub fn routes(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .nest("/files", files::routes(state.clone()))
        .nest("/shares", shares::routes(state.clone()))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::auth_middleware,
        ));

    Router::new()
        .nest("/auth", auth::routes(state.clone()))
        .nest("/downloads", download::routes(state.clone()))
        .merge(protected_routes)
}
