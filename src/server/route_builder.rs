use axum::{Router, extract::DefaultBodyLimit};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::{AppConfig, AppState};
use crate::database;
use crate::services::mailer::EmailJsMailer;
use crate::utils::jwt::JwtService;
use crate::utils::validation::MAX_FILE_SIZE;

pub async fn register_routes() -> Router {
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://sharelock.db?mode=rwc".to_string());

    let db = database::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    tracing::info!("Database connected and migrations applied");

    let jwt_service = Arc::new(JwtService::from_env().expect("Failed to initialize JWT service"));

    let mailer = Arc::new(EmailJsMailer::from_env().expect("Failed to initialize mailer"));

    let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());
    let public_base_url =
        std::env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let config = AppConfig {
        upload_dir: PathBuf::from(upload_dir),
        public_base_url,
    };

    let state = Arc::new(AppState {
        db,
        jwt_service,
        mailer,
        config,
    });

    let api_routes = crate::api::routes(state);

    Router::new()
        .nest("/api", api_routes)
        // Uploads arrive base64-encoded, so the body limit sits above the
        // raw file limit to cover the encoding overhead.
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + MAX_FILE_SIZE / 2))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
