use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    routing::{get, post},
};
use std::path::PathBuf;
use std::sync::Arc;

use crate::database::DbPool;
use crate::services::auth::{CredentialsRequest, get_session_user, login_user, register_user};
use crate::services::mailer::Mailer;
use crate::utils::error::{AppError, AppResult};
use crate::utils::helpers::json_response;
use crate::utils::jwt::JwtService;

#[derive(Clone)]
pub struct AppConfig {
    pub upload_dir: PathBuf,
    pub public_base_url: String,
}

pub struct AppState {
    pub db: DbPool,
    pub jwt_service: Arc<JwtService>,
    pub mailer: Arc<dyn Mailer>,
    pub config: AppConfig,
}

async fn health_check() -> &'static str {
    "OK"
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CredentialsRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let response = register_user(&state.db, payload, &state.jwt_service).await?;
    Ok(json_response(&response))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CredentialsRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let response = login_user(&state.db, payload, &state.jwt_service).await?;
    Ok(json_response(&response))
}

async fn logout() -> StatusCode {
    // Tokens are client-held; logout is an acknowledgment.
    StatusCode::OK
}

/// Session retrieval: resolves a bearer token to its user, the check the
/// client runs on startup before rendering anything gated.
async fn session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<serde_json::Value>> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Auth("Missing or invalid authorization header".to_string()))?;

    let email = state.jwt_service.extract_email(token)?;
    let user = get_session_user(&state.db, &email).await?;

    Ok(json_response(&user))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/session", get(session))
        .with_state(state)
}
