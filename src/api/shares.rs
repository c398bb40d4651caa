use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::AppState;
use crate::services::share::{create_share_link, list_share_links};
use crate::utils::error::{AppError, AppResult};
use crate::utils::helpers::{extract_email, json_list, json_response};

#[derive(Deserialize)]
struct CreateShareRequest {
    file_path: String,
    recipient_email: String,
    expiry_hours: i64,
}

async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateShareRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let owner_email = extract_email(&headers)
        .ok_or_else(|| AppError::Auth("Missing authenticated user".to_string()))?;

    let created = create_share_link(
        &state.db,
        state.mailer.as_ref(),
        &state.config.public_base_url,
        req.file_path,
        req.recipient_email,
        req.expiry_hours,
        owner_email,
    )
    .await?;

    Ok(json_response(&created))
}

async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<serde_json::Value>>> {
    let owner_email = extract_email(&headers)
        .ok_or_else(|| AppError::Auth("Missing authenticated user".to_string()))?;

    let links = list_share_links(&state.db, &owner_email).await?;
    Ok(json_list(links))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(create))
        .route("/", get(list))
        .with_state(state)
}
