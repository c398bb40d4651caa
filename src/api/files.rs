use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    routing::{delete, get, post},
};
use base64::Engine;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::AppState;
use crate::services::file_storage::{delete_file, list_files, save_file};
use crate::utils::error::{AppError, AppResult};
use crate::utils::helpers::{extract_email, json_list, json_response};

#[derive(Deserialize)]
struct UploadRequest {
    name: String,
    content_type: String,
    data: String,
}

fn caller_email(headers: &HeaderMap) -> AppResult<String> {
    extract_email(headers).ok_or_else(|| AppError::Auth("Missing authenticated user".to_string()))
}

async fn upload(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<UploadRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let owner_email = caller_email(&headers)?;

    let data = base64::engine::general_purpose::STANDARD
        .decode(&req.data)
        .map_err(|e| AppError::BadRequest(format!("Invalid base64: {}", e)))?;

    let file = save_file(
        &state.db,
        &state.config.upload_dir,
        req.name,
        req.content_type,
        data,
        owner_email,
    )
    .await?;

    Ok(json_response(&file))
}

async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<serde_json::Value>>> {
    let owner_email = caller_email(&headers)?;
    let files = list_files(&state.db, &owner_email).await?;
    Ok(json_list(files))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let owner_email = caller_email(&headers)?;
    delete_file(&state.db, &state.config.upload_dir, &key, &owner_email).await?;
    Ok(Json(serde_json::json!({"success": true})))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(upload))
        .route("/", get(list))
        .route("/:key", delete(remove))
        .with_state(state)
}
