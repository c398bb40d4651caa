use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::api::AppState;
use crate::services::file_storage::load_object;
use crate::services::share::{load_share, verify_otp};
use crate::utils::error::{AppError, AppResult};
use crate::utils::jwt::SCOPE_DOWNLOAD;

/// Public download surface. No session required: recipients hold only the
/// share URL, and the OTP arrives out-of-band.
async fn share_status(
    State(state): State<Arc<AppState>>,
    Path(share_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let link = load_share(&state.db, &share_id).await?;

    Ok(Json(json!({
        "share_id": link.id,
        "file_name": link.display_name(),
        "expires_at": link.expires_at,
    })))
}

#[derive(Deserialize)]
struct VerifyRequest {
    otp: String,
}

async fn verify(
    State(state): State<Arc<AppState>>,
    Path(share_id): Path<String>,
    Json(req): Json<VerifyRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let link = verify_otp(&state.db, &share_id, &req.otp).await?;

    let token = state
        .jwt_service
        .generate_download_token(&link.id, link.expires_at_timestamp())?;

    Ok(Json(json!({
        "share_id": link.id,
        "file_name": link.display_name(),
        "download_token": token,
    })))
}

#[derive(Deserialize)]
struct DownloadQuery {
    token: String,
}

async fn download(
    State(state): State<Arc<AppState>>,
    Path(share_id): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> AppResult<impl IntoResponse> {
    let claims = state.jwt_service.verify_token(&query.token, SCOPE_DOWNLOAD)?;
    if claims.sub != share_id {
        return Err(AppError::Auth(
            "Download token does not match this share link".to_string(),
        ));
    }

    // The row survives verification with otp_used set; only deletion or
    // link expiry ends the download window.
    let link = sqlx::query_as::<_, crate::models::share_link::ShareLink>(
        "SELECT * FROM share_links WHERE id = ?",
    )
    .bind(&share_id)
    .fetch_optional(state.db.as_ref())
    .await?
    .ok_or_else(|| AppError::NotFound("Invalid or expired share link".to_string()))?;

    // Token validation carries jsonwebtoken's clock leeway, so the row's
    // own expiry stays authoritative.
    if link.is_expired(Utc::now()) {
        return Err(AppError::LinkExpired);
    }

    let (file, contents) = load_object(&state.db, &state.config.upload_dir, &link.file_path).await?;

    tracing::info!(
        "Share download served: id={}, file={}, size={} bytes",
        share_id,
        file.display_name(),
        contents.len()
    );

    let content_disposition = format!("attachment; filename=\"{}\"", file.display_name());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type),
            (header::CONTENT_DISPOSITION, content_disposition),
        ],
        contents,
    ))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/:share_id", get(share_status))
        .route("/:share_id/verify", post(verify))
        .route("/:share_id/file", get(download))
        .with_state(state)
}
