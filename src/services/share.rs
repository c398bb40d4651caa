use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::DbPool;
use crate::models::share_link::ShareLink;
use crate::services::file_storage::get_owned_file;
use crate::services::mailer::{Mailer, OtpEmail};
use crate::utils::crypto::generate_otp;
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::{validate_email, validate_expiry_hours};

#[derive(Debug, Serialize)]
pub struct ShareCreated {
    #[serde(flatten)]
    pub link: ShareLink,
    pub share_url: String,
    pub email_sent: bool,
}

/// Creates the share row, then attempts the notification. The row is kept
/// even when the send fails; the caller learns about it via `email_sent`.
pub async fn create_share_link(
    pool: &DbPool,
    mailer: &dyn Mailer,
    public_base_url: &str,
    file_path: String,
    recipient_email: String,
    expiry_hours: i64,
    owner_email: String,
) -> AppResult<ShareCreated> {
    if file_path.is_empty() {
        return Err(AppError::Validation(
            "Please select a file to share".to_string(),
        ));
    }
    validate_email(&recipient_email)?;
    validate_expiry_hours(expiry_hours)?;

    get_owned_file(pool, &file_path, &owner_email).await?;

    let otp = generate_otp();
    let link = ShareLink::new(file_path, recipient_email, owner_email, expiry_hours, otp);

    insert_share_link(pool, &link).await?;

    tracing::info!(
        "Share link created: id={}, file={}, expires_at={}",
        link.id,
        link.file_path,
        link.expires_at
    );

    let share_url = format!("{}/download/{}", public_base_url.trim_end_matches('/'), link.id);

    let email = OtpEmail {
        recipient: link.recipient_email.clone(),
        otp: link.otp.clone(),
        expires_display: format_expiry(&link.otp_expires_at),
        share_url: share_url.clone(),
    };

    let email_sent = match mailer.send_otp(&email).await {
        Ok(()) => true,
        Err(e) => {
            // The link stays live; only the recipient was never told.
            tracing::warn!("Share link {} created but email failed: {}", link.id, e);
            false
        }
    };

    Ok(ShareCreated {
        link,
        share_url,
        email_sent,
    })
}

pub async fn insert_share_link(pool: &DbPool, link: &ShareLink) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO share_links (id, file_path, expires_at, otp, otp_expires_at, otp_used, recipient_email, created_by, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&link.id)
    .bind(&link.file_path)
    .bind(&link.expires_at)
    .bind(&link.otp)
    .bind(&link.otp_expires_at)
    .bind(link.otp_used)
    .bind(&link.recipient_email)
    .bind(&link.created_by)
    .bind(&link.created_at)
    .execute(pool.as_ref())
    .await?;

    Ok(())
}

pub async fn list_share_links(pool: &DbPool, owner_email: &str) -> AppResult<Vec<ShareLink>> {
    let links = sqlx::query_as::<_, ShareLink>(
        "SELECT * FROM share_links WHERE created_by = ? ORDER BY created_at DESC",
    )
    .bind(owner_email)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(links)
}

/// Loads a share for the download page, applying the access checks in
/// order: link expiry (with lazy deletion of the row), consumed OTP, OTP
/// expiry. Only the link-expired case deletes; the OTP-expired row is left
/// behind, matching the long-standing behavior of the share page.
pub async fn load_share(pool: &DbPool, share_id: &str) -> AppResult<ShareLink> {
    let link = sqlx::query_as::<_, ShareLink>("SELECT * FROM share_links WHERE id = ?")
        .bind(share_id)
        .fetch_optional(pool.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid or expired share link".to_string()))?;

    let now = Utc::now();

    if link.is_expired(now) {
        sqlx::query("DELETE FROM share_links WHERE id = ?")
            .bind(share_id)
            .execute(pool.as_ref())
            .await?;
        tracing::info!("Expired share link removed: id={}", share_id);
        return Err(AppError::LinkExpired);
    }

    if link.is_otp_used() {
        return Err(AppError::OtpUsed);
    }

    if link.is_otp_expired(now) {
        return Err(AppError::OtpExpired);
    }

    Ok(link)
}

/// Consumes the OTP. The single-use flag is claimed with a conditional
/// update so that of two concurrent correct entries exactly one wins.
pub async fn verify_otp(pool: &DbPool, share_id: &str, submitted: &str) -> AppResult<ShareLink> {
    let link = load_share(pool, share_id).await?;

    let entered = submitted.trim();
    let stored = link.otp.trim();

    if entered != stored {
        tracing::debug!("OTP mismatch for share link {}", share_id);
        return Err(AppError::InvalidOtp);
    }

    let claimed = sqlx::query("UPDATE share_links SET otp_used = 1 WHERE id = ? AND otp_used = 0")
        .bind(share_id)
        .execute(pool.as_ref())
        .await?
        .rows_affected();

    if claimed == 0 {
        return Err(AppError::OtpUsed);
    }

    tracing::info!("OTP verified for share link {}", share_id);

    Ok(ShareLink {
        otp_used: 1,
        ..link
    })
}

fn format_expiry(rfc3339: &str) -> String {
    match DateTime::parse_from_rfc3339(rfc3339) {
        Ok(t) => t.with_timezone(&Utc).format("%Y-%m-%d %H:%M UTC").to_string(),
        Err(_) => rfc3339.to_string(),
    }
}
