use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::helpers::display_name;

/// Minutes a recipient has to enter the OTP, independent of link lifetime.
pub const OTP_VALIDITY_MINUTES: i64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShareLink {
    pub id: String,
    pub file_path: String,
    pub expires_at: String,
    pub otp: String,
    pub otp_expires_at: String,
    pub otp_used: i64,
    pub recipient_email: String,
    pub created_by: String,
    pub created_at: String,
}

impl ShareLink {
    pub fn new(
        file_path: String,
        recipient_email: String,
        created_by: String,
        expiry_hours: i64,
        otp: String,
    ) -> Self {
        let now = Utc::now();
        let expires = now + Duration::hours(expiry_hours);
        let otp_expires = now + Duration::minutes(OTP_VALIDITY_MINUTES);

        Self {
            id: Uuid::new_v4().to_string(),
            file_path,
            expires_at: expires.to_rfc3339(),
            otp,
            otp_expires_at: otp_expires.to_rfc3339(),
            otp_used: 0,
            recipient_email,
            created_by,
            created_at: now.to_rfc3339(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        timestamp_before(&self.expires_at, now)
    }

    pub fn is_otp_expired(&self, now: DateTime<Utc>) -> bool {
        timestamp_before(&self.otp_expires_at, now)
    }

    pub fn is_otp_used(&self) -> bool {
        self.otp_used != 0
    }

    pub fn display_name(&self) -> &str {
        display_name(&self.file_path)
    }

    pub fn expires_at_timestamp(&self) -> i64 {
        DateTime::parse_from_rfc3339(&self.expires_at)
            .map(|t| t.timestamp())
            .unwrap_or(0)
    }
}

// Unparseable timestamps count as already passed, so a corrupt row can
// never be served.
fn timestamp_before(rfc3339: &str, now: DateTime<Utc>) -> bool {
    match DateTime::parse_from_rfc3339(rfc3339) {
        Ok(t) => t.with_timezone(&Utc) < now,
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_link(expiry_hours: i64) -> ShareLink {
        ShareLink::new(
            "ab12cd-report.pdf".to_string(),
            "bob@example.com".to_string(),
            "alice@example.com".to_string(),
            expiry_hours,
            "482913".to_string(),
        )
    }

    #[test]
    fn test_new_link_is_fresh() {
        let link = sample_link(24);
        let now = Utc::now();
        assert!(!link.is_expired(now));
        assert!(!link.is_otp_expired(now));
        assert!(!link.is_otp_used());
        assert_eq!(link.display_name(), "report.pdf");
    }

    #[test]
    fn test_otp_window_is_shorter_than_link() {
        let link = sample_link(1);
        let in_30_minutes = Utc::now() + Duration::minutes(30);
        assert!(link.is_otp_expired(in_30_minutes));
        assert!(!link.is_expired(in_30_minutes));
    }

    #[test]
    fn test_link_created_with_one_hour_expires_after_two() {
        let link = sample_link(1);
        let in_two_hours = Utc::now() + Duration::hours(2);
        assert!(link.is_expired(in_two_hours));
    }

    #[test]
    fn test_corrupt_timestamp_counts_as_expired() {
        let mut link = sample_link(24);
        link.expires_at = "not-a-timestamp".to_string();
        assert!(link.is_expired(Utc::now()));
    }
}
