use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::crypto::random_object_prefix;
use crate::utils::helpers::display_name;

/// One object in the upload directory. `key` doubles as the on-disk file
/// name and the value share links reference through `file_path`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredFile {
    pub key: String,
    pub original_name: String,
    pub content_type: String,
    pub size: i64,
    pub file_hash: String,
    pub owner_email: String,
    pub uploaded_at: String,
}

impl StoredFile {
    pub fn new(
        original_name: String,
        content_type: String,
        size: i64,
        file_hash: String,
        owner_email: String,
    ) -> Self {
        let key = format!("{}-{}", random_object_prefix(), original_name);

        Self {
            key,
            original_name,
            content_type,
            size,
            file_hash,
            owner_email,
            uploaded_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn display_name(&self) -> &str {
        display_name(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_prefix_recovers_original_name() {
        let file = StoredFile::new(
            "report.pdf".to_string(),
            "application/pdf".to_string(),
            1024,
            "deadbeef".to_string(),
            "alice@example.com".to_string(),
        );

        assert!(file.key.ends_with("-report.pdf"));
        assert_eq!(file.display_name(), "report.pdf");
    }
}
