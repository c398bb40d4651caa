use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::database::DbPool;
use crate::models::stored_file::StoredFile;
use crate::utils::crypto::hash_file;
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::{validate_file_name, validate_file_size};

pub async fn save_file(
    pool: &DbPool,
    upload_dir: &Path,
    original_name: String,
    content_type: String,
    data: Vec<u8>,
    owner_email: String,
) -> AppResult<StoredFile> {
    tracing::info!(
        "Uploading file: {} ({} bytes, type: {})",
        original_name,
        data.len(),
        content_type
    );

    validate_file_name(&original_name)?;
    validate_file_size(&data)?;

    fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create upload directory: {}", e)))?;

    let file_hash = hash_file(&data);
    let file_model = StoredFile::new(
        original_name,
        content_type,
        data.len() as i64,
        file_hash,
        owner_email,
    );

    let file_path = upload_dir.join(&file_model.key);

    let mut file = fs::File::create(&file_path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create file: {}", e)))?;

    file.write_all(&data)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to write file: {}", e)))?;

    sqlx::query(
        "INSERT INTO files (key, original_name, content_type, size, file_hash, owner_email, uploaded_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&file_model.key)
    .bind(&file_model.original_name)
    .bind(&file_model.content_type)
    .bind(file_model.size)
    .bind(&file_model.file_hash)
    .bind(&file_model.owner_email)
    .bind(&file_model.uploaded_at)
    .execute(pool.as_ref())
    .await?;

    tracing::info!(
        "File saved: key={}, size={} bytes, hash={}",
        file_model.key,
        file_model.size,
        &file_model.file_hash
    );

    Ok(file_model)
}

pub async fn list_files(pool: &DbPool, owner_email: &str) -> AppResult<Vec<StoredFile>> {
    tracing::debug!("Listing files for {}", owner_email);

    let files = sqlx::query_as::<_, StoredFile>(
        "SELECT * FROM files WHERE owner_email = ? ORDER BY uploaded_at DESC",
    )
    .bind(owner_email)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(files)
}

pub async fn get_owned_file(pool: &DbPool, key: &str, owner_email: &str) -> AppResult<StoredFile> {
    sqlx::query_as::<_, StoredFile>("SELECT * FROM files WHERE key = ? AND owner_email = ?")
        .bind(key)
        .bind(owner_email)
        .fetch_optional(pool.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("File not found or access denied".to_string()))
}

/// Removes the object, its row, and every share link referencing it. The
/// cascade exists only here; share rows are otherwise untouched by file
/// operations.
pub async fn delete_file(
    pool: &DbPool,
    upload_dir: &Path,
    key: &str,
    owner_email: &str,
) -> AppResult<()> {
    tracing::info!("User {} deleting file {}", owner_email, key);

    let file = get_owned_file(pool, key, owner_email).await?;

    let file_path = upload_dir.join(&file.key);
    if file_path.exists() {
        fs::remove_file(&file_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete file from disk: {}", e)))?;
    }

    sqlx::query("DELETE FROM files WHERE key = ?")
        .bind(key)
        .execute(pool.as_ref())
        .await?;

    let removed_links = sqlx::query("DELETE FROM share_links WHERE file_path = ?")
        .bind(key)
        .execute(pool.as_ref())
        .await?
        .rows_affected();

    tracing::info!(
        "File deleted: key={}, share links removed: {}",
        key,
        removed_links
    );

    Ok(())
}

/// Raw bytes for the download flow. No ownership check: access control at
/// this point is the verified share link.
pub async fn load_object(
    pool: &DbPool,
    upload_dir: &Path,
    key: &str,
) -> AppResult<(StoredFile, Vec<u8>)> {
    let file = sqlx::query_as::<_, StoredFile>("SELECT * FROM files WHERE key = ?")
        .bind(key)
        .fetch_optional(pool.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    let path: PathBuf = upload_dir.join(&file.key);

    let contents = fs::read(&path).await.map_err(|e| {
        tracing::error!("File missing on disk: key={}, error={}", key, e);
        AppError::NotFound("File not found on disk".to_string())
    })?;

    Ok((file, contents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;
    use crate::models::share_link::ShareLink;
    use crate::services::share::insert_share_link;
    use sqlx::Row;

    fn temp_upload_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sharelock-test-{}-{}", tag, uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_save_list_and_load() {
        let pool = test_pool().await;
        let dir = temp_upload_dir("save");

        let saved = save_file(
            &pool,
            &dir,
            "report.pdf".to_string(),
            "application/pdf".to_string(),
            b"pdf bytes".to_vec(),
            "alice@example.com".to_string(),
        )
        .await
        .unwrap();

        let listed = list_files(&pool, "alice@example.com").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].key, saved.key);

        let (file, bytes) = load_object(&pool, &dir, &saved.key).await.unwrap();
        assert_eq!(file.display_name(), "report.pdf");
        assert_eq!(bytes, b"pdf bytes");

        fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_listing_is_scoped_to_owner() {
        let pool = test_pool().await;
        let dir = temp_upload_dir("scope");

        save_file(
            &pool,
            &dir,
            "a.txt".to_string(),
            "text/plain".to_string(),
            b"a".to_vec(),
            "alice@example.com".to_string(),
        )
        .await
        .unwrap();

        let other = list_files(&pool, "bob@example.com").await.unwrap();
        assert!(other.is_empty());

        fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_delete_cascades_to_share_links() {
        let pool = test_pool().await;
        let dir = temp_upload_dir("cascade");

        let saved = save_file(
            &pool,
            &dir,
            "report.pdf".to_string(),
            "application/pdf".to_string(),
            b"pdf bytes".to_vec(),
            "alice@example.com".to_string(),
        )
        .await
        .unwrap();

        for _ in 0..2 {
            let link = ShareLink::new(
                saved.key.clone(),
                "bob@example.com".to_string(),
                "alice@example.com".to_string(),
                24,
                "482913".to_string(),
            );
            insert_share_link(&pool, &link).await.unwrap();
        }

        delete_file(&pool, &dir, &saved.key, "alice@example.com")
            .await
            .unwrap();

        let remaining = sqlx::query("SELECT COUNT(*) as count FROM share_links WHERE file_path = ?")
            .bind(&saved.key)
            .fetch_one(pool.as_ref())
            .await
            .unwrap()
            .get::<i64, _>("count");
        assert_eq!(remaining, 0);

        assert!(!dir.join(&saved.key).exists());
        assert!(load_object(&pool, &dir, &saved.key).await.is_err());

        fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_delete_requires_ownership() {
        let pool = test_pool().await;
        let dir = temp_upload_dir("owner");

        let saved = save_file(
            &pool,
            &dir,
            "report.pdf".to_string(),
            "application/pdf".to_string(),
            b"pdf bytes".to_vec(),
            "alice@example.com".to_string(),
        )
        .await
        .unwrap();

        let result = delete_file(&pool, &dir, &saved.key, "mallory@example.com").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        fs::remove_dir_all(&dir).await.ok();
    }
}
