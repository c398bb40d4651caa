use serde::{Deserialize, Serialize};
use sqlx::Row;

use crate::database::DbPool;
use crate::models::user::{User, UserResponse};
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::error::{AppError, AppResult};
use crate::utils::jwt::JwtService;
use crate::utils::validation::{validate_email, validate_password};

#[derive(Debug, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

pub async fn register_user(
    pool: &DbPool,
    request: CredentialsRequest,
    jwt_service: &JwtService,
) -> AppResult<AuthResponse> {
    validate_email(&request.email)?;
    validate_password(&request.password)?;

    let email_exists =
        sqlx::query("SELECT COUNT(*) as count FROM users WHERE LOWER(email) = LOWER(?)")
            .bind(&request.email)
            .fetch_one(pool.as_ref())
            .await?
            .get::<i64, _>("count");

    if email_exists > 0 {
        return Err(AppError::BadRequest(
            "An account with this email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&request.password)?;
    let user = User::new(request.email, password_hash);

    sqlx::query("INSERT INTO users (email, password_hash, created_at) VALUES (?, ?, ?)")
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.created_at)
        .execute(pool.as_ref())
        .await?;

    tracing::info!("User registered: {}", user.email);

    let token = jwt_service.generate_session_token(&user.email)?;

    Ok(AuthResponse {
        user: UserResponse::from(user),
        token,
    })
}

pub async fn login_user(
    pool: &DbPool,
    request: CredentialsRequest,
    jwt_service: &JwtService,
) -> AppResult<AuthResponse> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER(?)")
        .bind(&request.email)
        .fetch_optional(pool.as_ref())
        .await?
        .ok_or_else(|| AppError::Auth("Invalid credentials".to_string()))?;

    let is_valid = verify_password(&request.password, &user.password_hash)?;

    if !is_valid {
        tracing::debug!("Failed login attempt for {}", user.email);
        return Err(AppError::Auth("Invalid credentials".to_string()));
    }

    tracing::info!("User logged in: {}", user.email);

    let token = jwt_service.generate_session_token(&user.email)?;

    Ok(AuthResponse {
        user: UserResponse::from(user),
        token,
    })
}

pub async fn get_session_user(pool: &DbPool, email: &str) -> AppResult<UserResponse> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool.as_ref())
        .await?
        .ok_or_else(|| AppError::Auth("User no longer exists".to_string()))?;

    Ok(UserResponse::from(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;

    fn jwt() -> JwtService {
        JwtService::new("test-secret")
    }

    fn credentials(email: &str, password: &str) -> CredentialsRequest {
        CredentialsRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let pool = test_pool().await;
        let jwt = jwt();

        let registered = register_user(&pool, credentials("alice@example.com", "hunter2"), &jwt)
            .await
            .unwrap();
        assert_eq!(registered.user.email, "alice@example.com");

        let logged_in = login_user(&pool, credentials("alice@example.com", "hunter2"), &jwt)
            .await
            .unwrap();
        assert_eq!(jwt.extract_email(&logged_in.token).unwrap(), "alice@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let pool = test_pool().await;
        let jwt = jwt();

        register_user(&pool, credentials("alice@example.com", "hunter2"), &jwt)
            .await
            .unwrap();
        let result = register_user(&pool, credentials("ALICE@example.com", "other"), &jwt).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let pool = test_pool().await;
        let jwt = jwt();

        register_user(&pool, credentials("alice@example.com", "hunter2"), &jwt)
            .await
            .unwrap();
        let result = login_user(&pool, credentials("alice@example.com", "wrong"), &jwt).await;
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[tokio::test]
    async fn test_session_lookup() {
        let pool = test_pool().await;
        let jwt = jwt();

        register_user(&pool, credentials("alice@example.com", "hunter2"), &jwt)
            .await
            .unwrap();

        let user = get_session_user(&pool, "alice@example.com").await.unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert!(get_session_user(&pool, "ghost@example.com").await.is_err());
    }
}
