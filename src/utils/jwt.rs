use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::utils::error::{AppError, AppResult};

pub const SCOPE_SESSION: &str = "session";
pub const SCOPE_DOWNLOAD: &str = "download";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub scope: String,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn from_env() -> AppResult<Self> {
        let secret = std::env::var("SECRET_KEY")
            .map_err(|_| AppError::Internal("SECRET_KEY not set".to_string()))?;
        Ok(Self::new(&secret))
    }

    pub fn generate_session_token(&self, email: &str) -> AppResult<String> {
        let now = Utc::now();
        let expiration = now + Duration::days(30);
        self.encode_claims(email, expiration.timestamp(), SCOPE_SESSION)
    }

    /// Download tokens stand in for the verified state of a download page:
    /// issued once per successful OTP entry, reusable until the link expires.
    pub fn generate_download_token(&self, share_id: &str, expires_at: i64) -> AppResult<String> {
        self.encode_claims(share_id, expires_at, SCOPE_DOWNLOAD)
    }

    fn encode_claims(&self, sub: &str, exp: i64, scope: &str) -> AppResult<String> {
        let claims = Claims {
            sub: sub.to_string(),
            exp,
            iat: Utc::now().timestamp(),
            scope: scope.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    pub fn verify_token(&self, token: &str, expected_scope: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Auth(format!("Invalid token: {}", e)))?;

        if claims.scope != expected_scope {
            return Err(AppError::Auth("Token scope mismatch".to_string()));
        }

        Ok(claims)
    }

    pub fn extract_email(&self, token: &str) -> AppResult<String> {
        let claims = self.verify_token(token, SCOPE_SESSION)?;
        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_roundtrip() {
        let jwt = JwtService::new("test-secret");
        let token = jwt.generate_session_token("alice@example.com").unwrap();
        let email = jwt.extract_email(&token).unwrap();
        assert_eq!(email, "alice@example.com");
    }

    #[test]
    fn test_download_token_rejected_for_session_use() {
        let jwt = JwtService::new("test-secret");
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = jwt.generate_download_token("share-123", exp).unwrap();
        assert!(jwt.extract_email(&token).is_err());

        let claims = jwt.verify_token(&token, SCOPE_DOWNLOAD).unwrap();
        assert_eq!(claims.sub, "share-123");
    }

    #[test]
    fn test_expired_download_token_rejected() {
        let jwt = JwtService::new("test-secret");
        let exp = (Utc::now() - Duration::hours(1)).timestamp();
        let token = jwt.generate_download_token("share-123", exp).unwrap();
        assert!(jwt.verify_token(&token, SCOPE_DOWNLOAD).is_err());
    }
}
