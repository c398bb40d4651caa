use async_trait::async_trait;
use serde_json::json;

use crate::utils::error::{AppError, AppResult};

const EMAILJS_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Parameters for the OTP notification template.
#[derive(Debug, Clone)]
pub struct OtpEmail {
    pub recipient: String,
    pub otp: String,
    pub expires_display: String,
    pub share_url: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_otp(&self, email: &OtpEmail) -> AppResult<()>;
}

/// Sends through the EmailJS REST API, the provider the share form has
/// always used.
pub struct EmailJsMailer {
    client: reqwest::Client,
    endpoint: String,
    service_id: String,
    template_id: String,
    public_key: String,
}

impl EmailJsMailer {
    pub fn new(service_id: String, template_id: String, public_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: EMAILJS_ENDPOINT.to_string(),
            service_id,
            template_id,
            public_key,
        }
    }

    pub fn from_env() -> AppResult<Self> {
        let service_id = std::env::var("EMAILJS_SERVICE_ID")
            .map_err(|_| AppError::Internal("EMAILJS_SERVICE_ID not set".to_string()))?;
        let template_id = std::env::var("EMAILJS_TEMPLATE_ID")
            .map_err(|_| AppError::Internal("EMAILJS_TEMPLATE_ID not set".to_string()))?;
        let public_key = std::env::var("EMAILJS_PUBLIC_KEY")
            .map_err(|_| AppError::Internal("EMAILJS_PUBLIC_KEY not set".to_string()))?;

        Ok(Self::new(service_id, template_id, public_key))
    }
}

#[async_trait]
impl Mailer for EmailJsMailer {
    async fn send_otp(&self, email: &OtpEmail) -> AppResult<()> {
        let body = json!({
            "service_id": self.service_id,
            "template_id": self.template_id,
            "user_id": self.public_key,
            "template_params": {
                "email": email.recipient,
                "otp": email.otp,
                "time": email.expires_display,
                "sharelink": email.share_url,
            }
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Email(format!("Failed to reach email provider: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Email(format!(
                "Email provider returned {}: {}",
                status, text
            )));
        }

        tracing::info!("OTP email sent to {}", email.recipient);
        Ok(())
    }
}
