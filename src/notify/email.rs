// HTTP email provider client
//
// Delivers transactional email through the provider's JSON API. Callers
// treat delivery as best effort; errors are returned for the dispatcher to
// record, never retried here.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::notify::NotifyError;

/// Seam for email delivery so the dispatcher can be tested without a provider
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), NotifyError>;
}

/// Email client for an HTTP provider (JSON POST with a bearer key)
pub struct HttpEmailClient {
    client: Client,
    api_url: String,
    api_key: String,
    from_alias: String,
}

impl HttpEmailClient {
    /// Create a new HttpEmailClient
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
            from_alias: "bookings".to_string(),
        }
    }
}

#[derive(Serialize)]
struct EmailPayload {
    from_alias: String,
    to_addr: String,
    subject: String,
    html_body: String,
}

#[async_trait]
impl EmailSender for HttpEmailClient {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), NotifyError> {
        let payload = EmailPayload {
            from_alias: self.from_alias.clone(),
            to_addr: recipient.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        };

        let res = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Email(format!("connection error: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(NotifyError::Email(format!(
                "provider returned {}: {}",
                status, text
            )));
        }

        Ok(())
    }
}
