//! HTTP mail relay client.
//!
//! Posts composed emails as JSON to a configured relay endpoint. The relay
//! owns SMTP delivery; this client only needs an endpoint, an optional API
//! key and a bounded timeout.

use crate::error::NotifyError;
use clinibook_common::services::{BoxFuture, BoxedError, NotificationResult, Notifier};
use clinibook_config::NotifyConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Serialize, Debug)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
    html: bool,
}

#[derive(Deserialize, Debug)]
struct SendEmailResponse {
    id: Option<String>,
    status: Option<String>,
    message: Option<String>,
}

/// `Notifier` implementation backed by an HTTP mail relay.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: Client,
    config: NotifyConfig,
}

impl HttpMailer {
    pub fn new(config: NotifyConfig) -> Result<Self, NotifyError> {
        if config.relay_url.is_empty() {
            return Err(NotifyError::ConfigError);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    async fn post_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        is_html: bool,
    ) -> Result<NotificationResult, NotifyError> {
        debug!("Posting email to relay for recipient {}", to);

        let payload = SendEmailRequest {
            from: &self.config.from_address,
            to,
            subject,
            body,
            html: is_html,
        };

        let mut request = self.client.post(&self.config.relay_url).json(&payload);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            // Prefer the relay's structured message, fall back to the raw body.
            let message = match serde_json::from_str::<SendEmailResponse>(&body_text) {
                Ok(parsed) => parsed.message.unwrap_or(body_text),
                Err(_) => body_text,
            };
            return Err(NotifyError::ApiError {
                status: status.to_string(),
                message,
            });
        }

        let parsed: SendEmailResponse = serde_json::from_str(&body_text)?;

        info!("Email accepted by relay for {}", to);
        Ok(NotificationResult {
            id: parsed.id.unwrap_or_default(),
            status: parsed.status.unwrap_or_else(|| "queued".to_string()),
        })
    }
}

impl Notifier for HttpMailer {
    type Error = BoxedError;

    fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        is_html: bool,
    ) -> BoxFuture<'_, NotificationResult, Self::Error> {
        let to = to.to_string();
        let subject = subject.to_string();
        let body = body.to_string();

        Box::pin(async move {
            self.post_email(&to, &subject, &body, is_html)
                .await
                .map_err(BoxedError::new)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(relay_url: &str) -> NotifyConfig {
        NotifyConfig {
            relay_url: relay_url.to_string(),
            api_key: None,
            from_address: "noreply@clinibook.example".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_empty_relay_url_is_rejected() {
        assert!(matches!(
            HttpMailer::new(config("")),
            Err(NotifyError::ConfigError)
        ));
    }

    #[test]
    fn test_request_payload_serializes_expected_fields() {
        let payload = SendEmailRequest {
            from: "noreply@clinibook.example",
            to: "mia@example.com",
            subject: "Appointment Confirmation",
            body: "<html></html>",
            html: true,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["from"], "noreply@clinibook.example");
        assert_eq!(json["to"], "mia@example.com");
        assert_eq!(json["html"], true);
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let parsed: SendEmailResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.id.is_none());
        assert!(parsed.status.is_none());
        assert!(parsed.message.is_none());
    }
}
