use crate::domain::ports::EmailService;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};
use base64::{Engine as _, engine::general_purpose};

const RELAY_TIMEOUT_SECS: u64 = 10;

/// Sends mail through an HTTP relay that accepts JSON messages with base64 attachments.
pub struct HttpEmailService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpEmailService {
    pub fn new(api_url: String, api_key: String) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(RELAY_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::InternalWithMsg(format!("Failed to build mail relay client: {}", e)))?;

        Ok(Self { client, api_url, api_key })
    }
}

#[derive(Serialize)]
struct Attachment<'a> {
    filename: &'a str,
    content_type: &'static str,
    content_base64: String,
}

#[derive(Serialize)]
struct MailMessage<'a> {
    to_addr: &'a str,
    subject: &'a str,
    html_body: &'a str,
    attachments: Vec<Attachment<'a>>,
}

fn content_type_for(filename: &str) -> &'static str {
    if filename.ends_with(".ics") {
        "text/calendar; method=REQUEST"
    } else {
        "application/octet-stream"
    }
}

#[async_trait]
impl EmailService for HttpEmailService {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        attachment_name: Option<&str>,
        attachment_data: Option<&[u8]>
    ) -> Result<(), AppError> {
        let attachments = match (attachment_name, attachment_data) {
            (Some(name), Some(data)) => vec![Attachment {
                filename: name,
                content_type: content_type_for(name),
                content_base64: general_purpose::STANDARD.encode(data),
            }],
            _ => Vec::new(),
        };

        let message = MailMessage { to_addr: recipient, subject, html_body, attachments };

        debug!("Relaying mail to {} via {}", recipient, self.api_url);
        let res = self.client.post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&message)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Mail relay connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Mail relay rejected message. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calendar_attachments_get_calendar_mime() {
        assert_eq!(content_type_for("appointment.ics"), "text/calendar; method=REQUEST");
        assert_eq!(content_type_for("receipt.pdf"), "application/octet-stream");
    }
}
