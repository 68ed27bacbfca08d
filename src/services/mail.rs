use async_trait::async_trait;
use serde::Serialize;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Mail provider rejected message: {status} {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<(), MailError>;
}

/// Builds the transactional emails; links point back at the web app.
#[derive(Debug, Clone)]
pub struct MailTemplates {
    app_url: String,
}

impl MailTemplates {
    pub fn new(app_url: impl Into<String>) -> Self {
        Self {
            app_url: app_url.into(),
        }
    }

    pub fn verification(&self, email: &str, token: &str, callback_url: Option<&str>) -> MailMessage {
        let mut confirm_link = format!("{}/auth/new-verification?token={}", self.app_url, token);

        if let Some(callback_url) = callback_url {
            confirm_link.push_str("&callbackUrl=");
            confirm_link.push_str(&encode_query_value(callback_url));
        }

        MailMessage {
            to: email.to_string(),
            subject: "Confirm your email".to_string(),
            html: format!(
                r#"<p>Click <a href="{}">here</a> to confirm email.</p>"#,
                confirm_link
            ),
        }
    }

    pub fn password_reset(&self, email: &str, token: &str) -> MailMessage {
        let reset_link = format!("{}/auth/new-password?token={}", self.app_url, token);

        MailMessage {
            to: email.to_string(),
            subject: "Reset your password".to_string(),
            html: format!(
                r#"<p>Click <a href="{}">here</a> to reset your password.</p>"#,
                reset_link
            ),
        }
    }

    pub fn two_factor_code(&self, email: &str, code: &str) -> MailMessage {
        MailMessage {
            to: email.to_string(),
            subject: "2FA Code".to_string(),
            html: format!("<p>Your 2FA code: {}</p>", code),
        }
    }
}

fn encode_query_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

// =============================================================================
// RESEND
// =============================================================================

#[derive(Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
}

impl ResendMailer {
    const ENDPOINT: &'static str = "https://api.resend.com/emails";

    pub fn new(client: reqwest::Client, api_key: String, from: String) -> Self {
        Self {
            client,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        let response = self
            .client
            .post(Self::ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&ResendEmail {
                from: &self.from,
                to: [&message.to],
                subject: &message.subject,
                html: &message.html,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(to = %message.to, subject = %message.subject, "Mail sent");
        Ok(())
    }
}

// =============================================================================
// LOCAL MAILERS
// =============================================================================

/// Writes mail to the log instead of delivering it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        tracing::info!(to = %message.to, subject = %message.subject, html = %message.html, "Outgoing mail");
        Ok(())
    }
}

/// Keeps every message in memory.
#[derive(Default)]
pub struct OutboxMailer {
    sent: Mutex<Vec<MailMessage>>,
}

impl OutboxMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<MailMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn last_to(&self, email: &str) -> Option<MailMessage> {
        self.messages().into_iter().rev().find(|m| m.to == email)
    }
}

#[async_trait]
impl Mailer for OutboxMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message);
        }
        Ok(())
    }
}
