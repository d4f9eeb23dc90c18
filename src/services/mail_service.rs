use std::env;

use async_trait::async_trait;
use serde::Serialize;

use crate::{error::Error, Result};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: Mail) -> Result<()>;
}

#[derive(Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

impl MailConfig {
    /// `None` when no transactional mail API is configured.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            api_url: env::var("MAIL_API_URL").ok()?,
            api_key: env::var("MAIL_API_KEY").ok()?,
            from: env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@rap2rue.com".to_string()),
        })
    }
}

#[derive(Serialize)]
struct SendMailBody<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Sends through a JSON transactional mail API.
pub struct HttpMailer {
    config: MailConfig,
    http: reqwest::Client,
}

impl HttpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, mail: Mail) -> Result<()> {
        let body = SendMailBody {
            from: &self.config.from,
            to: &mail.to,
            subject: &mail.subject,
            text: &mail.text,
        };

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::MailProvider {
                message: format!("Erreur lors de l'envoi de l'email: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(Error::MailProvider {
                message: format!("Erreur lors de l'envoi de l'email ({})", response.status()),
            });
        }

        Ok(())
    }
}

/// Development fallback: writes the mail to the log instead of sending it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: Mail) -> Result<()> {
        tracing::warn!(
            "mail not sent (no MAIL_API_URL) to={} subject={:?}\n{}",
            mail.to,
            mail.subject,
            mail.text
        );
        Ok(())
    }
}
