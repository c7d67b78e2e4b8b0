use anyhow::{Context, Result};
use base64::Engine as _;
use chrono::Utc;
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use tracing::{info, warn};

use crate::config::{Config, EmailTransportKind};
use crate::fallback::{EmailLog, EmailLogEntry};
use crate::services::templates::html_to_text;
use crate::services::DispatchOutcome;

const BREVO_SEND_URL: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
    pub attachments: Vec<EmailAttachment>,
}

impl EmailMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
            text: None,
            attachments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content: Vec<u8>,
}

enum Transport {
    Api {
        api_key: String,
        http: reqwest::Client,
    },
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
    },
}

/// Provider-agnostic email dispatcher. The transport (REST API or SMTP
/// submission) is fixed at construction from configuration; callers see one
/// `send` with one outcome shape, and every attempt lands in the capped log.
pub struct Mailer {
    transport: Transport,
    sender_name: String,
    from_email: String,
    log: EmailLog,
}

impl Mailer {
    pub fn from_config(cfg: &Config, log: EmailLog) -> Result<Self> {
        let transport = match cfg.email_transport {
            EmailTransportKind::Api => {
                let http = reqwest::Client::builder()
                    .timeout(cfg.notify_timeout)
                    .build()
                    .context("build http client")?;
                Transport::Api {
                    api_key: cfg.brevo_api_key.clone(),
                    http,
                }
            }
            EmailTransportKind::Smtp => {
                let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.smtp_host)
                    .context("smtp relay")?
                    .port(cfg.smtp_port)
                    .credentials(Credentials::new(
                        cfg.smtp_user.clone(),
                        cfg.smtp_password.clone(),
                    ))
                    .build();
                Transport::Smtp { transport }
            }
        };

        Ok(Self {
            transport,
            sender_name: cfg.sender_name.clone(),
            from_email: cfg.from_email.clone(),
            log,
        })
    }

    pub fn method(&self) -> &'static str {
        match self.transport {
            Transport::Api { .. } => "brevo_api",
            Transport::Smtp { .. } => "smtp",
        }
    }

    pub async fn send(&self, msg: EmailMessage) -> DispatchOutcome {
        let to = msg.to.clone();
        let subject = msg.subject.clone();

        let outcome = match &self.transport {
            Transport::Api { api_key, http } => match self.send_via_api(api_key, http, &msg).await {
                Ok(message_id) => DispatchOutcome::sent(self.method(), message_id, Some("sent".into())),
                Err(e) => DispatchOutcome::failed(self.method(), format!("{:#}", e)),
            },
            Transport::Smtp { transport } => match self.send_via_smtp(transport, &msg).await {
                Ok(message_id) => {
                    DispatchOutcome::sent(self.method(), Some(message_id), Some("sent".into()))
                }
                Err(e) => DispatchOutcome::failed(self.method(), format!("{:#}", e)),
            },
        };

        if outcome.success {
            info!("email sent to {} via {}", to, outcome.method);
        } else {
            warn!(
                "email to {} failed via {}: {}",
                to,
                outcome.method,
                outcome.error.as_deref().unwrap_or("unknown")
            );
        }

        self.log.record(EmailLogEntry {
            timestamp: Utc::now(),
            to_email: to,
            subject,
            success: outcome.success,
            method: outcome.method.clone(),
            message_id: outcome.message_id.clone(),
            error: outcome.error.clone(),
        });

        outcome
    }

    async fn send_via_api(
        &self,
        api_key: &str,
        http: &reqwest::Client,
        msg: &EmailMessage,
    ) -> Result<Option<String>> {
        if api_key.is_empty() {
            anyhow::bail!("BREVO_API_KEY is not configured");
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("api-key", HeaderValue::from_str(api_key)?);

        let text = msg
            .text
            .clone()
            .unwrap_or_else(|| html_to_text(&msg.html));

        let mut payload = serde_json::json!({
            "sender": {"name": self.sender_name, "email": self.from_email},
            "to": [{"email": msg.to}],
            "subject": msg.subject,
            "htmlContent": msg.html,
            "textContent": text,
        });
        if !msg.attachments.is_empty() {
            let encoded: Vec<serde_json::Value> = msg
                .attachments
                .iter()
                .map(|a| {
                    serde_json::json!({
                        "name": a.filename,
                        "content": base64::engine::general_purpose::STANDARD.encode(&a.content),
                    })
                })
                .collect();
            payload["attachment"] = serde_json::Value::Array(encoded);
        }

        let res = http
            .post(BREVO_SEND_URL)
            .headers(headers)
            .json(&payload)
            .send()
            .await
            .context("brevo request failed")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            anyhow::bail!("brevo error: status={} body={}", status, truncate(&body));
        }

        let body: serde_json::Value = res.json().await.unwrap_or_default();
        Ok(body
            .get("messageId")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()))
    }

    async fn send_via_smtp(
        &self,
        transport: &AsyncSmtpTransport<Tokio1Executor>,
        msg: &EmailMessage,
    ) -> Result<String> {
        let from: Mailbox = format!("{} <{}>", self.sender_name, self.from_email)
            .parse()
            .context("parse sender mailbox")?;
        let to: Mailbox = msg.to.parse().context("parse recipient mailbox")?;

        let text = msg
            .text
            .clone()
            .unwrap_or_else(|| html_to_text(&msg.html));
        let alternative = MultiPart::alternative_plain_html(text, msg.html.clone());

        let builder = Message::builder()
            .from(from)
            .to(to)
            .subject(msg.subject.clone());

        let email = if msg.attachments.is_empty() {
            builder.multipart(alternative).context("build message")?
        } else {
            let mut mixed = MultiPart::mixed().multipart(alternative);
            for a in &msg.attachments {
                let content_type =
                    ContentType::parse("application/octet-stream").context("attachment type")?;
                mixed = mixed.singlepart(
                    Attachment::new(a.filename.clone()).body(a.content.clone(), content_type),
                );
            }
            builder.multipart(mixed).context("build message")?
        };

        transport.send(email).await.context("smtp send failed")?;
        Ok(format!("smtp_{}", Utc::now().timestamp_millis()))
    }
}

fn truncate(s: &str) -> String {
    const MAX: usize = 512;
    if s.len() > MAX {
        format!("{}...", &s[..MAX])
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_long_body() {
        let long = "x".repeat(600);
        let out = truncate(&long);
        assert_eq!(out.len(), 515);
        assert!(out.ends_with("..."));
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn test_email_message_defaults() {
        let msg = EmailMessage::new("a@b.co", "hi", "<p>hi</p>");
        assert!(msg.text.is_none());
        assert!(msg.attachments.is_empty());
    }
}
