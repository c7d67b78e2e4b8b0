use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;
use tracing::warn;

use crate::config::Config;
use crate::services::templates::short_id;
use crate::services::DispatchOutcome;

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: String,
    status: String,
}

/// Thin adapter over the Twilio WhatsApp Messages API. Alerts go out via a
/// pre-approved content template first; when that fails (template not set up,
/// rejected variables) a freeform body is attempted, which only delivers
/// inside an existing conversation window.
pub struct WhatsAppClient {
    http: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
    template_sid: String,
}

impl WhatsAppClient {
    pub fn from_config(cfg: &Config) -> Result<Option<Self>> {
        if !cfg.whatsapp_configured() {
            return Ok(None);
        }
        let http = reqwest::Client::builder()
            .timeout(cfg.notify_timeout)
            .build()
            .context("build http client")?;
        Ok(Some(Self {
            http,
            account_sid: cfg.twilio_account_sid.clone(),
            auth_token: cfg.twilio_auth_token.clone(),
            from_number: cfg.twilio_whatsapp_number.clone(),
            template_sid: cfg.twilio_template_sid.clone(),
        }))
    }

    /// Rescue alert: template first, freeform fallback.
    pub async fn send_alert(
        &self,
        phone_number: &str,
        report_id: &str,
        description: &str,
        location: &str,
        urgency_level: &str,
    ) -> DispatchOutcome {
        if !self.template_sid.is_empty() {
            let variables = serde_json::json!({
                "1": report_id,
                "2": truncate(description, 50),
                "3": truncate(location, 30),
                "4": urgency_level,
            })
            .to_string();

            match self.send_template(phone_number, &variables).await {
                Ok(msg) => {
                    return DispatchOutcome::sent("template", Some(msg.sid), Some(msg.status))
                }
                Err(e) => {
                    warn!("template WhatsApp failed, trying freeform: {:#}", e);
                }
            }
        }

        let body = format!(
            "RescueRadar Alert\n\n\
             Report ID: {}\n\
             Description: {}\n\
             Location: {}\n\
             Urgency: {}\n\n\
             Your animal rescue report has been submitted successfully. Our network \
             has been notified and will respond as soon as possible.\n\n\
             Thank you for helping animals in need!",
            report_id,
            truncate(description, 100),
            location,
            urgency_level
        );

        match self.send_freeform(phone_number, &body).await {
            Ok(msg) => DispatchOutcome::sent("freeform", Some(msg.sid), Some(msg.status)),
            Err(e) => DispatchOutcome::failed("freeform", format!("{:#}", e)),
        }
    }

    /// Submission receipt sent to the reporter.
    pub async fn send_receipt(
        &self,
        phone_number: &str,
        report_id: &str,
        description: &str,
    ) -> DispatchOutcome {
        let body = format!(
            "RescueRadar Report Received\n\n\
             Thank you for reporting an animal in need!\n\n\
             Report ID: {}\n\
             Details: {}\n\
             Time: {}\n\n\
             Your report has been forwarded to local rescue teams.\n\n\
             Emergency? Also contact local authorities immediately.\n\n\
             Reply to this message if you have updates.",
            short_id(report_id),
            truncate(description, 100),
            Utc::now().format("%m/%d at %I:%M %p")
        );

        match self.send_freeform(phone_number, &body).await {
            Ok(msg) => DispatchOutcome::sent("freeform", Some(msg.sid), Some(msg.status)),
            Err(e) => DispatchOutcome::failed("freeform", format!("{:#}", e)),
        }
    }

    async fn send_freeform(&self, to: &str, body: &str) -> Result<TwilioMessage> {
        let params = [
            ("From", self.from_number.clone()),
            ("To", format!("whatsapp:{}", to)),
            ("Body", body.to_string()),
        ];
        self.post_message(&params).await
    }

    async fn send_template(&self, to: &str, content_variables: &str) -> Result<TwilioMessage> {
        let params = [
            ("From", self.from_number.clone()),
            ("To", format!("whatsapp:{}", to)),
            ("ContentSid", self.template_sid.clone()),
            ("ContentVariables", content_variables.to_string()),
        ];
        self.post_message(&params).await
    }

    async fn post_message(&self, params: &[(&str, String)]) -> Result<TwilioMessage> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        );
        let res = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(params)
            .send()
            .await
            .context("twilio request failed")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            anyhow::bail!("twilio error: status={} body={}", status, truncate(&body, 512));
        }
        res.json().await.context("twilio json decode")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        s.chars().take(max).collect()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("héllo wörld", 5), "héllo");
    }
}
