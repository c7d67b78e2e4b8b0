use anyhow::{Context, Result};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTransportKind {
    Api,
    Smtp,
}

#[derive(Clone, Debug)]
pub struct Config {
    // Database
    pub db_host: String,
    pub db_port: String,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,

    // HTTP
    pub http_port: u16,
    pub base_url: String,
    pub frontend_url: String,
    pub upload_dir: String,

    // Email
    pub email_transport: EmailTransportKind,
    pub brevo_api_key: String,
    pub sender_name: String,
    pub from_email: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_password: String,
    pub rescue_team_email: String,

    // WhatsApp (Twilio)
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_whatsapp_number: String,
    pub twilio_template_sid: String,

    // AI enhancement
    pub groq_api_key: String,
    pub groq_model: String,

    // Fallback store
    pub fallback_reports_path: String,
    pub email_log_path: String,

    // Outbound calls
    pub notify_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let http_port: u16 = env("HTTP_PORT", "8080").parse().context("HTTP_PORT parse")?;
        let smtp_port: u16 = env("SMTP_PORT", "587").parse().context("SMTP_PORT parse")?;
        let notify_timeout =
            humantime::parse_duration(&env("NOTIFY_TIMEOUT", "10s")).context("NOTIFY_TIMEOUT parse")?;

        let email_transport = match env("EMAIL_TRANSPORT", "api").to_lowercase().as_str() {
            "smtp" => EmailTransportKind::Smtp,
            _ => EmailTransportKind::Api,
        };

        let config = Self {
            db_host: env("DB_HOST", "localhost"),
            db_port: env("DB_PORT", "3306"),
            db_user: env("DB_USER", "server"),
            db_password: env("DB_PASSWORD", "secret"),
            db_name: env("DB_NAME", "rescueradar"),

            http_port,
            base_url: env("BASE_URL", "http://localhost:8080"),
            frontend_url: env("FRONTEND_URL", "https://rescueradar.org"),
            upload_dir: env("UPLOAD_DIR", "uploads"),

            email_transport,
            brevo_api_key: env("BREVO_API_KEY", ""),
            sender_name: env("EMAIL_SENDER_NAME", "RescueRadar Team"),
            from_email: env("EMAIL_FROM", "alerts@rescueradar.org"),
            smtp_host: env("SMTP_HOST", "smtp.gmail.com"),
            smtp_port,
            smtp_user: env("SMTP_USER", ""),
            smtp_password: env("SMTP_PASSWORD", ""),
            rescue_team_email: env("RESCUE_TEAM_EMAIL", "rescue@animalwelfare.org"),

            twilio_account_sid: env("TWILIO_ACCOUNT_SID", ""),
            twilio_auth_token: env("TWILIO_AUTH_TOKEN", ""),
            twilio_whatsapp_number: env("TWILIO_WHATSAPP_NUMBER", ""),
            twilio_template_sid: env("TWILIO_WHATSAPP_TEMPLATE_SID", ""),

            groq_api_key: env("GROQ_API_KEY", ""),
            groq_model: env("GROQ_MODEL", "llama-3.3-70b-versatile"),

            fallback_reports_path: env("FALLBACK_REPORTS_PATH", "reports_backup.json"),
            email_log_path: env("EMAIL_LOG_PATH", "email_log.json"),

            notify_timeout,
        };

        if config.http_port == 0 {
            anyhow::bail!("HTTP_PORT must be a valid port number");
        }
        if config.db_host.is_empty() {
            anyhow::bail!("DB_HOST must not be empty");
        }
        if config.from_email.is_empty() {
            anyhow::bail!("EMAIL_FROM must not be empty");
        }
        if config.email_transport == EmailTransportKind::Smtp && config.smtp_host.is_empty() {
            anyhow::bail!("SMTP_HOST must not be empty when EMAIL_TRANSPORT=smtp");
        }

        Ok(config)
    }

    pub fn mysql_url(&self) -> String {
        format!(
            "mysql://{}:{}@{}:{}/{}",
            self.db_user, self.db_password, self.db_host, self.db_port, self.db_name
        )
    }

    pub fn mysql_masked_url(&self) -> String {
        format!(
            "mysql://{}:***@{}:{}/{}",
            self.db_user, self.db_host, self.db_port, self.db_name
        )
    }

    pub fn email_configured(&self) -> bool {
        match self.email_transport {
            EmailTransportKind::Api => !self.brevo_api_key.is_empty(),
            EmailTransportKind::Smtp => !self.smtp_user.is_empty() && !self.smtp_password.is_empty(),
        }
    }

    pub fn whatsapp_configured(&self) -> bool {
        !self.twilio_account_sid.is_empty()
            && !self.twilio_auth_token.is_empty()
            && !self.twilio_whatsapp_number.is_empty()
    }
}

fn env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_url_hides_password() {
        let cfg = Config {
            db_host: "db".into(),
            db_port: "3306".into(),
            db_user: "server".into(),
            db_password: "hunter2".into(),
            db_name: "rescueradar".into(),
            http_port: 8080,
            base_url: "http://localhost:8080".into(),
            frontend_url: "https://rescueradar.org".into(),
            upload_dir: "uploads".into(),
            email_transport: EmailTransportKind::Api,
            brevo_api_key: String::new(),
            sender_name: "RescueRadar Team".into(),
            from_email: "alerts@rescueradar.org".into(),
            smtp_host: "smtp.gmail.com".into(),
            smtp_port: 587,
            smtp_user: String::new(),
            smtp_password: String::new(),
            rescue_team_email: "rescue@animalwelfare.org".into(),
            twilio_account_sid: String::new(),
            twilio_auth_token: String::new(),
            twilio_whatsapp_number: String::new(),
            twilio_template_sid: String::new(),
            groq_api_key: String::new(),
            groq_model: "llama-3.3-70b-versatile".into(),
            fallback_reports_path: "reports_backup.json".into(),
            email_log_path: "email_log.json".into(),
            notify_timeout: Duration::from_secs(10),
        };
        assert_eq!(cfg.mysql_masked_url(), "mysql://server:***@db:3306/rescueradar");
        assert!(cfg.mysql_url().contains("hunter2"));
        assert!(!cfg.email_configured());
        assert!(!cfg.whatsapp_configured());
    }
}
