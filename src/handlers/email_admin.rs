use axum::{extract::State, response::Json};
use chrono::Utc;
use serde_json::json;

use crate::app_state::AppState;
use crate::config::EmailTransportKind;
use crate::handlers::{validation_error, ApiError};
use crate::models::{BulkEmailRequest, CustomEmailRequest, Report, TemplateEmailRequest, TestEmailRequest};
use crate::services::email::EmailMessage;
use crate::services::templates;
use crate::util::is_valid_email;

/// POST /api/email/send-test-email
pub async fn send_test_email(
    State(state): State<AppState>,
    Json(req): Json<TestEmailRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let email = req
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| validation_error("Email address is required"))?;
    let test_type = req.test_type.unwrap_or_else(|| "API Test".to_string());

    let (subject, html) = templates::test_email(&test_type, state.mailer.method());
    let outcome = state.mailer.send(EmailMessage::new(&email, subject, html)).await;

    Ok(Json(json!({
        "success": outcome.success,
        "message": if outcome.success { "Test email sent successfully" } else { "Failed to send test email" },
        "email": email,
        "method": outcome.method,
        "message_id": outcome.message_id,
        "error": outcome.error,
    })))
}

/// POST /api/email/send-custom-email
pub async fn send_custom_email(
    State(state): State<AppState>,
    Json(req): Json<CustomEmailRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let missing: Vec<&str> = [
        ("to_email", req.to_email.is_none()),
        ("subject", req.subject.is_none()),
        ("content", req.content.is_none()),
    ]
    .iter()
    .filter(|(_, absent)| *absent)
    .map(|(name, _)| *name)
    .collect();
    if !missing.is_empty() {
        return Err(validation_error(&format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let to_email = req.to_email.unwrap_or_default();
    let subject = req.subject.unwrap_or_default();
    let content = req.content.unwrap_or_default();

    let mut message = match req.content_type.as_deref() {
        Some("text") => {
            let mut m = EmailMessage::new(&to_email, &subject, templates::custom_text(&content));
            m.text = Some(content);
            m
        }
        _ => EmailMessage::new(&to_email, &subject, content),
    };

    let outcome = state.mailer.send(message).await;

    Ok(Json(json!({
        "success": outcome.success,
        "message": if outcome.success { "Email sent successfully" } else { "Failed to send email" },
        "to_email": to_email,
        "subject": subject,
        "method": outcome.method,
        "message_id": outcome.message_id,
        "error": outcome.error,
    })))
}

/// POST /api/email/send-bulk-email
pub async fn send_bulk_email(
    State(state): State<AppState>,
    Json(req): Json<BulkEmailRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let email_list = req
        .email_list
        .filter(|l| !l.is_empty())
        .ok_or_else(|| validation_error("email_list must be a non-empty array"))?;
    let subject = req
        .subject
        .filter(|s| !s.is_empty())
        .ok_or_else(|| validation_error("Missing required fields: subject"))?;
    let message = req
        .message
        .filter(|m| !m.is_empty())
        .ok_or_else(|| validation_error("Missing required fields: message"))?;

    let html = templates::bulk_notification(&message);
    let mut results = Vec::with_capacity(email_list.len());
    let mut total_sent = 0usize;

    for email in &email_list {
        if !is_valid_email(email) {
            results.push(json!({"email": email, "success": false, "error": "invalid email address"}));
            continue;
        }
        let outcome = state
            .mailer
            .send(EmailMessage::new(email, &subject, &html))
            .await;
        if outcome.success {
            total_sent += 1;
        }
        results.push(json!({
            "email": email,
            "success": outcome.success,
            "error": outcome.error,
        }));
    }

    let total_failed = email_list.len() - total_sent;
    Ok(Json(json!({
        "success": true,
        "message": format!("Bulk email completed. {} sent, {} failed", total_sent, total_failed),
        "total_recipients": email_list.len(),
        "total_sent": total_sent,
        "total_failed": total_failed,
        "details": results,
    })))
}

/// POST /api/email/send-template-email
pub async fn send_template_email(
    State(state): State<AppState>,
    Json(req): Json<TemplateEmailRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let template_name = req
        .template_name
        .filter(|t| !t.is_empty())
        .ok_or_else(|| validation_error("Missing required fields: template_name"))?;
    let to_email = req
        .to_email
        .filter(|t| !t.is_empty())
        .ok_or_else(|| validation_error("Missing required fields: to_email"))?;
    let variables = req.variables.unwrap_or_else(|| json!({}));

    let (subject, html) = match template_name.as_str() {
        "rescue_alert" => templates::rescue_alert(&report_from_variables(&variables)),
        "user_confirmation" => templates::user_confirmation(&report_from_variables(&variables)),
        "status_update" => templates::status_update(
            var(&variables, "report_id").as_deref().unwrap_or("unknown"),
            var(&variables, "status").as_deref().unwrap_or("updated"),
            var(&variables, "update_message").as_deref().unwrap_or(""),
        ),
        "test_email" => templates::test_email(
            var(&variables, "test_type").as_deref().unwrap_or("API Test"),
            state.mailer.method(),
        ),
        other => {
            return Err(validation_error(&format!("Unknown template: {}", other)));
        }
    };

    let outcome = state
        .mailer
        .send(EmailMessage::new(&to_email, subject, html))
        .await;

    Ok(Json(json!({
        "success": outcome.success,
        "message": if outcome.success { "Template email sent successfully" } else { "Failed to send template email" },
        "template_name": template_name,
        "to_email": to_email,
        "method": outcome.method,
        "message_id": outcome.message_id,
        "error": outcome.error,
    })))
}

/// GET /api/email/email-stats
pub async fn email_stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "statistics": state.email_log.stats(),
    }))
}

/// GET /api/email/email-templates
pub async fn email_templates() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "templates": templates::catalog(),
    }))
}

/// GET /api/email/email-config
pub async fn email_config(State(state): State<AppState>) -> Json<serde_json::Value> {
    let cfg = &state.cfg;
    Json(json!({
        "success": true,
        "configuration": {
            "from_email": cfg.from_email,
            "sender_name": cfg.sender_name,
            "transport": state.mailer.method(),
            "smtp_server": cfg.smtp_host,
            "smtp_port": cfg.smtp_port,
            "api_configured": !cfg.brevo_api_key.is_empty(),
            "smtp_configured": !cfg.smtp_user.is_empty() && !cfg.smtp_password.is_empty(),
            "active_transport_configured": cfg.email_configured(),
            "transport_kind": match cfg.email_transport {
                EmailTransportKind::Api => "api",
                EmailTransportKind::Smtp => "smtp",
            },
        }
    }))
}

fn var(variables: &serde_json::Value, key: &str) -> Option<String> {
    variables
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Template variables arrive as a flat JSON object; rebuild enough of a
/// report for the shared template builders.
fn report_from_variables(variables: &serde_json::Value) -> Report {
    Report {
        id: var(variables, "report_id").unwrap_or_else(|| "unknown".to_string()),
        description: var(variables, "description").unwrap_or_default(),
        location: var(variables, "location").unwrap_or_else(|| "Location not specified".to_string()),
        coordinates: None,
        contact_name: var(variables, "contact_name"),
        contact_email: var(variables, "contact_email"),
        contact_phone: var(variables, "contact_phone"),
        urgency_level: var(variables, "urgency_level").unwrap_or_else(|| "normal".to_string()),
        animal_type: var(variables, "animal_type"),
        situation_type: var(variables, "situation_type"),
        image_url: None,
        ai_analysis: None,
        status: "active".to_string(),
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_from_variables_defaults() {
        let report = report_from_variables(&json!({}));
        assert_eq!(report.id, "unknown");
        assert_eq!(report.location, "Location not specified");
        assert_eq!(report.urgency_level, "normal");
        assert!(report.contact_name.is_none());
    }

    #[test]
    fn test_report_from_variables_reads_strings() {
        let report = report_from_variables(&json!({
            "report_id": "r-1",
            "description": "stray cat",
            "urgency_level": "low",
            "contact_name": "Jo",
        }));
        assert_eq!(report.id, "r-1");
        assert_eq!(report.description, "stray cat");
        assert_eq!(report.urgency_level, "low");
        assert_eq!(report.contact_name.as_deref(), Some("Jo"));
    }
}
