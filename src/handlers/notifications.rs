use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use base64::Engine as _;
use qrcode::{render::svg, QrCode};
use serde_json::json;

use crate::app_state::AppState;
use crate::handlers::{internal_error, validation_error, ApiError};
use crate::models::{EmailNotifyRequest, QrParams, WhatsAppNotifyRequest};
use crate::services::email::EmailMessage;
use crate::services::templates;
use crate::util::is_valid_email;

/// POST /api/email-notify
pub async fn email_notify(
    State(state): State<AppState>,
    Json(req): Json<EmailNotifyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let email = req
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| validation_error("Email and report_id are required"))?;
    let report_id = req
        .report_id
        .filter(|r| !r.is_empty())
        .ok_or_else(|| validation_error("Email and report_id are required"))?;
    if !is_valid_email(&email) {
        return Err(validation_error("Invalid email address"));
    }

    let (subject, html, text) = templates::direct_alert(
        &report_id,
        req.description.as_deref(),
        req.location.as_deref(),
        req.urgency_level.as_deref(),
    );
    let mut message = EmailMessage::new(&email, subject, html);
    message.text = Some(text);

    let outcome = state.mailer.send(message).await;
    if outcome.success {
        Ok(Json(json!({
            "success": true,
            "email_sent": true,
            "details": {
                "message_id": outcome.message_id,
                "recipient": email,
            }
        })))
    } else {
        Err(internal_error(
            "Failed to send email",
            outcome.error.unwrap_or_else(|| "unknown error".to_string()),
        ))
    }
}

/// POST /api/whatsapp-notify
pub async fn whatsapp_notify(
    State(state): State<AppState>,
    Json(req): Json<WhatsAppNotifyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let phone_number = req
        .phone_number
        .filter(|p| !p.is_empty())
        .ok_or_else(|| validation_error("Phone number is required"))?;

    let whatsapp = state.whatsapp.as_ref().ok_or_else(|| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "message": "WhatsApp service is not configured",
            })),
        )
    })?;

    let report_id = req.report_id.as_deref().unwrap_or("Unknown");
    let description = req.description.as_deref().unwrap_or("Animal rescue report");
    let location = req.location.as_deref().unwrap_or("Location not specified");
    let urgency = req.urgency_level.as_deref().unwrap_or("Normal");

    let outcome = whatsapp
        .send_alert(&phone_number, report_id, description, location, urgency)
        .await;

    if outcome.success {
        Ok(Json(json!({
            "success": true,
            "message_sent": true,
            "method": outcome.method,
            "details": {
                "message_sid": outcome.message_id,
                "status": outcome.status,
                "report_id": report_id,
            }
        })))
    } else {
        Err(internal_error(
            "Failed to send WhatsApp message",
            outcome.error.unwrap_or_else(|| "unknown error".to_string()),
        ))
    }
}

/// GET /api/generate-qr?report_id=...
///
/// QR code pointing at the public report page, rendered as SVG and returned
/// base64-encoded.
pub async fn generate_qr(
    State(state): State<AppState>,
    Query(params): Query<QrParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let report_id = params
        .report_id
        .filter(|r| !r.is_empty())
        .ok_or_else(|| validation_error("Report ID is required"))?;

    let url = format!(
        "{}/report/{}",
        state.cfg.frontend_url.trim_end_matches('/'),
        report_id
    );

    let code = QrCode::new(url.as_bytes())
        .map_err(|e| internal_error("Failed to generate QR code", e))?;
    let image = code
        .render::<svg::Color>()
        .min_dimensions(200, 200)
        .build();
    let encoded = base64::engine::general_purpose::STANDARD.encode(image.as_bytes());

    Ok(Json(json!({
        "success": true,
        "qr_code": {
            "qr_code_data": encoded,
            "format": "svg+base64",
            "url": url,
        }
    })))
}
