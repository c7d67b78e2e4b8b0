use axum::{extract::State, response::Json};
use chrono::Utc;
use tracing::error;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::classifier;
use crate::database;
use crate::handlers::{validation_error, ApiError};
use crate::models::{
    ActiveReport, ActiveReportsResponse, Report, SubmitReportRequest, SubmitReportResponse,
};

/// POST /api/save-report
///
/// Persist a new report and fan out notifications. The classification is
/// computed server-side from the description at submission time and stored
/// with the report; it is never recomputed. As long as description and
/// location are present the endpoint succeeds, even when the database is
/// down (fallback file) and every notification failed - the response
/// enumerates what actually went out.
pub async fn save_report(
    State(state): State<AppState>,
    Json(req): Json<SubmitReportRequest>,
) -> Result<Json<SubmitReportResponse>, ApiError> {
    let (description, location) = req
        .required_fields()
        .map_err(|e| validation_error(&e.to_string()))?;

    let report_id = Uuid::new_v4().to_string();

    let mut classification = classifier::classify(&description, Some(&location));
    classification.ai_enhancement = state.enhancer.enhance(&description, &location).await;

    let report = Report {
        id: report_id.clone(),
        description,
        location,
        coordinates: req.coordinates,
        contact_name: non_empty(req.contact_name),
        contact_email: non_empty(req.contact_email),
        contact_phone: non_empty(req.contact_phone),
        urgency_level: classification.urgency_level.as_str().to_string(),
        animal_type: non_empty(req.animal_type),
        situation_type: non_empty(req.situation_type),
        image_url: non_empty(req.image_url),
        ai_analysis: serde_json::to_value(&classification).ok(),
        status: "active".to_string(),
        created_at: Utc::now(),
    };

    let saved_to_db = match database::insert_report(&state.pool, &report).await {
        Ok(()) => true,
        Err(e) => {
            error!("database error, falling back to file store: {:#}", e);
            false
        }
    };

    if !saved_to_db {
        match serde_json::to_value(&report) {
            Ok(record) => {
                if let Err(e) = state.fallback.append(record) {
                    error!("fallback append failed: {:#}", e);
                }
            }
            Err(e) => error!("failed to serialize report for fallback: {}", e),
        }
    }

    let notifications_sent = state
        .notifier
        .notify_submission(&state.pool, saved_to_db, &report)
        .await;

    Ok(Json(SubmitReportResponse {
        success: true,
        report_id,
        message: "Report saved successfully".to_string(),
        notifications_sent,
        saved_to_database: saved_to_db,
    }))
}

/// GET /api/reports/active
///
/// Active reports from the database; on database failure, whatever the
/// fallback file holds (marked with `source`).
pub async fn get_active_reports(State(state): State<AppState>) -> Json<ActiveReportsResponse> {
    match database::fetch_active_reports(&state.pool, 100).await {
        Ok(reports) => {
            let reports: Vec<ActiveReport> = reports.into_iter().map(Into::into).collect();
            Json(ActiveReportsResponse {
                success: true,
                total: reports.len(),
                reports,
                source: None,
            })
        }
        Err(e) => {
            error!("database error, reading fallback store: {:#}", e);
            let reports: Vec<ActiveReport> = state
                .fallback
                .load()
                .into_iter()
                .filter_map(|v| serde_json::from_value::<Report>(v).ok())
                .map(Into::into)
                .collect();
            Json(ActiveReportsResponse {
                success: true,
                total: reports.len(),
                reports,
                source: Some("backup_file".to_string()),
            })
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
