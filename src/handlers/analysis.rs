use axum::{extract::State, response::Json};
use serde_json::json;

use crate::app_state::AppState;
use crate::classifier;
use crate::handlers::{validation_error, ApiError};
use crate::models::AnalyzeRequest;

/// POST /api/ai-analysis
///
/// Rule-based severity classification of a report description, with an
/// optional best-effort LLM addendum. The addendum never changes the tier.
pub async fn analyze_report(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let description = req
        .description
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| validation_error("Description is required"))?;
    let location = req.location.unwrap_or_default();

    let mut analysis = classifier::classify(
        &description,
        (!location.is_empty()).then_some(location.as_str()),
    );
    analysis.ai_enhancement = state.enhancer.enhance(&description, &location).await;

    Ok(Json(json!({
        "success": true,
        "analysis": analysis,
    })))
}
