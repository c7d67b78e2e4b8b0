use axum::{extract::State, response::Json};
use chrono::Utc;
use serde_json::json;
use std::time::Duration;

use crate::app_state::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let database = match tokio::time::timeout(
        Duration::from_secs(1),
        sqlx::query("SELECT 1").fetch_one(&state.pool),
    )
    .await
    {
        Ok(Ok(_)) => "healthy",
        _ => "unreachable",
    };

    Json(json!({
        "status": "healthy",
        "service": "rescueradar-backend",
        "timestamp": Utc::now().to_rfc3339(),
        "version": "1.0.0",
        "services": {
            "ai_analysis": if state.enhancer.configured() { "healthy" } else { "misconfigured" },
            "email": if state.cfg.email_configured() { "healthy" } else { "misconfigured" },
            "whatsapp": if state.cfg.whatsapp_configured() { "healthy" } else { "misconfigured" },
            "database": database,
        }
    }))
}
