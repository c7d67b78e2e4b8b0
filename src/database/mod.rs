pub mod schema;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{pool::PoolOptions, MySql, Pool, Row};
use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::models::{Coordinates, Report};

/// Build the MySQL pool lazily: connections are established on first use, so
/// an unreachable database does not prevent startup. Callers treat query
/// failures as "try the fallback store".
pub fn create_pool(config: &Config) -> Result<Pool<MySql>> {
    let database_url = config.mysql_url();
    info!("database pool (lazy): {}", config.mysql_masked_url());

    let pool = PoolOptions::<MySql>::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(3))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect_lazy(&database_url)
        .context("build mysql pool")?;
    Ok(pool)
}

pub async fn insert_report(pool: &Pool<MySql>, report: &Report) -> Result<()> {
    let ai_analysis = report
        .ai_analysis
        .as_ref()
        .map(|v| v.to_string());

    sqlx::query(
        r#"
        INSERT INTO reports
            (id, description, location, latitude, longitude,
             contact_name, contact_email, contact_phone,
             urgency_level, animal_type, situation_type,
             image_url, ai_analysis, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&report.id)
    .bind(&report.description)
    .bind(&report.location)
    .bind(report.coordinates.map(|c| c.lat))
    .bind(report.coordinates.map(|c| c.lng))
    .bind(&report.contact_name)
    .bind(&report.contact_email)
    .bind(&report.contact_phone)
    .bind(&report.urgency_level)
    .bind(&report.animal_type)
    .bind(&report.situation_type)
    .bind(&report.image_url)
    .bind(ai_analysis)
    .bind(&report.status)
    .execute(pool)
    .await
    .context("insert report")?;

    Ok(())
}

pub async fn fetch_active_reports(pool: &Pool<MySql>, limit: u32) -> Result<Vec<Report>> {
    let rows = sqlx::query(
        r#"
        SELECT id, description, location, latitude, longitude,
               contact_name, contact_email, contact_phone,
               urgency_level, animal_type, situation_type,
               image_url, ai_analysis, status, created_at
        FROM reports
        WHERE status = 'active'
        ORDER BY created_at DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("select active reports")?;

    let mut reports = Vec::with_capacity(rows.len());
    for row in rows {
        let latitude: Option<f64> = row.get("latitude");
        let longitude: Option<f64> = row.get("longitude");
        let coordinates = match (latitude, longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        };
        let ai_analysis: Option<String> = row.get("ai_analysis");
        let created_at: DateTime<Utc> = row.get("created_at");

        reports.push(Report {
            id: row.get("id"),
            description: row.get("description"),
            location: row.get("location"),
            coordinates,
            contact_name: row.get("contact_name"),
            contact_email: row.get("contact_email"),
            contact_phone: row.get("contact_phone"),
            urgency_level: row.get("urgency_level"),
            animal_type: row.get("animal_type"),
            situation_type: row.get("situation_type"),
            image_url: row.get("image_url"),
            ai_analysis: ai_analysis.and_then(|raw| serde_json::from_str(&raw).ok()),
            status: row.get("status"),
            created_at,
        });
    }

    Ok(reports)
}

/// Best-effort bookkeeping row for a dispatched notification.
pub async fn insert_notification(
    pool: &Pool<MySql>,
    report_id: &str,
    notification_type: &str,
    recipient: &str,
    message_id: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO notifications (report_id, notification_type, recipient, status, message_id)
        VALUES (?, ?, ?, 'sent', ?)
        "#,
    )
    .bind(report_id)
    .bind(notification_type)
    .bind(recipient)
    .bind(message_id)
    .execute(pool)
    .await
    .context("insert notification")?;
    Ok(())
}
