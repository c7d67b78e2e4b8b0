use anyhow::Result;
use sqlx::{MySql, Pool};
use tracing::info;

pub async fn initialize_schema(pool: &Pool<MySql>) -> Result<()> {
    info!("initializing database schema");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reports (
            id CHAR(36) PRIMARY KEY,
            description TEXT NOT NULL,
            location TEXT NOT NULL,
            latitude DOUBLE NULL,
            longitude DOUBLE NULL,
            contact_name VARCHAR(255) NULL,
            contact_email VARCHAR(255) NULL,
            contact_phone VARCHAR(64) NULL,
            urgency_level VARCHAR(32) NOT NULL DEFAULT 'normal',
            animal_type VARCHAR(64) NULL,
            situation_type VARCHAR(64) NULL,
            image_url TEXT NULL,
            ai_analysis TEXT NULL,
            status VARCHAR(32) NOT NULL DEFAULT 'active',
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            INDEX idx_status_created (status, created_at DESC)
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            id INT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
            report_id CHAR(36) NOT NULL,
            notification_type VARCHAR(32) NOT NULL,
            recipient VARCHAR(255) NOT NULL,
            status VARCHAR(32) NOT NULL DEFAULT 'sent',
            message_id VARCHAR(255) NULL,
            sent_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            INDEX idx_report_id (report_id)
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci
        "#,
    )
    .execute(pool)
    .await?;

    info!("database schema initialized");
    Ok(())
}
