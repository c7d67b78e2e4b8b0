use sqlx::MySqlPool;
use std::sync::Arc;
use tracing::warn;

use crate::database;
use crate::models::Report;
use crate::services::email::{EmailMessage, Mailer};
use crate::services::templates;
use crate::services::whatsapp::WhatsAppClient;

/// Fan-out for report submissions. Every dispatch is best-effort and fully
/// decoupled from persistence: a failed notification never blocks the
/// others and never rolls back the save.
pub struct Notifier {
    mailer: Arc<Mailer>,
    whatsapp: Option<Arc<WhatsAppClient>>,
    rescue_team_email: String,
}

impl Notifier {
    pub fn new(
        mailer: Arc<Mailer>,
        whatsapp: Option<Arc<WhatsAppClient>>,
        rescue_team_email: String,
    ) -> Self {
        Self {
            mailer,
            whatsapp,
            rescue_team_email,
        }
    }

    /// Dispatch the submission fan-out and return the names of the
    /// notifications that actually went out.
    pub async fn notify_submission(
        &self,
        pool: &MySqlPool,
        saved_to_db: bool,
        report: &Report,
    ) -> Vec<String> {
        let mut sent = Vec::new();

        if let (Some(whatsapp), Some(phone)) = (&self.whatsapp, &report.contact_phone) {
            let outcome = whatsapp
                .send_receipt(phone, &report.id, &report.description)
                .await;
            if outcome.success {
                sent.push("whatsapp_receipt".to_string());
                self.record(pool, saved_to_db, report, "whatsapp", phone, &outcome.message_id)
                    .await;
            }
        }

        let (subject, html) = templates::rescue_alert(report);
        let outcome = self
            .mailer
            .send(EmailMessage::new(&self.rescue_team_email, subject, html))
            .await;
        if outcome.success {
            sent.push("rescue_team_email".to_string());
            self.record(
                pool,
                saved_to_db,
                report,
                "email",
                self.rescue_team_email.as_str(),
                &outcome.message_id,
            )
            .await;
        }

        if let Some(email) = &report.contact_email {
            let (subject, html) = templates::user_confirmation(report);
            let outcome = self.mailer.send(EmailMessage::new(email, subject, html)).await;
            if outcome.success {
                sent.push("user_email_confirmation".to_string());
                self.record(pool, saved_to_db, report, "email", email, &outcome.message_id)
                    .await;
            }
        }

        sent
    }

    /// Notification bookkeeping only exists when the primary save worked;
    /// a failed insert here is logged and forgotten.
    async fn record(
        &self,
        pool: &MySqlPool,
        saved_to_db: bool,
        report: &Report,
        notification_type: &str,
        recipient: &str,
        message_id: &Option<String>,
    ) {
        if !saved_to_db {
            return;
        }
        if let Err(e) = database::insert_notification(
            pool,
            &report.id,
            notification_type,
            recipient,
            message_id.as_deref(),
        )
        .await
        {
            warn!("failed to record {} notification: {:#}", notification_type, e);
        }
    }
}
