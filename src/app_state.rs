use sqlx::MySqlPool;
use std::sync::Arc;

use crate::config::Config;
use crate::fallback::{EmailLog, FallbackStore};
use crate::services::email::Mailer;
use crate::services::enhancement::Enhancer;
use crate::services::notifier::Notifier;
use crate::services::whatsapp::WhatsAppClient;

/// Everything handlers need, constructed once in `main` and cloned per
/// request. No global singletons; tests can build one with fakes.
#[derive(Clone)]
pub struct AppState {
    pub pool: MySqlPool,
    pub cfg: Arc<Config>,
    pub mailer: Arc<Mailer>,
    pub whatsapp: Option<Arc<WhatsAppClient>>,
    pub enhancer: Arc<Enhancer>,
    pub notifier: Arc<Notifier>,
    pub fallback: Arc<FallbackStore>,
    pub email_log: Arc<EmailLog>,
}
