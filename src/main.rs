mod app_state;
mod classifier;
mod config;
mod database;
mod fallback;
mod handlers;
mod models;
mod services;
mod util;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app_state::AppState;
use config::Config;
use fallback::{EmailLog, FallbackStore};
use services::email::Mailer;
use services::enhancement::Enhancer;
use services::notifier::Notifier;
use services::whatsapp::WhatsAppClient;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rescueradar_backend=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("starting rescueradar-backend");
    let cfg = Arc::new(Config::from_env()?);
    tracing::info!("database: {}", cfg.mysql_masked_url());

    let pool = database::create_pool(&cfg)?;
    // The pool is lazy; an unreachable database only disables the primary
    // store, so schema init is best-effort.
    if let Err(e) = database::schema::initialize_schema(&pool).await {
        tracing::warn!(
            "schema init failed, reports will use the fallback store: {:#}",
            e
        );
    }

    let email_log = EmailLog::new(cfg.email_log_path.clone());
    let mailer = Arc::new(Mailer::from_config(&cfg, email_log.clone())?);
    let whatsapp = WhatsAppClient::from_config(&cfg)?.map(Arc::new);
    if whatsapp.is_none() {
        tracing::warn!("Twilio credentials not set; WhatsApp notifications disabled");
    }
    let enhancer = Arc::new(Enhancer::from_config(&cfg)?);
    if enhancer.configured() {
        tracing::info!(
            "AI enhancement enabled: model={} key={}",
            cfg.groq_model,
            util::mask_secret(&cfg.groq_api_key, 4, 4)
        );
    } else {
        tracing::info!("GROQ_API_KEY not set; running rule-based analysis only");
    }
    let notifier = Arc::new(Notifier::new(
        mailer.clone(),
        whatsapp.clone(),
        cfg.rescue_team_email.clone(),
    ));
    let fallback = Arc::new(FallbackStore::new(cfg.fallback_reports_path.clone()));

    let state = AppState {
        pool,
        cfg: cfg.clone(),
        mailer,
        whatsapp,
        enhancer,
        notifier,
        fallback,
        email_log: Arc::new(email_log),
    };

    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("rescueradar-backend listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let upload_dir = state.cfg.upload_dir.clone();

    Router::new()
        .route("/api/health", get(handlers::health::health_check))
        .route("/api/ai-analysis", post(handlers::analysis::analyze_report))
        .route("/api/save-report", post(handlers::reports::save_report))
        .route("/api/reports/active", get(handlers::reports::get_active_reports))
        .route("/api/email-notify", post(handlers::notifications::email_notify))
        .route("/api/whatsapp-notify", post(handlers::notifications::whatsapp_notify))
        .route("/api/generate-qr", get(handlers::notifications::generate_qr))
        .route("/api/upload-image", post(handlers::upload::upload_image))
        .route("/api/email/send-test-email", post(handlers::email_admin::send_test_email))
        .route("/api/email/send-custom-email", post(handlers::email_admin::send_custom_email))
        .route("/api/email/send-bulk-email", post(handlers::email_admin::send_bulk_email))
        .route("/api/email/send-template-email", post(handlers::email_admin::send_template_email))
        .route("/api/email/email-stats", get(handlers::email_admin::email_stats))
        .route("/api/email/email-templates", get(handlers::email_admin::email_templates))
        .route("/api/email/email-config", get(handlers::email_admin::email_config))
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .fallback(handlers::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            tracing::info!("received terminate signal, shutting down gracefully");
        },
    }
}
