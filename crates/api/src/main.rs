use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adgen_api::config::ServerConfig;
use adgen_api::router::build_app_router;
use adgen_api::state::AppState;
use adgen_pipeline::{GenerationOrchestrator, GenerationStore, MemoryStore, PgGenerationStore};
use adgen_providers::clipdrop::ClipdropSynthesizer;
use adgen_providers::gemini::GeminiRefiner;
use adgen_providers::imagekit::ImageKitHost;
use adgen_providers::{build_http_client, ProviderConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // Missing API keys are fatal before anything binds.
    let provider_config =
        ProviderConfig::from_env().context("Provider configuration is incomplete")?;

    // --- Record store ---
    let store = build_store().await?;

    // --- Provider clients ---
    let http = build_http_client(&provider_config)?;
    let orchestrator = GenerationOrchestrator::new(
        Arc::clone(&store),
        Arc::new(GeminiRefiner::new(http.clone(), &provider_config)),
        Arc::new(ClipdropSynthesizer::new(http.clone(), &provider_config)),
        Arc::new(ImageKitHost::new(http, &provider_config)),
    );
    tracing::info!(model = %provider_config.gemini_model, "Provider clients ready");

    // --- App state ---
    let state = AppState {
        store,
        orchestrator: Arc::new(orchestrator),
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Install the global subscriber. `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "adgen_api=debug,adgen_pipeline=debug,adgen_providers=debug,tower_http=debug".into()
    });

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let (json_layer, text_layer) = if json {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

/// Connect to PostgreSQL when `DATABASE_URL` is set; otherwise fall back to
/// the in-memory store, which loses everything on restart.
async fn build_store() -> anyhow::Result<Arc<dyn GenerationStore>> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        tracing::warn!("DATABASE_URL not set, using the in-memory store");
        let store: Arc<dyn GenerationStore> = Arc::new(MemoryStore::new());
        return Ok(store);
    };

    let pool = adgen_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    adgen_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    adgen_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    let store: Arc<dyn GenerationStore> = Arc::new(PgGenerationStore::new(pool));
    Ok(store)
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
