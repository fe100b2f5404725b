use cosy::api::router::create_router;
use cosy::config::AppConfig;
use cosy::{db, metrics, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("Connecting to database...");
    let pool = db::init_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    tracing::info!("Database connected, migrations applied");

    let metrics_handle = metrics::init_metrics();

    tokio::fs::create_dir_all(&config.device_store_dir).await?;
    tracing::info!(dir = %config.device_store_dir.display(), "Device store ready");

    let state = AppState::new(pool, config, metrics_handle);
    if state.llm.is_none() {
        tracing::warn!("OPENAI_API_KEY not set, Jarvis will answer with an error");
    } else {
        tracing::info!(model = %state.config.jarvis_model, "Jarvis enabled");
    }
    if !state.config.has_session_auth() {
        tracing::warn!("SESSION_JWT_SECRET not set, every request is anonymous");
    }

    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
