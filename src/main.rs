use skyjo::{router, AppError, AppState, ServerConfig};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skyjo=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "Server stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = ServerConfig::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        seeded = config.shuffle_seed.is_some(),
        "Starting Skyjo game server"
    );

    let app = router(AppState::from_config(&config));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
