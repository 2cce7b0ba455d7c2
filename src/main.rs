use anyhow::Context;
use api_faker::adapters::jwt::JwtAuthenticator;
use api_faker::core::ThreadRolls;
use api_faker::utils::{logger, validation::Validate};
use api_faker::{router, AppState, ServerArgs, StoreHandle};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();
    let config = args
        .load_config()
        .with_context(|| format!("failed to load configuration from {}", args.config))?;

    logger::init_logger(args.verbose, &config.logging.level, config.logging.format);

    tracing::info!("Starting api-faker v{}", env!("CARGO_PKG_VERSION"));
    if args.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!(
            "❌ Configuration validation failed: {} (Category: {:?})",
            e,
            e.category()
        );
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let store = StoreHandle::open(&config.database).context("failed to open the configuration store")?;
    let authenticator = JwtAuthenticator::new(config.jwt_secret()?, config.auth.token_ttl_seconds);
    let state = AppState::new(store.shared(), authenticator, Arc::new(ThreadRolls));

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    tracing::info!("🚀 Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("🛑 Server stopped, closing store");
    store.close().context("failed to close the configuration store")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
