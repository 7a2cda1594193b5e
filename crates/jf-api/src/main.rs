use std::net::SocketAddr;

use clap::Parser;
use dotenvy::dotenv;
use tracing::info;

use jf_api::error::ApiError;
use jf_api::{build_state, create_router, AppConfig, Cli};
use jf_common::embedding::EMBEDDING_DIMENSION;
use jf_common::logging;
use jf_common::store::{create_pool_from_url, run_migrations};
use jf_common::vector::QdrantIndex;

async fn run() -> Result<(), ApiError> {
    dotenv().ok();
    logging::init("jf-api");

    let cli = Cli::parse();
    let config = AppConfig::from_cli(cli)?;

    let pool = create_pool_from_url(&config.database_url)
        .map_err(|err| ApiError::Database(format!("failed to create pool: {err}")))?;
    run_migrations(&pool)
        .await
        .map_err(|err| ApiError::Database(format!("migrations failed: {err}")))?;

    let index = QdrantIndex::connect(&config.qdrant_url, &config.collection, EMBEDDING_DIMENSION)
        .await
        .map_err(|err| ApiError::ServiceUnavailable(format!("qdrant unavailable: {err}")))?;

    let state = build_state(pool, index);
    let readiness = state.readiness.clone();

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    let app = create_router(state, &config.cors_origins);

    info!(%addr, collection = %config.collection, "jf-api listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            readiness.store(false, std::sync::atomic::Ordering::SeqCst);
            info!("shutdown signal received, draining");
        })
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!(error = %err, "jf-api failed");
        std::process::exit(1);
    }
}
