use anyhow::Context;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use movie_recs_api::{
    api::{create_router, AppState},
    config::Config,
    services::load_recommender,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movie_recs_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    // Serve immediately; requests fail with "not ready" until loading finishes
    let state = AppState::new();
    let app = create_router(state.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;
    tracing::info!(address = %config.bind_address(), "Server listening");

    let server = async {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")
    };

    tokio::try_join!(server, load_models(state, config))?;

    tracing::info!("Shutting down application");
    Ok(())
}

/// Loads artifacts on a blocking worker and installs the recommender.
///
/// A load failure is fatal and stops the server.
async fn load_models(state: AppState, config: Config) -> anyhow::Result<()> {
    let paths = config.artifact_paths();
    let warm = config.warm_feature_cache;

    let recommender = tokio::task::spawn_blocking(move || {
        let recommender = load_recommender(&paths)?;
        if warm {
            let rows = recommender.features().len();
            tracing::info!(rows, "Feature cache warmed");
        }
        Ok::<_, movie_recs_api::error::AppError>(recommender)
    })
    .await
    .context("Model loading task panicked")?
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to load models");
        e
    })?;

    state.install(recommender)?;
    tracing::info!("Models loaded, ready to serve recommendations");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
