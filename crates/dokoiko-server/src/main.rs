mod api;
mod middleware;
mod sessions;

#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dokoiko_core::{load_categories, CategoryMapping};
use dokoiko_providers::{GooglePhotoClient, HttpSettings};
use dokoiko_search::SearchServices;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, rate_limit_state, AppState},
    sessions::SessionStore,
};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(dokoiko_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let categories = Arc::new(match &config.categories_path {
        Some(path) => load_categories(path)?,
        None => CategoryMapping::builtin(),
    });
    tracing::info!(
        env = %config.env,
        geocoder = %config.geocoder,
        categories = categories.len(),
        "starting dokoiko-server"
    );

    let services = Arc::new(SearchServices::from_config(&config, Arc::clone(&categories))?);
    let photos = Arc::new(GooglePhotoClient::new(
        &config.google_api_key,
        &HttpSettings::from_config(&config),
    )?);

    let sessions = SessionStore::new(services, Duration::from_secs(config.session_ttl_secs));
    let _sweeper = sessions.spawn_sweeper(SESSION_SWEEP_INTERVAL);

    let app = build_app(
        AppState {
            sessions,
            categories,
            photos,
        },
        rate_limit_state(config.rate_limit_per_minute),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
