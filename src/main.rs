mod api;
mod config;
mod document;
mod handler;
mod internationalization;
mod localize;

use std::sync::Arc;

use eyre::WrapErr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_error::ErrorLayer::default())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = crate::config::Config::try_from_env()?;
    let translations_url = config.translations_url()?;
    let state = Arc::new(crate::handler::SiteState::new(
        config.site_root.clone(),
        &config.public_url,
        translations_url,
    ));
    tracing::info!(
        site_root = %state.site_root.display(),
        origin = %state.origin,
        translations_url = %state.translations_url,
        "serving site"
    );

    let router = crate::handler::create_router(state);

    let listen_addr = &config.listen_addr;
    tracing::info!(%listen_addr, "starting http server...");
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .wrap_err_with(|| format!("failed to bind `{listen_addr}`"))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("http server failed")?;

    Ok(())
}
