use axum::Router;
use common::config::Config;
use tokio::net::TcpListener;
use tokio::select;
use tokio::signal::unix::SignalKind;
use tracing::info;
use tracing::warn;

use crate::error::Result;
use crate::init_fs;
use crate::init_metadata;
use crate::init_metrics;
use crate::init_platform;
use crate::init_store;

pub async fn start(cfg: Config) -> Result<()> {
    init_fs(&cfg)?;
    let md = init_metadata(&cfg)?;
    let store = init_store(&cfg)?;
    info!("metrics initialization...");
    init_metrics()?;

    let router = Router::new();
    info!("initializing platform...");
    let router = init_platform(md, store, router, &cfg)?;

    let mut sig_int = tokio::signal::unix::signal(SignalKind::interrupt())?;
    let mut sig_term = tokio::signal::unix::signal(SignalKind::terminate())?;
    let signal = async move {
        select! {
            _=sig_int.recv()=>warn!("SIGINT received"),
            _=sig_term.recv()=>warn!("SIGTERM received"),
        }
    };

    info!("listening on http://{}", cfg.server.host);
    let listener = TcpListener::bind(cfg.server.host).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(signal)
        .await?;
    info!("server stopped");

    Ok(())
}
