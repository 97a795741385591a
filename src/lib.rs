pub mod aggregate;
pub mod battle;
pub mod builder;
pub mod catalog;
pub mod config;
pub mod error;
pub mod items;
pub mod model;
pub mod scoring;
pub mod server;
pub mod service;
pub mod session;
pub mod stats;
pub mod store;
pub mod types;

use crate::aggregate::Aggregator;
use crate::battle::DuelExecutor;
use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::service::{BattleService, SimulationSettings};
use crate::store::SessionStore;
use anyhow::Context;
use chrono::{TimeDelta, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub use crate::error::{EngineError, ErrorKind};

/// Wire the catalog, the duel executor, the worker pool and the session store.
pub fn build_service(config: &AppConfig) -> anyhow::Result<Arc<BattleService>> {
    let catalog = Arc::new(Catalog::load(&config.catalog.path)?);
    info!(
        creatures = catalog.len(),
        path = %config.catalog.path.display(),
        "loaded creature catalog"
    );
    service_with_catalog(config, catalog)
}

pub fn service_with_catalog(
    config: &AppConfig,
    catalog: Arc<Catalog>,
) -> anyhow::Result<Arc<BattleService>> {
    let executor = Arc::new(DuelExecutor::new(Arc::clone(&catalog)));
    let aggregator = Aggregator::new(catalog, executor, config.simulation.worker_threads)?;
    let ttl_secs = i64::try_from(config.sessions.ttl_secs)
        .context("sessions.ttl_secs does not fit a duration")?;
    let store = SessionStore::new(TimeDelta::seconds(ttl_secs), config.sessions.max_sessions);
    Ok(Arc::new(BattleService::new(
        Arc::new(aggregator),
        Arc::new(store),
        SimulationSettings::from(&config.simulation),
    )))
}

/// Background sweep that drops expired sessions every `every`.
pub fn spawn_session_sweeper(
    store: Arc<SessionStore>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            store.purge_expired(Utc::now());
        }
    })
}

/// Serve the HTTP API until `shutdown` resolves.
pub async fn serve(
    config: &AppConfig,
    service: Arc<BattleService>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let sweeper = spawn_session_sweeper(
        Arc::clone(service.store()),
        Duration::from_secs(config.sessions.sweep_interval_secs),
    );

    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Battle guessing API listening on http://{addr}");

    let result = axum::serve(listener, server::create_router(service))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed");
    sweeper.abort();
    result
}
