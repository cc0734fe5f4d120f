//! Raya background worker
//!
//! Runs scheduled maintenance jobs against the domain registry.

mod domain_expiry;

use std::sync::Arc;

use anyhow::Context;
use raya_api::domains::PgDomainStore;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use domain_expiry::{sweep_expired_verifications, DEFAULT_EXPIRY_SWEEP_CRON};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "raya_worker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(2);
    let schedule = std::env::var("EXPIRY_SWEEP_CRON")
        .unwrap_or_else(|_| DEFAULT_EXPIRY_SWEEP_CRON.to_string());

    let pool = raya_shared::create_pool(&database_url, max_connections)
        .await
        .context("Failed to connect to database")?;
    let store = Arc::new(PgDomainStore::new(pool));

    // Catch up once at startup instead of waiting for the first tick
    sweep_expired_verifications(store.as_ref()).await;

    let scheduler = JobScheduler::new().await?;
    let job_store = store.clone();
    scheduler
        .add(Job::new_async(schedule.as_str(), move |_id, _scheduler| {
            let store = job_store.clone();
            Box::pin(async move {
                sweep_expired_verifications(store.as_ref()).await;
            })
        })?)
        .await?;
    scheduler.start().await?;

    info!(schedule = %schedule, "Raya worker started");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Raya worker stopping");

    Ok(())
}
