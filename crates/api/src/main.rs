//! Raya API server

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use raya_api::{
    cache::{KeyValueCache, MemoryCache, RedisCache},
    dns::TrustDnsResolver,
    domains::{DomainService, PgDomainStore},
    routes::create_router,
    tenants::PgTenantDirectory,
    AppState, Config,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often expired entries are swept from the in-process cache
const MEMORY_CACHE_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;

    let migration_pool = raya_shared::create_migration_pool(&config.database_url)
        .await
        .context("Failed to connect to database for migrations")?;
    raya_shared::run_migrations(&migration_pool)
        .await
        .context("Failed to run database migrations")?;
    migration_pool.close().await;

    let pool = raya_shared::create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to connect to database")?;

    let cache: Arc<dyn KeyValueCache> = match &config.redis_url {
        Some(url) => {
            let redis = RedisCache::connect(url)
                .await
                .context("Failed to connect to Redis")?;
            info!("Using Redis domain cache");
            Arc::new(redis) as Arc<dyn KeyValueCache>
        }
        None => {
            warn!("REDIS_URL not set, using in-process domain cache (invalidation is not shared across instances)");
            let memory = Arc::new(MemoryCache::new());
            spawn_cache_cleanup(memory.clone());
            memory as Arc<dyn KeyValueCache>
        }
    };

    let domains = DomainService::new(
        Arc::new(PgDomainStore::new(pool.clone())),
        Arc::new(TrustDnsResolver::new(config.dns_lookup_timeout())),
        cache,
        Arc::new(PgTenantDirectory::new(pool)),
        config.domain_config(),
    );

    let bind_address = config.bind_address.clone();
    info!(
        platform_domain = %config.platform_domain,
        cname_target = %config.platform_cname_target,
        server_ip = %config.platform_server_ip,
        "Domain service configured"
    );

    let app = create_router(AppState::new(config, domains));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("Raya API listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Raya API stopped");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "raya_api=info,tower_http=info".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn spawn_cache_cleanup(cache: Arc<MemoryCache>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(MEMORY_CACHE_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = cache.cleanup();
            if removed > 0 {
                tracing::debug!(removed, "Removed expired domain cache entries");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
