use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common::StorageBackend;
use common::storage::ObjectStore;
use common::storage::filesystem::FilesystemObjectStore;
use common::storage::s3::S3ObjectStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use funoj::cache::{CacheStore, MemoryCache, RedisCache};
use funoj::config::AppConfig;
use funoj::mail::{LogMailer, Mailer, SmtpMailer};
use funoj::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let db = funoj::database::init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    info!("Database connected and schema synchronized");

    funoj::seed::seed_defaults(&db, &config.auth)
        .await
        .context("Failed to seed default data")?;
    funoj::seed::ensure_indexes(&db)
        .await
        .context("Failed to ensure indexes")?;

    let cache: Arc<dyn CacheStore> = match config.redis.url.as_deref() {
        Some(url) => {
            info!("Using Redis cache");
            Arc::new(RedisCache::connect(url).await?)
        }
        None => {
            info!("Redis not configured, using in-process cache");
            Arc::new(MemoryCache::new())
        }
    };

    let storage: Arc<dyn ObjectStore> = match config.storage.backend {
        StorageBackend::Filesystem => Arc::new(
            FilesystemObjectStore::new(config.storage.root.clone(), config.storage.max_object_size)
                .await?,
        ),
        StorageBackend::S3 => Arc::new(S3ObjectStore::new(&config.storage)?),
    };
    info!("Object storage backend: {:?}", config.storage.backend);

    let mailer: Arc<dyn Mailer> = if config.mail.enabled {
        Arc::new(SmtpMailer::new(&config.mail)?)
    } else {
        info!("Mail disabled, verification codes will be logged");
        Arc::new(LogMailer)
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server.host or server.port")?;

    let state = AppState {
        db,
        config: Arc::new(config),
        cache,
        storage,
        mailer,
    };
    let app = funoj::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", addr);
    info!("Swagger UI at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
