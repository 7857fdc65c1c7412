mod config;

use config::Config;
use shelfsync_core::cache::{FilterCache, FilterCacheConfig};
use shelfsync_core::catalog::Catalog;
use shelfsync_core::drive::{GoogleDriveClient, ServiceAccount};
use shelfsync_core::providers::{OmdbClient, TmdbClient};
use shelfsync_core::sync::Indexer;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let default_filter = if config.is_debug {
        "shelfsync=debug,shelfsync_core=debug"
    } else {
        "shelfsync=info,shelfsync_core=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let account = ServiceAccount::new(
        config.drive_client_id,
        config.drive_client_email,
        config.drive_private_key,
        config.drive_private_key_id,
    );
    let drive = Arc::new(GoogleDriveClient::new(account)?);
    let tmdb = Arc::new(TmdbClient::new(config.tmdb_api_key)?);
    let omdb = Arc::new(OmdbClient::new(config.omdb_api_key)?);

    let catalog = Catalog::connect(&config.database_url).await?;
    catalog.log_statistics().await?;

    let cache = FilterCache::connect(FilterCacheConfig {
        host: config.redis_host,
        port: config.redis_port,
        username: config.redis_username,
        password: config.redis_password,
    })
    .await?;

    let indexer = Indexer::new(
        drive,
        tmdb,
        omdb,
        catalog.stores(),
        Arc::new(cache),
        config.movies_folder,
        config.shows_folder,
    );
    indexer.run().await;

    info!("sync job finished");
    // The scheduler that launches this job treats a non-zero exit as
    // "run finished, reschedule"; exiting 0 would stop the cycle.
    std::process::exit(1);
}
