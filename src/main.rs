use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use navix_prefs::{
    api::{create_router, AppState},
    config::Config,
    db::{create_redis_client, MemoryStorage, RedisStorage, StorageAdapter},
    services::HttpPreferenceSync,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "navix_prefs=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let storage: Arc<dyn StorageAdapter> = match &config.redis_url {
        Some(redis_url) => {
            let client = create_redis_client(redis_url)?;
            tracing::info!(ttl = ?config.preference_ttl_secs, "Using Redis preference storage");
            Arc::new(RedisStorage::new(client, config.preference_ttl_secs))
        }
        None => {
            tracing::warn!("REDIS_URL not set, preferences are kept in memory only");
            Arc::new(MemoryStorage::new())
        }
    };

    let mut state = AppState::new(
        storage,
        config.default_settings(),
        config.max_open_profiles,
    );
    if let Some(sync_url) = &config.sync_url {
        tracing::info!(sync_url = %sync_url, "Mirroring place votes to backend");
        state = state.with_sync(Arc::new(HttpPreferenceSync::new(sync_url.clone())));
    }

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
