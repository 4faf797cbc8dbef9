use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use filmrank::{
    config::{Config, StoreBackend},
    db::{create_pool, EntityStore, EventFeed, MemoryEventFeed, MemoryStore, PgEventFeed, PgStore},
    routes::{create_router, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("filmrank=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let (store, feed): (Arc<dyn EntityStore>, Arc<dyn EventFeed>) = match config.store_backend {
        StoreBackend::Postgres => {
            let pool = create_pool(&config.database_url, config.max_connections).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!(max_connections = config.max_connections, "Connected to PostgreSQL");
            (
                Arc::new(PgStore::new(pool.clone())),
                Arc::new(PgEventFeed::new(pool)),
            )
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on shutdown");
            (Arc::new(MemoryStore::new()), Arc::new(MemoryEventFeed::new()))
        }
    };

    let state = Arc::new(AppState::new(store, feed, &config));
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
