use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use parkly_api::{app, AppState, Stores};
use parkly_core::repository::SessionStore;
use parkly_core::SystemClock;
use parkly_store::app_config::{Config, SessionBackend};
use parkly_store::{
    DbClient, MemorySessionStore, RedisSessionStore, StoreBookingRepository, StoreSlotRepository,
    StoreUserRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parkly_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Parkly API on port {}", config.server.port);

    // Postgres
    let db = DbClient::new(&config.database.url)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    let sessions: Arc<dyn SessionStore> = match config.session.backend {
        SessionBackend::Redis => Arc::new(
            RedisSessionStore::new(&config.redis.url, config.session.ttl_seconds)
                .await
                .context("Failed to connect to Redis")?,
        ),
        SessionBackend::Memory => Arc::new(MemorySessionStore::new()),
    };
    tracing::info!("Session backend: {:?}", config.session.backend);

    let stores = Stores {
        slots: Arc::new(StoreSlotRepository::new(db.pool.clone())),
        bookings: Arc::new(StoreBookingRepository::new(db.pool.clone())),
        users: Arc::new(StoreUserRepository::new(db.pool.clone())),
        sessions,
    };

    let app_state = AppState::new(
        stores,
        Arc::new(SystemClock),
        config.scoring.clone(),
        config.seed.clone(),
        config.booking.clone(),
    );

    if config.seed.on_startup {
        parkly_booking::seed_slots(app_state.slot_repo.as_ref(), &config.seed)
            .await
            .context("Failed to seed parking slots")?;
    }

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
