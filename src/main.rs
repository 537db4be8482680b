use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pizzaria_api::{
    config::AppConfig,
    db::{create_pool, orm_from_pool, run_migrations},
    payments::AbacatePayClient,
    realtime::EventHub,
    routes::create_app,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pizzaria_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let payments = AbacatePayClient::new(
        config
            .payments
            .base_url
            .parse()
            .context("ABACATEPAY_BASE_URL is not a valid URL")?,
        config.payments.api_key.clone(),
        config.payments.return_url.clone(),
        Duration::from_secs(config.payments.timeout_secs),
    )?;

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    let state = AppState {
        orm: orm_from_pool(&pool),
        pool,
        config: Arc::new(config),
        payments: Arc::new(payments),
        events: EventHub::default(),
    };
    let app = create_app(state);

    tracing::info!("listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
