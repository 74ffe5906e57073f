//! Purchasing ledger server binary

use std::{net::SocketAddr, sync::Arc, time::Duration};

use purchasing_backend::{
    config::Config, create_app, seed, services::AlertService, AppError, AppState, SystemClock,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "purchasing_server=debug,purchasing_backend=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load().map_err(|e| AppError::Configuration(e.to_string()))?;

    tracing::info!("Starting Purchasing Ledger Server");
    tracing::info!("Environment: {}", config.environment);

    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(host, config.server.port);

    let state = AppState::new(config.clone(), Arc::new(SystemClock));

    if config.purchasing.seed_demo_data {
        let mut store = state.store.lock().await;
        seed::seed_demo_data(&mut store, &config.purchasing, state.clock.as_ref())?;
        tracing::info!("Demo data seeded");
    }

    if config.alerts.scan_interval_secs > 0 {
        tokio::spawn(run_alert_scan(state.clone()));
    }

    let app = create_app(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically materialize payment alerts from the invoice ledger
async fn run_alert_scan(state: AppState) {
    let period = Duration::from_secs(state.config.alerts.scan_interval_secs);
    let mut interval = tokio::time::interval(period);

    loop {
        interval.tick().await;
        let mut store = state.store.lock().await;
        let today = state.clock.today();
        let created =
            AlertService::new(&mut store, &state.config.alerts, state.clock.as_ref()).scan(today);
        tracing::debug!(created = created.len(), "Scheduled alert scan");
    }
}
