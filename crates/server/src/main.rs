use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use herald_core::{
    load_config, validate_config, AdbDriver, Config, ContactStore, DeviceDriver, Dispatcher,
    EventBus, PolicyStore, QuotaLedger, QuotaStore, RunStore, SqliteContactStore,
    SqlitePolicyStore, SqliteQuotaStore, SqliteRunStore,
};

use herald_server::api::create_router;
use herald_server::state::AppState;

/// Event bus capacity (entries buffered per lagging subscriber)
const EVENT_BUS_CAPACITY: usize = 256;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("HERALD_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration; a missing file at the default location just means
    // defaults everywhere.
    let config = if config_path.exists() {
        info!("Loading configuration from {:?}", config_path);
        load_config(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        info!("No config file at {:?}, using defaults", config_path);
        Config::default()
    };

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);
    info!("adb path: {}", config.device.adb_path);

    // Create SQLite-backed stores (they share the database file)
    let contacts: Arc<dyn ContactStore> = Arc::new(
        SqliteContactStore::new(&config.database.path)
            .context("Failed to create contact store")?,
    );
    info!("Contact store initialized");

    let policy: Arc<dyn PolicyStore> = Arc::new(
        SqlitePolicyStore::new(&config.database.path).context("Failed to create policy store")?,
    );
    info!("Policy store initialized");

    let quota_store: Arc<dyn QuotaStore> = Arc::new(
        SqliteQuotaStore::new(&config.database.path).context("Failed to create quota store")?,
    );
    let quota = Arc::new(QuotaLedger::new(quota_store).context("Failed to load quota ledger")?);
    info!("Quota ledger initialized");

    let runs: Arc<dyn RunStore> = Arc::new(
        SqliteRunStore::new(&config.database.path).context("Failed to create run store")?,
    );
    info!("Run store initialized");

    // Create the adb device driver
    let driver: Arc<dyn DeviceDriver> = Arc::new(AdbDriver::new(config.device.clone()));
    info!("Device driver initialized: {}", driver.name());

    // Create the event bus and dispatcher
    let events = EventBus::new(
        EVENT_BUS_CAPACITY,
        Duration::from_secs(config.events.heartbeat_interval_secs),
    );
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&contacts),
        Arc::clone(&policy),
        Arc::clone(&quota),
        Arc::clone(&driver),
        Arc::clone(&runs),
        events,
    ));
    info!("Dispatcher initialized");

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        contacts,
        policy,
        quota,
        runs,
        driver,
        Arc::clone(&dispatcher),
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Cancel any active run; the worker observes the flag at its next loop
    // boundary and persists what it has.
    info!("Server shutting down...");
    if dispatcher.is_running() {
        info!("Stopping active dispatch run...");
        dispatcher.stop();
        while dispatcher.is_running() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        info!("Dispatch run stopped");
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
