use adsign::config;
use adsign::display::DisplayClient;
use adsign::errors::Result;
use adsign::scheduler;
use adsign::store::CollectionStore;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (non-fatal, env vars can be set externally)
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application settings
    let settings = config::load_default_settings()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    info!("Successfully processed application configuration.");

    // 4. Open the collection store (creates empty collections on first run)
    let store = CollectionStore::open(&settings.storage.data_dir)
        .inspect_err(|e| error!("Failed to initialize collection store: {}", e))?;
    let store = Arc::new(store);

    // 5. Build the display client
    // DISPLAY_API_KEY is loaded here, directly before use, not stored in Settings
    let display = DisplayClient::from_env(&settings.display)
        .inspect_err(|e| error!("Failed to build display client: {}", e))?;

    // 6. Run the rotation scheduler until shutdown
    tokio::select! {
        () = scheduler::run(Arc::clone(&store), display, settings.display.clone()) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received.");
        }
    }

    Ok(())
}
