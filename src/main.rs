use anyhow::Result;
use std::sync::Arc;

use dot_notes::config::Config;
use dot_notes::dispatch::ActionDispatcher;
use dot_notes::intent::IntentExtractor;
use dot_notes::server::{self, AppState};
use dot_notes::storage::PgNoteStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    pretty_env_logger::init();
    log::info!("Starting dot-notes agent service...");

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Load configuration
    let config = Config::from_file("config.toml")?;
    log::info!("Configuration loaded successfully");

    // Verify the notes table; failures are logged, not fatal
    let store = PgNoteStore::new(&config.database.url);
    store.ensure_schema().await;

    // Agent clients are built once and shared across requests
    let state = Arc::new(AppState {
        intent: IntentExtractor::new(&config.intent_model),
        dispatcher: ActionDispatcher::new(&config.action_model),
        store: Arc::new(store),
    });

    server::serve(state, &config.server).await
}
