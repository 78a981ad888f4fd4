//! Configured Client Example
//!
//! Loads connection settings from `config.json` (falling back to defaults),
//! then prints every database on the server with its document count.
//!
//! Example config.json:
//! {
//!   "host": "couch.example.com",
//!   "port": 6984,
//!   "tls": true,
//!   "username": "admin",
//!   "password": "secret",
//!   "timeout_secs": 10
//! }
//!
//! Run with: cargo run -p comfydb-rs --example from_config

use comfydb_rs::{Client, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("from_config=info,comfydb_rs=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::load("config.json").unwrap_or_else(|_| {
        tracing::warn!("Failed to load config.json, using defaults");
        Config::default()
    });
    tracing::info!("Connecting to {}", config.base_url());

    let client = Client::new(config)?;

    for db in client.list_databases().await? {
        match client.database_info(&db).await {
            Ok(info) => println!(
                "{:<30} {:>8} docs {:>8} deleted",
                info.db_name, info.doc_count, info.doc_del_count
            ),
            Err(e) => tracing::warn!(db = %db, "Failed to read database info: {}", e),
        }
    }

    Ok(())
}
