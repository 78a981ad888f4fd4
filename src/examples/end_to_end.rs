//! Document Lifecycle Example
//!
//! Creates a database, stores a document, reads it back, deletes it and
//! drops the database, against a server on 127.0.0.1:5984.
//!
//! Run with: cargo run -p comfydb-rs --example end_to_end
//! Override the log level with RUST_LOG, e.g. RUST_LOG=comfydb_rs=trace

use comfydb_rs::{Client, Config};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("end_to_end=info,comfydb_rs=debug"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let client = Client::new(Config::default())?;
    let db = "comfydb_example";

    client.create_database(db).await?;
    tracing::info!(db, "✓ Database created");

    let created = client
        .create_document(db, &json!({"a": 1}), Some("doc1"))
        .await?;
    tracing::info!(id = %created.id, rev = %created.rev, "📝 Document created");

    let doc = client.open_document(db, "doc1", None).await?;
    tracing::info!("   Opened: {}", serde_json::to_string(&doc)?);

    let listing = client.list_documents(db).await?;
    tracing::info!("   {} document(s) in {}", listing.total_rows, db);

    let rev = doc.rev.unwrap_or(created.rev);
    client.delete_document(db, "doc1", &rev).await?;

    match client.open_document(db, "doc1", None).await {
        Err(e) if e.is_not_found() => tracing::info!("✓ Document gone after delete"),
        Err(e) => return Err(e.into()),
        Ok(_) => tracing::warn!("Document still present after delete"),
    }

    client.delete_database(db).await?;
    tracing::info!(db, "✓ Database deleted");

    Ok(())
}
