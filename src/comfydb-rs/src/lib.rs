//! ComfyDb Client Library
//!
//! HTTP client for the CouchDB REST API: database listing, creation,
//! deletion and info, plus document CRUD.
//!
//! ```rust,no_run
//! use comfydb_rs::{Client, Config};
//! use serde_json::json;
//!
//! # async fn run() -> comfydb_rs::Result<()> {
//! let client = Client::new(Config::default())?;
//! client.create_database("t").await?;
//! let created = client.create_document("t", &json!({"a": 1}), Some("doc1")).await?;
//! client.delete_document("t", "doc1", &created.rev).await?;
//! client.delete_database("t").await?;
//! # Ok(())
//! # }
//! ```

mod client;

pub use client::Client;
pub use comfydb_core::{
    AllDocs, Config, DatabaseInfo, DocRow, Document, Envelope, ErrorResponse, RowValue,
};

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Not found: {reason}")]
    NotFound { reason: String },

    #[error("Revision conflict: {reason}")]
    RevisionConflict { reason: String },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid JSON in response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Map a non-success response onto the error taxonomy
    pub(crate) fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let message = match serde_json::from_slice::<ErrorResponse>(body) {
            Ok(err) => match err.reason {
                Some(reason) => format!("{}: {}", err.error, reason),
                None => err.error,
            },
            Err(_) if body.is_empty() => status
                .canonical_reason()
                .unwrap_or("no response body")
                .to_string(),
            Err(_) => String::from_utf8_lossy(body).into_owned(),
        };

        match status {
            StatusCode::NOT_FOUND => ClientError::NotFound { reason: message },
            StatusCode::PRECONDITION_FAILED | StatusCode::CONFLICT => {
                ClientError::RevisionConflict { reason: message }
            }
            _ => ClientError::Server {
                status: status.as_u16(),
                message,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ClientError::RevisionConflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
