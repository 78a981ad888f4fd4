//! ComfyDb Core Library
//!
//! Shared types for the ComfyDb client:
//! - Connection configuration
//! - Document and response models for the CouchDB REST API

pub mod config;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use models::*;
