//! Infrastructure layer for ensemble
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: provider HTTP clients, SQLite persistence
//! and configuration file loading.

pub mod config;
pub mod gateway;
pub mod providers;
pub mod store;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigValidationError, FileConfig, ProvidersConfig};
pub use gateway::HttpCompletionGateway;
pub use store::{SqliteTranscriptStore, SqliteXpStore, init_schema};
