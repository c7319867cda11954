//! # Fortune Demo
//!
//! Serves a random "fortune" from a SQLite table and imports classic
//! `%`-separated fortune files into it.
//!
//! Fortune Demo provides:
//! - A single-table store with create/drop/recreate and uniform random reads
//! - An idempotent importer that skips duplicates by content fingerprint
//! - A small axum web page that shows one fortune per request

pub mod fortune;
pub mod storage;
pub mod importer;
pub mod config;
pub mod server;
pub mod ui;

// Re-exports for convenient access
pub use fortune::{Fortune, NewFortune, UniquenessMode};
pub use storage::FortuneStore;
pub use importer::{ImportReport, Importer};

/// Result type alias for fortune operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for fortune operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error code {code}: {message}")]
    Connection { code: i32, message: String },

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("No fortunes to choose from")]
    EmptySelection,

    #[error("Fortune table does not exist")]
    TableMissing,

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// True for failures that mean the store itself is unusable.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }
}
