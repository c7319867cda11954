//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite table:
//! - fortune(fortune_id, text, date_added, fortune_hash)
//!
//! `fortune_hash` only exists when the table was created in content-hash mode.

pub mod schema;
pub mod sqlite;

pub use sqlite::{FortuneStore, InitOutcome, StoreStats};
