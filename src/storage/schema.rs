//! Database schema definitions

use crate::fortune::UniquenessMode;

/// Name of the single table holding fortunes
pub const FORTUNE_TABLE: &str = "fortune";

/// SQL to create the fortune table with a unique content fingerprint
pub const CREATE_FORTUNE_TABLE_HASHED: &str = r#"
CREATE TABLE fortune (
    fortune_id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL,
    date_added TEXT NOT NULL,
    fortune_hash CHAR(64) NOT NULL UNIQUE
)
"#;

/// SQL to create the fortune table with unique raw text
pub const CREATE_FORTUNE_TABLE_RAW: &str = r#"
CREATE TABLE fortune (
    fortune_id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL UNIQUE,
    date_added TEXT NOT NULL
)
"#;

pub const DROP_FORTUNE_TABLE: &str = "DROP TABLE IF EXISTS fortune";

pub const TABLE_EXISTS: &str =
    "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)";

pub fn create_table_sql(mode: UniquenessMode) -> &'static str {
    match mode {
        UniquenessMode::ContentHash => CREATE_FORTUNE_TABLE_HASHED,
        UniquenessMode::RawText => CREATE_FORTUNE_TABLE_RAW,
    }
}

/// Column list for reading a full row; raw-text tables have no hash column.
pub fn select_columns(mode: UniquenessMode) -> &'static str {
    match mode {
        UniquenessMode::ContentHash => "fortune_id, text, date_added, fortune_hash",
        UniquenessMode::RawText => "fortune_id, text, date_added, NULL",
    }
}
