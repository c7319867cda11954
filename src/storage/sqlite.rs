//! SQLite storage implementation

use std::path::Path;
use std::time::Duration;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, params};
use serde::Serialize;
use crate::{Result, Error};
use crate::fortune::{Fortune, NewFortune, UniquenessMode};
use super::schema;

/// What `initialize` did to the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    Recreated,
    AlreadyExisted,
}

impl InitOutcome {
    /// True only when the table was left untouched.
    pub fn already_existed(&self) -> bool {
        matches!(self, InitOutcome::AlreadyExisted)
    }
}

/// SQLite-backed storage for fortunes.
///
/// One store is one open connection; dropping it closes the connection.
pub struct FortuneStore {
    conn: Connection,
    /// Mode new tables are created with
    configured: UniquenessMode,
    /// Mode of the table as it exists right now
    mode: UniquenessMode,
}

impl FortuneStore {
    /// Open a database file and check that it answers queries.
    ///
    /// Any failure here is reported as [`Error::Connection`].
    pub fn open(path: &Path, mode: UniquenessMode) -> Result<Self> {
        let conn = Connection::open(path).map_err(connection_error)?;
        conn.busy_timeout(Duration::from_secs(5)).map_err(connection_error)?;
        Self::from_connection(conn, mode)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory(mode: UniquenessMode) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(connection_error)?;
        Self::from_connection(conn, mode)
    }

    fn from_connection(conn: Connection, mode: UniquenessMode) -> Result<Self> {
        // A file that is not a database only fails on first read.
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))
            .map_err(connection_error)?;

        let mut store = Self { conn, configured: mode, mode };
        if let Some(actual) = store.detect_table_mode()? {
            if actual != mode {
                tracing::warn!(
                    "Existing fortune table uses {} uniqueness, configured {}; following the table",
                    actual,
                    mode
                );
            }
            store.mode = actual;
        }
        Ok(store)
    }

    /// Uniqueness mode of the current table
    pub fn mode(&self) -> UniquenessMode {
        self.mode
    }

    // ========== Table Operations ==========

    pub fn table_exists(&self) -> Result<bool> {
        table_exists(&self.conn)
    }

    /// Create the table if absent, or drop and recreate it when `recreate` is set.
    pub fn initialize(&mut self, recreate: bool) -> Result<InitOutcome> {
        if !self.table_exists()? {
            tracing::info!("Creating fortune table...");
            self.conn.execute(schema::create_table_sql(self.configured), [])?;
            self.mode = self.configured;
            tracing::info!("Fortune table created.");
            return Ok(InitOutcome::Created);
        }

        if recreate {
            tracing::info!("Dropping fortune table...");
            let tx = self.conn.transaction()?;
            tx.execute(schema::DROP_FORTUNE_TABLE, [])?;
            tx.execute(schema::create_table_sql(self.configured), [])?;
            tx.commit()?;
            self.mode = self.configured;
            tracing::info!("Empty fortune table recreated.");
            return Ok(InitOutcome::Recreated);
        }

        tracing::info!("Fortune table already exists.");
        Ok(InitOutcome::AlreadyExisted)
    }

    /// Drop the table and every record in it. Missing table is not an error.
    pub fn drop_table(&self) -> Result<()> {
        self.conn.execute(schema::DROP_FORTUNE_TABLE, [])?;
        Ok(())
    }

    fn detect_table_mode(&self) -> Result<Option<UniquenessMode>> {
        if !self.table_exists()? {
            return Ok(None);
        }
        let has_hash: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM pragma_table_info(?1) WHERE name = 'fortune_hash')",
            [schema::FORTUNE_TABLE],
            |row| row.get(0),
        )?;
        Ok(Some(if has_hash {
            UniquenessMode::ContentHash
        } else {
            UniquenessMode::RawText
        }))
    }

    // ========== Fortune Operations ==========

    /// Insert one fortune and return its id.
    ///
    /// A uniqueness violation comes back as [`Error::DuplicateEntry`].
    pub fn insert(&self, fortune: &NewFortune) -> Result<i64> {
        let result = match self.mode {
            UniquenessMode::ContentHash => {
                // Fingerprint on demand if the caller built the record for raw-text mode
                let hash = fortune
                    .content_hash
                    .clone()
                    .unwrap_or_else(|| crate::fortune::fingerprint(&fortune.text));
                self.conn.execute(
                    "INSERT INTO fortune (text, date_added, fortune_hash) VALUES (?1, ?2, ?3)",
                    params![fortune.text, fortune.date_added, hash],
                )
            }
            UniquenessMode::RawText => self.conn.execute(
                "INSERT INTO fortune (text, date_added) VALUES (?1, ?2)",
                params![fortune.text, fortune.date_added],
            ),
        };

        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => Err(Error::DuplicateEntry(fortune.key().to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Pick one fortune uniformly among the rows that exist.
    ///
    /// Count and fetch share one transaction. Ids are never assumed to be
    /// contiguous, so gaps left by drops or aborted inserts are fine.
    pub fn random_fortune(&self) -> Result<Fortune> {
        let tx = self.conn.unchecked_transaction()?;
        if !table_exists(&tx)? {
            return Err(Error::TableMissing);
        }

        let count: i64 = tx.query_row("SELECT COUNT(*) FROM fortune", [], |row| row.get(0))?;
        if count == 0 {
            return Err(Error::EmptySelection);
        }

        let sql = format!(
            "SELECT {} FROM fortune ORDER BY RANDOM() LIMIT 1",
            schema::select_columns(self.mode)
        );
        let fortune = tx.query_row(&sql, [], row_to_fortune)?;
        tx.commit()?;

        tracing::info!("Read fortune #{} from the database", fortune.id);
        Ok(fortune)
    }

    /// Text of a random fortune
    pub fn read_random_fortune(&self) -> Result<String> {
        Ok(self.random_fortune()?.text)
    }

    /// Count all fortunes
    pub fn count(&self) -> Result<usize> {
        if !self.table_exists()? {
            return Err(Error::TableMissing);
        }
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM fortune", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<StoreStats> {
        if !self.table_exists()? {
            return Err(Error::TableMissing);
        }
        let (count, oldest, newest) = self.conn.query_row(
            "SELECT COUNT(*), MIN(date_added), MAX(date_added) FROM fortune",
            [],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<DateTime<Utc>>>(1)?,
                    row.get::<_, Option<DateTime<Utc>>>(2)?,
                ))
            },
        )?;

        Ok(StoreStats {
            fortunes: count as usize,
            oldest,
            newest,
            mode: self.mode,
        })
    }
}

fn table_exists(conn: &Connection) -> Result<bool> {
    let exists: bool = conn.query_row(schema::TABLE_EXISTS, [schema::FORTUNE_TABLE], |row| row.get(0))?;
    Ok(exists)
}

fn row_to_fortune(row: &rusqlite::Row) -> rusqlite::Result<Fortune> {
    Ok(Fortune {
        id: row.get(0)?,
        text: row.get(1)?,
        date_added: row.get(2)?,
        content_hash: row.get(3)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == ErrorCode::ConstraintViolation
                && (e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        }
        _ => false,
    }
}

fn connection_error(err: rusqlite::Error) -> Error {
    match err {
        rusqlite::Error::SqliteFailure(e, message) => Error::Connection {
            code: e.extended_code,
            message: message.unwrap_or_else(|| e.to_string()),
        },
        other => Error::Connection {
            code: -1,
            message: other.to_string(),
        },
    }
}

/// Database statistics
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub fortunes: usize,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
    pub mode: UniquenessMode,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fmt_date = |d: &Option<DateTime<Utc>>| {
            d.map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string())
        };
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Fortunes: {}", self.fortunes)?;
        writeln!(f, "  Oldest: {}", fmt_date(&self.oldest))?;
        writeln!(f, "  Newest: {}", fmt_date(&self.newest))?;
        writeln!(f, "  Uniqueness: {}", self.mode)
    }
}
