//! Bulk import of fortune files
//!
//! Every entry is inserted on its own. A uniqueness violation only skips that
//! entry; any other storage failure aborts the whole run. Because each insert
//! is checked against the table as it is at that moment, duplicates inside the
//! same file are caught too, and re-importing a file is a no-op.

use std::path::Path;
use std::time::{Duration, Instant};
use crossbeam::channel::Sender;
use serde::Serialize;
use crate::fortune::{split_entries, NewFortune};
use crate::storage::FortuneStore;
use crate::ui::ProgressMessage;
use crate::{Error, Result};

/// Outcome of one import run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportReport {
    /// Entries found in the source, duplicates included
    pub total: usize,
    pub imported: usize,
    pub duplicates: usize,
    pub elapsed: Duration,
}

impl ImportReport {
    /// Wall-clock time as `HH:MM:SS`
    pub fn elapsed_hms(&self) -> String {
        format_hms(self.elapsed)
    }

    /// Entries processed per second; zero when no measurable time passed.
    pub fn entries_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total as f64 / secs
        } else {
            0.0
        }
    }
}

impl std::fmt::Display for ImportReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Imported {} entries in {} ({:.2} eps)",
            self.imported,
            self.elapsed_hms(),
            self.entries_per_second()
        )?;
        write!(f, "Duplicates found: {}", self.duplicates)
    }
}

/// Imports fortune files into an existing table.
pub struct Importer<'a> {
    store: &'a FortuneStore,
    progress: Option<Sender<ProgressMessage>>,
}

impl<'a> Importer<'a> {
    pub fn new(store: &'a FortuneStore) -> Self {
        Self { store, progress: None }
    }

    /// Send progress to a renderer instead of the log.
    pub fn with_progress(mut self, tx: Sender<ProgressMessage>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Import a UTF-8 fortune file.
    pub fn import_file(&self, path: &Path) -> Result<ImportReport> {
        let contents = std::fs::read_to_string(path)?;
        tracing::info!("Importing file '{}'", path.display());
        self.import_str(&contents)
    }

    /// Import already-loaded fortune-file contents.
    pub fn import_str(&self, contents: &str) -> Result<ImportReport> {
        if !self.store.table_exists()? {
            return Err(Error::TableMissing);
        }

        let entries = split_entries(contents);
        let total = entries.len();
        let mode = self.store.mode();
        let mut duplicates = 0;

        self.send(ProgressMessage::Started { total });
        let start = Instant::now();

        for (index, entry) in entries.into_iter().enumerate() {
            match self.store.insert(&NewFortune::new(entry, mode)) {
                Ok(_) => {}
                Err(Error::DuplicateEntry(_)) => {
                    tracing::warn!("Entry {} already exists in the database", index);
                    duplicates += 1;
                    self.send(ProgressMessage::Duplicate { index });
                }
                Err(e) => {
                    self.send(ProgressMessage::Failed(e.to_string()));
                    return Err(e);
                }
            }

            let current = index + 1;
            if self.progress.is_some() {
                self.send(ProgressMessage::Progress { current, total });
            } else {
                tracing::info!(
                    "Processing entry {} of {} ({:.2}%)",
                    current,
                    total,
                    percent_complete(current, total)
                );
            }
        }

        let report = ImportReport {
            total,
            imported: total - duplicates,
            duplicates,
            elapsed: start.elapsed(),
        };
        self.send(ProgressMessage::Finished);

        tracing::info!(
            "Imported {} entries in {} ({:.2} eps)",
            report.imported,
            report.elapsed_hms(),
            report.entries_per_second()
        );
        tracing::info!("Duplicates found: {}", report.duplicates);
        Ok(report)
    }

    fn send(&self, msg: ProgressMessage) {
        if let Some(tx) = &self.progress {
            // Renderer may already be gone; progress is best-effort
            tx.send(msg).ok();
        }
    }
}

/// `processed / total * 100`, zero for an empty total.
pub fn percent_complete(processed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    processed as f64 / total as f64 * 100.0
}

/// Format a duration as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_hms(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
