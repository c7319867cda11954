use crate::importer::percent_complete;
use crate::ui::progress_message::ProgressMessage;
use indicatif::{ProgressBar, ProgressStyle};
use std::thread;

/// Renders importer progress on a background thread.
///
/// The importer sends [`ProgressMessage`]s over the returned channel. Only
/// meant for a terminal; elsewhere the importer logs progress lines instead.
pub struct ImportProgress {
    bar: ProgressBar,
    handle: Option<thread::JoinHandle<()>>,
}

impl ImportProgress {
    pub fn new() -> (Self, crossbeam::channel::Sender<ProgressMessage>) {
        let (tx, rx) = crossbeam::channel::unbounded::<ProgressMessage>();

        let bar = ProgressBar::new(0);
        if let Ok(style) =
            ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("=> "));
        }

        let bar_clone = bar.clone();
        let handle = thread::spawn(move || {
            let mut duplicates = 0usize;
            for msg in rx {
                match msg {
                    ProgressMessage::Started { total } => {
                        bar_clone.set_length(total as u64);
                        bar_clone.set_position(0);
                    }
                    ProgressMessage::Progress { current, total } => {
                        bar_clone.set_position(current as u64);
                        bar_clone.set_message(format!(
                            "({:.2}%) {} duplicates",
                            percent_complete(current, total),
                            duplicates
                        ));
                    }
                    ProgressMessage::Duplicate { .. } => {
                        duplicates += 1;
                    }
                    ProgressMessage::Failed(reason) => {
                        bar_clone.abandon_with_message(format!("Failed: {}", reason));
                        break;
                    }
                    ProgressMessage::Finished => {
                        bar_clone.finish_and_clear();
                        break;
                    }
                }
            }
        });

        (
            Self {
                bar,
                handle: Some(handle),
            },
            tx,
        )
    }

    /// Wait for the renderer to drain; call after the importer is done.
    pub fn finish(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
