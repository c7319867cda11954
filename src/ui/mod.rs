pub mod icons;
pub mod output;
pub mod progress;
pub mod progress_message;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{header, info, section, status, success, summary_row, timing};
pub use progress::ImportProgress;
pub use progress_message::ProgressMessage;
pub use table::{stats_table, TableBuilder};
pub use theme::{theme, Theme};
