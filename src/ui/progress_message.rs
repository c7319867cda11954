#[derive(Clone, Debug, PartialEq)]
pub enum ProgressMessage {
    Started {
        total: usize,
    },
    Progress {
        current: usize,
        total: usize,
    },
    /// Entry at this 0-based index was already stored
    Duplicate {
        index: usize,
    },
    Failed(String),
    Finished,
}
