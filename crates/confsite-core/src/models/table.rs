use serde::{Deserialize, Serialize};

use super::Record;

/// Options for a paginated select against a spreadsheet table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectQuery {
    /// Upper bound on rows returned across all pages
    pub max_records: u32,
    /// Named view of the table to read from
    pub view: String,
}

impl SelectQuery {
    pub fn new(max_records: u32, view: impl Into<String>) -> Self {
        Self {
            max_records,
            view: view.into(),
        }
    }
}

/// One page of a select. `offset` is the continuation token for the next
/// page; `None` means the select is exhausted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPage {
    pub records: Vec<Record>,
    pub offset: Option<String>,
}
