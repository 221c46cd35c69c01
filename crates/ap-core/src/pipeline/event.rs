use serde::Serialize;

pub const COMPLETE_LABEL: &str = "complete";

/// `(index, total, label)` emitted before each keyword and once after the loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub index: usize,
    pub total: usize,
    pub label: String,
}

impl ProgressEvent {
    pub fn keyword(index: usize, total: usize, keyword: &str) -> Self {
        Self {
            index,
            total,
            label: keyword.to_string(),
        }
    }

    pub fn complete(total: usize) -> Self {
        Self {
            index: total,
            total,
            label: COMPLETE_LABEL.to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.index == self.total && self.label == COMPLETE_LABEL
    }
}
