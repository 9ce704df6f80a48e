//! Pending-change summary.

use std::fmt;

/// Paths with pending changes, each list sorted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkingStatus {
    /// Changes recorded in the staging index but not yet committed.
    pub staged: Vec<String>,
    /// Working-tree changes not yet staged.
    pub unstaged: Vec<String>,
}

impl WorkingStatus {
    /// `true` if there is nothing staged and nothing modified.
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.unstaged.is_empty()
    }
}

impl fmt::Display for WorkingStatus {
    /// `staged: a, b; unstaged: c`, omitting empty lists.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.staged.is_empty() {
            parts.push(format!("staged: {}", self.staged.join(", ")));
        }
        if !self.unstaged.is_empty() {
            parts.push(format!("unstaged: {}", self.unstaged.join(", ")));
        }
        if parts.is_empty() {
            return f.write_str("clean");
        }
        f.write_str(&parts.join("; "))
    }
}
