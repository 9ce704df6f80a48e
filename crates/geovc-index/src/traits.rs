//! The [`WorkingState`] contract.

use geovc_types::ObjectId;

use crate::error::IndexResult;
use crate::status::WorkingStatus;

/// Checked-out state as seen by history-rewriting operations.
///
/// The heads are tree ids: `work_head` is the tree the working tree was
/// last synchronized with, `stage_head` the tree the staging index is
/// based on.
pub trait WorkingState: Send + Sync {
    /// Number of staged, uncommitted changes.
    fn count_staged(&self) -> IndexResult<usize>;

    /// Number of working-tree changes not yet staged.
    fn count_unstaged(&self) -> IndexResult<usize>;

    fn work_head(&self) -> IndexResult<Option<ObjectId>>;

    fn stage_head(&self) -> IndexResult<Option<ObjectId>>;

    fn update_work_head(&self, tree: ObjectId) -> IndexResult<()>;

    fn update_stage_head(&self, tree: ObjectId) -> IndexResult<()>;

    /// Which paths are staged and which are modified but unstaged.
    fn status(&self) -> IndexResult<WorkingStatus>;

    /// Drop every staged and unstaged change.
    fn discard_changes(&self) -> IndexResult<()>;

    /// `true` if nothing is staged or modified.
    fn is_clean(&self) -> IndexResult<bool> {
        Ok(self.count_staged()? == 0 && self.count_unstaged()? == 0)
    }
}
