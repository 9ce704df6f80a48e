use std::collections::BTreeSet;

use geovc_types::ObjectId;

use crate::error::GraphResult;

/// Reverse-adjacency index over the commit DAG.
///
/// Implementations must satisfy these invariants:
/// - After `register(c, parents)` returns `Ok`, `children(p)` contains `c`
///   for every `p` in `parents`.
/// - `register` is idempotent.
/// - An unreachable backend returns `GraphError::Unavailable`, never an
///   empty answer.
pub trait GraphIndex: Send + Sync {
    /// Record `commit` as a child of each of `parents`.
    fn register(&self, commit: &ObjectId, parents: &[ObjectId]) -> GraphResult<()>;

    /// Commits that list `id` as a parent. Empty for leaves and unknown ids.
    fn children(&self, id: &ObjectId) -> GraphResult<BTreeSet<ObjectId>>;

    fn child_count(&self, id: &ObjectId) -> GraphResult<usize> {
        Ok(self.children(id)?.len())
    }

    /// `true` if two or more commits descend directly from `id`.
    fn is_branch_point(&self, id: &ObjectId) -> GraphResult<bool> {
        Ok(self.child_count(id)? >= 2)
    }
}
