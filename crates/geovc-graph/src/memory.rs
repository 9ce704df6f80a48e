//! In-memory graph index.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use geovc_types::ObjectId;
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::traits::GraphIndex;

/// `HashMap`-backed [`GraphIndex`].
///
/// Edges live behind a single `RwLock`, so a registration is observed
/// either entirely or not at all. A poisoned lock is reported as
/// [`GraphError::Unavailable`].
#[derive(Debug, Default)]
pub struct InMemoryGraphIndex {
    children: RwLock<HashMap<ObjectId, BTreeSet<ObjectId>>>,
}

impl InMemoryGraphIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commits that have at least one child.
    pub fn len(&self) -> GraphResult<usize> {
        Ok(self.read()?.len())
    }

    /// True when no edges are registered.
    pub fn is_empty(&self) -> GraphResult<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Total number of parent -> child edges.
    pub fn edge_count(&self) -> GraphResult<usize> {
        Ok(self.read()?.values().map(BTreeSet::len).sum())
    }

    fn read(
        &self,
    ) -> GraphResult<std::sync::RwLockReadGuard<'_, HashMap<ObjectId, BTreeSet<ObjectId>>>> {
        self.children
            .read()
            .map_err(|e| GraphError::Unavailable(format!("lock poisoned: {e}")))
    }
}

impl GraphIndex for InMemoryGraphIndex {
    fn register(&self, commit: &ObjectId, parents: &[ObjectId]) -> GraphResult<()> {
        if parents.contains(commit) {
            return Err(GraphError::SelfEdge(*commit));
        }
        let mut map = self
            .children
            .write()
            .map_err(|e| GraphError::Unavailable(format!("lock poisoned: {e}")))?;
        for parent in parents {
            map.entry(*parent).or_default().insert(*commit);
        }
        debug!(commit = %commit.short_hex(), parents = parents.len(), "registered graph edges");
        Ok(())
    }

    fn children(&self, id: &ObjectId) -> GraphResult<BTreeSet<ObjectId>> {
        Ok(self.read()?.get(id).cloned().unwrap_or_default())
    }
}
