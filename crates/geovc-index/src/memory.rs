//! In-memory working state.
//!
//! [`InMemoryWorkingState`] keeps the staging area as a `BTreeMap` of path
//! to feature id and the set of modified-but-unstaged paths. Filesystem or
//! database I/O belongs to whatever embeds it.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use geovc_types::ObjectId;
use tracing::debug;

use crate::error::{IndexError, IndexResult};
use crate::status::WorkingStatus;
use crate::traits::WorkingState;

#[derive(Debug, Default)]
struct State {
    work_head: Option<ObjectId>,
    stage_head: Option<ObjectId>,
    staged: BTreeMap<String, ObjectId>,
    modified: BTreeSet<String>,
}

#[derive(Debug, Default)]
pub struct InMemoryWorkingState {
    state: RwLock<State>,
}

fn check_path(path: &str) -> IndexResult<()> {
    if path.is_empty() {
        return Err(IndexError::InvalidPath("empty path".to_string()));
    }
    Ok(())
}

impl InMemoryWorkingState {
    /// Clean working state: nothing staged or modified.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a working-tree change at `path` that is not yet staged.
    pub fn mark_modified(&self, path: &str) -> IndexResult<()> {
        check_path(path)?;
        self.write()?.modified.insert(path.to_string());
        Ok(())
    }

    /// Stage `feature` at `path`, clearing any unstaged change there.
    pub fn stage(&self, path: &str, feature: ObjectId) -> IndexResult<()> {
        check_path(path)?;
        let mut state = self.write()?;
        state.modified.remove(path);
        state.staged.insert(path.to_string(), feature);
        debug!(path, feature = %feature.short_hex(), "staged feature");
        Ok(())
    }

    /// Remove `path` from the staging area.
    pub fn unstage(&self, path: &str) -> IndexResult<ObjectId> {
        self.write()?
            .staged
            .remove(path)
            .ok_or_else(|| IndexError::PathNotFound(path.to_string()))
    }

    /// Staged feature id at `path`.
    pub fn staged(&self, path: &str) -> IndexResult<Option<ObjectId>> {
        Ok(self.read()?.staged.get(path).copied())
    }

    fn read(&self) -> IndexResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|e| IndexError::Unavailable(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> IndexResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|e| IndexError::Unavailable(format!("lock poisoned: {e}")))
    }
}

impl WorkingState for InMemoryWorkingState {
    fn count_staged(&self) -> IndexResult<usize> {
        Ok(self.read()?.staged.len())
    }

    fn count_unstaged(&self) -> IndexResult<usize> {
        Ok(self.read()?.modified.len())
    }

    fn work_head(&self) -> IndexResult<Option<ObjectId>> {
        Ok(self.read()?.work_head)
    }

    fn stage_head(&self) -> IndexResult<Option<ObjectId>> {
        Ok(self.read()?.stage_head)
    }

    fn update_work_head(&self, tree: ObjectId) -> IndexResult<()> {
        self.write()?.work_head = Some(tree);
        Ok(())
    }

    fn update_stage_head(&self, tree: ObjectId) -> IndexResult<()> {
        self.write()?.stage_head = Some(tree);
        Ok(())
    }

    fn status(&self) -> IndexResult<WorkingStatus> {
        let state = self.read()?;
        Ok(WorkingStatus {
            staged: state.staged.keys().cloned().collect(),
            unstaged: state.modified.iter().cloned().collect(),
        })
    }

    fn discard_changes(&self) -> IndexResult<()> {
        let mut state = self.write()?;
        let dropped = state.staged.len() + state.modified.len();
        state.staged.clear();
        state.modified.clear();
        debug!(dropped, "discarded working changes");
        Ok(())
    }
}
