use std::sync::Arc;

use geovc_config::{ConfigStore, InMemoryConfig, Platform, SystemPlatform, USER_EMAIL, USER_NAME};
use geovc_dag::{log, LogOptions};
use geovc_index::{InMemoryWorkingState, WorkingState};
use geovc_refs::{
    branch_ref_name, validate_branch_name, InMemoryRefStore, Ref, Reference, HEAD, HEADS_PREFIX,
};
use geovc_rewrite::{
    commit_on_head, reset_to_commit, squash, ResetMode, RewriteContext, SquashOutcome,
    SquashRequest,
};
use geovc_store::{Commit, Feature, ObjectDatabase, Tree, TreeEntry};
use geovc_types::ObjectId;
use tracing::info;

use crate::error::{SdkError, SdkResult};

/// Branch HEAD is attached to in a new repository.
pub const DEFAULT_BRANCH: &str = "main";

/// High-level geovc repository API.
#[derive(Clone, Debug)]
pub struct Repository {
    ctx: RewriteContext,
}

impl Repository {
    /// Open a repository over existing backends. HEAD is attached to
    /// [`DEFAULT_BRANCH`] if it is not set yet.
    pub fn open(ctx: RewriteContext) -> SdkResult<Self> {
        if ctx.refs.head()?.is_none() {
            ctx.refs
                .update_symref(HEAD, &branch_ref_name(DEFAULT_BRANCH))?;
        }
        Ok(Self { ctx })
    }

    /// Initialize an in-memory repository using `config` for identity and
    /// the host clock.
    pub fn init(config: Arc<dyn ConfigStore>) -> SdkResult<Self> {
        Self::init_with_platform(config, Arc::new(SystemPlatform))
    }

    /// In-memory repository using `platform` for time.
    pub fn init_with_platform(
        config: Arc<dyn ConfigStore>,
        platform: Arc<dyn Platform>,
    ) -> SdkResult<Self> {
        let ctx = RewriteContext::new(
            ObjectDatabase::in_memory(),
            Arc::new(InMemoryRefStore::new()),
            Arc::new(InMemoryWorkingState::new()),
            config,
            platform,
        );
        Self::open(ctx)
    }

    /// In-memory repository committing as `name <email>`.
    pub fn in_memory(name: &str, email: &str) -> SdkResult<Self> {
        let config = InMemoryConfig::with_values([(USER_NAME, name), (USER_EMAIL, email)])?;
        Self::init(Arc::new(config))
    }

    /// The rewrite context, for calling the engine directly.
    pub fn context(&self) -> &RewriteContext {
        &self.ctx
    }

    // ---- Content operations ----

    /// Store a feature and return its id.
    pub fn write_feature(&self, feature: &Feature) -> SdkResult<ObjectId> {
        Ok(self.ctx.db.put_feature(feature)?)
    }

    pub fn read_feature(&self, id: &ObjectId) -> SdkResult<Feature> {
        Ok(self.ctx.db.get_feature(id)?)
    }

    /// Store a tree built from `entries`.
    pub fn write_tree(&self, entries: Vec<TreeEntry>) -> SdkResult<ObjectId> {
        Ok(self.ctx.db.put_tree(&Tree::new(entries))?)
    }

    pub fn read_tree(&self, id: &ObjectId) -> SdkResult<Tree> {
        Ok(self.ctx.db.get_tree(id)?)
    }

    /// Read a commit, failing if it is missing.
    pub fn read_commit(&self, id: &ObjectId) -> SdkResult<Commit> {
        Ok(self.ctx.db.get_commit(id)?)
    }

    // ---- Commit operations ----

    /// Commit `tree` on the current branch.
    pub fn commit(&self, tree: ObjectId, message: &str) -> SdkResult<Commit> {
        Ok(commit_on_head(&self.ctx, tree, &[], message)?)
    }

    /// Commit `tree` on the current branch with `others` as additional
    /// parents after the branch tip.
    pub fn merge_commit(
        &self,
        tree: ObjectId,
        others: &[ObjectId],
        message: &str,
    ) -> SdkResult<Commit> {
        if others.is_empty() {
            return Err(SdkError::InvalidOperation(
                "a merge needs at least one other parent".into(),
            ));
        }
        Ok(commit_on_head(&self.ctx, tree, others, message)?)
    }

    /// The commit HEAD resolves to; `None` on an unborn branch.
    pub fn head_commit(&self) -> SdkResult<Option<Commit>> {
        let id = match self.ctx.refs.head()? {
            Some(Reference::Direct(r)) => Some(r.target),
            Some(Reference::Symbolic(sym)) => self
                .ctx
                .refs
                .read(&sym.target)?
                .and_then(|r| r.direct_target()),
            None => None,
        };
        match id {
            Some(id) => Ok(Some(self.ctx.db.get_commit(&id)?)),
            None => Ok(None),
        }
    }

    // ---- Branch operations ----

    /// Short name of the checked-out branch; `None` when HEAD is detached.
    pub fn current_branch(&self) -> SdkResult<Option<String>> {
        match self.ctx.refs.head()? {
            Some(Reference::Symbolic(sym)) => Ok(Some(
                sym.target
                    .strip_prefix(HEADS_PREFIX)
                    .unwrap_or(&sym.target)
                    .to_string(),
            )),
            _ => Ok(None),
        }
    }

    /// Every branch, in name order.
    pub fn branches(&self) -> SdkResult<Vec<Ref>> {
        Ok(self.ctx.refs.branches()?)
    }

    /// Create branch `name` at `at`, or at HEAD's commit.
    pub fn create_branch(&self, name: &str, at: Option<ObjectId>) -> SdkResult<Ref> {
        validate_branch_name(name)?;
        let target = match at {
            Some(id) => self.ctx.db.get_commit(&id)?.id(),
            None => self
                .head_commit()?
                .map(|c| c.id())
                .ok_or_else(|| SdkError::InvalidOperation("HEAD has no commits yet".into()))?,
        };
        let full = branch_ref_name(name);
        if self.ctx.refs.read(&full)?.is_some() {
            return Err(SdkError::BranchExists(name.to_string()));
        }
        self.ctx.refs.compare_and_swap(&full, None, target)?;
        info!(branch = name, at = %target.short_hex(), "created branch");
        Ok(Ref::new(full, target))
    }

    /// Attach HEAD to branch `name` and move the working state to its tip.
    pub fn checkout(&self, name: &str) -> SdkResult<()> {
        let full = branch_ref_name(name);
        let Some(tip) = self.ctx.refs.read(&full)?.and_then(|r| r.direct_target()) else {
            return Err(SdkError::BranchNotFound(name.to_string()));
        };
        self.ensure_clean("checkout")?;
        let tree = self.ctx.db.get_commit(&tip)?.tree_id();
        self.ctx.refs.update_symref(HEAD, &full)?;
        self.ctx.work.update_stage_head(tree)?;
        self.ctx.work.update_work_head(tree)?;
        info!(branch = name, "checked out");
        Ok(())
    }

    /// Point HEAD directly at commit `id`.
    pub fn detach(&self, id: &ObjectId) -> SdkResult<()> {
        self.ensure_clean("detach")?;
        let tree = self.ctx.db.get_commit(id)?.tree_id();
        self.ctx
            .refs
            .replace(Reference::Direct(Ref::new(HEAD, *id)))?;
        self.ctx.work.update_stage_head(tree)?;
        self.ctx.work.update_work_head(tree)?;
        Ok(())
    }

    fn ensure_clean(&self, op: &str) -> SdkResult<()> {
        let status = self.ctx.work.status()?;
        if !status.is_clean() {
            return Err(SdkError::InvalidOperation(format!(
                "cannot {op} with pending changes ({status})"
            )));
        }
        Ok(())
    }

    // ---- History ----

    /// Commits selected by `opts`, newest first.
    pub fn log(&self, opts: &LogOptions) -> SdkResult<Vec<Commit>> {
        Ok(log(&self.ctx.db, opts)?.collect::<Result<Vec<_>, _>>()?)
    }

    /// Full history of HEAD, newest first. Empty on an unborn branch.
    pub fn history(&self) -> SdkResult<Vec<Commit>> {
        match self.head_commit()? {
            Some(head) => self.log(&LogOptions::new(head.id())),
            None => Ok(Vec::new()),
        }
    }

    // ---- Rewrites ----

    /// Squash a range of history. See [`geovc_rewrite::squash`].
    pub fn squash(&self, request: &SquashRequest) -> SdkResult<SquashOutcome> {
        Ok(squash(&self.ctx, request)?)
    }

    /// Move the branch HEAD points at (or a detached HEAD) to `id`.
    pub fn reset(&self, id: &ObjectId, mode: ResetMode) -> SdkResult<()> {
        Ok(reset_to_commit(&self.ctx, id, mode, None)?)
    }
}
