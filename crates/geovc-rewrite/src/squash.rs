//! Squashing a run of mainline commits into one.
//!
//! Given `since` (oldest) and `until` (newest) on the checked-out branch,
//! [`squash`] replaces that range with a single commit holding `until`'s
//! tree, then replays every later mainline commit on top of it:
//!
//! ```text
//! before:  R <- A <- B <- C <- D      (main = D)
//! squash A..=C
//! after:   R <- E <- D'               (main = D', E.tree == C.tree)
//! ```
//!
//! The operation runs in three phases:
//!
//! 1. **plan** -- check every precondition and gather the ranges. Nothing
//!    is written.
//! 2. **stage** -- build the replacement chain in memory and validate it.
//! 3. **apply** -- write the new commits, then move the branch with one
//!    compare-and-swap against the tip seen while planning.
//!
//! Commits that fork another line of history (two or more children, or the
//! target of another branch) cannot be squashed or replayed; their history
//! would silently diverge from the rewritten branch.

use std::collections::{BTreeMap, HashSet};

use geovc_config::{resolve_identity, Identity};
use geovc_dag::{find_common_ancestor, is_ancestor, log, LogOptions};
use geovc_refs::HEAD;
use geovc_store::{Commit, CommitBuilder};
use geovc_types::ObjectId;
use tracing::{debug, info, warn};

use crate::commit::stamp;
use crate::context::RewriteContext;
use crate::error::{PreconditionViolation, RewriteError, RewriteResult};
use crate::reset::{reset_to_commit, ResetMode};

/// Which range to squash, and the message of the squashed commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SquashRequest {
    /// Oldest commit of the range. Must have a parent.
    pub since: ObjectId,
    /// Newest commit of the range.
    pub until: ObjectId,
    /// Defaults to `since`'s message.
    pub message: Option<String>,
}

impl SquashRequest {
    /// Squash `since` through `until`, both included.
    pub fn new(since: ObjectId, until: ObjectId) -> Self {
        Self {
            since,
            until,
            message: None,
        }
    }

    /// Use `message` instead of `since`'s message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// What a successful squash did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SquashOutcome {
    /// Branch tip before the squash.
    pub previous_tip: ObjectId,
    /// Branch tip after the squash.
    pub new_tip: ObjectId,
    /// The commit replacing the squashed range.
    pub squashed: Commit,
    /// Replayed commits, oldest first.
    pub replayed: Vec<Commit>,
}

/// Everything gathered while checking preconditions.
struct SquashPlan {
    branch: String,
    tip: ObjectId,
    tip_tree: ObjectId,
    since: Commit,
    until: Commit,
    new_base: ObjectId,
    /// Oldest first, `since` through `until`.
    squashed: Vec<Commit>,
    /// Oldest first, the child of `until` through the tip.
    replayed: Vec<Commit>,
    side_parents: Vec<ObjectId>,
    committer: Identity,
}

/// Squash `request.since..=request.until` on the checked-out branch.
///
/// Fails with [`RewriteError::Precondition`] and changes nothing when:
/// HEAD is missing or detached, the working tree or index has pending
/// changes, the commits are unrelated or given in the wrong order, `since`
/// is a root commit, either boundary is off the branch's first-parent line,
/// or a squashed or replayed commit is a branch point.
///
/// A graph index that cannot be reached fails the squash with
/// [`RewriteError::StorageUnavailable`]. If another writer moves the branch
/// while the squash runs, the final swap fails with a ref conflict and the
/// branch keeps the other writer's value.
pub fn squash(ctx: &RewriteContext, request: &SquashRequest) -> RewriteResult<SquashOutcome> {
    let plan = match plan(ctx, request) {
        Ok(plan) => plan,
        Err(err) => {
            warn!(
                since = %request.since.short_hex(),
                until = %request.until.short_hex(),
                error = %err,
                "squash rejected"
            );
            return Err(err);
        }
    };
    let (squashed, replayed) = stage(ctx, &plan, request)?;
    apply(ctx, &plan, squashed, replayed)
}

fn plan(ctx: &RewriteContext, request: &SquashRequest) -> RewriteResult<SquashPlan> {
    let branch = ctx.current_branch()?;

    // Pending changes are checked before any history is read.
    let staged = ctx.work.count_staged()?;
    let unstaged = ctx.work.count_unstaged()?;
    if staged > 0 || unstaged > 0 {
        return Err(PreconditionViolation::DirtyWorkingTree { staged, unstaged }.into());
    }

    let tip = ctx.refs.resolve(&branch)?;
    let since = ctx.db.get_commit(&request.since)?;
    let until = ctx.db.get_commit(&request.until)?;

    match find_common_ancestor(&ctx.db, &since.id(), &until.id())? {
        None => {
            return Err(PreconditionViolation::UnrelatedCommits {
                since: since.id(),
                until: until.id(),
            }
            .into())
        }
        // The alternating walk can meet below `since` when `until` also
        // reaches `since`'s parents through a merge.
        Some(ancestor)
            if ancestor.id() != since.id() && !is_ancestor(&ctx.db, &since.id(), &until.id())? =>
        {
            return Err(PreconditionViolation::WrongOrder {
                since: since.id(),
                until: until.id(),
            }
            .into())
        }
        Some(_) => {}
    }

    let Some(new_base) = since.first_parent() else {
        return Err(PreconditionViolation::RootSince.into());
    };

    let squashed = mainline(ctx, new_base, until.id())?;
    if squashed.first().map(Commit::id) != Some(since.id()) {
        return Err(PreconditionViolation::SinceNotOnMainline { since: since.id() }.into());
    }

    let replayed = mainline(ctx, until.id(), tip)?;
    let attached = match replayed.first() {
        Some(oldest) => oldest.first_parent() == Some(until.id()),
        None => tip == until.id(),
    };
    if !attached {
        return Err(PreconditionViolation::UntilNotOnBranch { until: until.id() }.into());
    }

    let tip_tree = match replayed.last() {
        Some(commit) => commit.tree_id(),
        None => until.tree_id(),
    };

    // Branches other than those sitting on the tip, keyed by target.
    let mut branch_targets: BTreeMap<ObjectId, Vec<String>> = BTreeMap::new();
    for r in ctx.refs.branches()? {
        if r.target != tip {
            branch_targets.entry(r.target).or_default().push(r.name);
        }
    }
    for commit in &squashed {
        if let Some(detail) = fork_detail(ctx, commit, &branch_targets)? {
            return Err(PreconditionViolation::BranchPointInRange {
                commit: commit.id(),
                detail,
            }
            .into());
        }
    }
    for commit in &replayed {
        if let Some(detail) = fork_detail(ctx, commit, &branch_targets)? {
            return Err(PreconditionViolation::BranchPointAfterRange {
                commit: commit.id(),
                detail,
            }
            .into());
        }
    }

    let rewritten: HashSet<ObjectId> = squashed.iter().chain(&replayed).map(Commit::id).collect();
    let mut side_parents: Vec<ObjectId> = Vec::new();
    for commit in squashed.iter().chain(&replayed) {
        for parent in commit.secondary_parents() {
            if *parent != new_base && !rewritten.contains(parent) && !side_parents.contains(parent) {
                side_parents.push(*parent);
            }
        }
    }

    let committer = resolve_identity(ctx.config.as_ref())?;

    debug!(
        branch = %branch,
        squashed = squashed.len(),
        replayed = replayed.len(),
        side_parents = side_parents.len(),
        "squash planned"
    );
    Ok(SquashPlan {
        branch,
        tip,
        tip_tree,
        since,
        until,
        new_base,
        squashed,
        replayed,
        side_parents,
        committer,
    })
}

/// First-parent commits reachable from `until` but not from `since`,
/// oldest first.
fn mainline(ctx: &RewriteContext, since: ObjectId, until: ObjectId) -> RewriteResult<Vec<Commit>> {
    let opts = LogOptions::range(since, until).first_parent_only();
    let mut commits = log(&ctx.db, &opts)?.collect::<Result<Vec<_>, _>>()?;
    commits.reverse();
    Ok(commits)
}

/// Why `commit` forks another line of history, if it does.
fn fork_detail(
    ctx: &RewriteContext,
    commit: &Commit,
    branch_targets: &BTreeMap<ObjectId, Vec<String>>,
) -> RewriteResult<Option<String>> {
    let children = ctx.db.children(&commit.id())?.len();
    if children >= 2 {
        return Ok(Some(format!("{children} children")));
    }
    match branch_targets.get(&commit.id()) {
        Some(names) if !commit.is_merge() => Ok(Some(format!("target of {}", names.join(", ")))),
        _ => Ok(None),
    }
}

/// Build the replacement chain in memory: the squashed commit followed by
/// the replayed commits, oldest first.
fn stage(
    ctx: &RewriteContext,
    plan: &SquashPlan,
    request: &SquashRequest,
) -> RewriteResult<(Commit, Vec<Commit>)> {
    let message = request
        .message
        .clone()
        .unwrap_or_else(|| plan.since.message().to_string());
    let parents = std::iter::once(plan.new_base).chain(plan.side_parents.iter().copied());
    let squashed = CommitBuilder::from_commit(&plan.until)
        .with_parents(parents)
        .with_message(message)
        .with_committer(stamp(ctx, &plan.committer))
        .build()?;

    let mut replayed = Vec::with_capacity(plan.replayed.len());
    let mut parent = squashed.id();
    for original in &plan.replayed {
        let now = ctx.platform.now_ms();
        let commit = CommitBuilder::from_commit(original)
            .with_parents([parent])
            .with_committer_time(now, ctx.platform.tz_offset_ms(now))
            .build()?;
        parent = commit.id();
        replayed.push(commit);
    }

    validate_chain(plan, &squashed, &replayed)?;
    Ok((squashed, replayed))
}

fn validate_chain(plan: &SquashPlan, squashed: &Commit, replayed: &[Commit]) -> RewriteResult<()> {
    if squashed.first_parent() != Some(plan.new_base) {
        return Err(RewriteError::InvalidChain(format!(
            "squashed commit {} does not descend from {}",
            squashed.id().short_hex(),
            plan.new_base.short_hex()
        )));
    }
    let mut previous = squashed;
    for commit in replayed {
        if commit.parent_ids() != [previous.id()] {
            return Err(RewriteError::InvalidChain(format!(
                "replayed commit {} does not follow {}",
                commit.id().short_hex(),
                previous.id().short_hex()
            )));
        }
        previous = commit;
    }
    if previous.tree_id() != plan.tip_tree {
        return Err(RewriteError::InvalidChain(format!(
            "new tip tree {} differs from old tip tree {}",
            previous.tree_id().short_hex(),
            plan.tip_tree.short_hex()
        )));
    }
    Ok(())
}

/// Write the staged chain and publish it with a single ref swap.
fn apply(
    ctx: &RewriteContext,
    plan: &SquashPlan,
    squashed: Commit,
    replayed: Vec<Commit>,
) -> RewriteResult<SquashOutcome> {
    // Unreachable until the swap below; a failure from here on leaves only
    // unreferenced objects behind.
    ctx.db.put_commit(&squashed)?;
    for commit in &replayed {
        ctx.db.put_commit(commit)?;
    }
    let new_tip = replayed.last().map_or(squashed.id(), Commit::id);

    reset_to_commit(ctx, &new_tip, ResetMode::Hard, Some(plan.tip))?;
    ctx.refs.update_symref(HEAD, &plan.branch)?;

    info!(
        branch = %plan.branch,
        since = %plan.since.id().short_hex(),
        until = %plan.until.id().short_hex(),
        squashed = plan.squashed.len(),
        replayed = replayed.len(),
        previous_tip = %plan.tip.short_hex(),
        new_tip = %new_tip.short_hex(),
        "squash complete"
    );
    Ok(SquashOutcome {
        previous_tip: plan.tip,
        new_tip,
        squashed,
        replayed,
    })
}
