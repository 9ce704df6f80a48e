//! Ref-moving primitives.

use geovc_refs::{validate_ref_name, Reference, HEAD};
use geovc_types::ObjectId;
use tracing::{debug, info};

use crate::context::RewriteContext;
use crate::error::{PreconditionViolation, RewriteResult};

/// How much of the checked-out state follows a reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResetMode {
    /// Move the ref only.
    Soft,
    /// Also move the staging index.
    #[default]
    Mixed,
    /// Also move the working tree and discard every pending change.
    Hard,
}

/// Move whatever HEAD designates (its branch, or HEAD itself when
/// detached) to commit `id`.
///
/// With `expected_tip` the move is a compare-and-swap and fails with
/// `RefError::Conflict` if the ref no longer holds that value; the staging
/// index and working tree are only touched after the ref moved.
pub fn reset_to_commit(
    ctx: &RewriteContext,
    id: &ObjectId,
    mode: ResetMode,
    expected_tip: Option<ObjectId>,
) -> RewriteResult<()> {
    let commit = ctx.db.get_commit(id)?;
    let target = match ctx.refs.head()? {
        Some(Reference::Symbolic(sym)) => sym.target,
        Some(Reference::Direct(_)) => HEAD.to_string(),
        None => return Err(PreconditionViolation::NoHead.into()),
    };

    match expected_tip {
        Some(expected) => ctx.refs.compare_and_swap(&target, Some(expected), *id)?,
        None => ctx.refs.update_ref(&target, *id)?,
    }

    let tree = commit.tree_id();
    if matches!(mode, ResetMode::Mixed | ResetMode::Hard) {
        ctx.work.update_stage_head(tree)?;
    }
    if mode == ResetMode::Hard {
        ctx.work.discard_changes()?;
        ctx.work.update_work_head(tree)?;
    }
    info!(ref_name = %target, commit = %id.short_hex(), ?mode, "reset");
    Ok(())
}

/// Point direct ref `name` at stored commit `id`.
pub fn update_ref(ctx: &RewriteContext, name: &str, id: &ObjectId) -> RewriteResult<()> {
    ctx.db.get_commit(id)?;
    ctx.refs.update_ref(name, *id)?;
    Ok(())
}

/// Point symref `name` at ref `target`.
pub fn update_symref(ctx: &RewriteContext, name: &str, target: &str) -> RewriteResult<()> {
    validate_ref_name(target)?;
    ctx.refs.update_symref(name, target)?;
    debug!(ref_name = name, to = target, "symref updated");
    Ok(())
}
