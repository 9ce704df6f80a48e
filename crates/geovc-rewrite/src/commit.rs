//! Commit construction on the checked-out branch.

use geovc_config::{resolve_identity, Identity};
use geovc_store::{Commit, CommitBuilder};
use geovc_types::{ObjectId, Person};
use tracing::info;

use crate::context::RewriteContext;
use crate::error::RewriteResult;

/// `identity` stamped with the platform's current time and local offset.
pub(crate) fn stamp(ctx: &RewriteContext, identity: &Identity) -> Person {
    let now = ctx.platform.now_ms();
    identity.at(now, ctx.platform.tz_offset_ms(now))
}

/// Build (but do not store) a commit authored and committed by the
/// configured identity, now.
pub fn create_commit(
    ctx: &RewriteContext,
    tree: ObjectId,
    parents: impl IntoIterator<Item = ObjectId>,
    message: &str,
) -> RewriteResult<Commit> {
    let identity = resolve_identity(ctx.config.as_ref())?;
    let person = stamp(ctx, &identity);
    Ok(CommitBuilder::new(tree, person.clone(), person)
        .with_parents(parents)
        .with_message(message)
        .build()?)
}

/// Commit `tree` on the branch HEAD is attached to.
///
/// The branch tip, if the branch has one, becomes the mainline parent and
/// `extra_parents` follow it. The branch moves by compare-and-swap against
/// the tip read here; the staging index and working tree follow it.
pub fn commit_on_head(
    ctx: &RewriteContext,
    tree: ObjectId,
    extra_parents: &[ObjectId],
    message: &str,
) -> RewriteResult<Commit> {
    let branch = ctx.current_branch()?;
    ctx.db.get_tree(&tree)?;
    for parent in extra_parents {
        ctx.db.get_commit(parent)?;
    }
    let tip = ctx.refs.read(&branch)?.and_then(|r| r.direct_target());

    let parents = tip.into_iter().chain(extra_parents.iter().copied());
    let commit = create_commit(ctx, tree, parents, message)?;
    ctx.db.put_commit(&commit)?;
    ctx.refs.compare_and_swap(&branch, tip, commit.id())?;
    ctx.work.update_stage_head(tree)?;
    ctx.work.update_work_head(tree)?;

    info!(
        branch = %branch,
        commit = %commit.id().short_hex(),
        parents = commit.parent_ids().len(),
        "committed"
    );
    Ok(commit)
}
