//! Newest-first topological history walks.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use geovc_store::{Commit, ObjectDatabase, StoreResult};
use geovc_types::ObjectId;
use tracing::debug;

/// Range and shape of a [`log`] walk.
///
/// Yields commits reachable from `until` that are not reachable from
/// `since` (`since` itself excluded).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogOptions {
    pub since: Option<ObjectId>,
    pub until: ObjectId,
    /// Follow only `parent_ids[0]` of every commit.
    pub first_parent_only: bool,
    pub limit: Option<usize>,
}

impl LogOptions {
    /// Full history of `until`, down to its root commits.
    pub fn new(until: ObjectId) -> Self {
        Self {
            since: None,
            until,
            first_parent_only: false,
            limit: None,
        }
    }

    /// `since..until`.
    pub fn range(since: ObjectId, until: ObjectId) -> Self {
        Self::new(until).with_since(since)
    }

    /// Hide `since` and everything reachable from it.
    pub fn with_since(mut self, since: ObjectId) -> Self {
        self.since = Some(since);
        self
    }

    /// Follow only the first parent of each commit.
    pub fn first_parent_only(mut self) -> Self {
        self.first_parent_only = true;
        self
    }

    /// Stop after `limit` commits.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Hidden commits popped, all older than every selected commit, before the
/// selection walk gives up on un-hiding anything else.
const SLOP: usize = 5;

/// Parents a walk follows from `commit`.
fn followed(commit: &Commit, first_parent_only: bool) -> &[ObjectId] {
    let parents = commit.parent_ids();
    if first_parent_only {
        &parents[..parents.len().min(1)]
    } else {
        parents
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mark {
    Selected,
    Hidden,
}

/// Selection-walk entry: newest first, hidden before selected on equal
/// timestamps, then insertion order.
struct Painted {
    timestamp_ms: i64,
    hidden: bool,
    seq: u64,
    id: ObjectId,
}

impl PartialEq for Painted {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Painted {}

impl PartialOrd for Painted {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Painted {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp_ms
            .cmp(&other.timestamp_ms)
            .then_with(|| self.hidden.cmp(&other.hidden))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Walks `until` and `since` together, marking everything `since` reaches
/// as hidden, and stops once no selected commit is left to expand and the
/// hidden frontier has fallen behind the oldest selected commit.
struct Selection<'a> {
    db: &'a ObjectDatabase,
    first_parent_only: bool,
    commits: HashMap<ObjectId, Commit>,
    marks: HashMap<ObjectId, Mark>,
    queue: BinaryHeap<Painted>,
    selected_queued: usize,
    next_seq: u64,
}

impl<'a> Selection<'a> {
    fn new(db: &'a ObjectDatabase, first_parent_only: bool) -> Self {
        Self {
            db,
            first_parent_only,
            commits: HashMap::new(),
            marks: HashMap::new(),
            queue: BinaryHeap::new(),
            selected_queued: 0,
            next_seq: 0,
        }
    }

    fn load(&mut self, id: &ObjectId) -> StoreResult<&Commit> {
        if !self.commits.contains_key(id) {
            let commit = self.db.get_commit(id)?;
            self.commits.insert(*id, commit);
        }
        Ok(&self.commits[id])
    }

    fn push(&mut self, id: ObjectId, mark: Mark) -> StoreResult<()> {
        match (self.marks.get(&id), mark) {
            (Some(Mark::Hidden), _) | (Some(Mark::Selected), Mark::Selected) => return Ok(()),
            _ => {}
        }
        let timestamp_ms = self.load(&id)?.committer().timestamp_ms;
        self.marks.insert(id, mark);
        if mark == Mark::Selected {
            self.selected_queued += 1;
        }
        self.queue.push(Painted {
            timestamp_ms,
            hidden: mark == Mark::Hidden,
            seq: self.next_seq,
            id,
        });
        self.next_seq += 1;
        Ok(())
    }

    fn run(
        mut self,
        since: Option<ObjectId>,
        until: ObjectId,
    ) -> StoreResult<HashMap<ObjectId, Commit>> {
        if let Some(since) = since {
            self.push(since, Mark::Hidden)?;
        }
        self.load(&until)?;
        self.push(until, Mark::Selected)?;

        let mut selected: HashSet<ObjectId> = HashSet::new();
        let mut oldest = i64::MAX;
        let mut slop = SLOP;
        while let Some(entry) = self.queue.pop() {
            if entry.hidden {
                selected.remove(&entry.id);
                let parents = self.commits[&entry.id].parent_ids().to_vec();
                for parent in parents {
                    self.push(parent, Mark::Hidden)?;
                }
            } else {
                self.selected_queued -= 1;
                // Hidden since it was queued.
                if self.marks.get(&entry.id) == Some(&Mark::Selected) {
                    selected.insert(entry.id);
                    oldest = oldest.min(entry.timestamp_ms);
                    let parents =
                        followed(&self.commits[&entry.id], self.first_parent_only).to_vec();
                    for parent in parents {
                        self.push(parent, Mark::Selected)?;
                    }
                }
            }

            if self.selected_queued == 0 {
                if selected.is_empty() {
                    break;
                }
                if entry.timestamp_ms < oldest {
                    slop -= 1;
                    if slop == 0 {
                        break;
                    }
                } else {
                    slop = SLOP;
                }
            }
        }
        debug!(
            until = %until.short_hex(),
            selected = selected.len(),
            read = self.commits.len(),
            "selected log range"
        );
        Ok(self
            .commits
            .into_iter()
            .filter(|(id, _)| selected.contains(id))
            .collect())
    }
}

/// Ready-heap entry: newest committer timestamp first, then the order in
/// which commits became ready.
struct Queued {
    timestamp_ms: i64,
    seq: u64,
    commit: Commit,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp_ms
            .cmp(&other.timestamp_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Iterator returned by [`log`].
///
/// A commit becomes ready only once every selected commit that lists it as
/// a followed parent has been yielded; among ready commits the newest
/// committer timestamp goes first. Every commit is read by [`log`] itself,
/// so iteration does not touch the store.
pub struct LogIter {
    waiting: HashMap<ObjectId, Commit>,
    /// Selected children not yet yielded, per waiting commit.
    pending: HashMap<ObjectId, usize>,
    ready: BinaryHeap<Queued>,
    first_parent_only: bool,
    remaining: Option<usize>,
    next_seq: u64,
}

impl LogIter {
    fn make_ready(&mut self, commit: Commit) {
        self.ready.push(Queued {
            timestamp_ms: commit.committer().timestamp_ms,
            seq: self.next_seq,
            commit,
        });
        self.next_seq += 1;
    }
}

impl Iterator for LogIter {
    type Item = StoreResult<Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            return None;
        }
        let Queued { commit, .. } = self.ready.pop()?;
        for parent in followed(&commit, self.first_parent_only) {
            let Some(count) = self.pending.get_mut(parent) else {
                continue;
            };
            *count -= 1;
            if *count == 0 {
                self.pending.remove(parent);
                if let Some(next) = self.waiting.remove(parent) {
                    self.make_ready(next);
                }
            }
        }
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        Some(Ok(commit))
    }
}

impl std::fmt::Debug for LogIter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogIter")
            .field("ready", &self.ready.len())
            .field("waiting", &self.waiting.len())
            .field("first_parent_only", &self.first_parent_only)
            .finish_non_exhaustive()
    }
}

/// Walk history as described by `opts`: children before parents, and among
/// commits whose children have all been yielded, newest committer
/// timestamp first.
///
/// The range is selected up front by one walk from `until` and `since`
/// together. Ancestors of `since` are only read as far as they can still
/// hide a selected commit, so the cost follows the size of the range rather
/// than the length of history. Fails with `NotFound` if `until` or `since`
/// is not a stored commit.
pub fn log(db: &ObjectDatabase, opts: &LogOptions) -> StoreResult<LogIter> {
    let mut waiting = Selection::new(db, opts.first_parent_only).run(opts.since, opts.until)?;

    let mut pending: HashMap<ObjectId, usize> = HashMap::new();
    for commit in waiting.values() {
        for parent in followed(commit, opts.first_parent_only) {
            if waiting.contains_key(parent) {
                *pending.entry(*parent).or_default() += 1;
            }
        }
    }

    let mut iter = LogIter {
        waiting: HashMap::new(),
        pending,
        ready: BinaryHeap::new(),
        first_parent_only: opts.first_parent_only,
        remaining: opts.limit,
        next_seq: 0,
    };
    // Everything selected descends from `until` through selected commits,
    // so `until` is the only commit with no pending children.
    if let Some(until) = waiting.remove(&opts.until) {
        iter.make_ready(until);
    }
    iter.waiting = waiting;
    Ok(iter)
}
