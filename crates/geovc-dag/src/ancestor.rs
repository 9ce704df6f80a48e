//! Ancestor queries.

use std::collections::{HashSet, VecDeque};

use geovc_store::{Commit, ObjectDatabase, StoreResult};
use geovc_types::ObjectId;
use tracing::debug;

/// One side of the bidirectional search in [`find_common_ancestor`].
struct Frontier {
    queue: VecDeque<ObjectId>,
    visited: HashSet<ObjectId>,
}

impl Frontier {
    fn new(start: ObjectId) -> Self {
        Self {
            queue: VecDeque::from([start]),
            visited: HashSet::from([start]),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.queue.is_empty()
    }

    /// Expand the next queued commit. Returns the first newly discovered
    /// parent that `other` has already visited.
    fn expand(&mut self, db: &ObjectDatabase, other: &Frontier) -> StoreResult<Option<ObjectId>> {
        let Some(id) = self.queue.pop_front() else {
            return Ok(None);
        };
        let commit = db.get_commit(&id)?;
        for parent in commit.parent_ids() {
            if !self.visited.insert(*parent) {
                continue;
            }
            if other.visited.contains(parent) {
                return Ok(Some(*parent));
            }
            self.queue.push_back(*parent);
        }
        Ok(None)
    }
}

/// Nearest commit reachable from both `left` and `right`.
///
/// Both lineages are expanded breadth-first, one commit per side in turn.
/// The first commit discovered by one side that the other side has already
/// visited wins. Returns `None` when the histories share no commit.
///
/// Fails with `NotFound` if either start commit, or any commit on the way,
/// is missing from the store.
pub fn find_common_ancestor(
    db: &ObjectDatabase,
    left: &ObjectId,
    right: &ObjectId,
) -> StoreResult<Option<Commit>> {
    let left_commit = db.get_commit(left)?;
    if left == right {
        return Ok(Some(left_commit));
    }
    db.get_commit(right)?;

    let mut lhs = Frontier::new(*left);
    let mut rhs = Frontier::new(*right);
    while !(lhs.is_exhausted() && rhs.is_exhausted()) {
        let found = match lhs.expand(db, &rhs)? {
            Some(id) => Some(id),
            None => rhs.expand(db, &lhs)?,
        };
        if let Some(id) = found {
            debug!(
                left = %left.short_hex(),
                right = %right.short_hex(),
                ancestor = %id.short_hex(),
                "found common ancestor"
            );
            return db.get_commit(&id).map(Some);
        }
    }
    debug!(left = %left.short_hex(), right = %right.short_hex(), "no common ancestor");
    Ok(None)
}

/// Whether `ancestor` is reachable from `descendant` along parent edges.
///
/// Every commit is its own ancestor.
pub fn is_ancestor(
    db: &ObjectDatabase,
    ancestor: &ObjectId,
    descendant: &ObjectId,
) -> StoreResult<bool> {
    if ancestor == descendant {
        return Ok(true);
    }
    let mut visited = HashSet::from([*descendant]);
    let mut queue = VecDeque::from([*descendant]);
    while let Some(id) = queue.pop_front() {
        for parent in db.get_commit(&id)?.parent_ids() {
            if parent == ancestor {
                return Ok(true);
            }
            if visited.insert(*parent) {
                queue.push_back(*parent);
            }
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{commit, linear};
    use geovc_store::StoreError;
    use proptest::prelude::*;

    #[test]
    fn same_commit_is_its_own_ancestor() {
        let db = ObjectDatabase::in_memory();
        let ids = linear(&db);
        let found = find_common_ancestor(&db, &ids[2], &ids[2]).unwrap().unwrap();
        assert_eq!(found.id(), ids[2]);
    }

    #[test]
    fn ancestor_on_one_side_is_returned() {
        let db = ObjectDatabase::in_memory();
        let ids = linear(&db);
        for (a, b) in [(1, 4), (4, 1), (0, 3)] {
            let found = find_common_ancestor(&db, &ids[a], &ids[b]).unwrap().unwrap();
            assert_eq!(found.id(), ids[a.min(b)]);
        }
    }

    #[test]
    fn diverged_branches_meet_at_fork() {
        //   R - A - B
        //        \
        //         X - Y
        let db = ObjectDatabase::in_memory();
        let r = commit(&db, &[], 1, "R");
        let a = commit(&db, &[r], 2, "A");
        let b = commit(&db, &[a], 3, "B");
        let x = commit(&db, &[a], 4, "X");
        let y = commit(&db, &[x], 5, "Y");
        let found = find_common_ancestor(&db, &b, &y).unwrap().unwrap();
        assert_eq!(found.id(), a);
    }

    #[test]
    fn merge_parents_are_followed() {
        //   R - A ------ M
        //    \          /
        //     S1 - S2 -'
        let db = ObjectDatabase::in_memory();
        let r = commit(&db, &[], 1, "R");
        let a = commit(&db, &[r], 2, "A");
        let s1 = commit(&db, &[r], 3, "S1");
        let s2 = commit(&db, &[s1], 4, "S2");
        let m = commit(&db, &[a, s2], 5, "M");
        assert_eq!(find_common_ancestor(&db, &m, &s2).unwrap().unwrap().id(), s2);
        assert!(is_ancestor(&db, &s1, &m).unwrap());
    }

    #[test]
    fn disjoint_roots_have_no_common_ancestor() {
        let db = ObjectDatabase::in_memory();
        let left = commit(&db, &[], 1, "left root");
        let left_tip = commit(&db, &[left], 2, "left tip");
        let right = commit(&db, &[], 3, "right root");
        assert!(find_common_ancestor(&db, &left_tip, &right).unwrap().is_none());
    }

    #[test]
    fn missing_commit_is_not_found() {
        let db = ObjectDatabase::in_memory();
        let ids = linear(&db);
        let ghost = ObjectId::hash_bytes(b"ghost");
        assert!(matches!(
            find_common_ancestor(&db, &ids[0], &ghost),
            Err(StoreError::NotFound(id)) if id == ghost
        ));
    }

    #[test]
    fn is_ancestor_is_directional() {
        let db = ObjectDatabase::in_memory();
        let ids = linear(&db);
        assert!(is_ancestor(&db, &ids[0], &ids[4]).unwrap());
        assert!(!is_ancestor(&db, &ids[4], &ids[0]).unwrap());
        assert!(is_ancestor(&db, &ids[3], &ids[3]).unwrap());
    }

    /// Random DAG: commit `i` picks up to two parents among commits `< i`.
    fn random_dag(db: &ObjectDatabase, shape: &[(usize, usize)]) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = Vec::new();
        for (i, (p1, p2)) in shape.iter().enumerate() {
            let mut parents = Vec::new();
            if i > 0 {
                parents.push(ids[p1 % i]);
                let second = ids[p2 % i];
                if p2 % 3 == 0 && !parents.contains(&second) {
                    parents.push(second);
                }
            }
            ids.push(commit(db, &parents, i as i64, &format!("c{i}")));
        }
        ids
    }

    proptest! {
        #[test]
        fn common_ancestor_is_shared_and_reflexive(
            shape in proptest::collection::vec((0usize..64, 0usize..64), 1..24),
            a in 0usize..64,
            b in 0usize..64,
        ) {
            let db = ObjectDatabase::in_memory();
            let ids = random_dag(&db, &shape);
            let a = ids[a % ids.len()];
            let b = ids[b % ids.len()];

            let own = find_common_ancestor(&db, &a, &a).unwrap().unwrap();
            prop_assert_eq!(own.id(), a);

            // Single root, so some common ancestor always exists.
            let found = find_common_ancestor(&db, &a, &b).unwrap().unwrap();
            prop_assert!(is_ancestor(&db, &found.id(), &a).unwrap());
            prop_assert!(is_ancestor(&db, &found.id(), &b).unwrap());
        }
    }
}
