//! Commit-graph builders shared by the unit tests.

use geovc_store::{CommitBuilder, ObjectDatabase, Tree};
use geovc_types::{ObjectId, Person};

pub(crate) fn person() -> Person {
    Person::new("Mapper", "mapper@example.org", 0, 0)
}

/// Store a commit with the given parents and committer timestamp.
pub(crate) fn commit(db: &ObjectDatabase, parents: &[ObjectId], ts: i64, message: &str) -> ObjectId {
    let tree = db.put_tree(&Tree::empty()).unwrap();
    let commit = CommitBuilder::new(tree, person(), person())
        .with_parents(parents.iter().copied())
        .with_message(message)
        .with_author_time(ts, 0)
        .with_committer_time(ts, 0)
        .build()
        .unwrap();
    db.put_commit(&commit).unwrap()
}

/// `R <- A <- B <- C <- D`, timestamps 1..=5. Returns `[R, A, B, C, D]`.
pub(crate) fn linear(db: &ObjectDatabase) -> Vec<ObjectId> {
    let mut ids: Vec<ObjectId> = Vec::new();
    for (ts, name) in ["R", "A", "B", "C", "D"].into_iter().enumerate() {
        let parents: Vec<ObjectId> = ids.last().copied().into_iter().collect();
        ids.push(commit(db, &parents, ts as i64 + 1, name));
    }
    ids
}
