//! Repositories and test doubles shared by the unit tests.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use geovc_config::{FixedPlatform, InMemoryConfig, USER_EMAIL, USER_NAME};
use geovc_graph::{GraphError, GraphIndex, GraphResult, InMemoryGraphIndex};
use geovc_index::InMemoryWorkingState;
use geovc_refs::{InMemoryRefStore, RefStore, Reference, HEAD};
use geovc_store::{
    Commit, CommitBuilder, Feature, InMemoryObjectStore, ObjectDatabase, ObjectStore, Tree,
    TreeEntry,
};
use geovc_types::{ObjectId, Person};
use serde_json::json;

use crate::context::RewriteContext;

pub(crate) const MAIN: &str = "refs/heads/main";

/// In-memory graph index that can be switched off.
#[derive(Debug, Default)]
pub(crate) struct FlakyGraph {
    inner: InMemoryGraphIndex,
    down: AtomicBool,
}

impl FlakyGraph {
    pub(crate) fn go_down(&self) {
        self.down.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> GraphResult<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(GraphError::Unavailable("graph backend unreachable".into()));
        }
        Ok(())
    }
}

impl GraphIndex for FlakyGraph {
    fn register(&self, commit: &ObjectId, parents: &[ObjectId]) -> GraphResult<()> {
        self.check()?;
        self.inner.register(commit, parents)
    }

    fn children(&self, id: &ObjectId) -> GraphResult<BTreeSet<ObjectId>> {
        self.check()?;
        self.inner.children(id)
    }
}

/// Everything observable about a repository, for before/after checks.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Snapshot {
    objects: Vec<ObjectId>,
    edges: usize,
    refs: Vec<Reference>,
}

pub(crate) struct Fixture {
    pub ctx: RewriteContext,
    pub objects: Arc<InMemoryObjectStore>,
    pub graph: Arc<FlakyGraph>,
    pub refs: Arc<InMemoryRefStore>,
    pub work: Arc<InMemoryWorkingState>,
    pub clock: Arc<FixedPlatform>,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        let objects = Arc::new(InMemoryObjectStore::new());
        let graph = Arc::new(FlakyGraph::default());
        let refs = Arc::new(InMemoryRefStore::new());
        let work = Arc::new(InMemoryWorkingState::new());
        let clock = Arc::new(FixedPlatform::new(1_000_000, 1_000).with_tz_offset(3_600_000));
        let config = InMemoryConfig::with_values([
            (USER_NAME, "Squasher"),
            (USER_EMAIL, "squasher@example.org"),
        ])
        .unwrap();
        let db = ObjectDatabase::new(objects.clone(), graph.clone());
        let ctx = RewriteContext::new(
            db,
            refs.clone(),
            work.clone(),
            Arc::new(config),
            clock.clone(),
        );
        Self {
            ctx,
            objects,
            graph,
            refs,
            work,
            clock,
        }
    }

    /// Store a commit whose tree holds one feature tagged with `name`.
    pub(crate) fn commit(&self, parents: &[ObjectId], name: &str, ts: i64) -> Commit {
        let db = &self.ctx.db;
        let feature = db
            .put_feature(&Feature::new(Some("POINT(0 0)".into())).with_property("rev", json!(name)))
            .unwrap();
        let tree = db
            .put_tree(&Tree::new(vec![TreeEntry::feature("points/1", feature)]))
            .unwrap();
        let author = Person::new(format!("author-{name}"), "author@example.org", ts, 0);
        let commit = CommitBuilder::new(tree, author.clone(), author)
            .with_parents(parents.iter().copied())
            .with_message(format!("commit {name}"))
            .build()
            .unwrap();
        db.put_commit(&commit).unwrap();
        commit
    }

    /// Point `main` at `tip` and attach HEAD to it.
    pub(crate) fn checkout_main(&self, tip: &Commit) {
        self.refs.update_ref(MAIN, tip.id()).unwrap();
        self.refs.update_symref(HEAD, MAIN).unwrap();
    }

    /// `R <- A <- B <- C <- D` on `main`, HEAD attached. Returns `[R, A, B, C, D]`.
    pub(crate) fn linear(&self) -> Vec<Commit> {
        let mut chain: Vec<Commit> = Vec::new();
        for (i, name) in ["R", "A", "B", "C", "D"].into_iter().enumerate() {
            let parents: Vec<ObjectId> = chain.last().map(Commit::id).into_iter().collect();
            chain.push(self.commit(&parents, name, (i as i64 + 1) * 100));
        }
        self.checkout_main(&chain[4]);
        chain
    }

    pub(crate) fn tip(&self) -> ObjectId {
        self.refs.resolve(MAIN).unwrap()
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            objects: self.objects.ids().unwrap(),
            edges: self.graph.inner.edge_count().unwrap(),
            refs: self.refs.list("").unwrap(),
        }
    }
}
