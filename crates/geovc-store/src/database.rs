//! Typed object access with graph-index maintenance.

use std::collections::BTreeSet;
use std::sync::Arc;

use geovc_graph::{GraphIndex, InMemoryGraphIndex};
use geovc_types::{ObjectId, ObjectKind};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::memory::InMemoryObjectStore;
use crate::object::{Commit, Feature, StoredObject, Tree};
use crate::traits::ObjectStore;

/// The object store as seen by the rest of the engine.
///
/// Pairs a raw [`ObjectStore`] backend with the [`GraphIndex`] derived from
/// it. Every commit inserted here is registered in the index before it
/// becomes readable, so `children` never lags `put_commit`.
#[derive(Clone)]
pub struct ObjectDatabase {
    objects: Arc<dyn ObjectStore>,
    graph: Arc<dyn GraphIndex>,
}

impl ObjectDatabase {
    /// Combine an object store with the graph index that tracks its commits.
    pub fn new(objects: Arc<dyn ObjectStore>, graph: Arc<dyn GraphIndex>) -> Self {
        Self { objects, graph }
    }

    /// Both layers backed by the in-memory implementations.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryObjectStore::new()),
            Arc::new(InMemoryGraphIndex::new()),
        )
    }

    /// The underlying object store.
    pub fn objects(&self) -> &Arc<dyn ObjectStore> {
        &self.objects
    }

    /// The underlying graph index.
    pub fn graph(&self) -> &Arc<dyn GraphIndex> {
        &self.graph
    }

    /// True if any object with `id` is stored.
    pub fn contains(&self, id: &ObjectId) -> StoreResult<bool> {
        self.objects.exists(id)
    }

    // ---------------------------------------------------------------
    // Commits
    // ---------------------------------------------------------------

    /// Store a commit and register its parent edges.
    ///
    /// Idempotent: re-inserting an existing commit returns its id.
    pub fn put_commit(&self, commit: &Commit) -> StoreResult<ObjectId> {
        let stored = commit.to_stored_object()?;
        // Edges before object: the index may over-report children of a
        // failed write, but never under-reports a readable commit.
        self.graph.register(&commit.id(), commit.parent_ids())?;
        let id = self.objects.write(&stored)?;
        debug!(commit = %id.short_hex(), parents = commit.parent_ids().len(), "stored commit");
        Ok(id)
    }

    /// Read a commit, failing with `NotFound` if absent.
    pub fn get_commit(&self, id: &ObjectId) -> StoreResult<Commit> {
        self.find_commit(id)?.ok_or(StoreError::NotFound(*id))
    }

    /// Read a commit, returning `None` if absent.
    ///
    /// Fails with `CorruptObject` when the stored bytes hash to a different id.
    pub fn find_commit(&self, id: &ObjectId) -> StoreResult<Option<Commit>> {
        let Some(obj) = self.objects.read(id)? else {
            return Ok(None);
        };
        let commit = Commit::from_stored_object(&obj)?;
        if commit.id() != *id {
            return Err(StoreError::CorruptObject {
                id: *id,
                reason: format!("content hashes to {}", commit.id()),
            });
        }
        Ok(Some(commit))
    }

    /// Commits that list `id` as a parent, straight from the graph index.
    pub fn children(&self, id: &ObjectId) -> StoreResult<BTreeSet<ObjectId>> {
        Ok(self.graph.children(id)?)
    }

    /// Re-register every stored commit in the graph index.
    ///
    /// Returns the number of commits registered.
    pub fn rebuild_graph(&self) -> StoreResult<usize> {
        let mut count = 0;
        for id in self.objects.ids()? {
            let Some(obj) = self.objects.read(&id)? else {
                continue;
            };
            if obj.kind != ObjectKind::Commit {
                continue;
            }
            let commit = Commit::from_stored_object(&obj)?;
            self.graph.register(&commit.id(), commit.parent_ids())?;
            count += 1;
        }
        debug!(commits = count, "rebuilt graph index");
        Ok(count)
    }

    // ---------------------------------------------------------------
    // Trees and features
    // ---------------------------------------------------------------

    /// Store a tree listing.
    pub fn put_tree(&self, tree: &Tree) -> StoreResult<ObjectId> {
        self.objects.write(&tree.to_stored_object()?)
    }

    /// Read a tree, failing with `NotFound` if absent.
    pub fn get_tree(&self, id: &ObjectId) -> StoreResult<Tree> {
        Tree::from_stored_object(&self.read_required(id)?)
    }

    /// Store a feature.
    pub fn put_feature(&self, feature: &Feature) -> StoreResult<ObjectId> {
        self.objects.write(&feature.to_stored_object()?)
    }

    /// Read a feature, failing with `NotFound` if absent.
    pub fn get_feature(&self, id: &ObjectId) -> StoreResult<Feature> {
        Feature::from_stored_object(&self.read_required(id)?)
    }

    fn read_required(&self, id: &ObjectId) -> StoreResult<StoredObject> {
        self.objects.read(id)?.ok_or(StoreError::NotFound(*id))
    }
}

impl std::fmt::Debug for ObjectDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectDatabase").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{CommitBuilder, TreeEntry};
    use geovc_graph::{GraphError, GraphResult};
    use geovc_types::Person;
    use serde_json::json;

    fn person() -> Person {
        Person::new("Surveyor", "surveyor@example.org", 1_000, 0)
    }

    fn commit_on(db: &ObjectDatabase, parents: &[ObjectId], message: &str) -> Commit {
        let feature = db
            .put_feature(&Feature::new(None).with_property("rev", json!(message)))
            .unwrap();
        let tree = db
            .put_tree(&Tree::new(vec![TreeEntry::feature("f", feature)]))
            .unwrap();
        let commit = CommitBuilder::new(tree, person(), person())
            .with_parents(parents.iter().copied())
            .with_message(message)
            .build()
            .unwrap();
        db.put_commit(&commit).unwrap();
        commit
    }

    /// Graph index whose backend is always down.
    struct UnreachableGraph;

    impl GraphIndex for UnreachableGraph {
        fn register(&self, _: &ObjectId, _: &[ObjectId]) -> GraphResult<()> {
            Err(GraphError::Unavailable("connection refused".into()))
        }

        fn children(&self, _: &ObjectId) -> GraphResult<BTreeSet<ObjectId>> {
            Err(GraphError::Unavailable("connection refused".into()))
        }
    }

    #[test]
    fn put_and_get_commit() {
        let db = ObjectDatabase::in_memory();
        let root = commit_on(&db, &[], "root");
        assert_eq!(db.get_commit(&root.id()).unwrap(), root);
        assert!(db.contains(&root.id()).unwrap());
    }

    #[test]
    fn missing_commit_is_not_found() {
        let db = ObjectDatabase::in_memory();
        let id = ObjectId::hash_bytes(b"ghost");
        assert!(matches!(db.get_commit(&id), Err(StoreError::NotFound(found)) if found == id));
        assert!(db.find_commit(&id).unwrap().is_none());
    }

    #[test]
    fn reading_a_tree_as_commit_is_corrupt() {
        let db = ObjectDatabase::in_memory();
        let tree = db.put_tree(&Tree::empty()).unwrap();
        assert!(matches!(
            db.get_commit(&tree),
            Err(StoreError::CorruptObject { .. })
        ));
    }

    #[test]
    fn children_visible_immediately_after_insert() {
        let db = ObjectDatabase::in_memory();
        let root = commit_on(&db, &[], "root");
        let a = commit_on(&db, &[root.id()], "a");
        let b = commit_on(&db, &[root.id()], "b");
        let merge = commit_on(&db, &[a.id(), b.id()], "merge");

        assert_eq!(
            db.children(&root.id()).unwrap(),
            BTreeSet::from([a.id(), b.id()])
        );
        assert_eq!(db.children(&a.id()).unwrap(), BTreeSet::from([merge.id()]));
        assert_eq!(db.children(&b.id()).unwrap(), BTreeSet::from([merge.id()]));
        assert!(db.children(&merge.id()).unwrap().is_empty());
    }

    #[test]
    fn put_commit_is_idempotent() {
        let db = ObjectDatabase::in_memory();
        let root = commit_on(&db, &[], "root");
        let child = commit_on(&db, &[root.id()], "child");
        assert_eq!(db.put_commit(&child).unwrap(), child.id());
        assert_eq!(db.children(&root.id()).unwrap().len(), 1);
    }

    #[test]
    fn unreachable_graph_fails_the_insert() {
        let db = ObjectDatabase::new(
            Arc::new(InMemoryObjectStore::new()),
            Arc::new(UnreachableGraph),
        );
        let commit = CommitBuilder::new(ObjectId::hash_bytes(b"t"), person(), person())
            .build()
            .unwrap();
        let err = db.put_commit(&commit).unwrap_err();
        assert!(err.is_unavailable());
        assert!(!db.contains(&commit.id()).unwrap());
        assert!(db.children(&commit.id()).unwrap_err().is_unavailable());
    }

    #[test]
    fn rebuild_graph_restores_edges() {
        let objects: Arc<dyn ObjectStore> = Arc::new(InMemoryObjectStore::new());
        let db = ObjectDatabase::new(Arc::clone(&objects), Arc::new(InMemoryGraphIndex::new()));
        let root = commit_on(&db, &[], "root");
        let child = commit_on(&db, &[root.id()], "child");

        let fresh = ObjectDatabase::new(objects, Arc::new(InMemoryGraphIndex::new()));
        assert!(fresh.children(&root.id()).unwrap().is_empty());
        assert_eq!(fresh.rebuild_graph().unwrap(), 2);
        assert_eq!(fresh.children(&root.id()).unwrap(), BTreeSet::from([child.id()]));
    }

    #[test]
    fn features_and_trees_roundtrip() {
        let db = ObjectDatabase::in_memory();
        let feature = Feature::new(Some("LINESTRING(0 0, 1 1)".into()))
            .with_property("highway", json!("residential"));
        let fid = db.put_feature(&feature).unwrap();
        assert_eq!(db.get_feature(&fid).unwrap(), feature);

        let tree = Tree::new(vec![TreeEntry::feature("roads/1", fid)]);
        let tid = db.put_tree(&tree).unwrap();
        assert_eq!(db.get_tree(&tid).unwrap(), tree);
        assert!(matches!(
            db.get_tree(&ObjectId::hash_bytes(b"none")),
            Err(StoreError::NotFound(_))
        ));
    }
}
