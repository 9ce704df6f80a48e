use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use geovc_crypto::ContentHasher;
use geovc_types::{ObjectId, ObjectKind, Person};

use crate::error::{StoreError, StoreResult};

/// The unit of storage: kind tag + canonical bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub kind: ObjectKind,
    pub data: Vec<u8>,
    pub size: u64,
}

impl StoredObject {
    /// Wrap encoded bytes, recording their size.
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Content-addressed id under the hasher for this object's kind.
    pub fn compute_id(&self) -> ObjectId {
        ContentHasher::for_kind(self.kind).hash(&self.data)
    }

    fn expect_kind(&self, kind: ObjectKind) -> StoreResult<()> {
        if self.kind != kind {
            return Err(StoreError::CorruptObject {
                id: self.compute_id(),
                reason: format!("expected {kind}, got {}", self.kind),
            });
        }
        Ok(())
    }
}

fn encode<T: Serialize>(kind: ObjectKind, value: &T) -> StoreResult<StoredObject> {
    let data = serde_json::to_vec(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(StoredObject::new(kind, data))
}

fn decode<T: for<'de> Deserialize<'de>>(obj: &StoredObject, kind: ObjectKind) -> StoreResult<T> {
    obj.expect_kind(kind)?;
    serde_json::from_slice(&obj.data).map_err(|e| StoreError::CorruptObject {
        id: obj.compute_id(),
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// Canonical, hashed form of a commit. Field order is the wire order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct CommitRecord {
    tree_id: ObjectId,
    parent_ids: Vec<ObjectId>,
    author: Person,
    committer: Person,
    message: String,
}

/// An immutable node of the revision history.
///
/// The id is derived from every other field, so a `Commit` value can only
/// be obtained through [`CommitBuilder::build`] or by decoding a stored
/// object, and its id always matches its content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    id: ObjectId,
    record: CommitRecord,
}

impl Commit {
    /// Content address of this commit.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Root tree of the snapshot.
    pub fn tree_id(&self) -> ObjectId {
        self.record.tree_id
    }

    /// All parents; index 0 is the mainline parent.
    pub fn parent_ids(&self) -> &[ObjectId] {
        &self.record.parent_ids
    }

    /// Mainline parent, or `None` for a root commit.
    pub fn first_parent(&self) -> Option<ObjectId> {
        self.record.parent_ids.first().copied()
    }

    /// Merge parents: everything after the mainline parent.
    pub fn secondary_parents(&self) -> &[ObjectId] {
        self.record.parent_ids.get(1..).unwrap_or(&[])
    }

    /// True when the commit has no parents.
    pub fn is_root(&self) -> bool {
        self.record.parent_ids.is_empty()
    }

    /// True when the commit has more than one parent.
    pub fn is_merge(&self) -> bool {
        self.record.parent_ids.len() > 1
    }

    pub fn author(&self) -> &Person {
        &self.record.author
    }

    pub fn committer(&self) -> &Person {
        &self.record.committer
    }

    /// Full commit message.
    pub fn message(&self) -> &str {
        &self.record.message
    }

    /// First line of the message.
    pub fn summary(&self) -> &str {
        self.record.message.lines().next().unwrap_or("")
    }

    /// Encode for the object store.
    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        encode(ObjectKind::Commit, &self.record)
    }

    /// Decode a stored commit, recomputing its id from content.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        let record: CommitRecord = decode(obj, ObjectKind::Commit)?;
        Ok(Self {
            id: obj.compute_id(),
            record,
        })
    }
}

/// Builds commits, either from scratch or derived from an existing one.
#[derive(Clone, Debug)]
pub struct CommitBuilder {
    record: CommitRecord,
}

impl CommitBuilder {
    /// Start a parentless commit with an empty message.
    pub fn new(tree_id: ObjectId, author: Person, committer: Person) -> Self {
        Self {
            record: CommitRecord {
                tree_id,
                parent_ids: Vec::new(),
                author,
                committer,
                message: String::new(),
            },
        }
    }

    /// Start from every field of `commit`.
    pub fn from_commit(commit: &Commit) -> Self {
        Self {
            record: commit.record.clone(),
        }
    }

    /// Replace the root tree.
    pub fn with_tree(mut self, tree_id: ObjectId) -> Self {
        self.record.tree_id = tree_id;
        self
    }

    /// Replace the parent list. Order is kept; the first entry is the mainline.
    pub fn with_parents(mut self, parents: impl IntoIterator<Item = ObjectId>) -> Self {
        self.record.parent_ids = parents.into_iter().collect();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.record.message = message.into();
        self
    }

    pub fn with_author(mut self, author: Person) -> Self {
        self.record.author = author;
        self
    }

    pub fn with_committer(mut self, committer: Person) -> Self {
        self.record.committer = committer;
        self
    }

    /// Restamp the author time, keeping name and email.
    pub fn with_author_time(mut self, timestamp_ms: i64, tz_offset_ms: i32) -> Self {
        self.record.author = self.record.author.at(timestamp_ms, tz_offset_ms);
        self
    }

    /// Restamp the committer time, keeping name and email.
    pub fn with_committer_time(mut self, timestamp_ms: i64, tz_offset_ms: i32) -> Self {
        self.record.committer = self.record.committer.at(timestamp_ms, tz_offset_ms);
        self
    }

    /// Hash the record and produce the commit.
    pub fn build(self) -> StoreResult<Commit> {
        let (id, _) = ContentHasher::COMMIT
            .hash_canonical(&self.record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Commit {
            id,
            record: self.record,
        })
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// What a tree entry points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Feature,
    Tree,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    pub kind: EntryKind,
    pub object_id: ObjectId,
}

impl TreeEntry {
    /// Entry pointing at a feature.
    pub fn feature(name: impl Into<String>, object_id: ObjectId) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Feature,
            object_id,
        }
    }

    /// Entry pointing at a sub-tree.
    pub fn tree(name: impl Into<String>, object_id: ObjectId) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Tree,
            object_id,
        }
    }
}

/// Snapshot listing. Entries are kept sorted by name so equal listings hash
/// equally.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Sort entries by name. A repeated name keeps its first entry.
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries.dedup_by(|a, b| a.name == b.name);
        Self { entries }
    }

    /// Tree with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Entries in name order.
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// Look up an entry by exact name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the tree lists nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode for the object store.
    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        encode(ObjectKind::Tree, self)
    }

    /// Decode a stored tree.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        decode(obj, ObjectKind::Tree)
    }
}

// ---------------------------------------------------------------------------
// Feature
// ---------------------------------------------------------------------------

/// A versioned geospatial feature: optional WKT geometry plus attributes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub geometry: Option<String>,
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl Feature {
    /// Feature with the given geometry and no properties.
    pub fn new(geometry: Option<String>) -> Self {
        Self {
            geometry,
            properties: BTreeMap::new(),
        }
    }

    /// Set attribute `key`, replacing any earlier value.
    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Encode for the object store.
    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        encode(ObjectKind::Feature, self)
    }

    /// Decode a stored feature.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        decode(obj, ObjectKind::Feature)
    }
}
