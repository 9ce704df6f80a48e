use geovc_types::{ObjectId, ObjectKind};

/// Domain-separated BLAKE3 hasher.
///
/// The digest covers `"<domain>:" || data`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    pub const COMMIT: Self = Self::new("geovc-commit-v1");
    pub const TREE: Self = Self::new("geovc-tree-v1");
    pub const FEATURE: Self = Self::new("geovc-feature-v1");

    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// The hasher used for objects of `kind`.
    pub const fn for_kind(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Commit => Self::COMMIT,
            ObjectKind::Tree => Self::TREE,
            ObjectKind::Feature => Self::FEATURE,
        }
    }

    /// Hash `data` under this hasher's domain.
    pub fn hash(&self, data: &[u8]) -> ObjectId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        ObjectId::from_hash(*hasher.finalize().as_bytes())
    }

    /// Serialize `value` to canonical JSON and hash it.
    ///
    /// Canonical here means serde's declaration-order field layout; callers
    /// must use `BTreeMap` for any map-valued fields.
    pub fn hash_canonical<T: serde::Serialize>(
        &self,
        value: &T,
    ) -> Result<(ObjectId, Vec<u8>), HasherError> {
        let data =
            serde_json::to_vec(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
        Ok((self.hash(&data), data))
    }

    /// True if `data` hashes to `expected`.
    pub fn verify(&self, data: &[u8], expected: &ObjectId) -> bool {
        self.hash(data) == *expected
    }

    /// Domain tag mixed into every hash.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}
