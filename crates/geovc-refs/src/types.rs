//! Core reference types.

use serde::{Deserialize, Serialize};

use geovc_types::ObjectId;

/// Name of the checked-out-state reference.
pub const HEAD: &str = "HEAD";

/// Namespace holding branch refs.
pub const HEADS_PREFIX: &str = "refs/heads/";

/// Full ref name for a branch (`main` -> `refs/heads/main`).
///
/// Names already in the `refs/` namespace are returned unchanged.
pub fn branch_ref_name(branch: &str) -> String {
    if branch.starts_with("refs/") {
        branch.to_string()
    } else {
        format!("{HEADS_PREFIX}{branch}")
    }
}

/// A direct pointer to a commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref {
    pub name: String,
    pub target: ObjectId,
}

impl Ref {
    /// Direct ref `name` pointing at `target`.
    pub fn new(name: impl Into<String>, target: ObjectId) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }

    /// Branch name without the `refs/heads/` prefix, if this is a branch.
    pub fn branch_name(&self) -> Option<&str> {
        self.name.strip_prefix(HEADS_PREFIX)
    }
}

/// A pointer to another ref, by name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymRef {
    pub name: String,
    pub target: String,
}

impl SymRef {
    /// Symbolic ref `name` pointing at ref `target`.
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
        }
    }
}

/// Any value stored under a ref name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reference {
    Direct(Ref),
    Symbolic(SymRef),
}

impl Reference {
    /// Full ref name.
    pub fn name(&self) -> &str {
        match self {
            Self::Direct(r) => &r.name,
            Self::Symbolic(s) => &s.name,
        }
    }

    pub fn is_symbolic(&self) -> bool {
        matches!(self, Self::Symbolic(_))
    }

    /// The commit id, for direct refs.
    pub fn direct_target(&self) -> Option<ObjectId> {
        match self {
            Self::Direct(r) => Some(r.target),
            Self::Symbolic(_) => None,
        }
    }

    /// The referenced name, for symbolic refs.
    pub fn symbolic_target(&self) -> Option<&str> {
        match self {
            Self::Direct(_) => None,
            Self::Symbolic(s) => Some(&s.target),
        }
    }

    pub(crate) fn kind_str(&self) -> &'static str {
        match self {
            Self::Direct(_) => "a direct ref",
            Self::Symbolic(_) => "a symbolic ref",
        }
    }
}
