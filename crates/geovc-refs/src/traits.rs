//! The [`RefStore`] storage contract.

use geovc_types::ObjectId;

use crate::error::{RefError, Result};
use crate::types::{Ref, Reference, HEAD, HEADS_PREFIX};

/// Storage backend for named references.
///
/// Implementations must be thread-safe and make every mutating call atomic
/// with respect to concurrent readers.
pub trait RefStore: Send + Sync {
    /// Read the raw value stored under `name`. `Ok(None)` if absent.
    fn read(&self, name: &str) -> Result<Option<Reference>>;

    /// Set a direct ref, creating it if needed.
    ///
    /// Fails with `WrongKind` if `name` currently holds a symref.
    fn update_ref(&self, name: &str, target: ObjectId) -> Result<()>;

    /// Set a direct ref only if its current target equals `expected`
    /// (`None` meaning the ref must not exist yet).
    fn compare_and_swap(
        &self,
        name: &str,
        expected: Option<ObjectId>,
        target: ObjectId,
    ) -> Result<()>;

    /// Point symref `name` at ref `target`.
    fn update_symref(&self, name: &str, target: &str) -> Result<()>;

    /// Store `value` under its own name, whatever that name held before,
    /// in a single update. Returns the previous value.
    ///
    /// Turning a symref into a direct ref (detaching HEAD) or back goes
    /// through here, so readers never observe the name missing in between.
    fn replace(&self, value: Reference) -> Result<Option<Reference>>;

    /// Remove a ref. Returns `true` if it existed.
    fn delete(&self, name: &str) -> Result<bool>;

    /// All refs whose name starts with `prefix`, sorted by name.
    fn list(&self, prefix: &str) -> Result<Vec<Reference>>;

    /// Resolve `name` to a commit id, following at most one symbolic hop.
    fn resolve(&self, name: &str) -> Result<ObjectId> {
        let not_found = |n: &str| RefError::NotFound {
            name: n.to_string(),
        };
        match self.read(name)?.ok_or_else(|| not_found(name))? {
            Reference::Direct(r) => Ok(r.target),
            Reference::Symbolic(sym) => match self.read(&sym.target)? {
                Some(Reference::Direct(r)) => Ok(r.target),
                Some(Reference::Symbolic(_)) => Err(RefError::SymbolicChain {
                    name: sym.name,
                    target: sym.target,
                }),
                None => Err(not_found(&sym.target)),
            },
        }
    }

    /// Current value of HEAD, if set.
    fn head(&self) -> Result<Option<Reference>> {
        self.read(HEAD)
    }

    /// Every branch ref (`refs/heads/*`).
    fn branches(&self) -> Result<Vec<Ref>> {
        Ok(self
            .list(HEADS_PREFIX)?
            .into_iter()
            .filter_map(|r| match r {
                Reference::Direct(r) => Some(r),
                Reference::Symbolic(_) => None,
            })
            .collect())
    }
}
