use geovc_types::ObjectId;

use crate::error::StoreResult;
use crate::object::StoredObject;

/// Raw content-addressed storage backend.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. There is no delete: reclaiming
///   unreachable objects is not the backend's business.
/// - `write` is idempotent. Writing bytes whose id already maps to
///   different bytes fails with `StoreError::HashCollision`.
/// - Concurrent reads are always safe.
/// - An unreachable backend fails with `StoreError::Unavailable`.
pub trait ObjectStore: Send + Sync {
    /// Read an object by id. `Ok(None)` if absent.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    /// Write an object and return its id.
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Every stored id, sorted.
    fn ids(&self) -> StoreResult<Vec<ObjectId>>;

    fn read_batch(&self, ids: &[ObjectId]) -> StoreResult<Vec<Option<StoredObject>>> {
        ids.iter().map(|id| self.read(id)).collect()
    }

    fn write_batch(&self, objects: &[StoredObject]) -> StoreResult<Vec<ObjectId>> {
        objects.iter().map(|obj| self.write(obj)).collect()
    }
}
