//! In-memory reference store.
//!
//! [`InMemoryRefStore`] keeps every ref in one `BTreeMap` behind a single
//! `RwLock`, which makes each update atomic and keeps listings sorted.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use geovc_types::ObjectId;
use tracing::debug;

use crate::error::{RefError, Result};
use crate::names::validate_ref_name;
use crate::traits::RefStore;
use crate::types::{Ref, Reference, SymRef};

#[derive(Debug, Default)]
pub struct InMemoryRefStore {
    refs: RwLock<BTreeMap<String, Reference>>,
}

impl InMemoryRefStore {
    /// Create an empty ref store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read_map(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, Reference>>> {
        self.refs
            .read()
            .map_err(|e| RefError::Unavailable(format!("lock poisoned: {e}")))
    }

    fn write_map(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, Reference>>> {
        self.refs
            .write()
            .map_err(|e| RefError::Unavailable(format!("lock poisoned: {e}")))
    }
}

fn ensure_not_symbolic(name: &str, existing: Option<&Reference>) -> Result<()> {
    match existing {
        Some(r @ Reference::Symbolic(_)) => Err(RefError::WrongKind {
            name: name.to_string(),
            expected: "a direct ref",
            actual: r.kind_str(),
        }),
        _ => Ok(()),
    }
}

impl RefStore for InMemoryRefStore {
    fn read(&self, name: &str) -> Result<Option<Reference>> {
        Ok(self.read_map()?.get(name).cloned())
    }

    fn update_ref(&self, name: &str, target: ObjectId) -> Result<()> {
        validate_ref_name(name)?;
        let mut refs = self.write_map()?;
        ensure_not_symbolic(name, refs.get(name))?;
        refs.insert(name.to_string(), Reference::Direct(Ref::new(name, target)));
        debug!(ref_name = name, to = %target.short_hex(), "updated ref");
        Ok(())
    }

    fn compare_and_swap(
        &self,
        name: &str,
        expected: Option<ObjectId>,
        target: ObjectId,
    ) -> Result<()> {
        validate_ref_name(name)?;
        let mut refs = self.write_map()?;
        let current = refs.get(name);
        ensure_not_symbolic(name, current)?;
        let actual = current.and_then(Reference::direct_target);
        if actual != expected {
            return Err(RefError::Conflict {
                name: name.to_string(),
                expected,
                actual,
            });
        }
        refs.insert(name.to_string(), Reference::Direct(Ref::new(name, target)));
        debug!(ref_name = name, to = %target.short_hex(), "swapped ref");
        Ok(())
    }

    fn update_symref(&self, name: &str, target: &str) -> Result<()> {
        validate_ref_name(name)?;
        validate_ref_name(target)?;
        let mut refs = self.write_map()?;
        if let Some(Reference::Symbolic(_)) = refs.get(target) {
            return Err(RefError::SymbolicChain {
                name: name.to_string(),
                target: target.to_string(),
            });
        }
        refs.insert(
            name.to_string(),
            Reference::Symbolic(SymRef::new(name, target)),
        );
        debug!(ref_name = name, to = target, "updated symref");
        Ok(())
    }

    fn replace(&self, value: Reference) -> Result<Option<Reference>> {
        let name = value.name().to_string();
        validate_ref_name(&name)?;
        let mut refs = self.write_map()?;
        if let Reference::Symbolic(sym) = &value {
            validate_ref_name(&sym.target)?;
            if let Some(Reference::Symbolic(_)) = refs.get(&sym.target) {
                return Err(RefError::SymbolicChain {
                    name,
                    target: sym.target.clone(),
                });
            }
        }
        let previous = refs.insert(name.clone(), value);
        debug!(ref_name = %name, "replaced ref");
        Ok(previous)
    }

    fn delete(&self, name: &str) -> Result<bool> {
        Ok(self.write_map()?.remove(name).is_some())
    }

    fn list(&self, prefix: &str) -> Result<Vec<Reference>> {
        Ok(self
            .read_map()?
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(_, v)| v.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HEAD;

    fn id(n: u8) -> ObjectId {
        ObjectId::from_hash([n; 32])
    }

    fn store_with_main(target: ObjectId) -> InMemoryRefStore {
        let store = InMemoryRefStore::new();
        store.update_ref("refs/heads/main", target).unwrap();
        store.update_symref(HEAD, "refs/heads/main").unwrap();
        store
    }

    #[test]
    fn update_and_read_direct_ref() {
        let store = InMemoryRefStore::new();
        store.update_ref("refs/heads/main", id(1)).unwrap();
        let read = store.read("refs/heads/main").unwrap().unwrap();
        assert_eq!(read.direct_target(), Some(id(1)));
        assert!(store.read("refs/heads/nope").unwrap().is_none());
    }

    #[test]
    fn resolve_follows_one_symbolic_hop() {
        let store = store_with_main(id(7));
        assert_eq!(store.resolve(HEAD).unwrap(), id(7));
        assert_eq!(store.resolve("refs/heads/main").unwrap(), id(7));
    }

    #[test]
    fn resolve_missing_name_or_target() {
        let store = InMemoryRefStore::new();
        assert!(matches!(
            store.resolve(HEAD),
            Err(RefError::NotFound { name }) if name == HEAD
        ));

        store.update_symref(HEAD, "refs/heads/unborn").unwrap();
        assert!(matches!(
            store.resolve(HEAD),
            Err(RefError::NotFound { name }) if name == "refs/heads/unborn"
        ));
    }

    #[test]
    fn symref_chains_are_rejected() {
        let store = store_with_main(id(1));
        let err = store.update_symref("refs/heads/alias", HEAD).unwrap_err();
        assert!(matches!(err, RefError::SymbolicChain { .. }));
    }

    #[test]
    fn resolve_reports_chain_planted_out_of_band() {
        let store = InMemoryRefStore::new();
        store.update_symref(HEAD, "refs/heads/b").unwrap();
        store.update_symref("refs/heads/b", "refs/heads/c").unwrap();
        assert!(matches!(
            store.resolve(HEAD),
            Err(RefError::SymbolicChain { .. })
        ));
    }

    #[test]
    fn direct_update_of_symref_is_wrong_kind() {
        let store = store_with_main(id(1));
        let err = store.update_ref(HEAD, id(2)).unwrap_err();
        assert!(matches!(err, RefError::WrongKind { .. }));
        assert!(store.head().unwrap().unwrap().is_symbolic());
    }

    #[test]
    fn compare_and_swap_succeeds_on_expected_value() {
        let store = store_with_main(id(1));
        store
            .compare_and_swap("refs/heads/main", Some(id(1)), id(2))
            .unwrap();
        assert_eq!(store.resolve(HEAD).unwrap(), id(2));
    }

    #[test]
    fn compare_and_swap_conflicts_on_stale_value() {
        let store = store_with_main(id(1));
        let err = store
            .compare_and_swap("refs/heads/main", Some(id(9)), id(2))
            .unwrap_err();
        match err {
            RefError::Conflict {
                expected, actual, ..
            } => {
                assert_eq!(expected, Some(id(9)));
                assert_eq!(actual, Some(id(1)));
            }
            other => panic!("expected Conflict, got {other}"),
        }
        assert_eq!(store.resolve(HEAD).unwrap(), id(1));
    }

    #[test]
    fn compare_and_swap_create_only() {
        let store = InMemoryRefStore::new();
        store.compare_and_swap("refs/heads/new", None, id(3)).unwrap();
        assert!(store
            .compare_and_swap("refs/heads/new", None, id(4))
            .is_err());
    }

    #[test]
    fn invalid_names_are_rejected() {
        let store = InMemoryRefStore::new();
        assert!(matches!(
            store.update_ref("main", id(1)),
            Err(RefError::InvalidName { .. })
        ));
        assert!(store.update_ref("refs/heads/a b", id(1)).is_err());
    }

    #[test]
    fn list_and_branches_filter_by_prefix() {
        let store = store_with_main(id(1));
        store.update_ref("refs/heads/dev", id(2)).unwrap();
        store.update_ref("refs/tags/v1", id(3)).unwrap();

        let names: Vec<String> = store
            .list("refs/heads/")
            .unwrap()
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["refs/heads/dev", "refs/heads/main"]);

        let branches = store.branches().unwrap();
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[1].branch_name(), Some("main"));
        assert_eq!(store.list("").unwrap().len(), 4);
    }

    #[test]
    fn replace_swaps_kind_in_one_step() {
        let store = store_with_main(id(1));
        let previous = store
            .replace(Reference::Direct(Ref::new(HEAD, id(1))))
            .unwrap();
        assert_eq!(previous.unwrap().symbolic_target(), Some("refs/heads/main"));
        assert_eq!(store.head().unwrap().unwrap().direct_target(), Some(id(1)));

        store
            .replace(Reference::Symbolic(SymRef::new(HEAD, "refs/heads/main")))
            .unwrap();
        assert!(store.head().unwrap().unwrap().is_symbolic());

        store.update_symref("refs/heads/alias", "refs/heads/main").unwrap();
        assert!(matches!(
            store.replace(Reference::Symbolic(SymRef::new(HEAD, "refs/heads/alias"))),
            Err(RefError::SymbolicChain { .. })
        ));
    }

    #[test]
    fn head_is_never_missing_while_toggling_detached() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(store_with_main(id(1)));
        let done = Arc::new(AtomicBool::new(false));
        let toggler = {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                for _ in 0..100 {
                    store.replace(Reference::Direct(Ref::new(HEAD, id(1)))).unwrap();
                    store
                        .replace(Reference::Symbolic(SymRef::new(HEAD, "refs/heads/main")))
                        .unwrap();
                }
                done.store(true, Ordering::SeqCst);
            })
        };
        while !done.load(Ordering::SeqCst) {
            assert!(store.head().unwrap().is_some());
            assert_eq!(store.resolve(HEAD).unwrap(), id(1));
        }
        toggler.join().unwrap();
    }

    #[test]
    fn delete_ref() {
        let store = store_with_main(id(1));
        store.update_ref("refs/heads/dev", id(2)).unwrap();
        assert!(store.delete("refs/heads/dev").unwrap());
        assert!(!store.delete("refs/heads/dev").unwrap());
    }

    #[test]
    fn readers_never_observe_partial_updates() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(store_with_main(id(0)));
        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for n in 1..=50u8 {
                    store.update_ref("refs/heads/main", id(n)).unwrap();
                }
            })
        };
        let reader = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..200 {
                    let tip = store.resolve(HEAD).unwrap();
                    assert!((0..=50u8).any(|n| id(n) == tip));
                }
            })
        };
        writer.join().unwrap();
        reader.join().unwrap();
        assert_eq!(store.resolve(HEAD).unwrap(), id(50));
    }
}
