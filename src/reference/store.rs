//! Shared, swappable reference data.
//!
//! The store holds the active [`ReferenceSnapshot`] behind a
//! `parking_lot::RwLock<Arc<_>>`. The lock is taken only to clone or replace
//! the `Arc`:
//!
//! - readers clone the `Arc` and then work lock-free on their own copy of the
//!   pointer, so a resolver keeps seeing the snapshot it started with
//! - a reload builds the new snapshot completely before taking the write
//!   lock, so nobody observes a half-built table set
//! - a failed reload leaves the active snapshot untouched

use super::snapshot::ReferenceSnapshot;
use super::table::RawTable;
use crate::config::MatchConfig;
use crate::error::SchemaError;
use crate::resolver::AddressResolver;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Owner of the active reference snapshot.
///
/// Cheap to clone; clones share the same active snapshot.
#[derive(Clone)]
pub struct ReferenceStore {
    active: Arc<RwLock<Arc<ReferenceSnapshot>>>,
    generation: Arc<AtomicU64>,
}

impl ReferenceStore {
    /// Wrap an already-built snapshot.
    pub fn new(snapshot: ReferenceSnapshot) -> Self {
        Self {
            active: Arc::new(RwLock::new(Arc::new(snapshot))),
            generation: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Load the initial snapshot from both sheets.
    pub fn load(communes: &RawTable, hamlets: &RawTable) -> Result<Self, SchemaError> {
        Ok(Self::new(ReferenceSnapshot::load(communes, hamlets)?))
    }

    /// The active snapshot.
    ///
    /// Acquires a shared read lock for the duration of an `Arc` clone.
    pub fn snapshot(&self) -> Arc<ReferenceSnapshot> {
        self.active.read().clone()
    }

    /// Number of snapshots installed so far, starting at 1.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Rebuild from new sheet contents and swap it in.
    ///
    /// On error the previous snapshot stays active and the error is returned.
    pub fn reload(
        &self,
        communes: &RawTable,
        hamlets: &RawTable,
    ) -> Result<Arc<ReferenceSnapshot>, SchemaError> {
        match ReferenceSnapshot::load(communes, hamlets) {
            Ok(snapshot) => Ok(self.replace(snapshot)),
            Err(err) => {
                warn!(error = %err, generation = self.generation(), "reload failed, keeping active snapshot");
                Err(err)
            }
        }
    }

    /// Install `snapshot`, returning it as the new active one.
    ///
    /// Acquires an exclusive write lock for the duration of a pointer swap.
    pub fn replace(&self, snapshot: ReferenceSnapshot) -> Arc<ReferenceSnapshot> {
        let snapshot = Arc::new(snapshot);
        {
            let mut active = self.active.write();
            *active = Arc::clone(&snapshot);
        }
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let stats = snapshot.stats();
        info!(
            generation,
            commune_records = stats.commune_records,
            hamlet_records = stats.hamlet_records,
            "reference snapshot swapped"
        );
        snapshot
    }

    /// A resolver bound to the snapshot active right now.
    pub fn resolver(&self, config: MatchConfig) -> AddressResolver {
        AddressResolver::new(self.snapshot(), config)
    }
}

impl Default for ReferenceStore {
    fn default() -> Self {
        Self::new(ReferenceSnapshot::default())
    }
}

impl std::fmt::Debug for ReferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceStore")
            .field("generation", &self.generation())
            .field("stats", &self.snapshot().stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const COMMUNE_HEADERS: [&str; 5] = ["xacu", "huyencu", "tinhcu", "xamoi", "tinhmoi"];
    const HAMLET_HEADERS: [&str; 7] = ["apcu", "xacu", "huyencu", "tinhcu", "apmoi", "xamoi", "tinhmoi"];

    fn tables(rows: &[&[&str]]) -> (RawTable, RawTable) {
        (
            RawTable::from_slices(&COMMUNE_HEADERS, rows),
            RawTable::from_slices(&HAMLET_HEADERS, &[]),
        )
    }

    #[test]
    fn test_reload_swaps_snapshot() {
        let (communes, hamlets) = tables(&[&["An Phú", "Củ Chi", "HCM", "An Phú", "HCM"]]);
        let store = ReferenceStore::load(&communes, &hamlets).unwrap();
        let before = store.snapshot();
        assert_eq!(before.communes().len(), 1);
        assert_eq!(store.generation(), 1);

        let (communes, hamlets) = tables(&[
            &["An Phú", "Củ Chi", "HCM", "An Phú", "HCM"],
            &["Long Thới", "Nhà Bè", "HCM", "Nhà Bè", "HCM"],
        ]);
        store.reload(&communes, &hamlets).unwrap();

        assert_eq!(store.snapshot().communes().len(), 2);
        assert_eq!(store.generation(), 2);
        // holders of the old snapshot are unaffected
        assert_eq!(before.communes().len(), 1);
    }

    #[test]
    fn test_failed_reload_keeps_active_snapshot() {
        let (communes, hamlets) = tables(&[&["An Phú", "Củ Chi", "HCM", "An Phú", "HCM"]]);
        let store = ReferenceStore::load(&communes, &hamlets).unwrap();

        let broken = RawTable::from_slices(&["xacu"], &[&["Long Thới"]]);
        assert!(store.reload(&broken, &hamlets).is_err());

        assert_eq!(store.generation(), 1);
        assert_eq!(store.snapshot().communes()[0].old_commune, "An Phú");
    }

    #[test]
    fn test_concurrent_readers_see_whole_snapshots() {
        let store = ReferenceStore::default();
        let small = tables(&[&["A", "B", "C", "D", "E"]]);
        let large = tables(&[&["A", "B", "C", "D", "E"], &["F", "G", "H", "I", "J"]]);

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..200 {
                        let snapshot = store.snapshot();
                        let n = snapshot.communes().len();
                        assert_eq!(snapshot.communes_normalized().len(), n);
                        assert!(n <= 2);
                    }
                })
            })
            .collect();

        for i in 0..20 {
            let (communes, hamlets) = if i % 2 == 0 { &small } else { &large };
            store.reload(communes, hamlets).unwrap();
        }

        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(store.generation(), 21);
    }
}
