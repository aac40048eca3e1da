//! Reference tables
//!
//! The curated pre-merger to post-merger mapping, in two sheets (commune
//! level and hamlet level), loaded into an immutable [`ReferenceSnapshot`]
//! and published through a [`ReferenceStore`].

pub mod index;
pub mod keys;
pub mod record;
pub mod snapshot;
pub mod store;
pub mod table;

pub use index::{ExactIndex, IndexEntry, IndexKey};
pub use keys::{CommuneKey, HamletKey, MatchKeys};
pub use record::{CommuneRecord, HamletRecord, ReferenceRecord, SheetKind};
pub use snapshot::{ReferenceSnapshot, SnapshotStats};
pub use store::ReferenceStore;
pub use table::{ColumnSpec, RawTable, COMMUNE_COLUMNS, HAMLET_COLUMNS};
