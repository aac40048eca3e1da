//! addrmerge - resolve pre-merger administrative addresses
//!
//! Maps Vietnamese commune / district / province addresses (optionally with a
//! hamlet) written before the administrative merger onto their post-merger
//! equivalents, using a curated two-sheet reference table.
//!
//! # Features
//! - Canonical text normalization (diacritics, abbreviations, place aliases)
//! - Exact-match indexes with fuzzy fallback and numeric-suffix pruning
//! - Weighted multi-field scoring with per-field thresholds
//! - Classified failure reasons instead of errors
//! - Atomic snapshot swap on reference reload
//! - Parallel batch processing with progress and cancellation
//!
//! # Example
//! ```
//! use addrmerge::{CommuneRecord, MatchConfig, ReferenceSnapshot, ReferenceStore, Reason};
//!
//! let snapshot = ReferenceSnapshot::from_records(
//!     vec![CommuneRecord::new("An Phú", "Củ Chi", "Hồ Chí Minh", "An Phú", "Hồ Chí Minh")],
//!     Vec::new(),
//! );
//! let store = ReferenceStore::new(snapshot);
//! let resolver = store.resolver(MatchConfig::default());
//!
//! let result = resolver.resolve("An Phu", "Cu Chi", "TP.HCM", None, None);
//! assert_eq!(result.reason, Reason::Resolved);
//! assert_eq!(result.record.unwrap().new_province, "Hồ Chí Minh");
//! ```

pub mod algorithms;
pub mod batch;
pub mod config;
pub mod error;
pub mod normalize;
pub mod reference;
pub mod resolver;

pub use batch::{resolve_batch, BatchProgress, BatchReport, BatchSummary, ColumnLayout, InputRow, RowOutcome};
pub use config::MatchConfig;
pub use error::{ColumnLayoutError, ConfigError, SchemaError};
pub use normalize::{normalize, split_word_and_number, strip_administrative_words};
pub use reference::{
    CommuneRecord, HamletRecord, RawTable, ReferenceSnapshot, ReferenceStore, SheetKind,
};
pub use resolver::{AddressResolver, Reason, Resolution};
