//! Exact-match lookup on normalized key tuples.

use super::record::SheetKind;
use ahash::AHashMap;
use smallvec::SmallVec;

/// Separates key parts; never produced by normalization.
const KEY_SEPARATOR: char = '\u{1f}';

/// A normalized tuple flattened into one hashable string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexKey(String);

impl IndexKey {
    pub fn new(parts: &[&str]) -> Self {
        let mut key = String::with_capacity(parts.iter().map(|p| p.len() + 1).sum());
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                key.push(KEY_SEPARATOR);
            }
            key.push_str(part);
        }
        Self(key)
    }
}

/// Position of a record in one of the two sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexEntry {
    pub index: usize,
    pub sheet: SheetKind,
}

impl IndexEntry {
    pub fn commune(index: usize) -> Self {
        Self {
            index,
            sheet: SheetKind::Commune,
        }
    }

    pub fn hamlet(index: usize) -> Self {
        Self {
            index,
            sheet: SheetKind::Hamlet,
        }
    }
}

/// Most keys map to one or two records.
type Bucket = SmallVec<[IndexEntry; 2]>;

/// Normalized key -> records sharing that key, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ExactIndex {
    map: AHashMap<IndexKey, Bucket>,
}

impl ExactIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: IndexKey, entry: IndexEntry) {
        self.map.entry(key).or_default().push(entry);
    }

    /// All records stored under `key`.
    pub fn get(&self, key: &IndexKey) -> &[IndexEntry] {
        self.map.get(key).map_or(&[], |bucket| bucket.as_slice())
    }

    /// The first commune-sheet record under `key`, else the first record.
    pub fn preferred(&self, key: &IndexKey) -> Option<IndexEntry> {
        let entries = self.get(key);
        entries
            .iter()
            .find(|e| e.sheet == SheetKind::Commune)
            .or_else(|| entries.first())
            .copied()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parts_do_not_merge() {
        assert_ne!(IndexKey::new(&["an phu", "cu chi"]), IndexKey::new(&["an", "phu cu chi"]));
        assert_eq!(IndexKey::new(&["a", "b"]), IndexKey::new(&["a", "b"]));
    }

    #[test]
    fn test_preferred_takes_commune_sheet() {
        let mut index = ExactIndex::new();
        let key = IndexKey::new(&["an phu", "ho chi minh"]);
        index.insert(key.clone(), IndexEntry::hamlet(4));
        index.insert(key.clone(), IndexEntry::commune(9));
        index.insert(key.clone(), IndexEntry::commune(2));

        assert_eq!(index.get(&key).len(), 3);
        assert_eq!(index.preferred(&key), Some(IndexEntry::commune(9)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_preferred_falls_back_to_hamlet_sheet() {
        let mut index = ExactIndex::new();
        let key = IndexKey::new(&["long thoi"]);
        index.insert(key.clone(), IndexEntry::hamlet(1));
        index.insert(key.clone(), IndexEntry::hamlet(0));
        assert_eq!(index.preferred(&key), Some(IndexEntry::hamlet(1)));
    }

    #[test]
    fn test_missing_key() {
        let index = ExactIndex::new();
        let key = IndexKey::new(&["nowhere"]);
        assert!(index.get(&key).is_empty());
        assert_eq!(index.preferred(&key), None);
        assert!(index.is_empty());
    }
}
