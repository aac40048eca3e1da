//! Immutable reference data with its derived indexes.

use super::index::{ExactIndex, IndexEntry, IndexKey};
use super::keys::{HamletKey, MatchKeys};
use super::record::{CommuneRecord, HamletRecord, ReferenceRecord, SheetKind};
use super::table::RawTable;
use crate::error::SchemaError;
use crate::normalize::{normalize, strip_administrative_words};
use ahash::AHashSet;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::info;

/// Size figures for a loaded snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotStats {
    pub commune_records: usize,
    pub hamlet_records: usize,
    pub old_address_keys: usize,
    pub new_address_keys: usize,
    pub hamlet_keys: usize,
    pub known_provinces: usize,
}

/// Every normalized value that occurs anywhere in either sheet, used to
/// classify failed matches.
#[derive(Debug, Clone, Default)]
struct KnownValues {
    commune_words: AHashSet<String>,
    districts: AHashSet<String>,
    provinces: AHashSet<String>,
}

impl KnownValues {
    fn observe(&mut self, keys: &MatchKeys) {
        self.commune_words.insert(keys.commune.name().to_string());
        self.districts.insert(keys.district.clone());
        self.provinces.insert(keys.province.clone());
    }
}

/// One complete, consistent set of reference data.
///
/// Display records and their normalized twins are index-aligned and never
/// reordered. A snapshot is never mutated after construction; reloading
/// builds a new one.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSnapshot {
    communes: Vec<CommuneRecord>,
    communes_normalized: Vec<CommuneRecord>,
    commune_keys: Vec<MatchKeys>,

    hamlets: Vec<HamletRecord>,
    hamlets_normalized: Vec<HamletRecord>,
    hamlet_keys: Vec<MatchKeys>,
    hamlet_names: Vec<HamletKey>,

    old_index: ExactIndex,
    new_index: ExactIndex,
    hamlet_index: ExactIndex,

    known: KnownValues,
}

impl ReferenceSnapshot {
    /// Load both sheets. Fails if either lacks a required column.
    pub fn load(communes: &RawTable, hamlets: &RawTable) -> Result<Self, SchemaError> {
        let communes = communes.commune_records()?;
        let hamlets = hamlets.hamlet_records()?;
        Ok(Self::from_records(communes, hamlets))
    }

    /// Build a snapshot from already-parsed records.
    pub fn from_records(communes: Vec<CommuneRecord>, hamlets: Vec<HamletRecord>) -> Self {
        let communes_normalized: Vec<CommuneRecord> =
            communes.par_iter().map(|r| r.map_fields(normalize)).collect();
        let hamlets_normalized: Vec<HamletRecord> =
            hamlets.par_iter().map(|r| r.map_fields(normalize)).collect();

        let commune_keys: Vec<MatchKeys> = communes_normalized
            .par_iter()
            .map(|r| {
                MatchKeys::from_normalized(
                    &r.old_commune,
                    &r.old_district,
                    &r.old_province,
                    &r.new_commune,
                    &r.new_province,
                )
            })
            .collect();
        let hamlet_keys: Vec<MatchKeys> = hamlets_normalized
            .par_iter()
            .map(|r| {
                MatchKeys::from_normalized(
                    &r.old_commune,
                    &r.old_district,
                    &r.old_province,
                    &r.new_commune,
                    &r.new_province,
                )
            })
            .collect();
        let hamlet_names: Vec<HamletKey> = hamlets_normalized
            .par_iter()
            .map(|r| HamletKey::from_normalized(&r.old_hamlet))
            .collect();

        let mut old_index = ExactIndex::new();
        let mut new_index = ExactIndex::new();
        let mut hamlet_index = ExactIndex::new();
        let mut known = KnownValues::default();

        for (i, keys) in commune_keys.iter().enumerate() {
            let entry = IndexEntry::commune(i);
            old_index.insert(old_address_key(keys), entry);
            new_index.insert(new_address_key(keys), entry);
            known.observe(keys);
        }
        for (i, (keys, hamlet)) in hamlet_keys.iter().zip(&hamlet_names).enumerate() {
            let entry = IndexEntry::hamlet(i);
            old_index.insert(old_address_key(keys), entry);
            new_index.insert(new_address_key(keys), entry);
            hamlet_index.insert(
                IndexKey::new(&[&hamlet.key, &keys.commune.full(), &keys.district, &keys.province]),
                entry,
            );
            known.observe(keys);
        }

        let snapshot = Self {
            communes,
            communes_normalized,
            commune_keys,
            hamlets,
            hamlets_normalized,
            hamlet_keys,
            hamlet_names,
            old_index,
            new_index,
            hamlet_index,
            known,
        };

        let stats = snapshot.stats();
        info!(
            commune_records = stats.commune_records,
            hamlet_records = stats.hamlet_records,
            old_address_keys = stats.old_address_keys,
            new_address_keys = stats.new_address_keys,
            hamlet_keys = stats.hamlet_keys,
            "reference snapshot built"
        );
        snapshot
    }

    /// Display records of the commune sheet.
    pub fn communes(&self) -> &[CommuneRecord] {
        &self.communes
    }

    /// Normalized records of the commune sheet, aligned with [`Self::communes`].
    pub fn communes_normalized(&self) -> &[CommuneRecord] {
        &self.communes_normalized
    }

    /// Display records of the hamlet sheet.
    pub fn hamlets(&self) -> &[HamletRecord] {
        &self.hamlets
    }

    /// Normalized records of the hamlet sheet, aligned with [`Self::hamlets`].
    pub fn hamlets_normalized(&self) -> &[HamletRecord] {
        &self.hamlets_normalized
    }

    pub fn is_empty(&self) -> bool {
        self.communes.is_empty() && self.hamlets.is_empty()
    }

    /// The display record behind an index entry.
    pub fn record(&self, entry: IndexEntry) -> Option<ReferenceRecord<'_>> {
        match entry.sheet {
            SheetKind::Commune => self.communes.get(entry.index).map(ReferenceRecord::Commune),
            SheetKind::Hamlet => self.hamlets.get(entry.index).map(ReferenceRecord::Hamlet),
        }
    }

    /// Matching keys of the record behind an index entry.
    pub fn match_keys(&self, entry: IndexEntry) -> Option<&MatchKeys> {
        match entry.sheet {
            SheetKind::Commune => self.commune_keys.get(entry.index),
            SheetKind::Hamlet => self.hamlet_keys.get(entry.index),
        }
    }

    /// Every record of both sheets with its keys, commune sheet first.
    pub fn candidates(&self) -> impl Iterator<Item = (IndexEntry, &MatchKeys)> + '_ {
        let communes = self
            .commune_keys
            .iter()
            .enumerate()
            .map(|(i, keys)| (IndexEntry::commune(i), keys));
        let hamlets = self
            .hamlet_keys
            .iter()
            .enumerate()
            .map(|(i, keys)| (IndexEntry::hamlet(i), keys));
        communes.chain(hamlets)
    }

    /// Hamlet-sheet records with their commune-shape keys and hamlet key.
    pub fn hamlet_candidates(&self) -> impl Iterator<Item = (usize, &MatchKeys, &HamletKey)> + '_ {
        self.hamlet_keys
            .iter()
            .zip(&self.hamlet_names)
            .enumerate()
            .map(|(i, (keys, hamlet))| (i, keys, hamlet))
    }

    /// Exact lookup on a pre-merger commune, district and province, all
    /// already stripped of administrative words.
    pub fn lookup_old(&self, commune: &str, district: &str, province: &str) -> Option<IndexEntry> {
        self.old_index
            .preferred(&IndexKey::new(&[commune, district, province]))
    }

    /// Exact lookup on a post-merger commune and province.
    pub fn lookup_new(&self, commune: &str, province: &str) -> Option<IndexEntry> {
        self.new_index.preferred(&IndexKey::new(&[commune, province]))
    }

    /// Exact lookup on a hamlet key plus its pre-merger commune, district and
    /// province.
    pub fn lookup_hamlet(
        &self,
        hamlet: &str,
        commune: &str,
        district: &str,
        province: &str,
    ) -> Option<IndexEntry> {
        self.hamlet_index
            .get(&IndexKey::new(&[hamlet, commune, district, province]))
            .first()
            .copied()
    }

    /// Whether a commune name part occurs in either sheet.
    pub fn knows_commune(&self, word: &str) -> bool {
        self.known.commune_words.contains(word)
    }

    pub fn knows_district(&self, district: &str) -> bool {
        self.known.districts.contains(district)
    }

    pub fn knows_province(&self, province: &str) -> bool {
        self.known.provinces.contains(province)
    }

    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            commune_records: self.communes.len(),
            hamlet_records: self.hamlets.len(),
            old_address_keys: self.old_index.len(),
            new_address_keys: self.new_index.len(),
            hamlet_keys: self.hamlet_index.len(),
            known_provinces: self.known.provinces.len(),
        }
    }

    /// Distinct non-empty province names, pre- and post-merger, as displayed.
    pub fn provinces(&self) -> Vec<String> {
        let communes = self
            .communes
            .iter()
            .flat_map(|r| [r.old_province.as_str(), r.new_province.as_str()]);
        let hamlets = self
            .hamlets
            .iter()
            .flat_map(|r| [r.old_province.as_str(), r.new_province.as_str()]);

        communes
            .chain(hamlets)
            .filter(|p| !p.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Records whose old or new province matches `province` after
    /// normalization.
    pub fn records_for_province(&self, province: &str) -> Vec<ReferenceRecord<'_>> {
        let wanted = strip_administrative_words(&normalize(province));
        if wanted.is_empty() {
            return Vec::new();
        }
        let hit = |keys: &MatchKeys| keys.province == wanted || keys.new_province == wanted;

        self.candidates()
            .filter(|(_, keys)| hit(keys))
            .filter_map(|(entry, _)| self.record(entry))
            .collect()
    }
}

fn old_address_key(keys: &MatchKeys) -> IndexKey {
    IndexKey::new(&[&keys.commune.full(), &keys.district, &keys.province])
}

fn new_address_key(keys: &MatchKeys) -> IndexKey {
    IndexKey::new(&[&keys.new_commune.full(), &keys.new_province])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ReferenceSnapshot {
        ReferenceSnapshot::from_records(
            vec![
                CommuneRecord::new("Xã An Phú", "Huyện Củ Chi", "TP.HCM", "Xã An Phú", "Hồ Chí Minh"),
                CommuneRecord::new("Phường 07", "Quận 3", "Hồ Chí Minh", "Phường Bến Thành", "Hồ Chí Minh"),
                CommuneRecord::new("Xã Mỹ Hạnh", "Đức Hòa", "Long An", "Xã Mỹ Hạnh", "Tây Ninh"),
            ],
            vec![HamletRecord::new(
                "KP 2",
                "Long Thới",
                "Nhà Bè",
                "Hồ Chí Minh",
                "KP 2",
                "Nhà Bè",
                "Hồ Chí Minh",
            )],
        )
    }

    #[test]
    fn test_sequences_stay_aligned() {
        let snapshot = sample();
        assert_eq!(snapshot.communes().len(), snapshot.communes_normalized().len());
        assert_eq!(snapshot.communes()[1].old_commune, "Phường 07");
        assert_eq!(snapshot.communes_normalized()[1].old_commune, "phuong 7");
        assert_eq!(snapshot.hamlets_normalized()[0].old_hamlet, "kp 2");
    }

    #[test]
    fn test_exact_lookups() {
        let snapshot = sample();
        assert_eq!(
            snapshot.lookup_old("an phu", "cu chi", "thanh pho ho chi minh"),
            Some(IndexEntry::commune(0))
        );
        assert_eq!(snapshot.lookup_new("ben thanh", "ho chi minh"), Some(IndexEntry::commune(1)));
        assert_eq!(
            snapshot.lookup_hamlet("khu pho 2", "long thoi", "nha be", "ho chi minh"),
            Some(IndexEntry::hamlet(0))
        );
        assert_eq!(snapshot.lookup_old("an phu", "nha be", "ho chi minh"), None);
    }

    #[test]
    fn test_hamlet_rows_join_commune_indexes() {
        let snapshot = sample();
        assert_eq!(
            snapshot.lookup_old("long thoi", "nha be", "ho chi minh"),
            Some(IndexEntry::hamlet(0))
        );
    }

    #[test]
    fn test_known_values() {
        let snapshot = sample();
        assert!(snapshot.knows_commune("an phu"));
        assert!(snapshot.knows_commune("long thoi"));
        assert!(snapshot.knows_commune("7"));
        assert!(!snapshot.knows_commune(""));
        assert!(snapshot.knows_district("đuc hoa"));
        assert!(snapshot.knows_province("long an"));
        assert!(!snapshot.knows_province("tay ninh"));
    }

    #[test]
    fn test_stats() {
        let stats = sample().stats();
        assert_eq!(stats.commune_records, 3);
        assert_eq!(stats.hamlet_records, 1);
        assert_eq!(stats.old_address_keys, 4);
        assert_eq!(stats.hamlet_keys, 1);
    }

    #[test]
    fn test_provinces_sorted_unique() {
        let provinces = sample().provinces();
        assert_eq!(provinces, vec!["Hồ Chí Minh", "Long An", "TP.HCM", "Tây Ninh"]);
    }

    #[test]
    fn test_records_for_province() {
        let snapshot = sample();
        let records = snapshot.records_for_province("Tỉnh Tây Ninh");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].to_commune_record().old_commune, "Xã Mỹ Hạnh");

        assert_eq!(snapshot.records_for_province("Hồ Chí Minh").len(), 3);
        assert!(snapshot.records_for_province("").is_empty());
    }

    #[test]
    fn test_load_reports_schema_error() {
        let communes = RawTable::from_slices(&["xacu", "huyencu", "tinhcu", "xamoi", "tinhmoi"], &[]);
        let hamlets = RawTable::from_slices(&["apcu"], &[]);
        let err = ReferenceSnapshot::load(&communes, &hamlets).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::MissingColumns {
                sheet: SheetKind::Hamlet,
                ..
            }
        ));
    }
}
