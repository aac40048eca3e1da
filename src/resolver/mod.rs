//! Address resolution
//!
//! [`AddressResolver::resolve`] maps one pre-merger address onto its
//! post-merger equivalent. Branches are tried in a fixed order:
//!
//! 1. commune or province empty: [`Reason::MissingRequiredInput`]
//! 2. no district: the input is taken to be a post-merger address and
//!    matched against post-merger names only
//! 3. a hamlet is known (given, or found in the detailed address): the
//!    hamlet sheet is tried first; a miss falls through
//! 4. commune, district and province against both sheets, classifying the
//!    failure when nothing matches
//!
//! Each branch tries the exact index first, then scores candidates. Numbers
//! ("an phu 2", a bare "phuong 7") must match exactly before a candidate is
//! scored at all. Ties keep the earliest candidate, commune sheet before
//! hamlet sheet.
//!
//! Resolution reads one [`ReferenceSnapshot`] and never mutates it, so a
//! resolver can be shared freely across threads.

mod reason;
pub mod scoring;


pub use reason::Reason;

use crate::config::MatchConfig;
use crate::normalize::{
    extract_hamlet_from_free_text, normalize, strip_administrative_words, AddressField,
};
use crate::reference::{
    CommuneKey, CommuneRecord, HamletKey, IndexEntry, MatchKeys, ReferenceSnapshot, SheetKind,
};
use scoring::{gated, score_hamlet, weighted_total, FieldScore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, trace};

/// The outcome of resolving one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Matched record in display form, commune shape
    pub record: Option<CommuneRecord>,
    pub reason: Reason,
}

impl Resolution {
    fn matched(record: CommuneRecord, reason: Reason) -> Self {
        Self {
            record: Some(record),
            reason,
        }
    }

    fn failed(reason: Reason) -> Self {
        Self {
            record: None,
            reason,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.record.is_some()
    }

    /// `(old_commune, old_district, old_province, new_commune, new_province,
    /// reason)`, with empty strings for the fields of a failed row.
    pub fn to_tuple(&self) -> (String, String, String, String, String, String) {
        let reason = self.reason.as_str().to_string();
        match &self.record {
            Some(r) => (
                r.old_commune.clone(),
                r.old_district.clone(),
                r.old_province.clone(),
                r.new_commune.clone(),
                r.new_province.clone(),
                reason,
            ),
            None => (
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                reason,
            ),
        }
    }
}

/// Input fields reduced to matching form.
#[derive(Debug, Clone)]
struct Query {
    commune: CommuneKey,
    district: String,
    province: String,
    hamlet: Option<HamletKey>,
}

impl Query {
    fn new(
        commune: &str,
        district: &str,
        province: &str,
        hamlet: Option<&str>,
        detail: Option<&str>,
    ) -> Self {
        Self {
            commune: CommuneKey::from_normalized(&normalize(commune)),
            district: strip_administrative_words(&normalize(district)),
            province: strip_administrative_words(&normalize(province)),
            hamlet: hamlet_key(hamlet, detail),
        }
    }
}

/// The hamlet given directly, else the one named in the detailed address.
fn hamlet_key(hamlet: Option<&str>, detail: Option<&str>) -> Option<HamletKey> {
    let text = match hamlet.map(str::trim).filter(|h| !h.is_empty()) {
        Some(hamlet) => normalize(hamlet),
        None => normalize(&extract_hamlet_from_free_text(detail?)?),
    };
    let key = HamletKey::from_normalized(&text);
    (!key.is_empty()).then_some(key)
}

/// Highest-scoring candidate so far; ties keep the earlier one.
#[derive(Debug, Clone, Copy)]
struct Best {
    entry: IndexEntry,
    score: f64,
}

fn pick_best<T, I, F>(candidates: I, score: F) -> Option<Best>
where
    I: Iterator<Item = (IndexEntry, T)>,
    F: Fn(T) -> Option<f64>,
{
    let mut best: Option<Best> = None;
    for (entry, candidate) in candidates {
        let Some(total) = score(candidate) else {
            continue;
        };
        trace!(sheet = %entry.sheet, index = entry.index, total, "candidate scored");
        if best.map_or(true, |b| total > b.score) {
            best = Some(Best {
                entry,
                score: total,
            });
        }
    }
    best
}

/// Resolves addresses against one reference snapshot.
#[derive(Debug, Clone)]
pub struct AddressResolver {
    snapshot: Arc<ReferenceSnapshot>,
    config: MatchConfig,
}

impl AddressResolver {
    pub fn new(snapshot: Arc<ReferenceSnapshot>, config: MatchConfig) -> Self {
        Self { snapshot, config }
    }

    pub fn snapshot(&self) -> &Arc<ReferenceSnapshot> {
        &self.snapshot
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Resolve one address. Never fails; see [`Reason`] for the outcomes.
    pub fn resolve(
        &self,
        commune: &str,
        district: &str,
        province: &str,
        hamlet: Option<&str>,
        detail: Option<&str>,
    ) -> Resolution {
        let query = Query::new(commune, district, province, hamlet, detail);

        if query.commune.full().is_empty() || query.province.is_empty() {
            debug!(commune, province, "missing required input");
            return Resolution::failed(Reason::MissingRequiredInput);
        }

        if query.district.is_empty() {
            return self.resolve_new_address(&query);
        }

        if let Some(hamlet) = &query.hamlet {
            if let Some(resolution) = self.resolve_hamlet(&query, hamlet) {
                return resolution;
            }
        }

        self.resolve_full_address(&query)
    }

    /// Entries always come from this resolver's own snapshot, so the record
    /// exists; a stale entry would read as no match.
    fn found(&self, entry: IndexEntry, reason: Reason) -> Resolution {
        let record = self.snapshot.record(entry);
        debug_assert!(record.is_some(), "index entry outside its snapshot: {entry:?}");
        match record {
            Some(record) => Resolution::matched(record.to_commune_record(), reason),
            None => Resolution::failed(Reason::NoMatch),
        }
    }

    fn resolve_new_address(&self, query: &Query) -> Resolution {
        let commune = query.commune.full();
        if let Some(entry) = self.snapshot.lookup_new(&commune, &query.province) {
            debug!(commune = %commune, sheet = %entry.sheet, "exact post-merger match");
            return self.found(entry, Reason::NewAddressUnchanged);
        }

        let thresholds = &self.config.thresholds;
        let weights = &self.config.weights.new_address;
        let scale = self.config.token_sort_scale;

        let best = pick_best(self.snapshot.candidates(), |keys: &MatchKeys| {
            if keys.new_commune.number != query.commune.number {
                return None;
            }
            let scores = [
                gated(
                    AddressField::Commune,
                    query.commune.name(),
                    keys.new_commune.name(),
                    thresholds.new_commune_min,
                    weights.commune,
                    scale,
                )?,
                gated(
                    AddressField::Province,
                    &query.province,
                    &keys.new_province,
                    thresholds.new_province_min,
                    weights.province,
                    scale,
                )?,
            ];
            Some(weighted_total(&scores))
        });

        match best {
            Some(best) if best.score >= thresholds.total_min => {
                debug!(score = best.score, sheet = %best.entry.sheet, "fuzzy post-merger match");
                self.found(best.entry, Reason::NewAddressUnchanged)
            }
            _ => {
                debug!(commune = %commune, province = %query.province, "no post-merger match");
                Resolution::failed(Reason::NewAddressNotFound)
            }
        }
    }

    fn resolve_hamlet(&self, query: &Query, hamlet: &HamletKey) -> Option<Resolution> {
        let commune = query.commune.full();
        if let Some(entry) =
            self.snapshot
                .lookup_hamlet(&hamlet.key, &commune, &query.district, &query.province)
        {
            debug!(hamlet = %hamlet.key, "exact hamlet match");
            return Some(self.found(entry, Reason::Resolved));
        }

        let thresholds = &self.config.thresholds;
        let weights = &self.config.weights.hamlet;
        let scale = self.config.token_sort_scale;
        let number_exact = self.config.hamlet_number_exact;

        let candidates = self
            .snapshot
            .hamlet_candidates()
            .map(|(i, keys, name)| (IndexEntry::hamlet(i), (keys, name)));

        let best = pick_best(candidates, |(keys, name): (&MatchKeys, &HamletKey)| {
            if keys.commune.number != query.commune.number {
                return None;
            }
            let hamlet_score = score_hamlet(hamlet, name, number_exact, scale);
            if hamlet_score < thresholds.hamlet_min {
                return None;
            }
            let scores = [
                FieldScore::new(AddressField::Hamlet, hamlet_score, weights.hamlet),
                gated(
                    AddressField::Commune,
                    query.commune.name(),
                    keys.commune.name(),
                    thresholds.commune_min,
                    weights.commune,
                    scale,
                )?,
                gated(
                    AddressField::District,
                    &query.district,
                    &keys.district,
                    thresholds.district_min,
                    weights.district,
                    scale,
                )?,
                gated(
                    AddressField::Province,
                    &query.province,
                    &keys.province,
                    thresholds.province_min,
                    weights.province,
                    scale,
                )?,
            ];
            Some(weighted_total(&scores))
        });

        match best {
            Some(best) if best.score >= thresholds.total_min => {
                debug!(score = best.score, hamlet = %hamlet.key, "fuzzy hamlet match");
                Some(self.found(best.entry, Reason::Resolved))
            }
            _ => {
                debug!(hamlet = %hamlet.key, "no hamlet match, trying commune level");
                None
            }
        }
    }

    fn resolve_full_address(&self, query: &Query) -> Resolution {
        let by_sheet = |entry: IndexEntry| match entry.sheet {
            SheetKind::Commune => Reason::Resolved,
            SheetKind::Hamlet => Reason::CommuneSplit,
        };

        let commune = query.commune.full();
        if let Some(entry) = self
            .snapshot
            .lookup_old(&commune, &query.district, &query.province)
        {
            debug!(commune = %commune, sheet = %entry.sheet, "exact match");
            return self.found(entry, by_sheet(entry));
        }

        let thresholds = &self.config.thresholds;
        let weights = &self.config.weights.full_address;
        let scale = self.config.token_sort_scale;
        let tolerance = self.config.commune_length_tolerance;

        let best = pick_best(self.snapshot.candidates(), |keys: &MatchKeys| {
            if keys.commune.number != query.commune.number
                || keys.commune.word_len.abs_diff(query.commune.word_len) > tolerance
            {
                return None;
            }
            let scores = [
                gated(
                    AddressField::Commune,
                    query.commune.name(),
                    keys.commune.name(),
                    thresholds.commune_min,
                    weights.commune,
                    scale,
                )?,
                gated(
                    AddressField::District,
                    &query.district,
                    &keys.district,
                    thresholds.district_min,
                    weights.district,
                    scale,
                )?,
                gated(
                    AddressField::Province,
                    &query.province,
                    &keys.province,
                    thresholds.province_min,
                    weights.province,
                    scale,
                )?,
            ];
            Some(weighted_total(&scores))
        });

        match best {
            Some(best) if best.score >= thresholds.total_min => {
                debug!(score = best.score, sheet = %best.entry.sheet, "fuzzy match");
                self.found(best.entry, by_sheet(best.entry))
            }
            _ => {
                let reason = self.classify_failure(query);
                debug!(commune = %commune, district = %query.district, province = %query.province, %reason, "unresolved");
                Resolution::failed(reason)
            }
        }
    }

    /// Name the first input field that occurs nowhere in the reference data.
    fn classify_failure(&self, query: &Query) -> Reason {
        if !self.snapshot.knows_commune(query.commune.name()) {
            Reason::CommuneNotFound
        } else if !self.snapshot.knows_district(&query.district) {
            Reason::DistrictNotFound
        } else if !self.snapshot.knows_province(&query.province) {
            Reason::ProvinceNotFound
        } else {
            Reason::NoMatch
        }
    }
}
