//! Batch resolution
//!
//! Drives an [`AddressResolver`] over many rows: finds the address columns in
//! a header row, resolves rows in parallel while keeping their order, counts
//! completed rows for progress display, and stops between rows when
//! cancelled.

use crate::algorithms::partial_ratio;
use crate::error::ColumnLayoutError;
use crate::normalize::{validate_input, InputWarning};
use crate::resolver::{AddressResolver, Reason, Resolution};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, info};

/// Minimum input size for parallel processing.
///
/// For inputs smaller than this threshold, sequential processing is faster
/// due to the overhead of thread pool coordination.
pub const PARALLEL_THRESHOLD: usize = 100;

/// Smallest partial ratio at which a header counts as naming a column.
const HEADER_MATCH_MIN: f64 = 80.0;

const COMMUNE_HEADERS: &[&str] = &["xã", "xa", "phường", "phuong", "commune", "ward"];
const DISTRICT_HEADERS: &[&str] = &["huyện", "huyen", "quận", "quan", "district"];
const PROVINCE_HEADERS: &[&str] = &["tỉnh", "tinh", "thành phố", "province"];
const HAMLET_HEADERS: &[&str] = &[
    "ấp", "ap", "thôn", "thon", "thôn/ấp", "thon/ap", "khu phố", "khu pho", "hamlet",
];
const DETAIL_HEADERS: &[&str] = &[
    "địa chỉ",
    "dia chi",
    "địa chỉ chi tiết",
    "dia chi chi tiet",
    "address",
];

/// One input row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRow {
    pub commune: String,
    pub district: String,
    pub province: String,
    pub hamlet: Option<String>,
    pub detail: Option<String>,
}

impl InputRow {
    pub fn new(
        commune: impl Into<String>,
        district: impl Into<String>,
        province: impl Into<String>,
    ) -> Self {
        Self {
            commune: commune.into(),
            district: district.into(),
            province: province.into(),
            hamlet: None,
            detail: None,
        }
    }

    pub fn with_hamlet(mut self, hamlet: impl Into<String>) -> Self {
        self.hamlet = Some(hamlet.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Where the address fields sit in an input sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub commune: usize,
    pub district: usize,
    pub province: usize,
    pub hamlet: Option<usize>,
    pub detail: Option<usize>,
}

impl ColumnLayout {
    /// Find the address columns by fuzzy header match.
    ///
    /// Each column is claimed by at most one field; fields are assigned in
    /// the order commune, district, province, hamlet, detail.
    pub fn detect<S: AsRef<str>>(headers: &[S]) -> Result<Self, ColumnLayoutError> {
        let lowered: Vec<String> = headers
            .iter()
            .map(|h| h.as_ref().trim().to_lowercase())
            .collect();
        let mut taken = vec![false; lowered.len()];

        let mut claim = |keywords: &[&str]| -> Option<usize> {
            let pos = lowered.iter().enumerate().position(|(i, header)| {
                !taken[i]
                    && !header.is_empty()
                    && keywords
                        .iter()
                        .any(|k| partial_ratio(k, header) >= HEADER_MATCH_MIN)
            })?;
            taken[pos] = true;
            Some(pos)
        };

        let commune = claim(COMMUNE_HEADERS);
        let district = claim(DISTRICT_HEADERS);
        let province = claim(PROVINCE_HEADERS);
        let hamlet = claim(HAMLET_HEADERS);
        let detail = claim(DETAIL_HEADERS);

        match (commune, district, province) {
            (Some(commune), Some(district), Some(province)) => {
                debug!(commune, district, province, ?hamlet, ?detail, "input columns detected");
                Ok(Self {
                    commune,
                    district,
                    province,
                    hamlet,
                    detail,
                })
            }
            _ => {
                let missing = [
                    (commune, "commune"),
                    (district, "district"),
                    (province, "province"),
                ]
                .into_iter()
                .filter(|(pos, _)| pos.is_none())
                .map(|(_, name)| name)
                .collect();
                Err(ColumnLayoutError::MissingColumns { missing })
            }
        }
    }

    /// Pick the address fields out of one row of cells. Missing cells read
    /// as empty; blank optional cells become `None`.
    pub fn row<S: AsRef<str>>(&self, cells: &[S]) -> InputRow {
        let cell = |pos: usize| cells.get(pos).map_or("", |c| c.as_ref()).to_string();
        let optional = |pos: Option<usize>| {
            pos.map(cell).filter(|value| !value.trim().is_empty())
        };
        InputRow {
            commune: cell(self.commune),
            district: cell(self.district),
            province: cell(self.province),
            hamlet: optional(self.hamlet),
            detail: optional(self.detail),
        }
    }
}

/// Shared progress and cancellation state for one batch.
///
/// Another thread may read [`Self::completed`] or call [`Self::cancel`]
/// while the batch runs.
#[derive(Debug, Default)]
pub struct BatchProgress {
    completed: AtomicUsize,
    cancelled: AtomicBool,
}

impl BatchProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows resolved so far.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Stop the batch; rows not yet started are skipped.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Result for one processed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOutcome {
    pub resolution: Resolution,
    pub warnings: Vec<InputWarning>,
}

/// Outcome counts for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub processed: usize,
    pub resolved: usize,
    pub with_warnings: usize,
    pub by_reason: BTreeMap<Reason, usize>,
    pub cancelled: bool,
}

impl BatchSummary {
    fn tally(total: usize, outcomes: &[Option<RowOutcome>], cancelled: bool) -> Self {
        let mut summary = Self {
            total,
            cancelled,
            ..Self::default()
        };
        for outcome in outcomes.iter().flatten() {
            summary.processed += 1;
            if outcome.resolution.is_resolved() {
                summary.resolved += 1;
            }
            if !outcome.warnings.is_empty() {
                summary.with_warnings += 1;
            }
            *summary.by_reason.entry(outcome.resolution.reason).or_default() += 1;
        }
        summary
    }

    /// Share of processed rows that resolved, 0.0 - 1.0.
    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            self.resolved as f64 / self.processed as f64
        }
    }
}

/// Per-row outcomes, in input order, plus their summary.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// `None` for rows skipped after cancellation
    pub outcomes: Vec<Option<RowOutcome>>,
    pub summary: BatchSummary,
}

/// Resolve every row, in parallel for large inputs.
///
/// Output order matches input order. `progress` is incremented once per
/// finished row and checked before each row starts.
pub fn resolve_batch(
    resolver: &AddressResolver,
    rows: &[InputRow],
    progress: &BatchProgress,
) -> BatchReport {
    let resolve_one = |row: &InputRow| -> Option<RowOutcome> {
        if progress.is_cancelled() {
            return None;
        }
        let warnings = validate_input(&row.commune, &row.district, &row.province);
        let resolution = resolver.resolve(
            &row.commune,
            &row.district,
            &row.province,
            row.hamlet.as_deref(),
            row.detail.as_deref(),
        );
        progress.completed.fetch_add(1, Ordering::Relaxed);
        Some(RowOutcome {
            resolution,
            warnings,
        })
    };

    let outcomes: Vec<Option<RowOutcome>> = if rows.len() >= PARALLEL_THRESHOLD {
        rows.par_iter().map(resolve_one).collect()
    } else {
        rows.iter().map(resolve_one).collect()
    };

    let summary = BatchSummary::tally(rows.len(), &outcomes, progress.is_cancelled());
    info!(
        total = summary.total,
        processed = summary.processed,
        resolved = summary.resolved,
        cancelled = summary.cancelled,
        "batch finished"
    );
    BatchReport { outcomes, summary }
}
