//! Reference record shapes.
//!
//! The commune sheet maps `(commune, district, province)` to
//! `(commune, province)`; the hamlet sheet adds a hamlet on both sides.
//! Results are always reported in the commune shape.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which reference sheet a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SheetKind {
    /// Commune-level records (first sheet)
    Commune,
    /// Hamlet-level records (second sheet)
    Hamlet,
}

impl SheetKind {
    pub fn name(&self) -> &'static str {
        match self {
            SheetKind::Commune => "commune",
            SheetKind::Hamlet => "hamlet",
        }
    }
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the commune sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommuneRecord {
    pub old_commune: String,
    pub old_district: String,
    pub old_province: String,
    pub new_commune: String,
    pub new_province: String,
}

impl CommuneRecord {
    pub fn new(
        old_commune: impl Into<String>,
        old_district: impl Into<String>,
        old_province: impl Into<String>,
        new_commune: impl Into<String>,
        new_province: impl Into<String>,
    ) -> Self {
        Self {
            old_commune: old_commune.into(),
            old_district: old_district.into(),
            old_province: old_province.into(),
            new_commune: new_commune.into(),
            new_province: new_province.into(),
        }
    }

    /// Apply `f` to every field.
    pub(crate) fn map_fields(&self, f: impl Fn(&str) -> String) -> Self {
        Self {
            old_commune: f(&self.old_commune),
            old_district: f(&self.old_district),
            old_province: f(&self.old_province),
            new_commune: f(&self.new_commune),
            new_province: f(&self.new_province),
        }
    }
}

/// One row of the hamlet sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HamletRecord {
    pub old_hamlet: String,
    pub old_commune: String,
    pub old_district: String,
    pub old_province: String,
    pub new_hamlet: String,
    pub new_commune: String,
    pub new_province: String,
}

impl HamletRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        old_hamlet: impl Into<String>,
        old_commune: impl Into<String>,
        old_district: impl Into<String>,
        old_province: impl Into<String>,
        new_hamlet: impl Into<String>,
        new_commune: impl Into<String>,
        new_province: impl Into<String>,
    ) -> Self {
        Self {
            old_hamlet: old_hamlet.into(),
            old_commune: old_commune.into(),
            old_district: old_district.into(),
            old_province: old_province.into(),
            new_hamlet: new_hamlet.into(),
            new_commune: new_commune.into(),
            new_province: new_province.into(),
        }
    }

    /// The commune-shaped view of this record; both hamlet fields are dropped.
    pub fn to_commune_record(&self) -> CommuneRecord {
        CommuneRecord {
            old_commune: self.old_commune.clone(),
            old_district: self.old_district.clone(),
            old_province: self.old_province.clone(),
            new_commune: self.new_commune.clone(),
            new_province: self.new_province.clone(),
        }
    }

    pub(crate) fn map_fields(&self, f: impl Fn(&str) -> String) -> Self {
        Self {
            old_hamlet: f(&self.old_hamlet),
            old_commune: f(&self.old_commune),
            old_district: f(&self.old_district),
            old_province: f(&self.old_province),
            new_hamlet: f(&self.new_hamlet),
            new_commune: f(&self.new_commune),
            new_province: f(&self.new_province),
        }
    }
}

impl From<&HamletRecord> for CommuneRecord {
    fn from(record: &HamletRecord) -> Self {
        record.to_commune_record()
    }
}

/// A borrowed record from either sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceRecord<'a> {
    Commune(&'a CommuneRecord),
    Hamlet(&'a HamletRecord),
}

impl ReferenceRecord<'_> {
    pub fn sheet(&self) -> SheetKind {
        match self {
            ReferenceRecord::Commune(_) => SheetKind::Commune,
            ReferenceRecord::Hamlet(_) => SheetKind::Hamlet,
        }
    }

    pub fn to_commune_record(&self) -> CommuneRecord {
        match self {
            ReferenceRecord::Commune(record) => (*record).clone(),
            ReferenceRecord::Hamlet(record) => record.to_commune_record(),
        }
    }
}
