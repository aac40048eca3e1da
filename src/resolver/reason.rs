//! Outcome classification for a single row.

use serde::Serialize;
use std::fmt;

/// Why a row resolved the way it did.
///
/// The first three variants carry a record; the rest are row-local failures
/// reported as data so a batch keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Reason {
    /// Matched on pre-merger fields
    Resolved,
    /// Input already used post-merger names
    NewAddressUnchanged,
    /// Matched through a hamlet-level record of a commune that was split;
    /// worth a manual check
    CommuneSplit,
    /// Commune or province is empty after normalization
    MissingRequiredInput,
    /// No district given and no post-merger record matched
    NewAddressNotFound,
    CommuneNotFound,
    DistrictNotFound,
    ProvinceNotFound,
    /// Every field exists somewhere, but no record matches the combination
    NoMatch,
}

impl Reason {
    pub const ALL: [Reason; 9] = [
        Reason::Resolved,
        Reason::NewAddressUnchanged,
        Reason::CommuneSplit,
        Reason::MissingRequiredInput,
        Reason::NewAddressNotFound,
        Reason::CommuneNotFound,
        Reason::DistrictNotFound,
        Reason::ProvinceNotFound,
        Reason::NoMatch,
    ];

    /// Text written to the reason column; empty for a plain success.
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::Resolved => "",
            Reason::NewAddressUnchanged => "new address, left unchanged",
            Reason::CommuneSplit => "commune split, verify manually",
            Reason::MissingRequiredInput => "MissingRequiredInput",
            Reason::NewAddressNotFound => "NewAddressNotFound",
            Reason::CommuneNotFound => "CommuneNotFound",
            Reason::DistrictNotFound => "DistrictNotFound",
            Reason::ProvinceNotFound => "ProvinceNotFound",
            Reason::NoMatch => "NoMatch",
        }
    }

    /// Whether the outcome carries a resolved record.
    pub fn is_resolved(&self) -> bool {
        matches!(
            self,
            Reason::Resolved | Reason::NewAddressUnchanged | Reason::CommuneSplit
        )
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strings() {
        assert_eq!(Reason::Resolved.as_str(), "");
        assert_eq!(Reason::NewAddressUnchanged.to_string(), "new address, left unchanged");
        assert_eq!(Reason::CommuneNotFound.to_string(), "CommuneNotFound");
    }

    #[test]
    fn test_resolved_partition() {
        let resolved: Vec<_> = Reason::ALL.iter().filter(|r| r.is_resolved()).collect();
        assert_eq!(resolved.len(), 3);
        assert!(!Reason::NoMatch.is_resolved());
    }
}
