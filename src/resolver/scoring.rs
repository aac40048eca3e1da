//! Per-field scores and their weighted combination.
//!
//! Every field is scored on the 0-100 scale by [`field_score`] (best of the
//! full, partial and scaled token-sort ratios), except hamlets, which follow
//! [`score_hamlet`].

use crate::algorithms::{field_score, partial_ratio, ratio};
use crate::normalize::AddressField;
use crate::reference::HamletKey;

/// One field's score with the weight it carries in the total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldScore {
    pub field: AddressField,
    /// Similarity (0 - 100)
    pub score: f64,
    pub weight: f64,
}

impl FieldScore {
    pub fn new(field: AddressField, score: f64, weight: f64) -> Self {
        Self {
            field,
            score: score.clamp(0.0, 100.0),
            weight: weight.max(0.0),
        }
    }

    /// Get the weighted score (score × weight)
    pub fn weighted_score(&self) -> f64 {
        self.score * self.weight
    }
}

/// Weighted average of field scores.
///
/// Formula: Σ(score_i × weight_i) / Σ(weight_i)
pub fn weighted_total(field_scores: &[FieldScore]) -> f64 {
    let mut total_weighted_score = 0.0;
    let mut total_weight = 0.0;

    for field_score in field_scores {
        if field_score.weight > 0.0 {
            total_weighted_score += field_score.weighted_score();
            total_weight += field_score.weight;
        }
    }

    if total_weight > 0.0 {
        (total_weighted_score / total_weight).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Score a field and check it against its minimum in one step.
///
/// Returns `None` when the score falls below `min`, so candidate loops can
/// bail out with `?` before computing the remaining fields.
#[inline]
pub fn gated(
    field: AddressField,
    input: &str,
    candidate: &str,
    min: f64,
    weight: f64,
    token_sort_scale: f64,
) -> Option<FieldScore> {
    let score = field_score(input, candidate, token_sort_scale);
    (score >= min).then(|| FieldScore::new(field, score, weight))
}

/// Score two hamlets.
///
/// - both numeric-coded ("khu pho 2", "ap 03"), with `number_exact`: 100 on
///   equal numbers, 0 otherwise
/// - same keyword with text values: best of ratio and partial ratio on the
///   values alone
/// - anything else: [`field_score`] on the whole keys
pub fn score_hamlet(
    input: &HamletKey,
    candidate: &HamletKey,
    number_exact: bool,
    token_sort_scale: f64,
) -> f64 {
    if input.is_empty() || candidate.is_empty() {
        return 0.0;
    }

    if let (Some(a), Some(b)) = (&input.code, &candidate.code) {
        if number_exact {
            if let (Some(x), Some(y)) = (a.number(), b.number()) {
                return if x == y { 100.0 } else { 0.0 };
            }
        }
        if a.keyword == b.keyword {
            return ratio(&a.value, &b.value).max(partial_ratio(&a.value, &b.value));
        }
    }

    field_score(&input.key, &candidate.key, token_sort_scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::DEFAULT_TOKEN_SORT_SCALE;

    fn hamlet(text: &str) -> HamletKey {
        HamletKey::from_normalized(text)
    }

    #[test]
    fn test_field_score_clamping() {
        let score = FieldScore::new(AddressField::Commune, 150.0, -1.0);
        assert_eq!(score.score, 100.0);
        assert_eq!(score.weight, 0.0);
    }

    #[test]
    fn test_weighted_total() {
        let scores = [
            FieldScore::new(AddressField::Commune, 100.0, 0.5),
            FieldScore::new(AddressField::District, 80.0, 0.3),
            FieldScore::new(AddressField::Province, 60.0, 0.2),
        ];
        assert!((weighted_total(&scores) - 86.0).abs() < 1e-9);
        assert_eq!(weighted_total(&[]), 0.0);
    }

    #[test]
    fn test_gated_rejects_below_minimum() {
        let s = DEFAULT_TOKEN_SORT_SCALE;
        assert!(gated(AddressField::Commune, "an phu", "an phu", 85.0, 0.5, s).is_some());
        assert!(gated(AddressField::Commune, "an phu", "long thoi", 85.0, 0.5, s).is_none());
    }

    #[test]
    fn test_numeric_hamlets_are_binary() {
        let s = DEFAULT_TOKEN_SORT_SCALE;
        assert_eq!(score_hamlet(&hamlet("kp 2"), &hamlet("khu pho 2"), true, s), 100.0);
        assert_eq!(score_hamlet(&hamlet("kp 2"), &hamlet("kp 12"), true, s), 0.0);
        assert_eq!(score_hamlet(&hamlet("ap 1"), &hamlet("ap 11"), true, s), 0.0);
    }

    #[test]
    fn test_numeric_hamlets_fuzzy_when_not_exact() {
        let s = DEFAULT_TOKEN_SORT_SCALE;
        // same keyword: values compared directly, "2" inside "12"
        assert_eq!(score_hamlet(&hamlet("kp 2"), &hamlet("kp 12"), false, s), 100.0);
    }

    #[test]
    fn test_text_hamlets_compare_values() {
        let s = DEFAULT_TOKEN_SORT_SCALE;
        assert_eq!(
            score_hamlet(&hamlet("ap binh loi"), &hamlet("ap binh loi"), true, s),
            100.0
        );
        assert!(score_hamlet(&hamlet("ap binh loi"), &hamlet("ap tan hoa"), true, s) < 75.0);
    }

    #[test]
    fn test_hamlet_fallback_and_empty() {
        let s = DEFAULT_TOKEN_SORT_SCALE;
        assert_eq!(score_hamlet(&hamlet("binh loi"), &hamlet("ap binh loi"), true, s), 100.0);
        assert_eq!(score_hamlet(&hamlet(""), &hamlet("ap 1"), true, s), 0.0);
    }
}
