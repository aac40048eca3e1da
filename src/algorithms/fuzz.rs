//! Fuzzy ratios used to score address fields.
//!
//! All ratios are whole percentages in `[0, 100]`:
//! - `ratio`: indel similarity of the full strings
//! - `partial_ratio`: best substring match ratio
//! - `token_sort_ratio`: order-insensitive comparison
//! - `field_score`: the maximum of the three, used for every address field
//!
//! Every ratio is rounded to a whole percentage so that thresholds compare
//! against exactly the values an operator sees in a report.
//!
//! # Performance
//!
//! `partial_ratio` slides the shorter string across the longer string by
//! comparing char slices directly, never allocating a `String` per window.

use super::lcs::indel_similarity_chars;
use smallvec::SmallVec;

/// Scale applied to `token_sort_ratio` inside [`field_score`].
///
/// Token reordering is a weaker signal than a direct match, so it can never
/// outrank an equally good direct comparison.
pub const DEFAULT_TOKEN_SORT_SCALE: f64 = 0.9;

#[inline]
fn to_percent(similarity: f64) -> f64 {
    (similarity * 100.0).round()
}

/// Compute the basic similarity ratio between two strings.
///
/// Returns 0 when either string is empty.
///
/// # Examples
/// ```
/// use addrmerge::algorithms::fuzz::ratio;
/// assert_eq!(ratio("an phu", "an phu"), 100.0);
/// assert_eq!(ratio("an phu", ""), 0.0);
/// ```
#[must_use]
pub fn ratio(s1: &str, s2: &str) -> f64 {
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }
    let a: SmallVec<[char; 64]> = s1.chars().collect();
    let b: SmallVec<[char; 64]> = s2.chars().collect();
    to_percent(indel_similarity_chars(&a, &b))
}

/// Compute the best partial match ratio between two strings.
///
/// Slides the shorter string across the longer string and returns the
/// maximum similarity found. Windows hanging over either edge of the longer
/// string are included, so a needle that only partially overlaps the start
/// or end still scores.
///
/// # Examples
/// ```
/// use addrmerge::algorithms::fuzz::partial_ratio;
/// assert_eq!(partial_ratio("ho chi minh", "thanh pho ho chi minh"), 100.0);
/// ```
#[must_use]
pub fn partial_ratio(s1: &str, s2: &str) -> f64 {
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }

    let c1: SmallVec<[char; 64]> = s1.chars().collect();
    let c2: SmallVec<[char; 64]> = s2.chars().collect();

    // Ensure shorter string is the "needle"
    let (shorter, longer) = if c1.len() <= c2.len() {
        (&c1[..], &c2[..])
    } else {
        (&c2[..], &c1[..])
    };

    let k = shorter.len();
    let n = longer.len();
    let mut max_sim = 0.0f64;

    // Full-length windows first: a perfect hit ends the search early
    for start in 0..=(n - k) {
        let sim = indel_similarity_chars(shorter, &longer[start..start + k]);
        max_sim = max_sim.max(sim);
        if max_sim == 1.0 {
            return 100.0;
        }
    }

    // Windows overlapping the left and right edges
    for len in 1..k {
        max_sim = max_sim.max(indel_similarity_chars(shorter, &longer[..len]));
        max_sim = max_sim.max(indel_similarity_chars(shorter, &longer[n - len..]));
    }

    to_percent(max_sim)
}

/// Tokenize a string into words, sort them, and rejoin.
fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Compute similarity after tokenizing and sorting both strings.
///
/// Useful for comparing names whose words were entered in a different order.
///
/// # Examples
/// ```
/// use addrmerge::algorithms::fuzz::token_sort_ratio;
/// assert_eq!(token_sort_ratio("ho chi minh", "minh chi ho"), 100.0);
/// ```
#[must_use]
pub fn token_sort_ratio(s1: &str, s2: &str) -> f64 {
    ratio(&sorted_tokens(s1), &sorted_tokens(s2))
}

/// Score one address field: the maximum of the full ratio, the partial
/// ratio, and the token-sort ratio scaled by `token_sort_scale`.
#[must_use]
pub fn field_score(s1: &str, s2: &str, token_sort_scale: f64) -> f64 {
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }
    if s1 == s2 {
        return 100.0;
    }
    ratio(s1, s2)
        .max(partial_ratio(s1, s2))
        .max(token_sort_ratio(s1, s2) * token_sort_scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_identical() {
        assert_eq!(ratio("long thoi", "long thoi"), 100.0);
    }

    #[test]
    fn test_ratio_rounded() {
        // LCS = 6, total length = 14 -> 85.71
        assert_eq!(ratio("an phu", "an phuoc"), 86.0);
    }

    #[test]
    fn test_ratio_empty() {
        assert_eq!(ratio("", ""), 0.0);
        assert_eq!(ratio("", "abc"), 0.0);
    }

    #[test]
    fn test_partial_ratio_substring() {
        assert_eq!(partial_ratio("test", "this is a test"), 100.0);
        assert_eq!(partial_ratio("this is a test", "test"), 100.0);
    }

    #[test]
    fn test_partial_ratio_edge_window() {
        // best alignment is "ab" hanging off the left edge
        let score = partial_ratio("zab", "abcdefgh");
        assert!(score > 60.0 && score < 100.0, "score = {score}");
    }

    #[test]
    fn test_partial_ratio_empty() {
        assert_eq!(partial_ratio("", "hello"), 0.0);
        assert_eq!(partial_ratio("hello", ""), 0.0);
    }

    #[test]
    fn test_token_sort_ratio_reordered() {
        assert_eq!(token_sort_ratio("chi minh ho", "ho chi minh"), 100.0);
    }

    #[test]
    fn test_field_score_takes_maximum() {
        let scaled = token_sort_ratio("phu an", "an phu") * DEFAULT_TOKEN_SORT_SCALE;
        assert_eq!(scaled, 90.0);
        assert!(field_score("phu an", "an phu", DEFAULT_TOKEN_SORT_SCALE) >= 90.0);
    }

    #[test]
    fn test_field_score_empty_is_zero() {
        assert_eq!(field_score("", "", DEFAULT_TOKEN_SORT_SCALE), 0.0);
        assert_eq!(field_score("cu chi", "", DEFAULT_TOKEN_SORT_SCALE), 0.0);
    }
}
