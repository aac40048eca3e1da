//! Longest Common Subsequence (LCS) implementation
//!
//! The indel similarity used by every ratio in [`super::fuzz`] is derived
//! from the LCS length: `2 * LCS / (len(a) + len(b))`.
//!
//! # Complexity
//! - Time: O(m*n)
//! - Space: O(n) (only two rows are kept)

use smallvec::SmallVec;

/// Calculate the length of the Longest Common Subsequence of two strings.
#[must_use]
pub fn lcs_length(a: &str, b: &str) -> usize {
    let a_chars: SmallVec<[char; 64]> = a.chars().collect();
    let b_chars: SmallVec<[char; 64]> = b.chars().collect();
    lcs_length_chars(&a_chars, &b_chars)
}

/// LCS length over pre-collected char slices.
///
/// Used by the sliding-window ratios so windows can be compared without
/// allocating a new `String` per position.
#[must_use]
pub fn lcs_length_chars(a: &[char], b: &[char]) -> usize {
    let m = a.len();
    let n = b.len();

    if m == 0 || n == 0 {
        return 0;
    }

    // Space-optimized: only keep current and previous row
    let mut prev: SmallVec<[usize; 64]> = SmallVec::from_elem(0, n + 1);
    let mut curr: SmallVec<[usize; 64]> = SmallVec::from_elem(0, n + 1);

    for i in 1..=m {
        curr[0] = 0;
        for j in 1..=n {
            if a[i - 1] == b[j - 1] {
                curr[j] = prev[j - 1] + 1;
            } else {
                curr[j] = prev[j].max(curr[j - 1]);
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// LCS-based (indel) similarity in `[0.0, 1.0]` over char slices.
///
/// Formula: `2 * LCS_length / (len(a) + len(b))`. Two empty inputs are
/// identical (1.0).
#[must_use]
pub fn indel_similarity_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    (2 * lcs_length_chars(a, b)) as f64 / total as f64
}

/// LCS-based (indel) similarity in `[0.0, 1.0]`.
#[must_use]
pub fn indel_similarity(a: &str, b: &str) -> f64 {
    let a_chars: SmallVec<[char; 64]> = a.chars().collect();
    let b_chars: SmallVec<[char; 64]> = b.chars().collect();
    indel_similarity_chars(&a_chars, &b_chars)
}
