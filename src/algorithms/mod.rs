//! String similarity primitives
//!
//! Everything the resolver scores with is built on the LCS-based indel
//! similarity in [`lcs`]; [`fuzz`] turns it into the percentage ratios.

pub mod fuzz;
pub mod lcs;

pub use fuzz::{field_score, partial_ratio, ratio, token_sort_ratio, DEFAULT_TOKEN_SORT_SCALE};
pub use lcs::{indel_similarity, lcs_length};
