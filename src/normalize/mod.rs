//! Address text normalization
//!
//! Converts raw, human-entered address fragments into the canonical form used
//! for matching: lowercase, diacritic-free, abbreviation-free and
//! whitespace-collapsed. The canonical form is only ever compared, never
//! shown; display values are kept separately by the reference tables.
//!
//! All functions here are pure and total. Empty or unusable input yields an
//! empty string.

pub mod detail;
pub mod hamlet;
pub mod rules;

pub use detail::{parse_address_detail, validate_input, AddressDetail, AddressField, InputWarning};
pub use hamlet::{extract_hamlet_from_free_text, HamletCode};
pub use rules::ADMINISTRATIVE_WORDS;

use rules::{
    ADMIN_ABBREVIATIONS, LEADING_ZEROS, ORDINAL_SUFFIX, PLACE_ALIASES, PUNCTUATION, WHITESPACE,
    WORD_AND_NUMBER,
};
use std::borrow::Cow;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Replace typographic dash and quote glyphs with their ASCII equivalents.
fn fold_glyphs(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}' | '\u{2212}' => '-',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{00AB}' | '\u{00BB}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
            other => other,
        })
        .collect()
}

/// Canonical decomposition with every combining mark dropped.
pub(crate) fn strip_diacritics(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

fn apply_place_aliases(mut text: String) -> String {
    for (pattern, replacement) in PLACE_ALIASES.iter() {
        if let Cow::Owned(replaced) = pattern.replace_all(&text, *replacement) {
            text = replaced;
        }
    }
    text
}

#[inline]
fn is_numeric_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_numeric)
}

/// Normalize an address fragment for matching.
///
/// The pipeline runs in a fixed order:
///
/// 1. trim, fold dash and quote glyphs
/// 2. lowercase
/// 3. remove dotted administrative abbreviations (`tp.`, `q.`, `p.` ...)
/// 4. expand place-name aliases (`hcm`, `brvt`, `hn` ...)
/// 5. strip ordinal suffixes attached to numbers
/// 6. NFKD decomposition, drop combining marks; aliases that only appear
///    once marks are gone ("sài gòn") are expanded here too
/// 7. strip leading zeros from standalone numbers
/// 8. dashes and `,` `.` to spaces, collapse whitespace; aliases split by
///    punctuation ("sai-gon") are expanded once more
/// 9. drop single-letter stop-list tokens
///
/// # Examples
/// ```
/// use addrmerge::normalize::normalize;
/// assert_eq!(normalize("  Phường 07, Q.3 "), "phuong 7 3");
/// assert_eq!(normalize("TP.HCM"), "thanh pho ho chi minh");
/// assert_eq!(normalize(""), "");
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    let text = fold_glyphs(text.trim());
    let mut text = text.to_lowercase();

    for pattern in ADMIN_ABBREVIATIONS.iter() {
        if let Cow::Owned(replaced) = pattern.replace_all(&text, "") {
            text = replaced;
        }
    }

    let text = apply_place_aliases(text);
    let text = ORDINAL_SUFFIX.replace_all(&text, "${1}");
    let text = apply_place_aliases(strip_diacritics(&text));
    let text = LEADING_ZEROS.replace_all(&text, "${1}");

    let text = text.replace('-', " ");
    let text = PUNCTUATION.replace_all(&text, " ");
    let text = apply_place_aliases(WHITESPACE.replace_all(&text, " ").into_owned());
    let text = WHITESPACE.replace_all(&text, " ");

    text.trim()
        .split(' ')
        .filter(|word| {
            is_numeric_token(word)
                || word.chars().count() >= 2
                || !ADMINISTRATIVE_WORDS.contains(word)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove bare administrative unit words ("xa", "phuong", "huyen" ...) from
/// an already-normalized fragment.
///
/// # Examples
/// ```
/// use addrmerge::normalize::strip_administrative_words;
/// assert_eq!(strip_administrative_words("xa an phu"), "an phu");
/// assert_eq!(strip_administrative_words("huyen cu chi"), "cu chi");
/// ```
#[must_use]
pub fn strip_administrative_words(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    text.to_lowercase()
        .split_whitespace()
        .filter(|word| !ADMINISTRATIVE_WORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip leading zeros from an all-digit string, keeping a lone "0".
pub fn trim_leading_zeros(digits: &str) -> &str {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() && !digits.is_empty() {
        "0"
    } else {
        trimmed
    }
}

/// Split a normalized name into its word part and trailing number.
///
/// The number comes back without leading zeros. Text that is not a plain
/// lowercase name with an optional trailing number is returned whole as the
/// word part.
///
/// # Examples
/// ```
/// use addrmerge::normalize::split_word_and_number;
/// assert_eq!(split_word_and_number("an phu 02"), ("an phu".to_string(), "2".to_string()));
/// assert_eq!(split_word_and_number("long thoi"), ("long thoi".to_string(), String::new()));
/// ```
#[must_use]
pub fn split_word_and_number(text: &str) -> (String, String) {
    match WORD_AND_NUMBER.captures(text) {
        Some(caps) => {
            let word = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();
            let number = caps
                .get(2)
                .map_or(String::new(), |m| trim_leading_zeros(m.as_str()).to_string());
            (word, number)
        }
        None => (text.trim().to_string(), String::new()),
    }
}

/// Join a word part and number part back into a single matching key.
#[must_use]
pub fn join_word_and_number(word: &str, number: &str) -> String {
    if number.is_empty() {
        word.to_string()
    } else {
        format!("{word} {number}")
    }
}
