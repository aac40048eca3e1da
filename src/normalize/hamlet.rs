//! Hamlet-level address parts: free-text extraction and keyword codes.

use super::rules::{HAMLET_IN_TEXT, HAMLET_KEYWORDS};
use super::{normalize, strip_diacritics, trim_leading_zeros};
use unicode_normalization::UnicodeNormalization;

/// Standard spelling for a hamlet keyword found in free text.
fn standard_keyword(raw: &str) -> String {
    let folded = strip_diacritics(&raw.to_lowercase()).replace('đ', "d");
    HAMLET_KEYWORDS
        .iter()
        .find(|(alias, _)| *alias == folded)
        .map_or(folded, |(_, canonical)| (*canonical).to_string())
}

/// Find the hamlet reference in a detailed address.
///
/// Scans for hamlet / quarter keywords ("ấp", "thôn", "khu phố", "KP",
/// "khóm", "tổ dân phố" ...) followed by a value and returns the **last**
/// occurrence, since the administrative hamlet conventionally closes a
/// detailed address. The keyword spelling is standardised and a numeric
/// value loses its leading zeros.
///
/// # Examples
/// ```
/// use addrmerge::normalize::extract_hamlet_from_free_text;
/// assert_eq!(
///     extract_hamlet_from_free_text("12 Lê Lợi, KP 03, Long Thới").as_deref(),
///     Some("khu pho 3"),
/// );
/// assert_eq!(extract_hamlet_from_free_text("12 Lê Lợi"), None);
/// ```
#[must_use]
pub fn extract_hamlet_from_free_text(detail: &str) -> Option<String> {
    let detail = detail.trim();
    if detail.is_empty() {
        return None;
    }

    let composed: String = detail.nfc().collect();
    let caps = HAMLET_IN_TEXT.captures_iter(&composed).last()?;
    let keyword = standard_keyword(caps.get(1)?.as_str());
    let raw_value = caps.get(2)?.as_str();

    let value = if raw_value.chars().all(|c| c.is_ascii_digit()) {
        trim_leading_zeros(raw_value).to_string()
    } else {
        normalize(raw_value)
    };

    if value.is_empty() {
        return None;
    }
    Some(format!("{keyword} {value}"))
}

/// A hamlet name read as `keyword value`, e.g. "khu pho 2" or "ap binh loi".
///
/// The keyword is always in its standard spelling, so "kp 2" and
/// "khu pho 2" parse to the same code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HamletCode {
    pub keyword: &'static str,
    pub value: String,
}

impl HamletCode {
    /// Parse a normalized hamlet fragment. Returns `None` when the fragment
    /// does not start with a known keyword followed by a value.
    #[must_use]
    pub fn parse(normalized: &str) -> Option<Self> {
        HAMLET_KEYWORDS.iter().find_map(|(alias, canonical)| {
            let rest = normalized.strip_prefix(*alias)?.strip_prefix(' ')?.trim();
            if rest.is_empty() {
                return None;
            }
            let value = if rest.chars().all(|c| c.is_ascii_digit()) {
                trim_leading_zeros(rest).to_string()
            } else {
                rest.to_string()
            };
            Some(Self {
                keyword: *canonical,
                value,
            })
        })
    }

    /// The number of a numeric-coded hamlet ("khu pho 2" -> "2").
    #[must_use]
    pub fn number(&self) -> Option<&str> {
        let numeric = !self.value.is_empty() && self.value.chars().all(|c| c.is_ascii_digit());
        numeric.then_some(self.value.as_str())
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.number().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_takes_last_occurrence() {
        assert_eq!(
            extract_hamlet_from_free_text("Tổ 5, Ấp 2, xã Long Thới").as_deref(),
            Some("ap 2")
        );
    }

    #[test]
    fn test_extract_standardises_keywords() {
        assert_eq!(extract_hamlet_from_free_text("kp.4").as_deref(), Some("khu pho 4"));
        assert_eq!(extract_hamlet_from_free_text("Khu phố 04").as_deref(), Some("khu pho 4"));
        assert_eq!(extract_hamlet_from_free_text("TDP 7").as_deref(), Some("to dan pho 7"));
        assert_eq!(extract_hamlet_from_free_text("Khóm 1").as_deref(), Some("khom 1"));
        assert_eq!(extract_hamlet_from_free_text("thôn Đông").as_deref(), Some("thon đong"));
    }

    #[test]
    fn test_extract_multiword_keyword_not_split() {
        assert_eq!(
            extract_hamlet_from_free_text("số 3, tổ dân phố 12").as_deref(),
            Some("to dan pho 12")
        );
    }

    #[test]
    fn test_extract_text_value() {
        assert_eq!(
            extract_hamlet_from_free_text("ấp Bình Lợi").as_deref(),
            Some("ap binh")
        );
    }

    #[test]
    fn test_extract_none() {
        assert_eq!(extract_hamlet_from_free_text(""), None);
        assert_eq!(extract_hamlet_from_free_text("123 Nguyễn Huệ"), None);
    }

    #[test]
    fn test_hamlet_code_parse() {
        let code = HamletCode::parse("kp 2").unwrap();
        assert_eq!(code.keyword, "khu pho");
        assert_eq!(code.number(), Some("2"));

        let code = HamletCode::parse("khu pho 02").unwrap();
        assert_eq!(code.keyword, "khu pho");
        assert_eq!(code.number(), Some("2"));

        let code = HamletCode::parse("ap binh loi").unwrap();
        assert_eq!(code.keyword, "ap");
        assert_eq!(code.value, "binh loi");
        assert!(!code.is_numeric());
    }

    #[test]
    fn test_hamlet_code_requires_keyword_and_value() {
        assert!(HamletCode::parse("binh loi").is_none());
        assert!(HamletCode::parse("ap").is_none());
        assert!(HamletCode::parse("apt 3").is_none());
        assert!(HamletCode::parse("").is_none());
    }
}
