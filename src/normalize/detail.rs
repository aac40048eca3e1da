//! Detailed street addresses and input sanity checks.

use super::hamlet::extract_hamlet_from_free_text;
use super::rules::{ALLEY, HOUSE_NUMBER, STREET, WHITESPACE};
use super::{normalize, strip_diacritics};
use std::fmt;

/// Longest field value accepted without a warning.
const MAX_FIELD_LENGTH: usize = 50;

/// Address fields a caller supplies per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    Commune,
    District,
    Province,
    Hamlet,
}

impl AddressField {
    pub fn name(&self) -> &'static str {
        match self {
            AddressField::Commune => "commune",
            AddressField::District => "district",
            AddressField::Province => "province",
            AddressField::Hamlet => "hamlet",
        }
    }
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Components pulled out of a free-text detailed address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressDetail {
    /// House number, e.g. "12/3a"
    pub house_number: Option<String>,
    /// Alley or lane with its keyword, e.g. "hem 45"
    pub alley: Option<String>,
    /// Street name, up to the next comma
    pub street: Option<String>,
    /// Hamlet reference, see [`extract_hamlet_from_free_text`]
    pub hamlet: Option<String>,
    /// The whole address through [`normalize`]
    pub normalized: String,
}

/// Lowercase, diacritic-free text that still carries its punctuation, so
/// street names stop at the next comma.
fn fold_for_detail(text: &str) -> String {
    let folded = strip_diacritics(&text.to_lowercase()).replace('đ', "d");
    WHITESPACE.replace_all(folded.trim(), " ").into_owned()
}

/// Split a detailed address into house number, alley, street and hamlet.
///
/// # Examples
/// ```
/// use addrmerge::normalize::parse_address_detail;
/// let detail = parse_address_detail("Số 12/3, hẻm 45, đường Lê Lợi, Ấp 2");
/// assert_eq!(detail.house_number.as_deref(), Some("12/3"));
/// assert_eq!(detail.alley.as_deref(), Some("hem 45"));
/// assert_eq!(detail.street.as_deref(), Some("le loi"));
/// assert_eq!(detail.hamlet.as_deref(), Some("ap 2"));
/// ```
#[must_use]
pub fn parse_address_detail(text: &str) -> AddressDetail {
    if text.trim().is_empty() {
        return AddressDetail::default();
    }

    let folded = fold_for_detail(text);

    let house_number = HOUSE_NUMBER
        .captures(&folded)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    let alley = ALLEY.captures(&folded).and_then(|caps| {
        let keyword = match caps.get(1)?.as_str() {
            "hem" | "h." => "hem",
            _ => "ngo",
        };
        Some(format!("{keyword} {}", caps.get(2)?.as_str()))
    });

    let street = STREET
        .captures(&folded)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty());

    AddressDetail {
        house_number,
        alley,
        street,
        hamlet: extract_hamlet_from_free_text(text),
        normalized: normalize(text),
    }
}

/// A non-fatal observation about an input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputWarning {
    /// The field is longer than any real administrative name.
    TooLong { field: AddressField, length: usize },
    /// The field contains characters outside Vietnamese letters, digits,
    /// spaces and hyphens.
    UnusualCharacters { field: AddressField },
}

impl fmt::Display for InputWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputWarning::TooLong { field, length } => {
                write!(f, "{field} is unusually long ({length} characters)")
            }
            InputWarning::UnusualCharacters { field } => {
                write!(f, "{field} contains unusual characters")
            }
        }
    }
}

const VIETNAMESE_LETTERS: &str = "áàảãạăắằẳẵặâấầẩẫậéèẻẽẹêếềểễệíìỉĩịóòỏõọôốồổỗộơớờởỡợúùủũụưứừửữựýỳỷỹỵđ";

fn is_expected_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c.is_whitespace()
        || c == '-'
        || c.to_lowercase().all(|l| VIETNAMESE_LETTERS.contains(l))
}

/// Check raw commune, district and province values for anything that
/// suggests a data-entry problem.
#[must_use]
pub fn validate_input(commune: &str, district: &str, province: &str) -> Vec<InputWarning> {
    let mut warnings = Vec::new();

    for (field, value) in [
        (AddressField::Commune, commune),
        (AddressField::District, district),
        (AddressField::Province, province),
    ] {
        let length = value.chars().count();
        if length > MAX_FIELD_LENGTH {
            warnings.push(InputWarning::TooLong { field, length });
        }
    }

    if !commune.chars().all(is_expected_char) {
        warnings.push(InputWarning::UnusualCharacters {
            field: AddressField::Commune,
        });
    }

    warnings
}
