//! Rule tables for address normalization.
//!
//! Every table is compiled once on first use and shared for the life of the
//! process; none of them grow.

use regex::Regex;
use std::sync::LazyLock;

fn compile(pattern: &str) -> Regex {
    // Patterns are literals in this file; a failure is a programming error
    // caught by the tests below on first use.
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid normalization rule {pattern:?}: {e}"))
}

/// Administrative abbreviations written with a trailing period.
///
/// Only the dotted forms are removed; the full, undotted words survive this
/// stage. Applied in order.
pub(crate) static ADMIN_ABBREVIATIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\btp\.\s*",  // thành phố
        r"\btx\.\s*",  // thị xã
        r"\btt\.\s*",  // thị trấn
        r"\bq\.\s*",   // quận
        r"\bp\.\s*",   // phường
        r"\bx\.\s*",   // xã
        r"\bh\.\s*",   // huyện
        r"\bkp\.\s*",  // khu phố
        r"\btdp\.\s*", // tổ dân phố
        r"\bkv\.\s*",  // khu vực
    ]
    .into_iter()
    .map(compile)
    .collect()
});

/// Place-name nicknames and abbreviations expanded to their full forms.
///
/// Order matters: the Ho Chi Minh City spellings must run before the bare
/// two-letter codes (`cm` would otherwise eat the tail of `hcm`).
pub(crate) static PLACE_ALIASES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    const HCM: &str = "thanh pho ho chi minh";
    const BRVT: &str = "ba ria vung tau";
    [
        (r"\btp\.?\s*h\.?\s*c\.?\s*m\.?\b", HCM),
        (r"\btphcm\b", HCM),
        (r"\bhcm\b", HCM),
        (r"\btp\.?\s*hcm\b", HCM),
        (r"\bh\.?\s*c\.?\s*m\.?\b", HCM),
        (r"\bsai gon\b", HCM),
        (r"\bsaigon\b", HCM),
        (r"\bsg\b", HCM),
        (r"\bbr[ -]?vt\b", BRVT),
        (r"\bb\.?\s*ria[ -]?v\.?\s*tau\b", BRVT),
        (r"\bba ria[ -]?vung tau\b", BRVT),
        (r"\bhn\b", "ha noi"),
        (r"\bdn\b", "da nang"),
        (r"\bvt\b", "vung tau"),
        (r"\bbd\b", "binh duong"),
        (r"\bbduong\b", "binh duong"),
        (r"\bla\b", "long an"),
        (r"\btg\b", "tien giang"),
        (r"\bct\b", "can tho"),
        (r"\bag\b", "an giang"),
        (r"\bkg\b", "kien giang"),
        (r"\bcm\b", "ca mau"),
        (r"\bbl\b", "bac lieu"),
        (r"\btv\b", "tra vinh"),
        (r"\bst\b", "soc trang"),
        (r"\bdt\b", "dong thap"),
        (r"\bvl\b", "vinh long"),
        (r"\bht\b", "hau giang"),
        (r"\bbn\b", "ben tre"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (compile(pattern), replacement))
    .collect()
});

/// Ordinal suffix letters attached to a number ("2nd" -> "2").
pub(crate) static ORDINAL_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b(\d+)(?:st|nd|rd|th)\b"));

/// Leading zeros on a standalone number ("007" -> "7", "00" -> "0").
pub(crate) static LEADING_ZEROS: LazyLock<Regex> = LazyLock::new(|| compile(r"\b0+(\d+)\b"));

/// Residual punctuation replaced by a space.
pub(crate) static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| compile(r"[,.]"));

pub(crate) static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| compile(r"\s+"));

/// Name followed by an optional trailing number: "an phu 2" -> ("an phu", "2").
pub(crate) static WORD_AND_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^([a-z\s]+?)(?:\s+(\d+))?$"));

/// Bare administrative unit words.
///
/// Removed from fragments before comparison so that "xa an phu" and
/// "an phu" land on the same key.
pub const ADMINISTRATIVE_WORDS: &[&str] = &[
    "xa", "phuong", "huyen", "quan", "tinh", "ap", "thon", "ban", "khom", "to",
];

/// Hamlet / quarter keywords in free text, followed by their value.
///
/// Multi-word keywords come first so "tổ dân phố 5" is not read as "tổ d".
pub(crate) static HAMLET_IN_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)\b(tổ dân phố|to dan pho|khu phố|khu pho|khu vực|khu vuc|ấp|ap|thôn|thon|kp|khóm|khom|tổ|to|bản|ban|tdp|kv)(?:\.\s*|\s+)([\p{L}\p{N}]+)",
    )
});

/// Canonical hamlet keywords, longest spelling first, with the standard
/// spelling each alias maps to.
pub(crate) const HAMLET_KEYWORDS: &[(&str, &str)] = &[
    ("to dan pho", "to dan pho"),
    ("khu pho", "khu pho"),
    ("khu vuc", "khu vuc"),
    ("tdp", "to dan pho"),
    ("kp", "khu pho"),
    ("kv", "khu vuc"),
    ("khom", "khom"),
    ("thon", "thon"),
    ("khu", "khu"),
    ("ban", "ban"),
    ("ap", "ap"),
    ("to", "to"),
];

pub(crate) static HOUSE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b(?:so|s\.)\s*(\d+[a-z]*(?:/\d+[a-z]*)*)"));

pub(crate) static ALLEY: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b(hem|ngo|h\.|n\.)\s*(\d+[a-z]*(?:/\d+[a-z]*)*)"));

pub(crate) static STREET: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b(?:duong|d\.)\s*([^,]+)"));
