//! Matching keys derived from normalized text.
//!
//! Reference records and resolver input go through the same functions here,
//! so both sides of every comparison are shaped identically.

use crate::normalize::{
    join_word_and_number, split_word_and_number, strip_administrative_words, trim_leading_zeros,
    HamletCode,
};

/// Commune name split for numeric-suffix pruning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommuneKey {
    /// Name without administrative words or trailing number; empty for a
    /// bare numbered unit ("phuong 7")
    pub word: String,
    /// Trailing number without leading zeros, empty when absent
    pub number: String,
    /// `word` length in characters
    pub word_len: usize,
}

impl CommuneKey {
    pub fn from_normalized(normalized: &str) -> Self {
        let stripped = strip_administrative_words(normalized);
        let (word, number) = if !stripped.is_empty() && stripped.bytes().all(|b| b.is_ascii_digit()) {
            (String::new(), trim_leading_zeros(&stripped).to_string())
        } else {
            split_word_and_number(&stripped)
        };
        let word_len = word.chars().count();
        Self {
            word,
            number,
            word_len,
        }
    }

    /// Word and number rejoined, as used in exact-match keys.
    pub fn full(&self) -> String {
        join_word_and_number(&self.word, &self.number)
    }

    /// The part compared by similarity: the word, or the number of a bare
    /// numbered unit.
    pub fn name(&self) -> &str {
        if self.word.is_empty() {
            &self.number
        } else {
            &self.word
        }
    }
}

/// Precomputed fields of one reference record in commune shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchKeys {
    pub commune: CommuneKey,
    pub district: String,
    pub province: String,
    pub new_commune: CommuneKey,
    pub new_province: String,
}

impl MatchKeys {
    pub fn from_normalized(
        old_commune: &str,
        old_district: &str,
        old_province: &str,
        new_commune: &str,
        new_province: &str,
    ) -> Self {
        Self {
            commune: CommuneKey::from_normalized(old_commune),
            district: strip_administrative_words(old_district),
            province: strip_administrative_words(old_province),
            new_commune: CommuneKey::from_normalized(new_commune),
            new_province: strip_administrative_words(new_province),
        }
    }
}

/// A hamlet reduced to its matching form.
///
/// Keyword-coded hamlets key on their standard spelling ("kp 2" and
/// "khu pho 02" both become "khu pho 2"); anything else keys on the text with
/// administrative words removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HamletKey {
    pub key: String,
    pub code: Option<HamletCode>,
}

impl HamletKey {
    pub fn from_normalized(normalized: &str) -> Self {
        match HamletCode::parse(normalized) {
            Some(code) => Self {
                key: format!("{} {}", code.keyword, code.value),
                code: Some(code),
            },
            None => Self {
                key: strip_administrative_words(normalized),
                code: None,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    #[test]
    fn test_commune_key() {
        let key = CommuneKey::from_normalized(&normalize("Phường 07"));
        assert_eq!(key.word, "");
        assert_eq!(key.number, "7");
        assert_eq!(key.name(), "7");
        assert_eq!(key.full(), "7");

        let key = CommuneKey::from_normalized(&normalize("Xã"));
        assert_eq!(key.full(), "");

        let key = CommuneKey::from_normalized(&normalize("Xã An Phú 2"));
        assert_eq!(key.word, "an phu");
        assert_eq!(key.number, "2");
        assert_eq!(key.word_len, 6);
        assert_eq!(key.full(), "an phu 2");
    }

    #[test]
    fn test_match_keys_strip_unit_words() {
        let keys = MatchKeys::from_normalized(
            &normalize("Xã An Phú"),
            &normalize("Huyện Củ Chi"),
            &normalize("TP.HCM"),
            &normalize("Xã An Phú"),
            &normalize("Hồ Chí Minh"),
        );
        assert_eq!(keys.commune.full(), "an phu");
        assert_eq!(keys.district, "cu chi");
        assert_eq!(keys.province, "thanh pho ho chi minh");
        assert_eq!(keys.new_province, "ho chi minh");
    }

    #[test]
    fn test_hamlet_key_standard_spelling() {
        assert_eq!(HamletKey::from_normalized("kp 2").key, "khu pho 2");
        assert_eq!(HamletKey::from_normalized("khu pho 02").key, "khu pho 2");
        assert_eq!(HamletKey::from_normalized("ap binh loi").key, "ap binh loi");
        assert!(HamletKey::from_normalized("kp 2").code.is_some());
    }

    #[test]
    fn test_hamlet_key_without_keyword() {
        let key = HamletKey::from_normalized("binh loi");
        assert_eq!(key.key, "binh loi");
        assert_eq!(key.code, None);
        assert!(HamletKey::from_normalized("").is_empty());
    }
}
