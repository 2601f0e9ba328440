//! Text normalization shared by scoring, highlighting and context extraction
//!
//! Normalized text is lowercase, has its diacritics stripped, and contains only
//! word characters separated by single spaces:
//!
//! ```
//! use live_search::search::normalize;
//!
//! assert_eq!(normalize("  Café -- Crème brûlée! "), "cafe creme brulee");
//! ```

use crate::search::record::value_text;
use serde_json::Value;
use unicode_normalization::char::{decompose_canonical, is_combining_mark};

/// Word characters survive normalization; everything else becomes a separator.
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Normalize text for comparison.
pub fn normalize(text: &str) -> String {
    normalize_with_offsets(text).0
}

/// Normalize any JSON value, coercing it to text first. `null` becomes "".
pub fn normalize_value(value: &Value) -> String {
    normalize(&value_text(value))
}

/// Normalize text and keep, for every char of the output, the char index in
/// `text` that produced it.
pub fn normalize_with_offsets(text: &str) -> (String, Vec<usize>) {
    let mut normalized = String::with_capacity(text.len());
    let mut offsets = Vec::with_capacity(text.len());
    let mut pending_separator = false;

    for (index, original) in text.chars().enumerate() {
        for lower in original.to_lowercase() {
            decompose_canonical(lower, |c| {
                if is_combining_mark(c) {
                    return;
                }
                if !is_word_char(c) {
                    pending_separator = true;
                    return;
                }
                if pending_separator && !normalized.is_empty() {
                    normalized.push(' ');
                    offsets.push(index);
                }
                pending_separator = false;
                normalized.push(c);
                offsets.push(index);
            });
        }
    }

    (normalized, offsets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize("Hello, World!"), "hello world");
        assert_eq!(normalize("   multiple   spaces\there "), "multiple spaces here");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("...---..."), "");
    }

    #[test]
    fn test_normalize_strips_accents() {
        assert_eq!(normalize("Ångström"), "angstrom");
        assert_eq!(normalize("naïve façade"), "naive facade");
        assert_eq!(normalize("E\u{301}cole"), "ecole");
    }

    #[test]
    fn test_normalize_keeps_word_characters() {
        assert_eq!(normalize("snake_case v2.0"), "snake_case v2 0");
        assert_eq!(normalize("user@example.com"), "user example com");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "Website NOT loading!!",
            "  Ünïcödé   tëxt ",
            "İstanbul",
            "tabs\tand\nnewlines",
            "a-b_c.d",
            "",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_normalize_is_idempotent_for_every_char() {
        for c in (0..=0x2FFFF).filter_map(char::from_u32) {
            let once = normalize(&c.to_string());
            assert_eq!(normalize(&once), once, "not idempotent for U+{:04X}", c as u32);
        }
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent_for_any_text(text in any::<String>()) {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn offsets_follow_the_original_text(text in any::<String>()) {
            let (normalized, offsets) = normalize_with_offsets(&text);
            let len = text.chars().count();
            prop_assert_eq!(offsets.len(), normalized.chars().count());
            prop_assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
            prop_assert!(offsets.iter().all(|&o| o < len));
        }
    }

    #[test]
    fn test_normalize_value() {
        assert_eq!(normalize_value(&Value::Null), "");
        assert_eq!(normalize_value(&json!(42)), "42");
        assert_eq!(normalize_value(&json!(["Urgent", "Billing"])), "urgent billing");
        assert_eq!(normalize_value(&json!("Mixed CASE")), "mixed case");
    }

    #[test]
    fn test_offsets_point_into_original() {
        let text = "  Crème, brûlée";
        let (normalized, offsets) = normalize_with_offsets(text);
        assert_eq!(normalized, "creme brulee");
        assert_eq!(offsets.len(), normalized.chars().count());

        let original: Vec<char> = text.chars().collect();
        assert_eq!(original[offsets[0]], 'C');
        // the 'b' of "brûlée"
        assert_eq!(original[offsets[6]], 'b');
    }
}
