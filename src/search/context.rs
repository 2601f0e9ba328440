//! Bounded excerpts around the first match of a query

use crate::search::normalize::{normalize, normalize_with_offsets};

/// Marker added where an excerpt cuts the original text.
pub const ELLIPSIS: &str = "...";

/// Excerpt of `text` centered on the first occurrence of `query`.
///
/// The match is located on normalized text and mapped back to the original,
/// so the excerpt keeps the original casing, accents and punctuation. The
/// window extends `window_size / 2` chars before the match start and after the
/// match end, clamped to the text. Returns `text` unchanged when nothing
/// matches.
pub fn extract_context(text: &str, query: &str, window_size: usize) -> String {
    let needle = normalize(query);
    if needle.is_empty() {
        return text.to_string();
    }

    let (haystack, offsets) = normalize_with_offsets(text);
    let Some(byte_start) = haystack.find(&needle) else {
        return text.to_string();
    };

    let match_start = haystack[..byte_start].chars().count();
    let match_len = needle.chars().count();
    let (Some(&first), Some(&last)) = (
        offsets.get(match_start),
        offsets.get(match_start + match_len - 1),
    ) else {
        return text.to_string();
    };

    let chars: Vec<char> = text.chars().collect();
    let half = window_size / 2;
    let start = first.saturating_sub(half);
    let end = (last + 1 + half).min(chars.len());

    let mut excerpt = String::with_capacity(end - start + 2 * ELLIPSIS.len());
    if start > 0 {
        excerpt.push_str(ELLIPSIS);
    }
    excerpt.extend(&chars[start..end]);
    if end < chars.len() {
        excerpt.push_str(ELLIPSIS);
    }
    excerpt
}
