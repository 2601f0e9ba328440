//! Highlighting of query words inside original (un-normalized) text

use crate::search::scorer::PreparedQuery;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

/// A contiguous piece of the highlighted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSpan {
    pub text: String,
    pub is_match: bool,
}

impl HighlightSpan {
    fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_match: false }
    }

    fn matched(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_match: true }
    }
}

/// Split `text` into matched and unmatched spans for `query`.
///
/// Query words are applied in order; a span already matched by an earlier
/// word is never split again, so matches never nest. Concatenating the span
/// texts always yields `text`.
pub fn highlight(text: &str, query: &str) -> Vec<HighlightSpan> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut spans = vec![HighlightSpan::plain(text)];
    let prepared = PreparedQuery::new(query);

    let mut seen: Vec<&str> = Vec::new();
    for word in prepared.words() {
        if seen.contains(&word.as_str()) {
            continue;
        }
        seen.push(word);

        let Ok(pattern) = RegexBuilder::new(&regex::escape(word))
            .case_insensitive(true)
            .build()
        else {
            continue;
        };

        let mut next = Vec::with_capacity(spans.len());
        for span in spans {
            if span.is_match {
                next.push(span);
                continue;
            }

            let mut cursor = 0;
            for found in pattern.find_iter(&span.text) {
                if found.start() > cursor {
                    next.push(HighlightSpan::plain(&span.text[cursor..found.start()]));
                }
                next.push(HighlightSpan::matched(found.as_str()));
                cursor = found.end();
            }
            if cursor < span.text.len() {
                next.push(HighlightSpan::plain(&span.text[cursor..]));
            }
        }
        spans = next;
    }

    spans
}

/// Render spans as a string, wrapping matches in `open`/`close`.
pub fn render_marked(spans: &[HighlightSpan], open: &str, close: &str) -> String {
    let mut out = String::new();
    for span in spans {
        if span.is_match {
            out.push_str(open);
            out.push_str(&span.text);
            out.push_str(close);
        } else {
            out.push_str(&span.text);
        }
    }
    out
}
