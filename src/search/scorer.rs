//! Relevance scoring of a single field value against a query
//!
//! Scores are additive:
//!
//! | Condition                               | Bonus                         |
//! |-----------------------------------------|-------------------------------|
//! | candidate equals query                  | +100                          |
//! | candidate starts with query             | +50                           |
//! | candidate contains query                | +25                           |
//! | each query word found in candidate      | +10                           |
//! | ... position of that word               | +5 at offset 0, 0 at the end  |
//! | ... word is a whole token of candidate  | +5                            |
//!
//! The sum is multiplied by the weight of the field the candidate came from.

use crate::search::normalize::normalize;

const EXACT_MATCH_BONUS: f64 = 100.0;
const PREFIX_MATCH_BONUS: f64 = 50.0;
const SUBSTRING_MATCH_BONUS: f64 = 25.0;
const WORD_MATCH_BONUS: f64 = 10.0;
const WORD_POSITION_BONUS_MAX: f64 = 5.0;
const WORD_BOUNDARY_BONUS: f64 = 5.0;

/// Importance multiplier for a semantic field name. Unknown fields weigh 1.0.
pub fn field_weight(field: &str) -> f64 {
    match field {
        "title" | "name" => 2.0,
        "email" => 1.5,
        "tags" => 1.3,
        "description" => 1.2,
        _ => 1.0,
    }
}

/// A query normalized once and split into words, reused across candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedQuery {
    normalized: String,
    words: Vec<String>,
}

impl PreparedQuery {
    pub fn new(query: &str) -> Self {
        let normalized = normalize(query);
        let words = normalized.split(' ').filter(|w| !w.is_empty()).map(String::from).collect();
        Self { normalized, words }
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Score an already-normalized candidate, before field weighting.
    pub fn raw_score(&self, candidate: &str) -> f64 {
        if candidate.is_empty() || self.normalized.is_empty() {
            return 0.0;
        }

        let mut score = 0.0;
        if candidate == self.normalized {
            score += EXACT_MATCH_BONUS;
        }
        if candidate.starts_with(&self.normalized) {
            score += PREFIX_MATCH_BONUS;
        }
        if candidate.contains(&self.normalized) {
            score += SUBSTRING_MATCH_BONUS;
        }

        let candidate_len = candidate.chars().count() as f64;
        for word in &self.words {
            let Some(byte_offset) = candidate.find(word.as_str()) else {
                continue;
            };
            score += WORD_MATCH_BONUS;

            let offset = candidate[..byte_offset].chars().count() as f64;
            score += WORD_POSITION_BONUS_MAX * (1.0 - offset / candidate_len);

            if candidate.split(' ').any(|token| token == word) {
                score += WORD_BOUNDARY_BONUS;
            }
        }

        score
    }

    /// Score an already-normalized candidate for `field`.
    pub fn score(&self, candidate: &str, field: &str) -> f64 {
        self.raw_score(candidate) * field_weight(field)
    }
}

/// Relevance of `candidate` for `query` when found in `field`. Always finite and >= 0.
pub fn score(candidate: &str, query: &str, field: &str) -> f64 {
    PreparedQuery::new(query).score(&normalize(candidate), field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs_score_zero() {
        assert_eq!(score("", "login", "title"), 0.0);
        assert_eq!(score("login", "", "title"), 0.0);
        assert_eq!(score("login", "?!", "title"), 0.0);
        assert_eq!(score("website", "email", "title"), 0.0);
    }

    #[test]
    fn test_exact_match_score() {
        // 100 + 50 + 25 + (10 + 5 + 5)
        assert_eq!(score("Login", "login", "content"), 195.0);
        assert_eq!(score("Login", "login", "title"), 390.0);
    }

    #[test]
    fn test_match_kind_ordering() {
        let candidate = "Database error";
        let exact = score(candidate, "database error", "content");
        let prefix = score(candidate, "database", "content");
        let substring = score(candidate, "base error", "content");
        let words_only = score(candidate, "error database", "content");

        assert!(exact > prefix, "{} <= {}", exact, prefix);
        assert!(prefix > substring, "{} <= {}", prefix, substring);
        assert!(substring > words_only, "{} <= {}", substring, words_only);
        assert!(words_only > 0.0);
    }

    #[test]
    fn test_earlier_words_score_higher() {
        let early = score("timeout in the gateway", "timeout", "content");
        let late = score("the gateway hit a timeout", "timeout", "content");
        assert!(early > late);
    }

    #[test]
    fn test_word_boundary_bonus() {
        let whole = score("config file", "config", "content");
        let partial = score("configuration file", "config", "content");
        assert_eq!(whole - partial, WORD_BOUNDARY_BONUS);
    }

    #[test]
    fn test_field_weights() {
        assert_eq!(field_weight("title"), 2.0);
        assert_eq!(field_weight("name"), 2.0);
        assert_eq!(field_weight("email"), 1.5);
        assert_eq!(field_weight("tags"), 1.3);
        assert_eq!(field_weight("description"), 1.2);
        assert_eq!(field_weight("content"), 1.0);
        assert_eq!(field_weight("priority"), 1.0);

        let title = score("login", "login", "title");
        let email = score("login@x.com", "login", "email");
        assert!(title > email);
    }

    #[test]
    fn test_prepared_query_words() {
        let query = PreparedQuery::new("  Email, CONFIG ");
        assert_eq!(query.normalized(), "email config");
        assert_eq!(query.words(), ["email", "config"]);
        assert!(PreparedQuery::new("--").is_empty());
    }
}
