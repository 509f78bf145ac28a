//! Full-text search query grammar.
//!
//! The store consumes a single-line query string where terms separated by a
//! space are AND'ed and the literal token `OR` between two terms creates a
//! disjunction. No other operators exist. Parsed form: a conjunction of
//! disjunction groups.

use serde::{Deserialize, Serialize};

/// A parsed full-text query: every group must match, a group matches when
/// any of its terms does. Terms are matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    groups: Vec<Vec<String>>,
}

impl SearchQuery {
    /// Parse a grammar string (translator output). Returns `None` when the
    /// input is empty, spans multiple lines, or yields no terms - callers
    /// treat that as a translator failure and fall back to [`from_phrase`].
    ///
    /// [`from_phrase`]: SearchQuery::from_phrase
    pub fn parse(raw: &str) -> Option<Self> {
        let line = raw.trim();
        if line.is_empty() || line.contains('\n') {
            return None;
        }

        let mut groups: Vec<Vec<String>> = Vec::new();
        let mut pending_or = false;
        for token in line.split_whitespace() {
            if token == "OR" {
                // Leading or doubled OR has no left operand and is dropped.
                pending_or = !groups.is_empty();
                continue;
            }
            let term = token.to_lowercase();
            if pending_or {
                groups.last_mut().unwrap().push(term);
                pending_or = false;
            } else {
                groups.push(vec![term]);
            }
        }

        if groups.is_empty() { None } else { Some(Self { groups }) }
    }

    /// Build a plain multi-term AND query from a raw user phrase. This is
    /// the fallback when the translator is unavailable; every whitespace
    /// token becomes its own conjunct, `OR` included.
    pub fn from_phrase(phrase: &str) -> Option<Self> {
        let groups: Vec<Vec<String>> = phrase
            .split_whitespace()
            .map(|t| vec![t.to_lowercase()])
            .collect();

        if groups.is_empty() { None } else { Some(Self { groups }) }
    }

    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }

    /// Whether the query matches a set of text surfaces. Each group must
    /// have at least one term contained in at least one surface.
    pub fn matches(&self, surfaces: &[&str]) -> bool {
        let lowered: Vec<String> = surfaces.iter().map(|s| s.to_lowercase()).collect();
        self.groups.iter().all(|group| {
            group
                .iter()
                .any(|term| lowered.iter().any(|s| s.contains(term)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(q: &SearchQuery) -> Vec<Vec<&str>> {
        q.groups()
            .iter()
            .map(|g| g.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn parse_plain_terms_are_anded() {
        let q = SearchQuery::parse("redstone piston").unwrap();
        assert_eq!(groups(&q), vec![vec!["redstone"], vec!["piston"]]);
    }

    #[test]
    fn parse_or_builds_disjunction_group() {
        let q = SearchQuery::parse("backup script OR addon world").unwrap();
        assert_eq!(
            groups(&q),
            vec![vec!["backup"], vec!["script", "addon"], vec!["world"]]
        );
    }

    #[test]
    fn parse_chained_or_extends_one_group() {
        let q = SearchQuery::parse("a OR b OR c").unwrap();
        assert_eq!(groups(&q), vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn parse_stray_or_tokens_are_dropped() {
        let q = SearchQuery::parse("OR a OR OR b OR").unwrap();
        assert_eq!(groups(&q), vec![vec!["a", "b"]]);
    }

    #[test]
    fn parse_rejects_empty_and_multiline() {
        assert!(SearchQuery::parse("").is_none());
        assert!(SearchQuery::parse("   ").is_none());
        assert!(SearchQuery::parse("a\nb").is_none());
        assert!(SearchQuery::parse("OR OR").is_none());
    }

    #[test]
    fn from_phrase_treats_or_as_literal_term() {
        let q = SearchQuery::from_phrase("cats OR dogs").unwrap();
        assert_eq!(groups(&q), vec![vec!["cats"], vec!["or"], vec!["dogs"]]);
    }

    #[test]
    fn matches_is_case_insensitive_across_surfaces() {
        let q = SearchQuery::parse("backup OR restore script").unwrap();
        assert!(q.matches(&["Auto Backup Script", ""]));
        assert!(q.matches(&["nightly RESTORE", "shell script how-to"]));
        assert!(!q.matches(&["backup only, no s-word here"]));
    }
}
