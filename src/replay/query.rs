//! FTS5 match expression construction
//!
//! Keywords are re-sanitized here regardless of how they were produced, then
//! quoted so FTS5 treats each one as a plain term: `"near"`, `"not"` and
//! friends lose any operator meaning inside quotes.

use std::fmt;

use super::{ReplayError, ReplayResult, MAX_QUERY_TERMS};

/// A non-empty boolean-OR expression of quoted terms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchExpression {
    terms: Vec<String>,
}

impl MatchExpression {
    /// Sanitized terms, unquoted, in query order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn as_fts(&self) -> String {
        self.terms
            .iter()
            .map(|t| format!("\"{}\"", t))
            .collect::<Vec<_>>()
            .join(" OR ")
    }
}

impl fmt::Display for MatchExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_fts())
    }
}

/// Builds bounded match expressions from keywords
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder {
    max_terms: usize,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self {
            max_terms: MAX_QUERY_TERMS,
        }
    }

    /// Build an expression from the earliest keywords.
    ///
    /// Fails with `NoUsableTerms` when nothing survives sanitization; callers
    /// must not query in that case.
    pub fn build<S: AsRef<str>>(&self, keywords: &[S]) -> ReplayResult<MatchExpression> {
        let terms: Vec<String> = keywords
            .iter()
            .take(self.max_terms)
            .map(|k| sanitize_term(k.as_ref()))
            .filter(|t| t.len() > 2)
            .collect();

        if terms.is_empty() {
            return Err(ReplayError::NoUsableTerms);
        }

        Ok(MatchExpression { terms })
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip everything outside `[a-z0-9_-]`
fn sanitize_term(term: &str) -> String {
    term.chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect()
}
