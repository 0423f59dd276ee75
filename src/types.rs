//! Shared types used across modules
//!
//! This module contains types that are used by multiple modules
//! to avoid circular dependencies.

use serde::{Deserialize, Serialize};

/// A stored learning: a rule captured after a past correction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LearningRecord {
    pub category: String,
    pub rule: String,
    /// The mistake that produced the rule; may be empty
    pub mistake: String,
}

impl LearningRecord {
    pub fn new(category: &str, rule: &str, mistake: &str) -> Self {
        Self {
            category: category.to_string(),
            rule: rule.to_string(),
            mistake: mistake.to_string(),
        }
    }

    /// Parse a `category|rule|mistake` row as printed by the sqlite3 shell.
    ///
    /// Missing trailing fields become empty strings. Anything after the
    /// second delimiter belongs to the mistake.
    pub fn from_delimited(line: &str, delimiter: char) -> Self {
        let mut parts = line.splitn(3, delimiter);
        let category = parts.next().unwrap_or_default();
        let rule = parts.next().unwrap_or_default();
        let mistake = parts.next().unwrap_or_default();
        Self::new(category, rule, mistake)
    }

    pub fn has_mistake(&self) -> bool {
        !self.mistake.is_empty()
    }
}
