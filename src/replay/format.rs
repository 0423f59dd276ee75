//! Advisory rendering for ranked learnings

use crate::types::LearningRecord;

/// Default header prefix
pub const DEFAULT_BANNER: &str = "[ProWorkflow]";

/// Renders ranked records into advisory lines
#[derive(Debug, Clone)]
pub struct ResultFormatter {
    banner: String,
}

impl ResultFormatter {
    pub fn new(banner: &str) -> Self {
        Self {
            banner: banner.to_string(),
        }
    }

    /// Render records in the order given. Returns `None` for an empty list
    /// so callers emit nothing at all.
    pub fn format(&self, records: &[LearningRecord]) -> Option<String> {
        if records.is_empty() {
            return None;
        }

        let mut lines = Vec::with_capacity(records.len() * 2 + 1);
        lines.push(format!(
            "{} {} relevant learning(s) found:",
            self.banner,
            records.len()
        ));

        for record in records {
            lines.push(format!("  - [{}] {}", record.category, record.rule));
            if record.has_mistake() {
                lines.push(format!("    Mistake: {}", record.mistake));
            }
        }

        Some(lines.join("\n"))
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_BANNER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_renders_nothing() {
        assert_eq!(ResultFormatter::default().format(&[]), None);
    }

    #[test]
    fn test_two_records() {
        let records = vec![
            LearningRecord::new("concurrency", "Hold the lock across the retry check", "Checked then locked"),
            LearningRecord::new("testing", "Use paused time for timeout tests", ""),
        ];
        let out = ResultFormatter::default().format(&records).unwrap();
        assert_eq!(
            out,
            "[ProWorkflow] 2 relevant learning(s) found:\n\
             \x20 - [concurrency] Hold the lock across the retry check\n\
             \x20   Mistake: Checked then locked\n\
             \x20 - [testing] Use paused time for timeout tests"
        );
    }

    #[test]
    fn test_missing_fields_render_empty() {
        let records = vec![LearningRecord::from_delimited("solo", '|')];
        let out = ResultFormatter::new("[Learnings]").format(&records).unwrap();
        assert_eq!(out, "[Learnings] 1 relevant learning(s) found:\n  - [solo] ");
    }
}
