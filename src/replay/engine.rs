//! Replay engine - runs the pipeline and fails open
//!
//! Each stage yields a `ReplayResult`; any error ends the run with no advisory.
//! Nothing here can change the host's success status.

use tracing::debug;

use super::{
    KeywordExtractor, QueryBuilder, ReplayError, ReplayResult, ResultFormatter, MAX_RESULTS,
};
use crate::gateway::SearchGateway;

/// Result of one replay
#[derive(Debug)]
pub enum ReplayOutcome {
    /// Advisory text for the side channel
    Advisory(String),
    /// The lookup ran and nothing matched
    NoMatches,
    /// A stage bailed out; nothing to show
    Skipped(ReplayError),
}

impl ReplayOutcome {
    pub fn advisory(&self) -> Option<&str> {
        match self {
            ReplayOutcome::Advisory(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_advisory(self) -> Option<String> {
        match self {
            ReplayOutcome::Advisory(text) => Some(text),
            _ => None,
        }
    }
}

/// Prompt → keywords → match expression → ranked records → advisory
pub struct ReplayEngine {
    extractor: KeywordExtractor,
    builder: QueryBuilder,
    formatter: ResultFormatter,
    gateway: Box<dyn SearchGateway>,
}

impl ReplayEngine {
    pub fn new(gateway: Box<dyn SearchGateway>, formatter: ResultFormatter) -> Self {
        Self {
            extractor: KeywordExtractor::new(),
            builder: QueryBuilder::new(),
            formatter,
            gateway,
        }
    }

    /// Run one replay. Never fails; see `ReplayOutcome`.
    pub async fn run(&self, prompt: Option<&str>) -> ReplayOutcome {
        match self.try_run(prompt).await {
            Ok(Some(text)) => ReplayOutcome::Advisory(text),
            Ok(None) => {
                debug!(gateway = self.gateway.name(), "No learnings matched");
                ReplayOutcome::NoMatches
            }
            Err(e) => {
                debug!(gateway = self.gateway.name(), kind = e.kind(), error = %e, "Replay skipped");
                ReplayOutcome::Skipped(e)
            }
        }
    }

    async fn try_run(&self, prompt: Option<&str>) -> ReplayResult<Option<String>> {
        if !self.gateway.is_available() {
            return Err(ReplayError::AbsentStore(format!(
                "{} store unavailable",
                self.gateway.name()
            )));
        }

        let keywords = self.extractor.extract(prompt);
        if keywords.is_empty() {
            return Err(ReplayError::NoUsableTerms);
        }

        let expr = self.builder.build(&keywords)?;
        debug!(keywords = keywords.len(), query = %expr, "Searching learnings");

        let mut records = self.gateway.search(&expr).await?;
        records.truncate(MAX_RESULTS);

        Ok(self.formatter.format(&records))
    }
}
