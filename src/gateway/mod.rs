//! Search gateway - bounded, read-only lookups against the learnings store
//!
//! Adapters own their timeout and error-status handling so the replay engine
//! can swap them without knowing how the lookup runs.

pub mod embedded;
pub mod process;

pub use embedded::EmbeddedGateway;
pub use process::ProcessGateway;

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use crate::config::{StoreAdapter, StoreConfig};
use crate::replay::{MatchExpression, ReplayError, ReplayResult, MAX_RESULTS};
use crate::types::LearningRecord;

/// Ranked lookup over the learnings table joined to its FTS5 index.
///
/// FTS5 `bm25()` scores better matches lower (more negative), so ascending
/// order puts the best match first.
pub const LEARNINGS_QUERY: &str = "SELECT l.category, l.rule, l.mistake \
     FROM learnings l \
     JOIN learnings_fts ON l.id = learnings_fts.rowid \
     WHERE learnings_fts MATCH ?1 \
     ORDER BY bm25(learnings_fts) \
     LIMIT ?2";

/// Same lookup with the expression inlined, for engines that take plain SQL
pub fn inline_sql(expr: &MatchExpression) -> String {
    // Terms are restricted to [a-z0-9_-] and wrapped in double quotes, so the
    // expression can never close the single-quoted literal.
    format!(
        "SELECT l.category, l.rule, l.mistake \
         FROM learnings l \
         JOIN learnings_fts ON l.id = learnings_fts.rowid \
         WHERE learnings_fts MATCH '{}' \
         ORDER BY bm25(learnings_fts) \
         LIMIT {};",
        expr.as_fts(),
        MAX_RESULTS
    )
}

/// A read-only ranked lookup over learning records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Whether the backing store exists. Checked before any query.
    fn is_available(&self) -> bool;

    /// Run the lookup, best match first, at most `MAX_RESULTS` rows.
    ///
    /// Must enforce its own timeout and report non-zero engine status as
    /// `EngineFailure`.
    async fn search(&self, expr: &MatchExpression) -> ReplayResult<Vec<LearningRecord>>;

    /// Adapter name for logs
    fn name(&self) -> &'static str;
}

/// Build the configured adapter
pub fn from_config(store: &StoreConfig, timeout: Duration) -> Box<dyn SearchGateway> {
    let db_path = store.resolved_path();
    match store.adapter {
        StoreAdapter::Embedded => Box::new(EmbeddedGateway::new(db_path, timeout)),
        StoreAdapter::Sqlite3 => Box::new(
            ProcessGateway::new(&store.sqlite3_bin, db_path, timeout)
                .with_program_args(store.sqlite3_args.clone()),
        ),
    }
}

/// Run `fut` with a hard deadline; expiry becomes `ReplayError::Timeout`
pub async fn bounded<T, F>(limit: Duration, fut: F) -> ReplayResult<T>
where
    F: Future<Output = ReplayResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(ReplayError::Timeout(limit.as_millis() as u64)),
    }
}
