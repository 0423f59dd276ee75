//! In-process SQLite adapter
//!
//! Opens the store read-only, binds the match expression as a parameter and
//! runs the statement on the blocking pool. On timeout the statement is
//! interrupted through the connection's interrupt handle.

use async_trait::async_trait;
use rusqlite::{params, Connection, OpenFlags};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use super::{bounded, SearchGateway, LEARNINGS_QUERY};
use crate::replay::{MatchExpression, ReplayError, ReplayResult, MAX_RESULTS};
use crate::types::LearningRecord;

/// Largest busy timeout SQLite accepts (milliseconds as a C int)
const MAX_BUSY_TIMEOUT: Duration = Duration::from_millis(i32::MAX as u64);

/// SQLite adapter using the bundled engine
pub struct EmbeddedGateway {
    db_path: PathBuf,
    timeout: Duration,
}

impl EmbeddedGateway {
    pub fn new(db_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            db_path: db_path.into(),
            timeout,
        }
    }

    fn open(&self) -> ReplayResult<Connection> {
        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(self.timeout.min(MAX_BUSY_TIMEOUT))?;
        Ok(conn)
    }

    fn query(conn: &Connection, fts_query: &str) -> ReplayResult<Vec<LearningRecord>> {
        let mut stmt = conn.prepare(LEARNINGS_QUERY)?;

        // NULL columns degrade to empty strings
        let records = stmt
            .query_map(params![fts_query, MAX_RESULTS as i64], |row| {
                Ok(LearningRecord {
                    category: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    rule: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    mistake: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}

#[async_trait]
impl SearchGateway for EmbeddedGateway {
    fn is_available(&self) -> bool {
        self.db_path.is_file()
    }

    async fn search(&self, expr: &MatchExpression) -> ReplayResult<Vec<LearningRecord>> {
        if !self.is_available() {
            return Err(ReplayError::AbsentStore(self.db_path.display().to_string()));
        }

        let conn = self.open()?;
        let interrupt = conn.get_interrupt_handle();
        let fts_query = expr.as_fts();

        let task = tokio::task::spawn_blocking(move || Self::query(&conn, &fts_query));
        let result = bounded(self.timeout, async {
            task.await
                .map_err(|e| ReplayError::EngineFailure(format!("lookup task failed: {}", e)))?
        })
        .await;

        if let Err(ReplayError::Timeout(ms)) = &result {
            debug!(db = %self.db_path.display(), timeout_ms = ms, "Interrupting learnings lookup");
            interrupt.interrupt();
        }

        result
    }

    fn name(&self) -> &'static str {
        "embedded"
    }
}
