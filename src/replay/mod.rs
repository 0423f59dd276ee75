//! Learning Replay - surfaces stored learnings relevant to a prompt
//!
//! The pipeline runs one way: prompt → keywords → match expression →
//! ranked records → advisory text. Every stage returns an explicit outcome
//! and the engine turns any failure into silence.

pub mod keywords;
pub mod query;
pub mod format;
pub mod engine;

pub use keywords::{KeywordExtractor, STOP_WORDS};
pub use query::{MatchExpression, QueryBuilder};
pub use format::ResultFormatter;
pub use engine::{ReplayEngine, ReplayOutcome};

use thiserror::Error;

/// Prompts shorter than this (in characters) are never searched
pub const MIN_PROMPT_CHARS: usize = 20;

/// Maximum number of terms in a match expression
pub const MAX_QUERY_TERMS: usize = 8;

/// Maximum number of records returned by a lookup
pub const MAX_RESULTS: usize = 5;

/// Why a replay produced no advisory
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("learnings store not found at {0}")]
    AbsentStore(String),

    #[error("malformed hook input: {0}")]
    MalformedInput(String),

    #[error("no usable search terms in prompt")]
    NoUsableTerms,

    #[error("search engine failure: {0}")]
    EngineFailure(String),

    #[error("search timed out after {0}ms")]
    Timeout(u64),

    #[error("learnings database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReplayError {
    /// Short, stable label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ReplayError::AbsentStore(_) => "absent_store",
            ReplayError::MalformedInput(_) => "malformed_input",
            ReplayError::NoUsableTerms => "no_usable_terms",
            ReplayError::EngineFailure(_) | ReplayError::Database(_) | ReplayError::Io(_) => {
                "engine_failure"
            }
            ReplayError::Timeout(_) => "timeout",
        }
    }
}

pub type ReplayResult<T> = std::result::Result<T, ReplayError>;
