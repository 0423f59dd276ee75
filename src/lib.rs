//! Replay Learnings - surfaces stored learnings relevant to a new prompt
//!
//! Extracts salient keywords from a prompt, turns them into a bounded,
//! injection-safe FTS5 match expression, looks them up in the learnings store
//! and renders the best matches as advisory text. Every failure is silent:
//! the advisory is a side channel and must never block the prompt.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use replay_learnings::{EmbeddedGateway, ReplayEngine, ResultFormatter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let gateway = EmbeddedGateway::new("/home/me/.pro-workflow/data.db", Duration::from_secs(3));
//!     let engine = ReplayEngine::new(Box::new(gateway), ResultFormatter::default());
//!     if let Some(text) = engine.run(Some("Why does the scheduler retry loop race?")).await.into_advisory() {
//!         eprintln!("{}", text);
//!     }
//! }
//! ```

pub mod types;
pub mod replay;
pub mod gateway;
pub mod config;
pub mod hooks;
pub mod cli;

pub use types::LearningRecord;

pub use replay::{
    KeywordExtractor,
    QueryBuilder,
    MatchExpression,
    ResultFormatter,
    ReplayEngine,
    ReplayOutcome,
    ReplayError,
};

pub use gateway::{SearchGateway, EmbeddedGateway, ProcessGateway};

pub use config::Config;

pub use hooks::HookInput;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
