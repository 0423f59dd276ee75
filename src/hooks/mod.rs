//! Prompt-submit hook payload
//!
//! The host delivers a JSON object on stdin. Only `user_prompt` matters here;
//! anything missing, mistyped or unparseable is treated as an empty prompt.

use serde::Deserialize;
use std::io::Read;
use tracing::debug;

use crate::replay::{ReplayError, ReplayResult};

/// Hook input record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub user_prompt: Option<String>,
}

impl HookInput {
    /// Parse a payload strictly
    pub fn parse(raw: &str) -> ReplayResult<Self> {
        serde_json::from_str(raw).map_err(|e| ReplayError::MalformedInput(e.to_string()))
    }

    /// Parse a payload, degrading any problem to an empty prompt
    pub fn parse_lenient(raw: &str) -> Self {
        match Self::parse(raw) {
            Ok(input) => input,
            Err(e) => {
                debug!(kind = e.kind(), error = %e, "Ignoring hook payload");
                Self::default()
            }
        }
    }

    /// Read and leniently parse the payload from a reader
    pub fn read_from<R: Read>(mut reader: R) -> Self {
        let mut raw = String::new();
        if let Err(e) = reader.read_to_string(&mut raw) {
            debug!(error = %e, "Failed to read hook payload");
            return Self::default();
        }
        Self::parse_lenient(&raw)
    }

    pub fn prompt(&self) -> Option<&str> {
        self.user_prompt.as_deref()
    }
}
