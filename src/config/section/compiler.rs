//! `[compiler]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [compiler]
//! command = "latexmk"
//! args = ["-pdf", "-interaction=nonstopmode", "-halt-on-error"]
//! timeout_secs = 60
//! ```
//!
//! The source file name is appended after `args`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// External compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Program name or path, resolved on `PATH`.
    pub command: String,

    /// Arguments placed before the source file.
    pub args: Vec<String>,

    /// Kill a compile that runs longer than this.
    pub timeout_secs: u64,
}

impl CompilerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            command: "latexmk".to_string(),
            args: vec![
                "-pdf".to_string(),
                "-interaction=nonstopmode".to_string(),
                "-halt-on-error".to_string(),
            ],
            timeout_secs: 60,
        }
    }
}
