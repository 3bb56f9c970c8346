//! `[preview]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [preview]
//! quiet_period_ms = 500     # Silence after the last edit before compiling
//! skip_unchanged = false    # Skip compiling text identical to the last request
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::preview::DEFAULT_QUIET_PERIOD;

/// Live preview timing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Quiet period in milliseconds.
    pub quiet_period_ms: u64,

    /// Skip a compile when the text equals the last compiled text.
    /// - `false` (default): every quiet period compiles
    /// - `true`: identical text is not recompiled
    pub skip_unchanged: bool,
}

impl PreviewConfig {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: DEFAULT_QUIET_PERIOD.as_millis() as u64,
            skip_unchanged: false,
        }
    }
}
