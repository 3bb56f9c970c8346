//! `[output]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [output]
//! path = "preview.pdf"    # Relative to the config file's directory
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the rendered document is published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("preview.pdf"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::config::test_parse_config;

    #[test]
    fn test_output_config() {
        let config = test_parse_config("[output]\npath = \"build/out.pdf\"");
        assert_eq!(config.output.path, PathBuf::from("build/out.pdf"));
    }

    #[test]
    fn test_output_config_default() {
        let config = test_parse_config("");
        assert_eq!(config.output.path, PathBuf::from("preview.pdf"));
    }
}
