//! Configuration management for `livetex.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── compiler   # [compiler]
//! │   ├── output     # [output]
//! │   └── preview    # [preview]
//! ├── types/         # Utility types
//! │   └── error      # ConfigError, ConfigDiagnostics
//! └── mod.rs         # LiveConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section      | Purpose                                        |
//! |--------------|------------------------------------------------|
//! | `[preview]`  | Quiet period and unchanged-text skipping       |
//! | `[compiler]` | External compiler command, args and timeout    |
//! | `[output]`   | Where the rendered document is written         |
//!
//! The config file is optional. Without one every section uses its defaults.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{CompilerConfig, OutputConfig, PreviewConfig};
pub use types::{ConfigDiagnostics, ConfigError};

use crate::{
    cli::{Cli, Commands},
    debug, log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing livetex.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiveConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Directory relative paths are resolved against (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Live preview settings
    #[serde(default)]
    pub preview: PreviewConfig,

    /// Compiler settings
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

impl LiveConfig {
    /// Load configuration for the given CLI invocation.
    ///
    /// Searches upward from cwd for the config file. Relative paths in the
    /// file resolve against its directory, CLI paths against cwd.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
                config.config_path = Some(path);
                config
            }
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                Self {
                    root: cwd.clone(),
                    ..Self::default()
                }
            }
        };

        config.output.path = config.root.join(&config.output.path);
        config.apply_command_options(cli, &cwd);
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli, cwd: &Path) {
        let target = cli.command.target();
        if let Some(output) = &target.output {
            self.output.path = cwd.join(output);
        }

        match &cli.command {
            Commands::Watch { quiet_period, .. } => {
                Self::update_option(&mut self.preview.quiet_period_ms, quiet_period.as_ref());
            }
            Commands::Compile { .. } => {}
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        if self.preview.quiet_period_ms == 0 {
            diag.error_with_hint(
                "preview.quiet_period_ms",
                "must be greater than 0",
                "500 is a comfortable typing pause",
            );
        }
        if self.compiler.command.trim().is_empty() {
            diag.error_with_hint(
                "compiler.command",
                "must not be empty",
                "use \"latexmk\" or a full path to the compiler",
            );
        }
        if self.compiler.timeout_secs == 0 {
            diag.error("compiler.timeout_secs", "must be greater than 0");
        }
        if self.output.path.file_name().is_none() {
            diag.error("output.path", "must name a file");
        }

        diag.into_result()
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking if there are unknown fields (to catch config
/// typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> LiveConfig {
    let (parsed, ignored) = LiveConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse_cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("livetex").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result = LiveConfig::from_str("[preview\nquiet_period_ms = 1");
        assert!(result.is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(LiveConfig::default().validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[preview]\nquiet_period_ms = 300\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = LiveConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.preview.quiet_period_ms, 300);
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let (_, ignored) = LiveConfig::parse_with_ignored("[output]\npath = \"a.pdf\"").unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let config = test_parse_config(
            "[preview]\nquiet_period_ms = 0\n[compiler]\ncommand = \"\"\ntimeout_secs = 0",
        );

        let Err(ConfigError::Validation(diag)) = config.validate() else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = diag.errors().iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "preview.quiet_period_ms",
                "compiler.command",
                "compiler.timeout_secs"
            ]
        );
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = test_parse_config("[preview]\nquiet_period_ms = 800");
        let cli = parse_cli(&["watch", "main.tex", "-o", "out.pdf", "--quiet-period", "250"]);

        config.apply_command_options(&cli, Path::new("/work"));

        assert_eq!(config.preview.quiet_period_ms, 250);
        assert_eq!(config.output.path, PathBuf::from("/work/out.pdf"));
    }

    #[test]
    fn test_cli_without_overrides_keeps_config() {
        let mut config = test_parse_config("[preview]\nquiet_period_ms = 800");
        config.output.path = PathBuf::from("/doc/preview.pdf");
        let cli = parse_cli(&["compile", "main.tex"]);

        config.apply_command_options(&cli, Path::new("/work"));

        assert_eq!(config.preview.quiet_period_ms, 800);
        assert_eq!(config.output.path, PathBuf::from("/doc/preview.pdf"));
    }
}
