//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// livetex: live preview for LaTeX documents
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: livetex.toml)
    #[arg(short = 'C', long, default_value = "livetex.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Watch a source file and recompile after each pause in editing
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        target: TargetArgs,

        /// Quiet period in milliseconds before a compile starts
        #[arg(short, long = "quiet-period", value_name = "MS")]
        quiet_period: Option<u64>,
    },

    /// Compile a source file once
    #[command(visible_alias = "c")]
    Compile {
        #[command(flatten)]
        target: TargetArgs,
    },
}

impl Commands {
    pub fn target(&self) -> &TargetArgs {
        match self {
            Self::Watch { target, .. } | Self::Compile { target } => target,
        }
    }
}

/// Source and output shared by all commands
#[derive(clap::Args, Debug, Clone)]
pub struct TargetArgs {
    /// LaTeX source file
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,

    /// Output PDF path (relative to current directory)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}
