//! CLI argument definitions.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::services::ExecutionMode;

/// Photo gallery - capture, list and delete photos in a local gallery.
///
/// Robot Mode: Use --robot or --format=json for machine-parseable output.
#[derive(Parser, Debug)]
#[command(name = "gallery", version, about, long_about = None)]
#[command(propagate_version = true)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Output format (text for humans, json for agents/scripts)
    #[arg(
        long,
        short = 'f',
        default_value = "text",
        global = true,
        env = "GALLERY_FORMAT"
    )]
    pub format: OutputFormat,

    /// Robot mode: equivalent to --format=json
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only errors are logged)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "GALLERY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Execution mode, overriding the config file
    #[arg(long, global = true, env = "GALLERY_MODE")]
    pub mode: Option<ExecutionMode>,

    /// Data directory, overriding the config file
    #[arg(long, global = true, env = "GALLERY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts and agents
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

impl Cli {
    /// Returns true if output should be JSON (robot mode or explicit --format=json).
    pub const fn use_json(&self) -> bool {
        self.robot || matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    /// Returns true if output should be compact JSON.
    pub const fn use_compact_json(&self) -> bool {
        matches!(self.format, OutputFormat::JsonCompact)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load and print the gallery
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Capture a photo from an image file and add it to the gallery
    Capture(CaptureArgs),

    /// Delete a photo by filepath
    #[command(visible_alias = "rm")]
    Delete(DeleteArgs),

    /// Print a single photo record
    Show(ShowArgs),

    /// Report records whose file is missing
    Reconcile,

    /// Show the effective configuration
    Config(ConfigArgs),

    /// Show version and build information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Include inline (data URI) content for rehydrated records
    #[arg(long)]
    pub inline: bool,
}

#[derive(Parser, Debug)]
pub struct CaptureArgs {
    /// Source image file to import
    pub source: PathBuf,

    /// JPEG quality (0-100), overriding the config file
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub quality: Option<u8>,
}

#[derive(Parser, Debug)]
pub struct DeleteArgs {
    /// Filepath of the record, as shown by `gallery list`
    pub filepath: String,
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Filepath of the record
    pub filepath: String,

    /// Include inline content
    #[arg(long)]
    pub inline: bool,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Show configuration file path only
    #[arg(long)]
    pub path: bool,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
