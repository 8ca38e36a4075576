//! Output mode abstraction for robot and human output.

use std::io::{self, IsTerminal};

use serde::Serialize;

use crate::cli::Cli;
use crate::config::GalleryConfig;
use crate::controller::ReconcileReport;
use crate::error::GalleryError;
use crate::record::PhotoRecord;
use crate::services::ExecutionMode;
use crate::theme::GalleryTheme;

pub mod human;
pub mod robot;

pub use human::HumanOutput;
pub use robot::RobotOutput;

/// Serializable view of a record.
///
/// `inlineContent` is only present when the caller asked for it and the
/// record carries it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoView<'a> {
    pub filepath: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_path: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_content: Option<&'a str>,
}

impl<'a> PhotoView<'a> {
    #[must_use]
    pub fn new(record: &'a PhotoRecord, inline: bool) -> Self {
        Self {
            filepath: &record.filepath,
            display_path: record.display_path.as_deref(),
            inline_content: if inline {
                record.inline_content.as_deref()
            } else {
                None
            },
        }
    }
}

/// Gallery listing as emitted by `gallery list`.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryView<'a> {
    pub mode: ExecutionMode,
    pub count: usize,
    pub photos: Vec<PhotoView<'a>>,
}

impl<'a> GalleryView<'a> {
    #[must_use]
    pub fn new(mode: ExecutionMode, photos: &'a [PhotoRecord], inline: bool) -> Self {
        Self {
            mode,
            count: photos.len(),
            photos: photos.iter().map(|p| PhotoView::new(p, inline)).collect(),
        }
    }
}

/// Build metadata printed by `gallery version`.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: &'static str,
    pub git_sha: &'static str,
    pub git_dirty: bool,
    pub build_timestamp: &'static str,
    pub rustc_version: &'static str,
    pub target: &'static str,
}

/// JSON formatting options for robot mode.
#[derive(Debug, Clone, Copy)]
pub enum RobotFormat {
    /// Pretty-printed JSON (default for --robot).
    Json,
    /// Single-line JSON (--format=json-compact).
    JsonCompact,
}

/// Determines how command output is rendered.
#[derive(Debug)]
pub enum OutputMode {
    /// JSON output for AI agents and scripting.
    Robot(RobotFormat),
    /// Styled terminal output for human users.
    Human(GalleryTheme),
}

impl OutputMode {
    /// Create OutputMode from CLI arguments.
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.use_json() {
            let format = if cli.use_compact_json() {
                RobotFormat::JsonCompact
            } else {
                RobotFormat::Json
            };
            Self::Robot(format)
        } else if cli.no_color || !io::stdout().is_terminal() {
            Self::Human(GalleryTheme::plain())
        } else {
            Self::Human(GalleryTheme::default())
        }
    }

    /// Convert into the appropriate Output implementation.
    #[must_use]
    pub fn into_output(self) -> Box<dyn Output> {
        match self {
            Self::Robot(format) => Box::new(RobotOutput::new(format)),
            Self::Human(theme) => Box::new(HumanOutput::new(theme)),
        }
    }
}

/// Trait for all output operations.
///
/// Commands call these methods without knowing the output mode.
pub trait Output {
    // Basic messages
    fn success(&self, message: &str);
    fn error(&self, error: &GalleryError);
    fn warning(&self, message: &str);

    // Gallery
    fn photo_list(&self, gallery: &GalleryView<'_>);
    fn photo(&self, photo: &PhotoView<'_>);
    fn photo_captured(&self, photo: &PhotoView<'_>);
    fn photo_deleted(&self, filepath: &str);
    fn reconcile_report(&self, report: &ReconcileReport);

    // Metadata
    fn config(&self, config: &GalleryConfig, path: Option<&str>);
    fn config_path(&self, path: &str, exists: bool);
    fn version_info(&self, info: &VersionInfo);
}
