//! Robot mode JSON output implementation.

use serde::Serialize;
use tracing::{debug, error, instrument, trace};

use crate::config::GalleryConfig;
use crate::controller::ReconcileReport;
use crate::error::GalleryError;

use super::{GalleryView, Output, PhotoView, RobotFormat, VersionInfo};

/// JSON output implementation for AI agents and scripting.
///
/// Results go to stdout. Errors go to stderr as pretty JSON.
pub struct RobotOutput {
    format: RobotFormat,
}

impl RobotOutput {
    #[instrument]
    pub fn new(format: RobotFormat) -> Self {
        debug!(?format, "Creating RobotOutput");
        Self { format }
    }

    fn render<T: Serialize + ?Sized>(&self, data: &T) -> Option<String> {
        let rendered = match self.format {
            RobotFormat::Json => serde_json::to_string_pretty(data),
            RobotFormat::JsonCompact => serde_json::to_string(data),
        };
        match rendered {
            Ok(json) => {
                trace!(json_len = json.len(), "JSON serialized");
                Some(json)
            }
            Err(e) => {
                error!(error = %e, "Failed to serialize output");
                None
            }
        }
    }

    /// Output any serializable data as JSON to stdout.
    fn output_json<T: Serialize + ?Sized>(&self, data: &T) {
        if let Some(json) = self.render(data) {
            println!("{json}");
        }
    }

    /// Output pretty JSON to stderr.
    fn output_json_stderr<T: Serialize>(&self, data: &T) {
        match serde_json::to_string_pretty(data) {
            Ok(json) => eprintln!("{json}"),
            Err(e) => error!(error = %e, "Failed to serialize error"),
        }
    }
}

impl Output for RobotOutput {
    #[instrument(skip(self))]
    fn success(&self, message: &str) {
        self.output_json(&serde_json::json!({
            "success": true,
            "message": message
        }));
    }

    #[instrument(skip(self))]
    fn error(&self, error: &GalleryError) {
        debug!(error = %error, "Robot: error");
        self.output_json_stderr(&serde_json::json!({
            "error": true,
            "message": error.to_string(),
            "suggestion": error.suggestion(),
            "recoverable": error.is_user_recoverable(),
        }));
    }

    #[instrument(skip(self))]
    fn warning(&self, message: &str) {
        self.output_json(&serde_json::json!({
            "warning": true,
            "message": message
        }));
    }

    #[instrument(skip(self, gallery), fields(count = gallery.count))]
    fn photo_list(&self, gallery: &GalleryView<'_>) {
        self.output_json(gallery);
    }

    #[instrument(skip(self, photo), fields(filepath = photo.filepath))]
    fn photo(&self, photo: &PhotoView<'_>) {
        self.output_json(photo);
    }

    #[instrument(skip(self, photo), fields(filepath = photo.filepath))]
    fn photo_captured(&self, photo: &PhotoView<'_>) {
        self.output_json(&serde_json::json!({
            "success": true,
            "captured": photo,
        }));
    }

    #[instrument(skip(self))]
    fn photo_deleted(&self, filepath: &str) {
        self.output_json(&serde_json::json!({
            "success": true,
            "deleted": filepath,
        }));
    }

    #[instrument(skip(self, report), fields(missing = report.missing.len()))]
    fn reconcile_report(&self, report: &ReconcileReport) {
        self.output_json(&serde_json::json!({
            "clean": report.is_clean(),
            "checked": report.checked,
            "missing": report.missing,
            "orphaned": report.orphaned,
        }));
    }

    #[instrument(skip(self, config))]
    fn config(&self, config: &GalleryConfig, path: Option<&str>) {
        self.output_json(&serde_json::json!({
            "config_path": path,
            "config": config,
        }));
    }

    #[instrument(skip(self))]
    fn config_path(&self, path: &str, exists: bool) {
        self.output_json(&serde_json::json!({
            "config_path": path,
            "exists": exists,
        }));
    }

    fn version_info(&self, info: &VersionInfo) {
        self.output_json(info);
    }
}
