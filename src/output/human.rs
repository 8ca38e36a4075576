//! Human-friendly output implementation using console styles.

use tracing::{debug, instrument, trace};

use crate::config::GalleryConfig;
use crate::controller::ReconcileReport;
use crate::error::GalleryError;
use crate::theme::GalleryTheme;

use super::{GalleryView, Output, PhotoView, VersionInfo};

/// Styled terminal output implementation for human users.
pub struct HumanOutput {
    theme: GalleryTheme,
}

impl HumanOutput {
    #[instrument(skip(theme))]
    pub fn new(theme: GalleryTheme) -> Self {
        debug!("Creating HumanOutput");
        Self { theme }
    }

    fn field(&self, label: &str, value: &str) {
        println!(
            "  {} {}",
            self.theme.label.apply_to(format!("{label}:")),
            self.theme.value.apply_to(value)
        );
    }

    fn print_photo(&self, index: Option<usize>, photo: &PhotoView<'_>) {
        match index {
            Some(i) => println!(
                "{} {}",
                self.theme.index.apply_to(format!("[{i}]")),
                self.theme.filepath.apply_to(photo.filepath)
            ),
            None => println!("{}", self.theme.filepath.apply_to(photo.filepath)),
        }
        if let Some(display) = photo.display_path {
            self.field("display", display);
        }
        if let Some(inline) = photo.inline_content {
            self.field("inline", inline);
        }
    }
}

impl Output for HumanOutput {
    fn success(&self, message: &str) {
        println!("{} {message}", self.theme.success.apply_to("[OK]"));
    }

    #[instrument(skip(self))]
    fn error(&self, error: &GalleryError) {
        debug!(
            error = %error,
            recoverable = error.is_user_recoverable(),
            "Outputting error"
        );
        eprintln!("{} {error}", self.theme.error.apply_to("[ERR]"));
        if let Some(suggestion) = error.suggestion() {
            trace!(suggestion, "Adding suggestion");
            eprintln!(
                "{} {}",
                self.theme.warning.apply_to("Hint:"),
                self.theme.muted.apply_to(suggestion)
            );
        }
    }

    fn warning(&self, message: &str) {
        println!("{} {message}", self.theme.warning.apply_to("[WARN]"));
    }

    #[instrument(skip(self, gallery), fields(count = gallery.count))]
    fn photo_list(&self, gallery: &GalleryView<'_>) {
        if gallery.photos.is_empty() {
            self.warning("Gallery is empty");
            println!(
                "Add one with {}",
                self.theme.accent.apply_to("gallery capture <IMAGE>")
            );
            return;
        }

        println!(
            "{} {}",
            self.theme.header.apply_to("Gallery"),
            self.theme
                .muted
                .apply_to(format!("({} photos, {})", gallery.count, gallery.mode.as_str()))
        );
        for (i, photo) in gallery.photos.iter().enumerate() {
            self.print_photo(Some(i), photo);
        }
    }

    fn photo(&self, photo: &PhotoView<'_>) {
        self.print_photo(None, photo);
    }

    fn photo_captured(&self, photo: &PhotoView<'_>) {
        self.success("Photo captured");
        self.print_photo(None, photo);
    }

    fn photo_deleted(&self, filepath: &str) {
        self.success(&format!(
            "Deleted {}",
            self.theme.filepath.apply_to(filepath)
        ));
    }

    #[instrument(skip(self, report))]
    fn reconcile_report(&self, report: &ReconcileReport) {
        if report.is_clean() {
            self.success(&format!("All {} records have their files", report.checked));
            return;
        }
        if !report.missing.is_empty() {
            self.warning(&format!(
                "{} of {} records have no backing file",
                report.missing.len(),
                report.checked
            ));
            for filepath in &report.missing {
                println!("  - {}", self.theme.filepath.apply_to(filepath));
            }
        }
        if !report.orphaned.is_empty() {
            self.warning(&format!("{} files have no record", report.orphaned.len()));
            for name in &report.orphaned {
                println!("  - {}", self.theme.filepath.apply_to(name));
            }
        }
    }

    fn config(&self, config: &GalleryConfig, path: Option<&str>) {
        println!("{}", self.theme.header.apply_to("Configuration"));
        self.field("file", path.unwrap_or("(defaults)"));
        self.field("mode", config.mode.as_str());
        let data_dir = config
            .data_dir()
            .map_or_else(|e| format!("<{e}>"), |d| d.display().to_string());
        self.field("data_dir", &data_dir);
        self.field("storage_key", &config.storage_key);
        self.field("file_extension", &config.file_extension);
        self.field("quality", &config.quality.to_string());
        self.field("server_url", &config.server_url);
    }

    fn config_path(&self, path: &str, exists: bool) {
        if exists {
            println!("{path}");
        } else {
            println!("{path} {}", self.theme.muted.apply_to("(not created)"));
        }
    }

    fn version_info(&self, info: &VersionInfo) {
        println!("gallery {}", info.version);
        println!(
            "git: {}{}",
            info.git_sha,
            if info.git_dirty { " (dirty)" } else { "" }
        );
        println!("built: {}", info.build_timestamp);
        println!("rustc: {}", info.rustc_version);
        println!("target: {}", info.target);
    }
}
