//! Theme system for human-mode output.

use console::Style;

/// Visual theme for gallery human-mode output.
///
/// Centralizes styles so every command renders the same way.
#[derive(Debug, Clone)]
pub struct GalleryTheme {
    pub accent: Style,
    pub success: Style,
    pub error: Style,
    pub warning: Style,
    pub muted: Style,

    pub header: Style,
    pub label: Style,
    pub value: Style,
    pub filepath: Style,
    pub index: Style,
}

impl Default for GalleryTheme {
    fn default() -> Self {
        Self {
            accent: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            warning: Style::new().yellow().bold(),
            muted: Style::new().dim(),
            header: Style::new().bold().underlined(),
            label: Style::new().dim(),
            value: Style::new().bold(),
            filepath: Style::new().green(),
            index: Style::new().yellow(),
        }
    }
}

impl GalleryTheme {
    /// Theme with every style stripped, for `--no-color` or piped output.
    #[must_use]
    pub fn plain() -> Self {
        let plain = Style::new();
        Self {
            accent: plain.clone(),
            success: plain.clone(),
            error: plain.clone(),
            warning: plain.clone(),
            muted: plain.clone(),
            header: plain.clone(),
            label: plain.clone(),
            value: plain.clone(),
            filepath: plain.clone(),
            index: plain,
        }
    }
}
