//! Tracing setup for the gallery CLI.
//!
//! Logs always go to stderr so stdout stays clean for command output.

use std::io::{self, IsTerminal};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Initialize the tracing subscriber based on CLI flags and environment.
///
/// # Arguments
///
/// * `robot_mode` - If true, emit JSON lines for machine consumption
/// * `verbose` - Verbosity level: 0 = warn, 1 = info, 2 = debug, 3+ = trace
/// * `quiet` - If true, only errors are logged
/// * `no_color` - Disable ANSI styling even on a terminal
///
/// `RUST_LOG` overrides the computed filter (e.g. "gallery=debug,rusqlite=warn").
///
/// | Mode | TTY | Output |
/// |------|-----|--------|
/// | Robot | any | JSON lines to stderr |
/// | Human | yes | Colored compact lines to stderr |
/// | Human | no | Plain compact lines to stderr |
pub fn init_logging(robot_mode: bool, verbose: u8, quiet: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    // A second init (tests, embedding) keeps the first subscriber.
    let result = if robot_mode {
        let fmt_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(io::stderr);
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
    } else {
        let ansi = io::stderr().is_terminal() && !no_color;
        let fmt_layer = fmt::layer()
            .compact()
            .with_ansi(ansi)
            .with_target(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(io::stderr);
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Filter directive for the given verbosity flags.
#[must_use]
pub const fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "gallery=error";
    }
    match verbose {
        0 => "gallery=warn",
        1 => "gallery=info",
        2 => "gallery=debug",
        _ => "gallery=trace",
    }
}
