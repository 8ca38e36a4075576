//! Photo gallery CLI.
//!
//! Provides both human-friendly and agent-friendly (robot mode) interfaces.
#![forbid(unsafe_code)]

use std::io;
use std::sync::Arc;

use clap::Parser;
use console::style;
use serde::Serialize;
use tracing::debug;

use gallery::cli::{self, Cli, Commands};
use gallery::config::{GalleryConfig, default_config_path};
use gallery::controller::PhotoGallery;
use gallery::error::{GalleryError, Result, ResultExt};
use gallery::logging::init_logging;
use gallery::output::{GalleryView, Output, OutputMode, PhotoView, VersionInfo};
use gallery::record::PhotoRecord;
use gallery::services::{CaptureService, FileImportCapture, UnavailableCapture};

/// Build information embedded at compile time.
mod build_info {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    pub fn git_sha() -> &'static str {
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown")
    }

    pub fn git_dirty() -> bool {
        option_env!("VERGEN_GIT_DIRTY") == Some("true")
    }

    pub fn build_timestamp() -> &'static str {
        option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown")
    }

    pub fn rustc_semver() -> &'static str {
        option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown")
    }

    pub fn target() -> &'static str {
        option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown")
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.use_json(), cli.verbose, cli.quiet, cli.no_color);
    if cli.no_color {
        console::set_colors_enabled(false);
    }

    let output = OutputMode::from_cli(&cli).into_output();

    if let Err(e) = run(&cli, output.as_ref()).await {
        output.error(&e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli, out: &dyn Output) -> Result<()> {
    match &cli.command {
        None => print_quick_start(cli),
        Some(Commands::List(args)) => cmd_list(cli, out, args).await,
        Some(Commands::Capture(args)) => cmd_capture(cli, out, args).await,
        Some(Commands::Delete(args)) => cmd_delete(cli, out, args).await,
        Some(Commands::Show(args)) => cmd_show(cli, out, args).await,
        Some(Commands::Reconcile) => cmd_reconcile(cli, out).await,
        Some(Commands::Config(args)) => cmd_config(cli, out, args),
        Some(Commands::Version) => {
            cmd_version(out);
            Ok(())
        }
        Some(Commands::Completions(args)) => {
            cmd_completions(args);
            Ok(())
        }
    }
}

// === Setup ===

/// Load the config file and apply CLI overrides.
fn load_config(cli: &Cli) -> Result<GalleryConfig> {
    let mut config = GalleryConfig::load(cli.config.as_deref())?;
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(std::path::absolute(dir)?);
    }
    debug!(?config, "Effective configuration");
    Ok(config)
}

/// Build and initialize a gallery.
async fn open_gallery(
    config: &GalleryConfig,
    capture: Arc<dyn CaptureService>,
) -> Result<PhotoGallery> {
    let gallery = config.build_gallery(capture)?;
    gallery.initialize().await?;
    Ok(gallery)
}

async fn open_read_only(cli: &Cli) -> Result<PhotoGallery> {
    let config = load_config(cli)?;
    open_gallery(&config, Arc::new(UnavailableCapture)).await
}

// === Quick Start ===

fn print_quick_start(cli: &Cli) -> Result<()> {
    if cli.use_json() {
        let help = RobotQuickStart {
            tool: "gallery",
            version: build_info::VERSION,
            description: "Local photo gallery with native and web execution modes",
            commands: RobotCommands {
                list: "gallery list --robot",
                capture: "gallery capture <IMAGE> [--quality N]",
                show: "gallery show <FILEPATH>",
                delete: "gallery delete <FILEPATH>",
                reconcile: "gallery reconcile",
                config: "gallery config",
            },
            output_modes: OutputModes {
                human: "--format=text (default)",
                robot: "--robot or --format=json",
                compact: "--format=json-compact",
            },
            modes: "--mode native|web (or GALLERY_MODE)",
        };
        let json =
            serde_json::to_string_pretty(&help).with_context(|| "Failed to render quick start")?;
        println!("{json}");
    } else {
        print_human_quick_start();
    }
    Ok(())
}

fn print_human_quick_start() {
    println!(
        "{} {} - local photo gallery\n",
        style("gallery").bold().cyan(),
        build_info::VERSION
    );

    println!("{}", style("QUICK START").bold().underlined());
    println!();
    println!("  {}  List photos", style("gallery list").green());
    println!("  {}  Add a photo", style("gallery capture photo.png").green());
    println!("  {}  Show one photo", style("gallery show <FILEPATH>").green());
    println!("  {}  Delete a photo", style("gallery delete <FILEPATH>").green());
    println!("  {}  Find missing and orphaned files", style("gallery reconcile").green());
    println!();

    println!("{}", style("ROBOT MODE (for AI agents)").bold().underlined());
    println!();
    println!("  {}  JSON output", style("gallery --robot <command>").cyan());
    println!("  {}  Quick-start JSON", style("gallery --robot").cyan());
    println!();

    println!("Run {} for full help", style("gallery --help").yellow());
}

#[derive(Serialize)]
struct RobotQuickStart {
    tool: &'static str,
    version: &'static str,
    description: &'static str,
    commands: RobotCommands,
    output_modes: OutputModes,
    modes: &'static str,
}

#[derive(Serialize)]
struct RobotCommands {
    list: &'static str,
    capture: &'static str,
    show: &'static str,
    delete: &'static str,
    reconcile: &'static str,
    config: &'static str,
}

#[derive(Serialize)]
struct OutputModes {
    human: &'static str,
    robot: &'static str,
    compact: &'static str,
}

// === Command Implementations ===

async fn cmd_list(cli: &Cli, out: &dyn Output, args: &cli::ListArgs) -> Result<()> {
    let gallery = open_read_only(cli).await?;
    let photos = gallery.photos();
    out.photo_list(&GalleryView::new(gallery.mode(), &photos, args.inline));
    Ok(())
}

async fn cmd_capture(cli: &Cli, out: &dyn Output, args: &cli::CaptureArgs) -> Result<()> {
    let mut config = load_config(cli)?;
    if let Some(quality) = args.quality {
        config.quality = quality;
    }

    let capture = FileImportCapture::new(&args.source, config.scratch_dir()?, config.mode)?;
    let purged = capture.purge_scratch().await?;
    if purged > 0 {
        debug!(purged, dir = %capture.scratch_dir().display(), "Cleared earlier captures");
    }
    let gallery = open_gallery(&config, Arc::new(capture)).await?;
    let record = gallery.capture().await?;
    out.photo_captured(&PhotoView::new(&record, false));
    Ok(())
}

async fn cmd_delete(cli: &Cli, out: &dyn Output, args: &cli::DeleteArgs) -> Result<()> {
    let gallery = open_read_only(cli).await?;
    let record = find_record(&gallery, &args.filepath)?;
    if gallery.delete(&record).await? {
        out.photo_deleted(&record.filepath);
    } else {
        out.warning(&format!("Nothing deleted for {}", record.filepath));
    }
    Ok(())
}

async fn cmd_show(cli: &Cli, out: &dyn Output, args: &cli::ShowArgs) -> Result<()> {
    let gallery = open_read_only(cli).await?;
    let record = find_record(&gallery, &args.filepath)?;
    out.photo(&PhotoView::new(&record, args.inline));
    Ok(())
}

async fn cmd_reconcile(cli: &Cli, out: &dyn Output) -> Result<()> {
    let gallery = open_read_only(cli).await?;
    let report = gallery.reconcile().await?;
    out.reconcile_report(&report);
    Ok(())
}

fn cmd_config(cli: &Cli, out: &dyn Output, args: &cli::ConfigArgs) -> Result<()> {
    let path = match &cli.config {
        Some(p) => Some(p.clone()),
        None => default_config_path().ok(),
    };

    if args.path {
        let path = path.ok_or_else(|| {
            GalleryError::ConfigInvalid("Could not determine config directory".to_string())
        })?;
        out.config_path(&path.display().to_string(), path.exists());
        return Ok(());
    }

    let config = load_config(cli)?;
    let shown = path.filter(|p| p.exists()).map(|p| p.display().to_string());
    out.config(&config, shown.as_deref());
    Ok(())
}

fn cmd_version(out: &dyn Output) {
    out.version_info(&VersionInfo {
        version: build_info::VERSION,
        git_sha: build_info::git_sha(),
        git_dirty: build_info::git_dirty(),
        build_timestamp: build_info::build_timestamp(),
        rustc_version: build_info::rustc_semver(),
        target: build_info::target(),
    });
}

fn cmd_completions(args: &cli::CompletionsArgs) {
    use clap::CommandFactory;
    clap_complete::generate(args.shell, &mut Cli::command(), "gallery", &mut io::stdout());
}

// === Utility Functions ===

fn find_record(gallery: &PhotoGallery, filepath: &str) -> Result<PhotoRecord> {
    gallery
        .find(filepath)
        .ok_or_else(|| GalleryError::RecordNotFound {
            filepath: filepath.to_string(),
        })
}
