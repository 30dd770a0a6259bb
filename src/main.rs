//! Evalens - analytics for video-evaluation sessions
//!
//! A CLI tool that reads a session snapshot and writes a report with
//! evaluator totals, agreement, score distributions and comment timeline.
//!
//! Exit codes:
//!   0 - Success (agreement at or above --fail-below, or no threshold set)
//!   1 - Runtime error (unreadable snapshot, invalid config, etc.)
//!   2 - Overall agreement below the --fail-below threshold

use anyhow::{Context, Result};
use evalens::cli::{Args, OutputFormat};
use evalens::config::{Config, CONFIG_FILE_NAME};
use evalens::report::{self, AnalysisSettings};
use evalens::session;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration first so general.verbose can pick the log level
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(&config, args.quiet);

    info!("Evalens v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    source.log();

    match run_analysis(args, config) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .evalens.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize timeline windows, thresholds and report sections.");
    Ok(())
}

/// Initialize logging based on the merged configuration.
fn init_logging(config: &Config, quiet: bool) {
    let level = config.log_level(quiet);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete analysis workflow. Returns exit code (0 or 2).
fn run_analysis(args: Args, config: Config) -> Result<i32> {
    config.validate()?;

    // Step 1: Load the session
    let input = args
        .input
        .as_deref()
        .context("An input session file is required")?;
    if !args.quiet {
        println!("📥 Loading session: {}", input.display());
    }
    let snapshot = session::load_snapshot(input)?;

    // Step 2: Run the analytics
    let mut settings = AnalysisSettings::from(&config);
    settings.video_duration = args.video_duration;

    let report = report::build_report(&snapshot, &settings)
        .with_context(|| format!("Failed to analyze session {}", snapshot.session.id))?;

    // Step 3: Render and save the report
    let output = match config.report.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    let output_path = PathBuf::from(&config.general.output);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    if !args.quiet {
        println!("\n📊 Session Summary:");
        println!(
            "   Evaluations: {} analyzed of {}",
            report.metadata.evaluations_analyzed, report.metadata.evaluations_total
        );
        match report.agreement.overall {
            Some(overall) => println!("   Overall agreement: {:.1}%", overall * 100.0),
            None => println!("   Overall agreement: not enough evaluations"),
        }
        println!("   Problem areas: {}", report.agreement.problem_areas.len());
        println!("   Comments: {}", report.metadata.comments_total);
        println!(
            "\n✅ Analysis complete! Report saved to: {}",
            output_path.display()
        );
    }

    // Check --fail-below threshold
    if let Some(threshold) = args.fail_below {
        match report.agreement.overall {
            Some(overall) if overall < threshold => {
                eprintln!(
                    "\n⛔ Overall agreement {:.3} is below {:.3}. Failing (exit code 2).",
                    overall, threshold
                );
                return Ok(2);
            }
            None => warn!("Agreement threshold ignored: not enough evaluations"),
            _ => {}
        }
    }

    Ok(0)
}

/// Where the configuration came from, logged once the subscriber is up.
enum ConfigSource {
    Explicit(PathBuf),
    Default,
    Builtin,
    Unreadable(anyhow::Error),
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigSource::Default => info!("Loaded default config from {}", CONFIG_FILE_NAME),
            ConfigSource::Builtin => debug!("No config file found, using defaults"),
            ConfigSource::Unreadable(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is initialized, so it reports through `ConfigSource`.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::Default)),
        Ok(None) => Ok((Config::default(), ConfigSource::Builtin)),
        Err(e) => Ok((Config::default(), ConfigSource::Unreadable(e))),
    }
}
