//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Evalens - analytics for video-evaluation sessions
///
/// Reads a session snapshot (template, evaluations, comments, users) and
/// reports weighted totals, category averages, inter-evaluator agreement,
/// score distributions and the comment timeline.
///
/// Examples:
///   evalens --input session.json
///   evalens --input session.json --format json --output report.json
///   evalens --input session.json --complete-only --fail-below 0.6
///   evalens --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Session snapshot to analyze (JSON)
    #[arg(short, long, value_name = "FILE", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// Defaults to general.output from the config file (evalens_report.md)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT", env = "EVALENS_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .evalens.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Hotspot window width in seconds
    #[arg(long, value_name = "SECS")]
    pub cluster_width: Option<f64>,

    /// Number of hotspots to report
    #[arg(long, value_name = "COUNT")]
    pub top_n: Option<usize>,

    /// Only analyze evaluations submitted as complete
    #[arg(long)]
    pub complete_only: bool,

    /// Override the video duration from the snapshot (seconds)
    #[arg(long, value_name = "SECS")]
    pub video_duration: Option<f64>,

    /// Fail if overall agreement is below this value (0.0 - 1.0)
    ///
    /// Useful in review pipelines. Exit code 2 when the session falls below it.
    #[arg(long, value_name = "AGREEMENT")]
    pub fail_below: Option<f64>,

    /// Generate a default .evalens.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        match self.input {
            Some(ref input) if !input.is_file() => {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
            None => return Err("An input session file is required".to_string()),
            _ => {}
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(width) = self.cluster_width {
            if !width.is_finite() || width <= 0.0 {
                return Err("Cluster width must be a positive number of seconds".to_string());
            }
        }

        if self.top_n == Some(0) {
            return Err("Top N must be at least 1".to_string());
        }

        if let Some(duration) = self.video_duration {
            if !duration.is_finite() || duration < 0.0 {
                return Err("Video duration must be a non-negative number of seconds".to_string());
            }
        }

        if let Some(threshold) = self.fail_below {
            if !(0.0..=1.0).contains(&threshold) {
                return Err("Agreement threshold must be between 0.0 and 1.0".to_string());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn make_args(input: PathBuf) -> Args {
        Args {
            input: Some(input),
            output: None,
            format: None,
            config: None,
            verbose: false,
            quiet: false,
            cluster_width: None,
            top_n: None,
            complete_only: false,
            video_duration: None,
            fail_below: None,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_missing_input() {
        let args = make_args(PathBuf::from("/definitely/not/here.json"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_ranges() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let base = make_args(file.path().to_path_buf());
        assert!(base.validate().is_ok());

        let mut args = base.clone();
        args.cluster_width = Some(0.0);
        assert!(args.validate().is_err());

        let mut args = base.clone();
        args.top_n = Some(0);
        assert!(args.validate().is_err());

        let mut args = base.clone();
        args.video_duration = Some(-10.0);
        assert!(args.validate().is_err());

        let mut args = base.clone();
        args.fail_below = Some(1.2);
        assert!(args.validate().is_err());

        let mut args = base;
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args(PathBuf::from("missing.json"));
        args.input = None;
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_verbose_flag_reaches_log_level() {
        let mut config = Config::default();
        let mut args = make_args(PathBuf::from("session.json"));
        config.merge_with_args(&args);
        assert_eq!(config.log_level(args.quiet), tracing::Level::INFO);

        args.verbose = true;
        config.merge_with_args(&args);
        assert_eq!(config.log_level(args.quiet), tracing::Level::DEBUG);
    }

    #[test]
    fn test_merge_only_explicit_values() {
        let mut config = Config::default();
        config.timeline.top_n = 7;

        let mut args = make_args(PathBuf::from("session.json"));
        args.cluster_width = Some(5.0);
        args.format = Some(OutputFormat::Json);
        args.complete_only = true;

        config.merge_with_args(&args);
        assert_eq!(config.timeline.cluster_width, 5.0);
        assert_eq!(config.timeline.top_n, 7);
        assert_eq!(config.report.format, OutputFormat::Json);
        assert!(config.analysis.complete_only);
        assert_eq!(config.general.output, "evalens_report.md");
    }
}
