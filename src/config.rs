//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.evalens.toml` files.

use crate::analysis::{DEFAULT_CLUSTER_WIDTH, DEFAULT_TOP_N};
use crate::cli::{Args, OutputFormat};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".evalens.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Timeline settings.
    #[serde(default)]
    pub timeline: TimelineConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "evalens_report.md".to_string()
}

/// Which evaluations are analyzed and how results are judged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Ignore evaluations that were not submitted as complete.
    #[serde(default)]
    pub complete_only: bool,

    /// Criteria with agreement below this value are reported as problem areas.
    #[serde(default = "default_problem_threshold")]
    pub problem_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            complete_only: false,
            problem_threshold: default_problem_threshold(),
        }
    }
}

fn default_problem_threshold() -> f64 {
    0.7
}

/// Comment timeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Hotspot window width in seconds.
    #[serde(default = "default_cluster_width")]
    pub cluster_width: f64,

    /// Number of hotspots to report.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            cluster_width: default_cluster_width(),
            top_n: default_top_n(),
        }
    }
}

fn default_cluster_width() -> f64 {
    DEFAULT_CLUSTER_WIDTH
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format when not given on the command line.
    #[serde(default)]
    pub format: OutputFormat,

    /// Include per-criterion histograms.
    #[serde(default = "default_true")]
    pub include_histograms: bool,

    /// Include the comment timeline and hotspots.
    #[serde(default = "default_true")]
    pub include_timeline: bool,

    /// Include the comment count of each evaluator.
    #[serde(default = "default_true")]
    pub include_comments_per_evaluator: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            include_histograms: true,
            include_timeline: true,
            include_comments_per_evaluator: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(format) = args.format {
            self.report.format = format;
        }

        if let Some(width) = args.cluster_width {
            self.timeline.cluster_width = width;
        }
        if let Some(top_n) = args.top_n {
            self.timeline.top_n = top_n;
        }

        // Flags always override
        if args.complete_only {
            self.analysis.complete_only = true;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Log level for this run: `quiet` wins, then `general.verbose`.
    pub fn log_level(&self, quiet: bool) -> tracing::Level {
        if quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Check values that the command line cannot catch on its own.
    pub fn validate(&self) -> Result<()> {
        if !self.timeline.cluster_width.is_finite() || self.timeline.cluster_width <= 0.0 {
            bail!(
                "timeline.cluster_width must be positive, got {}",
                self.timeline.cluster_width
            );
        }
        if self.timeline.top_n == 0 {
            bail!("timeline.top_n must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.analysis.problem_threshold) {
            bail!(
                "analysis.problem_threshold must be between 0.0 and 1.0, got {}",
                self.analysis.problem_threshold
            );
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
