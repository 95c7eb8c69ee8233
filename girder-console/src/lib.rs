//! # Girder Console
//!
//! Headless operator console for the girder glue dashboard.
//!
//! Runs one simulated glue job without a browser: the AI suggestion is drawn,
//! segments are selected, the run is started and the session is ticked on a
//! fixed interval until the run completes or the operator presses Ctrl-C.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p girder-console -- --select 1,4 --thickness 2.5
//! cargo run -p girder-console -- --suggested --seed 42
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `ConsoleConfig` - Resolved run configuration
//! - `ConsoleRunner` - Drives a `GirderSession` from a tokio interval

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod runner;

pub use runner::{ConsoleRunner, RunOutcome, RunSummary};

use std::path::PathBuf;

use clap::Parser;
use girder_core::{DashboardConfig, GirderError, GlueRejection, SegmentId, SEGMENT_COUNT};
use thiserror::Error;

/// Errors raised by the console before or during a run.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// A `--select` entry does not name a segment.
    #[error("Unknown segment {0}: expected 1..={}", SEGMENT_COUNT)]
    UnknownSegment(usize),

    /// The dashboard configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] GirderError),

    /// The glue run was refused.
    #[error("Glue run refused: {0}")]
    Rejected(#[from] GlueRejection),
}

/// Command-line arguments for girder-console.
#[derive(Debug, Clone, Parser)]
#[command(name = "girder-console")]
#[command(about = "Run a simulated girder glue job from the terminal")]
#[command(version)]
pub struct CliArgs {
    /// Seed for the AI suggestion and sensor walk (random if omitted)
    #[arg(long, env = "GIRDER_SEED")]
    pub seed: Option<u64>,

    /// Segments to select, 1-based (e.g. `--select 1,4`)
    #[arg(long, value_delimiter = ',', conflicts_with = "suggested")]
    pub select: Vec<usize>,

    /// Select the AI-suggested segments instead of `--select`
    #[arg(long)]
    pub suggested: bool,

    /// Glue thickness in mm (the suggested thickness if omitted)
    #[arg(long)]
    pub thickness: Option<f32>,

    /// JSON dashboard configuration file
    #[arg(long, env = "GIRDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Tick interval in milliseconds (the configured progress interval if omitted)
    #[arg(long)]
    pub tick_ms: Option<u64>,
}

/// Which segments the console selects before starting the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionMode {
    /// Explicit segment ids.
    Explicit(Vec<SegmentId>),
    /// Whatever the AI suggestion picked.
    Suggested,
}

/// Resolved console configuration.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Seed for the session, `None` to derive one from the clock.
    pub seed: Option<u64>,
    /// Segments to select.
    pub selection: SelectionMode,
    /// Thickness override (mm).
    pub thickness: Option<f32>,
    /// Optional dashboard configuration file.
    pub config_path: Option<PathBuf>,
    /// Tick interval override in milliseconds.
    pub tick_ms: Option<u64>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            seed: None,
            selection: SelectionMode::Suggested,
            thickness: None,
            config_path: None,
            tick_ms: None,
        }
    }
}

impl ConsoleConfig {
    /// Resolve CLI arguments, turning 1-based segment numbers into ids.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::UnknownSegment`] for numbers outside the girder.
    pub fn from_args(args: CliArgs) -> Result<Self, ConsoleError> {
        let selection = if args.suggested || args.select.is_empty() {
            SelectionMode::Suggested
        } else {
            let ids = args
                .select
                .iter()
                .map(|&n| {
                    n.checked_sub(1)
                        .map(SegmentId::new)
                        .filter(|id| id.is_valid())
                        .ok_or(ConsoleError::UnknownSegment(n))
                })
                .collect::<Result<Vec<_>, _>>()?;
            SelectionMode::Explicit(ids)
        };

        Ok(Self {
            seed: args.seed,
            selection,
            thickness: args.thickness,
            config_path: args.config,
            tick_ms: args.tick_ms.map(|ms| ms.max(1)),
        })
    }

    /// Load the dashboard configuration file, or the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn dashboard_config(&self) -> Result<DashboardConfig, ConsoleError> {
        match &self.config_path {
            Some(path) => Ok(DashboardConfig::load(path)?),
            None => Ok(DashboardConfig::default()),
        }
    }
}
