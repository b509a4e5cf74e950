//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Interval time tracker.
///
/// Records what you work on as time intervals tagged with projects, tags and
/// references. Run without a subcommand to see what is being tracked.
#[derive(Debug, Parser)]
#[command(name = "gott", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the running interval.
    Status,

    /// Start tracking.
    ///
    /// Tokens are classified as `+tag`, `proj:NAME` (or `project:NAME`),
    /// `ref:REF`; everything else becomes the annotation.
    Start {
        #[arg(allow_hyphen_values = true, trailing_var_arg = true)]
        tokens: Vec<String>,
    },

    /// Stop the running interval.
    Stop,

    /// Discard the running interval.
    Cancel,

    /// Replace the running interval's annotation.
    Annotate {
        #[arg(required = true, allow_hyphen_values = true, trailing_var_arg = true)]
        tokens: Vec<String>,
    },

    /// Start a new interval with the most recent interval's tokens.
    Continue,

    /// Record a finished interval by duration.
    Track(TrackArgs),

    /// Print a summary table.
    Summary {
        /// One of :today, :yesterday, :week, :month, :all or a YYYY-MM-DD date.
        filter: Vec<String>,
    },

    /// Edit intervals in a text editor.
    Edit {
        /// One of :today, :yesterday, :week, :month, :all or a YYYY-MM-DD date.
        filter: Vec<String>,
    },
}

impl Commands {
    /// Whether the command can change the store.
    pub const fn mutates(&self) -> bool {
        !matches!(self, Self::Status | Self::Summary { .. })
    }
}

#[derive(Debug, Args)]
pub struct TrackArgs {
    /// :today, :yesterday or a YYYY-MM-DD date.
    pub date: String,
    /// Elapsed time, e.g. 1h30m.
    pub duration: String,
    /// Annotation tokens.
    #[arg(allow_hyphen_values = true, trailing_var_arg = true)]
    pub tokens: Vec<String>,
}
