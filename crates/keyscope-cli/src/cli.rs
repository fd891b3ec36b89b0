//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Keyscope: schema-free key discovery for tabular data
#[derive(Parser)]
#[command(name = "keyscope")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify columns as order level or item level within a scope
    Classify {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Column whose most duplicated value selects the scope
        /// (default: analyze the whole file)
        #[arg(short, long)]
        search_key: Option<String>,

        /// Columns excluded from classification (repeatable)
        #[arg(short, long)]
        protect: Vec<String>,

        /// Keep exact-duplicate rows instead of removing them
        #[arg(long)]
        keep_duplicates: bool,

        /// Load at most this many data rows
        #[arg(long)]
        max_rows: Option<usize>,

        /// Write the full report as JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Discover a minimal primary key for the most duplicated scope
    Discover {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Column whose most duplicated value selects the scope
        #[arg(short, long)]
        search_key: String,

        /// Columns every candidate key must contain (repeatable;
        /// default: the search key)
        #[arg(short, long)]
        base_key: Vec<String>,

        /// How many top duplicate groups to report
        #[arg(short = 'n', long, default_value = "1")]
        top_n: usize,

        /// Keep exact-duplicate rows instead of removing them
        #[arg(long)]
        keep_duplicates: bool,

        /// Load at most this many data rows
        #[arg(long)]
        max_rows: Option<usize>,

        /// Write the full report as JSON to this path
        /// (default with --json: <file>.keyscope.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save the JSON report next to the data file
        #[arg(long)]
        json: bool,
    },
}
