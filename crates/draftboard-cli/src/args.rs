//! Command-line argument definitions for the Draftboard CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, the diagram view,
//! the theme, configuration file selection, and logging verbosity.

use clap::Parser;

use draftboard::graph::DiagramVariant;

/// Command-line arguments for the Draftboard layout tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input payload (a graph or a blueprint envelope, JSON)
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output snapshot (JSON)
    #[arg(short, long, default_value = "out.json")]
    pub output: String,

    /// Diagram view to lay out (flow, schema)
    #[arg(long, default_value = "flow")]
    pub variant: DiagramVariant,

    /// Style for a light theme, overriding the configuration
    #[arg(long)]
    pub light: bool,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
