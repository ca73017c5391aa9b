//! Draftboard CLI library
//!
//! A reference host for the canvas pipeline: it reads a payload, drives a
//! view through activation, layout and publishing, and writes the published
//! snapshot as JSON.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{fs, io};

use log::{info, warn};

use draftboard::{
    DiagramBuilder, DraftboardError,
    config::{AppConfig, StyleConfig},
};

/// Run the Draftboard CLI application
///
/// # Errors
///
/// Returns `DraftboardError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed payloads
pub fn run(args: &Args) -> Result<(), DraftboardError> {
    info!(
        input_path = args.input,
        output_path = args.output,
        variant:% = args.variant;
        "Processing payload"
    );

    // Load configuration
    let mut app_config = config::load_config(args.config.as_ref())?;
    // The command-line theme wins over the configured one
    if args.light {
        app_config = AppConfig::new(
            app_config.layout().clone(),
            StyleConfig::new(false),
            app_config.panels().clone(),
        );
    }

    // Read input file
    let source = fs::read_to_string(&args.input)?;

    // Lay out and publish the payload using DiagramBuilder API
    let builder = DiagramBuilder::new(app_config);
    let raw = builder.parse(&source, args.variant)?;
    let publication = builder.render(raw, args.variant);

    if publication.fallback_used {
        warn!(variant:% = args.variant; "Layered layout failed, snapshot uses the grid fallback");
    }
    for dropped in &publication.dropped_edges {
        warn!(edge_id = dropped.edge_id, missing:? = dropped.missing; "Edge dropped from snapshot");
    }

    // Write output file
    let json = serde_json::to_string_pretty(&publication).map_err(io::Error::from)?;
    fs::write(&args.output, json)?;

    info!(
        output_file = args.output,
        nodes = publication.snapshot.len(),
        edges = publication.snapshot.edges().len();
        "Snapshot exported successfully"
    );

    Ok(())
}
