//! Draftboard Core Types and Definitions
//!
//! This crate provides the foundational types for Draftboard diagram canvases:
//!
//! - **Geometry**: Points, sizes and bounds ([`geometry`] module)
//! - **Colors**: CSS color handling ([`color::Color`])
//! - **Graph**: Node/edge value types and their invariants ([`graph`] module)
//! - **Payload**: The raw graph payload supplied by hosts ([`payload`] module)
//! - **Handles**: Connection sides on node boundaries ([`handle`] module)
//! - **Style**: Semantic-type driven node and edge styling ([`style`] module)

pub mod color;
pub mod geometry;
pub mod graph;
pub mod handle;
pub mod payload;
pub mod style;
