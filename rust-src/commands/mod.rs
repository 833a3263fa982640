//! CLI command implementations.

pub mod heatmap;
