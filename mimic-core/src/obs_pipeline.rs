//! Conversion of raw frames into stacked observations.
//!
//! A frame is converted to a single channel `S x S` image (grayscale first, then a bilinear
//! resize) and pushed into a rolling window of the last `H` normalized frames. The window is
//! returned as an array of shape `[H, S, S]`, ordered from the oldest frame to the most recent.
mod base;
mod config;
pub use base::{ObsPipeline, StackedObs};
pub use config::ObsPipelineConfig;
