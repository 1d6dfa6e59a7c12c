//! Basolight Core Library
//!
//! Core functionality for highlighting basophilic structures (cell nuclei,
//! basophils, platelets) in hematoxylin-eosin or Romanowsky-stained
//! microscopy images.

pub mod classifier;
pub mod config;
pub mod decoders;
pub mod exporters;
pub mod models;
pub mod parallel;
pub mod pipeline;

// Re-export commonly used types
pub use models::{HighlightOptions, RedGate, StainProfile, Verdict};
pub use pipeline::{count_pixels, highlight_image, HighlightStats};
