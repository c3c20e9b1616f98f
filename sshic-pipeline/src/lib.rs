//! # Per-sample pipeline
//!
//! Runs every stage for one sample, in dependency order: probe association, contact
//! filtering, the unbinned profile, statistics, capture-efficiency weighting, re-binning
//! and landmark aggregation. A stage whose output file already exists is not run again,
//! its output is read back from disk when a later stage needs it.
pub mod config;
pub mod paths;
pub mod pipeline;

// re-exports
pub use config::*;
pub use paths::*;
pub use pipeline::*;
