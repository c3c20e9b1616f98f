//! # Probe statistics
//!
//! Descriptive statistics computed from an unbinned contact profile:
//!
//! - per-probe cis/trans and intra/inter-chromosome fractions and coverage ([compute_statistics]),
//! - chromosome-size-normalized contact densities, genome-wide and inter-chromosomal only,
//! - capture efficiency against a same-sample reference class of probes, and relative to
//!   reference samples ([compare]),
//! - weighting of profiles by the relative capture efficiency ([weight_profile]).
pub mod compare;
pub mod statistics;
pub mod weight;

// re-exports
pub use compare::*;
pub use statistics::*;
pub use weight::*;
