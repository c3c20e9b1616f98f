//! # From raw contacts to per-probe profiles
//!
//! The first four stages of the pipeline, each a pure function from tables to a table:
//!
//! 1. [associate_probes] binds every capture probe to the fragment containing its midpoint.
//! 2. [filter_contacts] keeps the contacts that involve a probe fragment and annotates both
//!    ends with fragment attributes and probe metadata.
//! 3. [organize_contacts] collapses those rows into one value per (fragment, probe).
//! 4. [rebin_contacts] aggregates fragment-level counts into fixed-size bins.
pub mod associate;
pub mod filter;
pub mod organize;
pub mod rebin;

// re-exports
pub use associate::*;
pub use filter::*;
pub use organize::*;
pub use rebin::*;
