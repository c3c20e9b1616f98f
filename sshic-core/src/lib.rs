//! # Core data model for ssDNA capture Hi-C
//!
//! This crate holds the tables every other `sshic` crate passes around: the restriction
//! fragments of the genome, the capture probes bound to them, the raw sparse contact list,
//! chromosome landmarks and the per-probe contact profiles. It also provides the
//! delimited-text readers and writers shared by every stage of the pipeline.
//!
//! # Example
//!
//! ```no_run
//! use sshic_core::models::{FragmentList, ProbeSet};
//!
//! let fragments = FragmentList::try_from("fragments_list.txt").unwrap();
//! let probes = ProbeSet::try_from("capture_oligo_positions.csv").unwrap();
//! ```
pub mod consts;
pub mod errors;
pub mod io;
pub mod models;

// re-exports
pub use errors::{Result, SshicError};
