//! # Landmark-relative aggregation
//!
//! Lines every chromosome up on a biological landmark (its centromere, or its two
//! telomeres) and summarizes each probe's binned contacts across chromosomes as a function
//! of the signed distance, in bins, to that landmark.
//!
//! ```no_run
//! use sshic_aggregate::{aggregate, AggregateParams, LandmarkKind};
//! use sshic_contacts::ProbeFragments;
//! use sshic_core::models::{BinnedProfile, ChromosomeOrder, ChromosomeSizes, LandmarkTable};
//!
//! let profile = BinnedProfile::from_tsv("AD1_10kb_binned_frequencies.tsv").unwrap();
//! let landmarks = LandmarkTable::try_from("S288c_chr_centro_coordinates.tsv").unwrap();
//! let params = AggregateParams::new(LandmarkKind::Centromere, 150_000, 10_000);
//!
//! let result = aggregate(
//!     &profile,
//!     &landmarks,
//!     &ChromosomeSizes::default(),
//!     &ProbeFragments::default(),
//!     &params,
//!     None,
//!     &ChromosomeOrder::default(),
//! )
//! .unwrap();
//! ```
pub mod aggregate;
pub mod summary;
pub mod window;

// re-exports
pub use aggregate::*;
pub use summary::*;
pub use window::*;
