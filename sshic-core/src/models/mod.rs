pub mod chromosome;
pub mod contact;
pub mod fragment;
pub mod landmark;
pub mod probe;
pub mod profile;

// re-export for cleaner imports
pub use self::chromosome::{ChromosomeOrder, ChromosomeSizes};
pub use self::contact::{Contact, ContactGraph, ContactList, Edge};
pub use self::fragment::{Fragment, FragmentList};
pub use self::landmark::{Landmark, LandmarkTable};
pub use self::probe::{BoundProbe, Probe, ProbeSet};
pub use self::profile::{BinKey, BinnedProfile, FragmentKey, Profile, ProfileKey, UnbinnedProfile};
