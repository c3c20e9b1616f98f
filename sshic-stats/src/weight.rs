use log::warn;

use sshic_core::models::{Profile, ProfileKey};
use sshic_core::{Result, SshicError};

use crate::statistics::GlobalStatistics;

///
/// Multiply every probe column of a profile by that probe's capture efficiency relative to
/// `reference`.
///
/// Probes without a defined relative efficiency end up with an all-`None` column, so they
/// drop out of later aggregation instead of contributing zeros.
///
/// # Arguments
/// - profile: a contact or frequency profile, binned or not
/// - stats: the sample's statistics, already compared against `reference`
/// - reference: name of the reference sample
///
pub fn weight_profile<K: ProfileKey>(
    profile: &Profile<K>,
    stats: &GlobalStatistics,
    reference: &str,
) -> Result<Profile<K>> {
    if stats.reference_index(reference).is_none() {
        return Err(SshicError::UnknownReference(reference.to_string()));
    }

    let mut weighted = profile.clone();
    for (probe, column) in weighted.probes.iter().zip(weighted.columns.iter_mut()) {
        match stats.relative_efficiency(probe, reference) {
            Some(score) => {
                for cell in column.iter_mut() {
                    *cell = cell.map(|v| v * score);
                }
            }
            None => {
                warn!(
                    "probe {} has no capture efficiency against {}, its weighted column is empty",
                    probe, reference
                );
                column.iter_mut().for_each(|cell| *cell = None);
            }
        }
    }

    Ok(weighted)
}
