use log::{debug, warn};

use fxhash::FxHashMap as HashMap;
use sshic_core::consts::LARGE_GRID_CELLS;
use sshic_core::models::{BinKey, BinnedProfile, ChromosomeOrder, ChromosomeSizes, UnbinnedProfile};
use sshic_core::{Result, SshicError};

/// File name suffix for a bin size: `10kb` for whole kilobases, `500bp` otherwise.
pub fn bin_suffix(bin_size: u64) -> String {
    if bin_size % 1000 == 0 {
        format!("{}kb", bin_size / 1000)
    } else {
        format!("{}bp", bin_size)
    }
}

/// Cells of the full bin grid over `chromosomes` for `n_probes` probe columns.
pub fn grid_cells(chromosomes: &[(String, u64)], bin_size: u64, n_probes: usize) -> u64 {
    let bins: u64 = chromosomes
        .iter()
        .map(|(_, size)| size.div_ceil(bin_size))
        .sum();
    bins.saturating_mul(n_probes as u64)
}

///
/// Aggregate an unbinned profile into fixed-size bins.
///
/// A fragment is assigned to the bin holding its start, `floor(start / bin_size) * bin_size`.
/// Null cells count as zero. When chromosome sizes are given, every bin of every sized
/// chromosome is emitted, zero-filled where nothing was contacted; otherwise only bins
/// holding at least one fragment appear.
///
/// # Arguments
/// - profile: the fragment-level contact counts
/// - bin_size: bin width in base pairs, must be positive
/// - sizes: chromosome lengths used to lay out the full bin grid
/// - order: canonical chromosome order for the output rows
///
pub fn rebin_contacts(
    profile: &UnbinnedProfile,
    bin_size: u64,
    sizes: Option<&ChromosomeSizes>,
    order: &ChromosomeOrder,
) -> Result<BinnedProfile> {
    if bin_size == 0 {
        return Err(SshicError::InvalidBinSize);
    }

    let n_probes = profile.probes.len();
    let mut binned = BinnedProfile::new(profile.probes.clone());
    let mut row_of: HashMap<BinKey, usize> = HashMap::default();

    if let Some(sizes) = sizes {
        let chromosomes = sizes.ordered(order);
        let cells = grid_cells(&chromosomes, bin_size, n_probes);
        if cells > LARGE_GRID_CELLS {
            warn!(
                "rebinning at {} bp lays out {} cells, consider a larger bin size",
                bin_size, cells
            );
        }
        for (chr, size) in chromosomes {
            for i in 0..size.div_ceil(bin_size) {
                let key = BinKey {
                    chr: chr.clone(),
                    start: i * bin_size,
                };
                row_of.insert(key.clone(), binned.len());
                binned.push_row(key, vec![Some(0.0); n_probes]);
            }
        }
    }

    for (row, key) in profile.keys.iter().enumerate() {
        let bin = BinKey {
            chr: key.chr.clone(),
            start: (key.start / bin_size) * bin_size,
        };
        let target = match row_of.get(&bin) {
            Some(&target) => target,
            None => {
                row_of.insert(bin.clone(), binned.len());
                binned.push_row(bin, vec![Some(0.0); n_probes]);
                binned.len() - 1
            }
        };
        for col in 0..n_probes {
            let value = profile.columns[col][row].unwrap_or(0.0);
            let cell = &mut binned.columns[col][target];
            *cell = Some(cell.unwrap_or(0.0) + value);
        }
    }

    binned.sort_by_chromosome(order);
    debug!(
        "rebinned {} fragments into {} bins of {}",
        profile.len(),
        binned.len(),
        bin_suffix(bin_size)
    );
    Ok(binned)
}
