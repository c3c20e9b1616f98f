use std::collections::BTreeSet;

use log::{debug, info};

use sshic_contacts::ProbeFragments;
use sshic_core::io::{format_value, TsvWrite};
use sshic_core::models::{BinnedProfile, ChromosomeOrder, ChromosomeSizes, LandmarkTable};
use sshic_core::{Result, SshicError};
use sshic_stats::ChromosomeDensity;

use crate::summary::{mean, median, present, std_dev};
use crate::window::{anchors, extract_window, LandmarkKind, WindowSlice};

pub const OFFSET_COL_NAME: &str = "offset";

#[derive(Debug, Clone)]
pub struct AggregateParams {
    pub kind: LandmarkKind,
    /// Window radius around the landmark, in base pairs.
    pub window: u64,
    /// Bin size of the profile being aggregated.
    pub bin_size: u64,
    /// Chromosomes left out of the aggregation altogether.
    pub excluded_chromosomes: Vec<String>,
    /// Null out each probe's values on its own chromosome.
    pub mask_probe_chromosome: bool,
}

impl AggregateParams {
    pub fn new(kind: LandmarkKind, window: u64, bin_size: u64) -> Self {
        AggregateParams {
            kind,
            window,
            bin_size,
            excluded_chromosomes: Vec::new(),
            mask_probe_chromosome: true,
        }
    }
}

///
/// Values indexed by signed bin offset, one column per label (a probe, or a chromosome arm).
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OffsetTable {
    pub labels: Vec<String>,
    pub offsets: Vec<i64>,
    pub columns: Vec<Vec<Option<f64>>>,
}

impl OffsetTable {
    pub fn column(&self, label: &str) -> Option<&[Option<f64>]> {
        let col = self.labels.iter().position(|l| l == label)?;
        Some(&self.columns[col])
    }

    pub fn row_of(&self, offset: i64) -> Option<usize> {
        self.offsets.binary_search(&offset).ok()
    }

    pub fn value(&self, label: &str, offset: i64) -> Option<f64> {
        let row = self.row_of(offset)?;
        self.column(label)?[row]
    }
}

impl TsvWrite for OffsetTable {
    fn header(&self) -> Vec<String> {
        std::iter::once(OFFSET_COL_NAME.to_string())
            .chain(self.labels.iter().cloned())
            .collect()
    }

    fn records(&self) -> Vec<Vec<String>> {
        self.offsets
            .iter()
            .enumerate()
            .map(|(row, offset)| {
                std::iter::once(offset.to_string())
                    .chain(self.columns.iter().map(|c| format_value(c[row])))
                    .collect()
            })
            .collect()
    }
}

///
/// The accumulated, re-indexed and masked slices of every chromosome, before aggregation.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocusWindow {
    pub probes: Vec<String>,
    pub slices: Vec<WindowSlice>,
}

impl LocusWindow {
    /// Every offset covered by at least one slice, ascending.
    pub fn offsets(&self) -> Vec<i64> {
        let offsets: BTreeSet<i64> = self
            .slices
            .iter()
            .flat_map(|s| s.offsets.iter().copied())
            .collect();
        offsets.into_iter().collect()
    }

    /// Offset x chromosome matrix of one probe.
    pub fn probe_table(&self, probe: &str) -> Option<OffsetTable> {
        let col = self.probes.iter().position(|p| p == probe)?;
        let offsets = self.offsets();
        let columns = self
            .slices
            .iter()
            .map(|slice| offsets.iter().map(|&o| slice.value(col, o)).collect())
            .collect();

        Some(OffsetTable {
            labels: self.slices.iter().map(|s| s.label.clone()).collect(),
            offsets,
            columns,
        })
    }

    /// Non-null values of a probe at an offset, across slices.
    pub fn contributions(&self, col: usize, offset: i64) -> Vec<f64> {
        present(
            &self
                .slices
                .iter()
                .map(|s| s.value(col, offset))
                .collect::<Vec<_>>(),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    pub window: LocusWindow,
    pub mean: OffsetTable,
    pub median: OffsetTable,
    pub std: OffsetTable,
}

///
/// Aggregate a binned profile around the landmarks of every chromosome.
///
/// Each chromosome's window is sliced and re-indexed, then, per probe, optionally divided
/// by the probe's inter-chromosomal density on that chromosome, and masked on the probe's
/// own chromosome. Mean, median and standard deviation are then taken per offset over the
/// non-null contributions. Chromosomes whose window retains no bin are skipped.
///
/// # Arguments
/// - profile: binned contacts or frequencies
/// - landmarks: landmark coordinates per chromosome
/// - sizes: chromosome lengths, used for right telomeres the landmark table gives no length for
/// - probes: probe to chromosome binding, needed for masking
/// - params: window, bin size and filtering options
/// - normalization: inter-chromosomal densities to divide values by, if any
/// - order: canonical chromosome order
///
pub fn aggregate(
    profile: &BinnedProfile,
    landmarks: &LandmarkTable,
    sizes: &ChromosomeSizes,
    probes: &ProbeFragments,
    params: &AggregateParams,
    normalization: Option<&ChromosomeDensity>,
    order: &ChromosomeOrder,
) -> Result<AggregateResult> {
    if params.bin_size == 0 {
        return Err(SshicError::InvalidBinSize);
    }

    let probe_chr = probes.chromosomes();
    let mut window = LocusWindow {
        probes: profile.probes.clone(),
        slices: Vec::new(),
    };

    for anchor in anchors(params.kind, landmarks, sizes, order) {
        if params.excluded_chromosomes.contains(&anchor.chr) {
            debug!("{} excluded from aggregation", anchor.chr);
            continue;
        }

        let Some(mut slice) = extract_window(profile, &anchor, params.window, params.bin_size)
        else {
            debug!(
                "no bin around the {} landmark of {}, skipping",
                params.kind.name(),
                anchor.label
            );
            continue;
        };

        for (probe, column) in window.probes.iter().zip(slice.columns.iter_mut()) {
            if params.mask_probe_chromosome
                && probe_chr.get(probe).is_some_and(|chr| *chr == anchor.chr)
            {
                column.iter_mut().for_each(|cell| *cell = None);
                continue;
            }

            if let Some(densities) = normalization {
                let factor = densities.factor(probe, &anchor.chr);
                for cell in column.iter_mut() {
                    *cell = match (*cell, factor) {
                        (Some(_), Some(f)) if f == 0.0 => Some(0.0),
                        (Some(v), Some(f)) => Some(v / f),
                        _ => None,
                    };
                }
            }
        }

        window.slices.push(slice);
    }

    let offsets = window.offsets();
    let n_probes = window.probes.len();
    let mut mean_columns = vec![Vec::with_capacity(offsets.len()); n_probes];
    let mut median_columns = vec![Vec::with_capacity(offsets.len()); n_probes];
    let mut std_columns = vec![Vec::with_capacity(offsets.len()); n_probes];

    for &offset in &offsets {
        for col in 0..n_probes {
            let values = window.contributions(col, offset);
            mean_columns[col].push(mean(&values));
            median_columns[col].push(median(&values));
            std_columns[col].push(std_dev(&values));
        }
    }

    info!(
        "aggregated {} windows around {} over {} offsets",
        window.slices.len(),
        params.kind.name(),
        offsets.len()
    );

    let table = |columns: Vec<Vec<Option<f64>>>| OffsetTable {
        labels: window.probes.clone(),
        offsets: offsets.clone(),
        columns,
    };
    let mean = table(mean_columns);
    let median = table(median_columns);
    let std = table(std_columns);

    Ok(AggregateResult {
        window,
        mean,
        median,
        std,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use sshic_contacts::{associate_probes, AssociationOptions};
    use sshic_core::models::{BinKey, Fragment, FragmentList, Landmark, Probe, ProbeSet};
    use sshic_stats::DensityRow;
    use tempfile::tempdir;

    const BIN: u64 = 10;

    fn chromosomes() -> Vec<String> {
        (1..=16).map(|i| format!("chr{}", i)).collect()
    }

    /// 16 chromosomes of 30 bins; the value of P1 on chr<i>, bin b is `i`, P2 is 1 everywhere.
    #[fixture]
    fn profile() -> BinnedProfile {
        let mut profile = BinnedProfile::new(vec!["P1".to_string(), "P2".to_string()]);
        for (i, chr) in chromosomes().iter().enumerate() {
            for b in 0..30 {
                profile.push_row(
                    BinKey {
                        chr: chr.clone(),
                        start: b * BIN,
                    },
                    vec![Some((i + 1) as f64), Some(1.0)],
                );
            }
        }
        profile
    }

    #[fixture]
    fn landmarks() -> LandmarkTable {
        LandmarkTable::from(
            chromosomes()
                .into_iter()
                .map(|chr| Landmark {
                    chr,
                    position: 150,
                    length: Some(300),
                })
                .collect::<Vec<_>>(),
        )
    }

    /// P1 bound to chr3, P2 bound to chr16.
    #[fixture]
    fn probes() -> ProbeFragments {
        let fragments = FragmentList::from(vec![
            Fragment::new("chr3", 0, 300),
            Fragment::new("chr16", 0, 300),
        ]);
        let probes = ProbeSet::from(vec![
            Probe {
                name: "P1".to_string(),
                kind: "ds".to_string(),
                chr: "chr3".to_string(),
                start: 100,
                end: 110,
                sequence: None,
            },
            Probe {
                name: "P2".to_string(),
                kind: "ds".to_string(),
                chr: "chr16".to_string(),
                start: 100,
                end: 110,
                sequence: None,
            },
        ]);
        associate_probes(
            &fragments,
            &probes,
            &ChromosomeOrder::default(),
            &AssociationOptions::default(),
        )
        .unwrap()
    }

    fn run(
        profile: &BinnedProfile,
        landmarks: &LandmarkTable,
        probes: &ProbeFragments,
        params: &AggregateParams,
        normalization: Option<&ChromosomeDensity>,
    ) -> AggregateResult {
        aggregate(
            profile,
            landmarks,
            &ChromosomeSizes::default(),
            probes,
            params,
            normalization,
            &ChromosomeOrder::default(),
        )
        .unwrap()
    }

    #[rstest]
    fn test_centromere_offsets_and_masking(
        profile: BinnedProfile,
        landmarks: LandmarkTable,
        probes: ProbeFragments,
    ) {
        let params = AggregateParams::new(LandmarkKind::Centromere, 40, BIN);
        let result = run(&profile, &landmarks, &probes, &params, None);

        assert_eq!(result.mean.offsets, (-5..=3).collect::<Vec<i64>>());
        assert_eq!(result.window.slices.len(), 16);

        // chr3 is masked for P1: mean over the 15 other chromosomes
        let expected = ((1..=16).sum::<i32>() - 3) as f64 / 15.0;
        let mean = result.mean.value("P1", 0).unwrap();
        assert!((mean - expected).abs() < 1e-9);
        assert_eq!(result.window.contributions(0, 0).len(), 15);
        assert_eq!(result.median.value("P1", 0), Some(9.0));

        assert_eq!(result.mean.value("P2", 0), Some(1.0));
        assert_eq!(result.std.value("P2", 0), Some(0.0));
    }

    #[rstest]
    fn test_masking_switch(profile: BinnedProfile, landmarks: LandmarkTable, probes: ProbeFragments) {
        let mut params = AggregateParams::new(LandmarkKind::Centromere, 40, BIN);
        params.mask_probe_chromosome = false;
        let result = run(&profile, &landmarks, &probes, &params, None);
        assert_eq!(result.window.contributions(0, 0).len(), 16);
        assert_eq!(result.mean.value("P1", 0), Some(8.5));
    }

    #[rstest]
    fn test_excluded_chromosomes(
        profile: BinnedProfile,
        landmarks: LandmarkTable,
        probes: ProbeFragments,
    ) {
        let mut params = AggregateParams::new(LandmarkKind::Centromere, 40, BIN);
        params.excluded_chromosomes = vec!["chr1".to_string(), "chr2".to_string()];
        let result = run(&profile, &landmarks, &probes, &params, None);
        assert_eq!(result.window.slices.len(), 14);
        assert_eq!(result.window.contributions(0, 0).len(), 13);
    }

    #[rstest]
    fn test_clipped_window_only_counts_covering_chromosomes(
        profile: BinnedProfile,
        mut landmarks: LandmarkTable,
        probes: ProbeFragments,
    ) {
        // chr1 centromere at 20: offsets -2..=3 only
        landmarks.landmarks[0].position = 20;
        // chr2 centromere beyond every bin: no window at all
        landmarks.landmarks[1].position = 5_000;

        let params = AggregateParams::new(LandmarkKind::Centromere, 40, BIN);
        let result = run(&profile, &landmarks, &probes, &params, None);

        assert_eq!(result.window.slices.len(), 15);
        assert_eq!(result.window.contributions(1, -5).len(), 13);
        assert_eq!(result.window.contributions(1, 0).len(), 14);
        assert_eq!(result.mean.value("P2", -5), Some(1.0));
    }

    #[rstest]
    fn test_telomere_arms_share_offsets(
        profile: BinnedProfile,
        landmarks: LandmarkTable,
        probes: ProbeFragments,
    ) {
        let params = AggregateParams::new(LandmarkKind::Telomere, 40, BIN);
        let result = run(&profile, &landmarks, &probes, &params, None);

        assert_eq!(result.window.slices.len(), 32);
        assert_eq!(result.mean.offsets.first(), Some(&0));
        // both arms of the 15 non-probe chromosomes
        assert_eq!(result.window.contributions(0, 0).len(), 30);
    }

    #[rstest]
    fn test_inter_normalization(
        profile: BinnedProfile,
        landmarks: LandmarkTable,
        probes: ProbeFragments,
    ) {
        let chromosomes = chromosomes();
        let densities = ChromosomeDensity {
            rows: vec![
                DensityRow {
                    probe: "P1".to_string(),
                    fragment: 0,
                    kind: "ds".to_string(),
                    values: (1..=16).map(|i| i as f64).collect(),
                },
                DensityRow {
                    probe: "P2".to_string(),
                    fragment: 1,
                    kind: "ds".to_string(),
                    values: vec![0.0; 16],
                },
            ],
            chromosomes,
        };

        let params = AggregateParams::new(LandmarkKind::Centromere, 40, BIN);
        let result = run(&profile, &landmarks, &probes, &params, Some(&densities));

        assert_eq!(result.mean.value("P1", 0), Some(1.0));
        assert_eq!(result.mean.value("P2", 0), Some(0.0));
        assert_eq!(result.window.contributions(0, 0).len(), 15);
    }

    #[rstest]
    fn test_probe_table(profile: BinnedProfile, landmarks: LandmarkTable, probes: ProbeFragments) {
        let params = AggregateParams::new(LandmarkKind::Centromere, 40, BIN);
        let result = run(&profile, &landmarks, &probes, &params, None);

        let table = result.window.probe_table("P1").unwrap();
        assert_eq!(table.labels.len(), 16);
        assert_eq!(table.value("chr1", 0), Some(1.0));
        assert_eq!(table.value("chr3", 0), None);
        assert!(result.window.probe_table("P9").is_none());

        let dir = tempdir().unwrap();
        let path = dir.path().join("P1_chr_cen.tsv");
        table.write_tsv(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert!(lines.next().unwrap().starts_with("offset\tchr1\tchr2\tchr3"));
        assert!(lines.next().unwrap().starts_with("-5\t1\t2\t\t4"));
    }

    #[rstest]
    fn test_zero_bin_size_rejected(
        profile: BinnedProfile,
        landmarks: LandmarkTable,
        probes: ProbeFragments,
    ) {
        let params = AggregateParams::new(LandmarkKind::Centromere, 40, 0);
        let result = aggregate(
            &profile,
            &landmarks,
            &ChromosomeSizes::default(),
            &probes,
            &params,
            None,
            &ChromosomeOrder::default(),
        );
        assert!(matches!(result, Err(SshicError::InvalidBinSize)));
    }
}
