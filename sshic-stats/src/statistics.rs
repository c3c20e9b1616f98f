use std::path::Path;

use log::{debug, info};

use fxhash::FxHashMap as HashMap;
use sshic_contacts::ProbeFragments;
use sshic_core::consts::{
    CAPTURE_EFFICIENCY_COL_NAME, DEFAULT_CIS_RANGE, DOUBLE_STRANDED_TYPE, FRAGMENT_COL_NAME,
    PROBE_CHR_COL_NAME, PROBE_COL_NAME, RELATIVE_EFFICIENCY_PREFIX, TYPE_COL_NAME,
};
use sshic_core::io::{format_value, DelimitedTable, TsvWrite};
use sshic_core::models::{ChromosomeOrder, ChromosomeSizes, ProfileKey, UnbinnedProfile};
use sshic_core::Result;

///
/// Sample-wide constants shared by every probe's statistics.
///
#[derive(Debug, Clone)]
pub struct StatisticsContext {
    /// Grand total of contacts in the sample, probe contacts or not.
    pub total_contacts: u64,
    /// Chromosome sizes, in canonical order.
    pub chromosomes: Vec<(String, u64)>,
    /// Radius around a probe within which contacts are cis.
    pub cis_range: u64,
    /// Probe type whose mean contact total is the capture efficiency reference.
    pub reference_type: String,
}

impl StatisticsContext {
    pub fn new(total_contacts: u64, sizes: &ChromosomeSizes, order: &ChromosomeOrder) -> Self {
        StatisticsContext {
            total_contacts,
            chromosomes: sizes.ordered(order),
            cis_range: DEFAULT_CIS_RANGE,
            reference_type: DOUBLE_STRANDED_TYPE.to_string(),
        }
    }

    pub fn with_cis_range(mut self, cis_range: u64) -> Self {
        self.cis_range = cis_range;
        self
    }

    pub fn with_reference_type(mut self, reference_type: &str) -> Self {
        self.reference_type = reference_type.to_string();
        self
    }

    fn genome_size_excluding(&self, chr: &str) -> u64 {
        self.chromosomes
            .iter()
            .filter(|(c, _)| c != chr)
            .map(|(_, size)| size)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeStatistics {
    pub probe: String,
    pub chr: String,
    pub fragment: u32,
    pub kind: String,
    pub contacts: f64,
    pub coverage_over_hic_contacts: f64,
    pub cis: f64,
    pub trans: f64,
    pub intra_chr: f64,
    pub inter_chr: f64,
    /// Contacts over the mean contacts of the reference probe type.
    pub capture_efficiency: Option<f64>,
    /// Capture efficiency relative to each reference sample, in [GlobalStatistics::references] order.
    pub relative_efficiency: Vec<Option<f64>>,
}

///
/// One row per probe, sorted by bound fragment id.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalStatistics {
    /// Names of the reference samples compared against.
    pub references: Vec<String>,
    pub probes: Vec<ProbeStatistics>,
}

impl GlobalStatistics {
    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    pub fn get(&self, probe: &str) -> Option<&ProbeStatistics> {
        self.probes.iter().find(|p| p.probe == probe)
    }

    pub fn reference_index(&self, reference: &str) -> Option<usize> {
        self.references.iter().position(|r| r == reference)
    }

    /// Capture efficiency of `probe` relative to `reference`, if both are known and defined.
    pub fn relative_efficiency(&self, probe: &str, reference: &str) -> Option<f64> {
        let idx = self.reference_index(reference)?;
        self.get(probe)?.relative_efficiency.get(idx).copied().flatten()
    }

    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let table = DelimitedTable::read(path.as_ref(), true)?;

        let probe_col = table.column(PROBE_COL_NAME)?;
        let chr_col = table.column(PROBE_CHR_COL_NAME)?;
        let fragment_col = table.column(FRAGMENT_COL_NAME)?;
        let type_col = table.column(TYPE_COL_NAME)?;
        let contacts_col = table.column("contacts")?;
        let coverage_col = table.column("coverage_over_hic_contacts")?;
        let cis_col = table.column("cis")?;
        let trans_col = table.column("trans")?;
        let intra_col = table.column("intra_chr")?;
        let inter_col = table.column("inter_chr")?;
        let efficiency_col = table.column(CAPTURE_EFFICIENCY_COL_NAME)?;

        let (reference_cols, references): (Vec<usize>, Vec<String>) = table
            .header
            .iter()
            .enumerate()
            .filter_map(|(i, h)| {
                h.strip_prefix(RELATIVE_EFFICIENCY_PREFIX)
                    .map(|name| (i, name.to_string()))
            })
            .unzip();

        let mut probes = Vec::with_capacity(table.len());
        for row in 0..table.len() {
            probes.push(ProbeStatistics {
                probe: table.text(row, probe_col)?.to_string(),
                chr: table.text(row, chr_col)?.to_string(),
                fragment: table.field(row, fragment_col)?,
                kind: table.text(row, type_col)?.to_string(),
                contacts: table.field(row, contacts_col)?,
                coverage_over_hic_contacts: table.field(row, coverage_col)?,
                cis: table.field(row, cis_col)?,
                trans: table.field(row, trans_col)?,
                intra_chr: table.field(row, intra_col)?,
                inter_chr: table.field(row, inter_col)?,
                capture_efficiency: table.optional_f64(row, efficiency_col)?,
                relative_efficiency: reference_cols
                    .iter()
                    .map(|&c| table.optional_f64(row, c))
                    .collect::<Result<Vec<_>>>()?,
            });
        }

        Ok(GlobalStatistics { references, probes })
    }
}

impl TsvWrite for GlobalStatistics {
    fn header(&self) -> Vec<String> {
        let mut header: Vec<String> = [
            PROBE_COL_NAME,
            PROBE_CHR_COL_NAME,
            FRAGMENT_COL_NAME,
            TYPE_COL_NAME,
            "contacts",
            "coverage_over_hic_contacts",
            "cis",
            "trans",
            "intra_chr",
            "inter_chr",
            CAPTURE_EFFICIENCY_COL_NAME,
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();
        header.extend(
            self.references
                .iter()
                .map(|r| format!("{}{}", RELATIVE_EFFICIENCY_PREFIX, r)),
        );
        header
    }

    fn records(&self) -> Vec<Vec<String>> {
        self.probes
            .iter()
            .map(|p| {
                let mut record = vec![
                    p.probe.clone(),
                    p.chr.clone(),
                    p.fragment.to_string(),
                    p.kind.clone(),
                    format_value(Some(p.contacts)),
                    format_value(Some(p.coverage_over_hic_contacts)),
                    format_value(Some(p.cis)),
                    format_value(Some(p.trans)),
                    format_value(Some(p.intra_chr)),
                    format_value(Some(p.inter_chr)),
                    format_value(p.capture_efficiency),
                ];
                record.extend(p.relative_efficiency.iter().map(|&v| format_value(v)));
                record
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DensityRow {
    pub probe: String,
    pub fragment: u32,
    pub kind: String,
    /// One value per chromosome, in [ChromosomeDensity::chromosomes] order.
    pub values: Vec<f64>,
}

///
/// Per-probe, per-chromosome contact density normalized by chromosome length.
///
/// A value of 1.0 means the probe contacts the chromosome exactly as often as its share of
/// the genome (excluding the probe's own chromosome) would predict.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChromosomeDensity {
    pub chromosomes: Vec<String>,
    pub rows: Vec<DensityRow>,
}

impl ChromosomeDensity {
    pub fn factor(&self, probe: &str, chr: &str) -> Option<f64> {
        let col = self.chromosomes.iter().position(|c| c == chr)?;
        self.rows
            .iter()
            .find(|r| r.probe == probe)
            .map(|r| r.values[col])
    }

    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let table = DelimitedTable::read(path.as_ref(), true)?;

        let probe_col = table.column(PROBE_COL_NAME)?;
        let fragment_col = table.column(FRAGMENT_COL_NAME)?;
        let type_col = table.column(TYPE_COL_NAME)?;
        let value_cols: Vec<usize> = (0..table.header.len())
            .filter(|c| ![probe_col, fragment_col, type_col].contains(c))
            .collect();
        let chromosomes = value_cols
            .iter()
            .map(|&c| table.header[c].clone())
            .collect();

        let mut rows = Vec::with_capacity(table.len());
        for row in 0..table.len() {
            rows.push(DensityRow {
                probe: table.text(row, probe_col)?.to_string(),
                fragment: table.field(row, fragment_col)?,
                kind: table.text(row, type_col)?.to_string(),
                values: value_cols
                    .iter()
                    .map(|&c| table.field(row, c))
                    .collect::<Result<Vec<f64>>>()?,
            });
        }

        Ok(ChromosomeDensity { chromosomes, rows })
    }
}

impl TsvWrite for ChromosomeDensity {
    fn header(&self) -> Vec<String> {
        [PROBE_COL_NAME, FRAGMENT_COL_NAME, TYPE_COL_NAME]
            .iter()
            .map(|c| c.to_string())
            .chain(self.chromosomes.iter().cloned())
            .collect()
    }

    fn records(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                let mut record = vec![r.probe.clone(), r.fragment.to_string(), r.kind.clone()];
                record.extend(r.values.iter().map(|&v| format_value(Some(v))));
                record
            })
            .collect()
    }
}

/// Everything the statistics stage produces for one sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticsReport {
    pub global: GlobalStatistics,
    /// Densities over all contacts.
    pub densities: ChromosomeDensity,
    /// Densities over inter-chromosomal contacts only.
    pub inter_densities: ChromosomeDensity,
}

/// `numerator / denominator`, or 0 when undefined.
fn fraction(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

///
/// Contact share of a chromosome relative to its share of the genome.
///
/// # Arguments
/// - contacts: the probe's contacts on the chromosome
/// - total: the probe's contacts the share is taken over
/// - chrom_size: the chromosome's length
/// - genome_size: summed length of the chromosomes the share is compared against
///
fn density(contacts: f64, total: f64, chrom_size: u64, genome_size: u64) -> f64 {
    if contacts == 0.0 || chrom_size == 0 || genome_size == 0 {
        return 0.0;
    }
    fraction(contacts, total) / (chrom_size as f64 / genome_size as f64)
}

///
/// Compute per-probe statistics and chromosome densities from an unbinned profile.
///
/// Fractions of a probe with no contacts are 0. Capture efficiency is unset for every
/// probe when the reference class is empty or has a zero mean.
///
/// # Arguments
/// - profile: the sample's unbinned contact counts
/// - probes: every probe of the sample with its bound fragment
/// - context: sample-wide constants
///
pub fn compute_statistics(
    profile: &UnbinnedProfile,
    probes: &ProbeFragments,
    context: &StatisticsContext,
) -> StatisticsReport {
    let chromosomes: Vec<String> = context.chromosomes.iter().map(|(c, _)| c.clone()).collect();
    let mut global = Vec::with_capacity(probes.len());
    let mut densities = Vec::with_capacity(probes.len());
    let mut inter_densities = Vec::with_capacity(probes.len());

    for bound in probes.iter() {
        let probe = &bound.probe;
        let column = profile.probe_index(&probe.name).map(|c| &profile.columns[c]);
        if column.is_none() {
            debug!("probe {} has no column in the profile", probe.name);
        }

        let cis_low = probe.start as i64 - context.cis_range as i64;
        let cis_high = (probe.end + context.cis_range) as i64;

        let mut total = 0.0;
        let mut cis = 0.0;
        let mut inter_contacts = 0.0;
        let mut per_chr: HashMap<&str, f64> = HashMap::default();

        if let Some(column) = column {
            for (key, value) in profile.keys.iter().zip(column) {
                let value = value.unwrap_or(0.0);
                total += value;
                *per_chr.entry(key.chr()).or_insert(0.0) += value;

                if key.chr != probe.chr {
                    inter_contacts += value;
                } else if key.start as i64 >= cis_low && (key.start + key.size) as i64 <= cis_high {
                    cis += value;
                }
            }
        }

        let (cis, trans, inter, intra) = if total > 0.0 {
            let cis = cis / total;
            let inter = inter_contacts / total;
            (cis, 1.0 - cis, inter, 1.0 - inter)
        } else {
            (0.0, 0.0, 0.0, 0.0)
        };

        let genome_size = context.genome_size_excluding(&probe.chr);
        let mut all_values = Vec::with_capacity(chromosomes.len());
        let mut inter_values = Vec::with_capacity(chromosomes.len());
        for (chr, size) in &context.chromosomes {
            let on_chr = per_chr.get(chr.as_str()).copied().unwrap_or(0.0);
            all_values.push(density(on_chr, total, *size, genome_size));

            let inter_on_chr = if *chr == probe.chr { 0.0 } else { on_chr };
            inter_values.push(density(inter_on_chr, inter_contacts, *size, genome_size));
        }

        global.push(ProbeStatistics {
            probe: probe.name.clone(),
            chr: probe.chr.clone(),
            fragment: bound.fragment_id(),
            kind: probe.kind.clone(),
            contacts: total,
            coverage_over_hic_contacts: fraction(total, context.total_contacts as f64),
            cis,
            trans,
            intra_chr: intra,
            inter_chr: inter,
            capture_efficiency: None,
            relative_efficiency: Vec::new(),
        });
        densities.push(DensityRow {
            probe: probe.name.clone(),
            fragment: bound.fragment_id(),
            kind: probe.kind.clone(),
            values: all_values,
        });
        inter_densities.push(DensityRow {
            probe: probe.name.clone(),
            fragment: bound.fragment_id(),
            kind: probe.kind.clone(),
            values: inter_values,
        });
    }

    let reference: Vec<f64> = global
        .iter()
        .filter(|p| p.kind == context.reference_type)
        .map(|p| p.contacts)
        .collect();
    let reference_mean = if reference.is_empty() {
        0.0
    } else {
        reference.iter().sum::<f64>() / reference.len() as f64
    };
    if reference_mean > 0.0 {
        for p in global.iter_mut() {
            p.capture_efficiency = Some(p.contacts / reference_mean);
        }
    } else {
        debug!(
            "no '{}' probe with contacts, capture efficiency left unset",
            context.reference_type
        );
    }

    global.sort_by_key(|p| p.fragment);
    densities.sort_by_key(|r| r.fragment);
    inter_densities.sort_by_key(|r| r.fragment);

    info!("computed statistics for {} probes", global.len());

    StatisticsReport {
        global: GlobalStatistics {
            references: Vec::new(),
            probes: global,
        },
        densities: ChromosomeDensity {
            chromosomes: chromosomes.clone(),
            rows: densities,
        },
        inter_densities: ChromosomeDensity {
            chromosomes,
            rows: inter_densities,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use sshic_contacts::{associate_probes, AssociationOptions};
    use sshic_core::models::{Fragment, FragmentKey, FragmentList, Probe, ProbeSet};
    use tempfile::tempdir;

    fn probe(name: &str, kind: &str, chr: &str, start: u64, end: u64) -> Probe {
        Probe {
            name: name.to_string(),
            kind: kind.to_string(),
            chr: chr.to_string(),
            start,
            end,
            sequence: None,
        }
    }

    #[fixture]
    fn probes() -> ProbeFragments {
        let fragments = FragmentList::from(vec![
            Fragment::new("chr1", 0, 100),
            Fragment::new("chr1", 100, 200),
            Fragment::new("chr1", 200, 300),
            Fragment::new("chr2", 0, 100),
            Fragment::new("chr2", 100, 200),
        ]);
        let probes = ProbeSet::from(vec![
            probe("P1", "ds", "chr1", 100, 110),
            probe("P2", "ds", "chr2", 120, 130),
            probe("P3", "ss", "chr1", 250, 260),
        ]);
        associate_probes(
            &fragments,
            &probes,
            &ChromosomeOrder::default(),
            &AssociationOptions::default(),
        )
        .unwrap()
    }

    #[fixture]
    fn profile() -> UnbinnedProfile {
        let mut profile = UnbinnedProfile::new(vec![
            "P1".to_string(),
            "P2".to_string(),
            "P3".to_string(),
        ]);
        for (chr, start, p1, p2) in [
            ("chr1", 0, 6.0, 0.0),
            ("chr1", 200, 2.0, 4.0),
            ("chr2", 0, 2.0, 0.0),
            ("chr2", 100, 0.0, 6.0),
        ] {
            profile.push_row(
                FragmentKey {
                    chr: chr.to_string(),
                    start,
                    size: 100,
                },
                vec![Some(p1), Some(p2), Some(0.0)],
            );
        }
        profile
    }

    #[fixture]
    fn context() -> StatisticsContext {
        let sizes: ChromosomeSizes = [("chr1", 300_u64), ("chr2", 200)].into_iter().collect();
        StatisticsContext::new(40, &sizes, &ChromosomeOrder::default()).with_cis_range(100)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[rstest]
    fn test_fractions_and_coverage(
        profile: UnbinnedProfile,
        probes: ProbeFragments,
        context: StatisticsContext,
    ) {
        let report = compute_statistics(&profile, &probes, &context);
        let p1 = report.global.get("P1").unwrap();

        assert_eq!(p1.contacts, 10.0);
        assert_close(p1.coverage_over_hic_contacts, 0.25);
        assert_close(p1.cis, 0.6);
        assert_close(p1.trans, 0.4);
        assert_close(p1.inter_chr, 0.2);
        assert_close(p1.intra_chr, 0.8);
    }

    #[rstest]
    fn test_probe_without_contacts_has_zero_fractions(
        profile: UnbinnedProfile,
        probes: ProbeFragments,
        context: StatisticsContext,
    ) {
        let report = compute_statistics(&profile, &probes, &context);
        let p3 = report.global.get("P3").unwrap();

        assert_eq!(
            (p3.contacts, p3.cis, p3.trans, p3.intra_chr, p3.inter_chr),
            (0.0, 0.0, 0.0, 0.0, 0.0)
        );
        assert_eq!(p3.capture_efficiency, Some(0.0));
        assert_eq!(report.densities.factor("P3", "chr1"), Some(0.0));
    }

    #[rstest]
    fn test_rows_sorted_by_fragment(
        profile: UnbinnedProfile,
        probes: ProbeFragments,
        context: StatisticsContext,
    ) {
        let report = compute_statistics(&profile, &probes, &context);
        let order: Vec<(&str, u32)> = report
            .global
            .probes
            .iter()
            .map(|p| (p.probe.as_str(), p.fragment))
            .collect();
        assert_eq!(order, vec![("P1", 1), ("P3", 2), ("P2", 4)]);
    }

    #[rstest]
    fn test_chromosome_densities(
        profile: UnbinnedProfile,
        probes: ProbeFragments,
        context: StatisticsContext,
    ) {
        let report = compute_statistics(&profile, &probes, &context);

        assert_close(report.densities.factor("P1", "chr1").unwrap(), 0.8 / 1.5);
        assert_close(report.densities.factor("P1", "chr2").unwrap(), 0.2);
        assert_close(report.densities.factor("P2", "chr1").unwrap(), 0.4);
        assert_close(report.densities.factor("P2", "chr2").unwrap(), 0.6 / (200.0 / 300.0));

        assert_eq!(report.inter_densities.factor("P1", "chr1"), Some(0.0));
        assert_close(report.inter_densities.factor("P1", "chr2").unwrap(), 1.0);
        assert_close(report.inter_densities.factor("P2", "chr1").unwrap(), 1.0);
    }

    #[rstest]
    fn test_capture_efficiency(
        profile: UnbinnedProfile,
        probes: ProbeFragments,
        context: StatisticsContext,
    ) {
        let report = compute_statistics(&profile, &probes, &context);
        assert_eq!(report.global.get("P1").unwrap().capture_efficiency, Some(1.0));
        assert_eq!(report.global.get("P2").unwrap().capture_efficiency, Some(1.0));

        let no_reference = context.with_reference_type("unknown");
        let report = compute_statistics(&profile, &probes, &no_reference);
        assert!(report.global.probes.iter().all(|p| p.capture_efficiency.is_none()));
    }

    #[rstest]
    fn test_write_and_read_back(
        profile: UnbinnedProfile,
        probes: ProbeFragments,
        context: StatisticsContext,
    ) {
        let report = compute_statistics(&profile, &probes, &context);
        let dir = tempdir().unwrap();

        let stats_path = dir.path().join("AD1_global_statistics.tsv");
        report.global.write_tsv(&stats_path).unwrap();
        assert_eq!(GlobalStatistics::from_tsv(&stats_path).unwrap(), report.global);

        let density_path = dir.path().join("AD1_normalized_chr_freq.tsv");
        report.densities.write_tsv(&density_path).unwrap();
        assert_eq!(ChromosomeDensity::from_tsv(&density_path).unwrap(), report.densities);
    }
}
