use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use sshic_aggregate::{aggregate, AggregateParams, LandmarkKind};
use sshic_contacts::{
    associate_probes, filter_contacts, organize_contacts, rebin_contacts, FilteredContacts,
};
use sshic_core::io::TsvWrite;
use sshic_core::models::{
    BinnedProfile, ChromosomeSizes, ContactList, FragmentList, LandmarkTable, ProbeSet,
    UnbinnedProfile,
};
use sshic_stats::{
    compare_to_references, compute_statistics, weight_profile, ChromosomeDensity,
    GlobalStatistics, ReferenceEfficiency, StatisticsContext,
};

use crate::config::PipelineConfig;
use crate::paths::{sample_id_from_path, SamplePaths};

const AGGREGATE_STATISTICS: [&str; 3] = ["mean", "median", "std"];

/// Input tables of one sample.
#[derive(Debug, Clone)]
pub struct SampleInputs {
    /// Raw sparse contact list.
    pub contacts: PathBuf,
    pub fragments: PathBuf,
    pub probes: PathBuf,
    pub landmarks: PathBuf,
    /// Derived from the contact file name when unset.
    pub sample_id: Option<String>,
}

impl SampleInputs {
    pub fn sample_id(&self) -> String {
        self.sample_id
            .clone()
            .unwrap_or_else(|| sample_id_from_path(&self.contacts))
    }
}

/// Files a run wrote, and files it found already present and left alone.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub sample_id: String,
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

impl RunReport {
    /// Whether `path` already exists, recording it as skipped if so.
    fn reuse(&mut self, path: &Path) -> bool {
        if path.exists() {
            self.skipped.push(path.to_path_buf());
            true
        } else {
            false
        }
    }

    fn persist<T: TsvWrite>(&mut self, table: &T, path: &Path) -> Result<()> {
        if self.reuse(path) {
            return Ok(());
        }
        table
            .write_tsv(path)
            .with_context(|| format!("writing {}", path.display()))?;
        self.written.push(path.to_path_buf());
        Ok(())
    }

    /// Overwrite a table recorded as skipped, moving it to the written list.
    fn replace<T: TsvWrite>(&mut self, table: &T, path: &Path) -> Result<()> {
        table
            .write_tsv(path)
            .with_context(|| format!("writing {}", path.display()))?;
        self.skipped.retain(|p| p != path);
        self.written.push(path.to_path_buf());
        Ok(())
    }

    /// Build and write a table, unless its file already exists.
    fn persist_with<T, F>(&mut self, path: &Path, build: F) -> Result<()>
    where
        T: TsvWrite,
        F: FnOnce() -> Result<T>,
    {
        if self.reuse(path) {
            return Ok(());
        }
        let table = build()?;
        table
            .write_tsv(path)
            .with_context(|| format!("writing {}", path.display()))?;
        self.written.push(path.to_path_buf());
        Ok(())
    }
}

///
/// Run every stage of the pipeline for one sample.
///
/// Outputs go to `<output_dir>/<sample id>/`. Structural failures (a missing input, a probe
/// outside every fragment) abort the sample with an error naming the sample and the stage.
///
/// # Arguments
/// - inputs: the sample's input tables
/// - config: pipeline parameters
/// - output_dir: root of the output tree
///
pub fn run_sample(
    inputs: &SampleInputs,
    config: &PipelineConfig,
    output_dir: &Path,
) -> Result<RunReport> {
    let sample_id = inputs.sample_id();
    let paths = SamplePaths::new(output_dir, &sample_id);
    let order = config.chromosome_order();
    let stage = |name: &str| format!("sample {}: {}", sample_id, name);

    let mut report = RunReport {
        sample_id: sample_id.clone(),
        ..Default::default()
    };

    info!("sample {}: reading inputs", sample_id);
    let fragments = FragmentList::try_from(inputs.fragments.as_path())
        .with_context(|| stage("reading the fragment list"))?;
    let probes = ProbeSet::try_from(inputs.probes.as_path())
        .with_context(|| stage("reading the probe list"))?;
    let landmarks = LandmarkTable::try_from(inputs.landmarks.as_path())
        .with_context(|| stage("reading the landmark table"))?;
    let sizes = ChromosomeSizes::resolve(&landmarks, &fragments);

    info!("{}", stage("associating probes to fragments"));
    let bound = associate_probes(&fragments, &probes, &order, &config.association_options())
        .with_context(|| stage("associating probes to fragments"))?;
    report.persist(&bound, &paths.probes_to_fragments())?;

    let not_weighted = paths.not_weighted_dir();
    let unbinned_path = paths.unbinned_contacts(&not_weighted);
    let filtered_path = paths.filtered();
    let stats_path = paths.global_statistics();

    // the raw contact list is only read when a stage that needs it has to run
    let needs_contacts =
        (!unbinned_path.exists() && !filtered_path.exists()) || !stats_path.exists();
    let contacts = if needs_contacts {
        Some(
            ContactList::try_from(inputs.contacts.as_path())
                .with_context(|| stage("reading the contact list"))?,
        )
    } else {
        None
    };

    let unbinned = if report.reuse(&unbinned_path) {
        UnbinnedProfile::from_tsv(&unbinned_path)
            .with_context(|| stage("reading the unbinned profile"))?
    } else {
        let filtered = if report.reuse(&filtered_path) {
            FilteredContacts::from_tsv(&filtered_path)
                .with_context(|| stage("reading the filtered contacts"))?
        } else {
            info!("{}", stage("filtering contacts"));
            let contacts = contacts.as_ref().context("contact list not loaded")?;
            let filtered = filter_contacts(&fragments, &bound, contacts)
                .with_context(|| stage("filtering contacts"))?;
            report.persist(&filtered, &filtered_path)?;
            filtered
        };

        info!("{}", stage("organizing contacts per probe"));
        let unbinned = organize_contacts(&filtered, &bound, &order);
        report.persist(&unbinned, &unbinned_path)?;
        unbinned
    };
    report.persist_with(&paths.unbinned_frequencies(&not_weighted), || {
        Ok(unbinned.frequencies())
    })?;

    let references = config
        .references
        .iter()
        .map(|r| {
            ReferenceEfficiency::from_tsv(&r.name, &r.path)
                .with_context(|| stage(&format!("reading reference {}", r.name)))
        })
        .collect::<Result<Vec<_>>>()?;

    let (stats, inter_densities) = if report.reuse(&stats_path) {
        let stored = GlobalStatistics::from_tsv(&stats_path)
            .with_context(|| stage("reading the global statistics"))?;
        let inter_densities = ChromosomeDensity::from_tsv(paths.normalized_inter_chr_freq())
            .with_context(|| stage("reading the inter-chromosomal densities"))?;

        // references may have changed since the table was written
        let stats = compare_to_references(stored.clone(), &references);
        if stats != stored {
            info!("{}", stage("updating the reference comparison"));
            report.replace(&stats, &stats_path)?;
        }
        (stats, inter_densities)
    } else {
        info!("{}", stage("computing statistics"));
        let contacts = contacts.as_ref().context("contact list not loaded")?;
        let context = StatisticsContext::new(contacts.total(), &sizes, &order)
            .with_cis_range(config.cis_range)
            .with_reference_type(&config.reference_probe_type);
        let computed = compute_statistics(&unbinned, &bound, &context);
        let stats = compare_to_references(computed.global, &references);

        // the global table goes last: its presence implies the density tables exist
        report.persist(&computed.densities, &paths.normalized_chr_freq())?;
        report.persist(&computed.inter_densities, &paths.normalized_inter_chr_freq())?;
        report.persist(&stats, &stats_path)?;
        (stats, computed.inter_densities)
    };

    for reference in &config.references {
        let dir = paths.weighted_dir(&reference.name);
        report.persist_with(&paths.unbinned_contacts(&dir), || {
            weight_profile(&unbinned, &stats, &reference.name)
                .with_context(|| stage(&format!("weighting by {}", reference.name)))
        })?;
        report.persist_with(&paths.unbinned_frequencies(&dir), || {
            weight_profile(&unbinned.frequencies(), &stats, &reference.name)
                .with_context(|| stage(&format!("weighting by {}", reference.name)))
        })?;
    }

    for bin_size in config.all_bin_sizes() {
        let mut targets = vec![(
            None,
            paths.binned_contacts(&not_weighted, bin_size),
            paths.binned_frequencies(&not_weighted, bin_size),
        )];
        for reference in &config.references {
            let dir = paths.weighted_dir(&reference.name);
            targets.push((
                Some(reference.name.as_str()),
                paths.binned_contacts(&dir, bin_size),
                paths.binned_frequencies(&dir, bin_size),
            ));
        }

        if targets.iter().all(|(_, c, f)| c.exists() && f.exists()) {
            for (_, c, f) in targets {
                report.skipped.push(c);
                report.skipped.push(f);
            }
            continue;
        }

        info!("{}", stage(&format!("rebinning at {} bp", bin_size)));
        let binned = rebin_contacts(&unbinned, bin_size, Some(&sizes), &order)
            .with_context(|| stage(&format!("rebinning at {} bp", bin_size)))?;
        let frequencies = binned.frequencies();

        for (reference, contacts_path, frequencies_path) in &targets {
            match reference {
                None => {
                    report.persist(&binned, contacts_path)?;
                    report.persist(&frequencies, frequencies_path)?;
                }
                Some(name) => {
                    report.persist_with(contacts_path, || {
                        Ok(weight_profile(&binned, &stats, name)?)
                    })?;
                    report.persist_with(frequencies_path, || {
                        Ok(weight_profile(&frequencies, &stats, name)?)
                    })?;
                }
            }
        }
    }

    let mut weight_dirs = vec![not_weighted.clone()];
    weight_dirs.extend(config.references.iter().map(|r| paths.weighted_dir(&r.name)));

    let landmark_params = [
        (
            LandmarkKind::Centromere,
            config.centromere_window,
            config.centromere_bin_size,
        ),
        (
            LandmarkKind::Telomere,
            config.telomere_window,
            config.telomere_bin_size,
        ),
    ];

    for dir in &weight_dirs {
        for (kind, window, bin_size) in landmark_params {
            for inter_normalized in [false, true] {
                let out_dir = paths.aggregated_dir(dir, kind, inter_normalized);
                let mut outputs: Vec<PathBuf> = AGGREGATE_STATISTICS
                    .iter()
                    .map(|s| paths.aggregated(&out_dir, kind, s))
                    .collect();
                outputs.extend(
                    unbinned
                        .probes
                        .iter()
                        .map(|p| paths.probe_window(&out_dir, kind, p)),
                );
                if outputs.iter().all(|p| p.exists()) {
                    report.skipped.extend(outputs);
                    continue;
                }

                let description = format!(
                    "aggregating around {} in {} ({})",
                    kind.name(),
                    dir.display(),
                    if inter_normalized { "inter-chromosomal normalization" } else { "no normalization" }
                );
                info!("{}", stage(&description));

                let profile = BinnedProfile::from_tsv(paths.binned_frequencies(dir, bin_size))
                    .with_context(|| stage(&description))?;
                let params = AggregateParams {
                    excluded_chromosomes: config.excluded_chromosomes.clone(),
                    mask_probe_chromosome: config.mask_probe_chromosome,
                    ..AggregateParams::new(kind, window, bin_size)
                };
                let result = aggregate(
                    &profile,
                    &landmarks,
                    &sizes,
                    &bound,
                    &params,
                    inter_normalized.then_some(&inter_densities),
                    &order,
                )
                .with_context(|| stage(&description))?;

                report.persist(&result.mean, &outputs[0])?;
                report.persist(&result.median, &outputs[1])?;
                report.persist(&result.std, &outputs[2])?;
                for probe in &result.window.probes {
                    if let Some(table) = result.window.probe_table(probe) {
                        report.persist(&table, &paths.probe_window(&out_dir, kind, probe))?;
                    }
                }
            }
        }
    }

    info!(
        "sample {}: done, {} files written, {} already present",
        sample_id,
        report.written.len(),
        report.skipped.len()
    );
    Ok(report)
}
