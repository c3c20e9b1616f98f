use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use sshic_aggregate::{AggregateParams, LandmarkKind, aggregate};
use sshic_core::io::TsvWrite;
use sshic_core::models::{BinnedProfile, ChromosomeSizes, LandmarkTable};
use sshic_pipeline::{SamplePaths, sample_id_from_path};
use sshic_stats::ChromosomeDensity;

use crate::common::{load_bound_probes, load_config, load_fragments, required_path};

pub fn run_aggregate(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let input = required_path(matches, "input")?;
    let output = required_path(matches, "output")?;
    let landmarks_path = required_path(matches, "landmarks")?;

    let kind = matches
        .get_one::<String>("kind")
        .context("the --kind argument is required")?;
    let kind = LandmarkKind::try_from(kind.as_str()).map_err(anyhow::Error::msg)?;
    let window = *matches
        .get_one::<u64>("window")
        .context("the --window argument is required")?;
    let bin_size = *matches
        .get_one::<u64>("bin-size")
        .context("the --bin-size argument is required")?;
    let sample_id = matches
        .get_one::<String>("sample-id")
        .cloned()
        .unwrap_or_else(|| sample_id_from_path(&input));

    let mut excluded = config.excluded_chromosomes.clone();
    if let Some(chromosomes) = matches.get_many::<String>("exclude") {
        excluded.extend(chromosomes.cloned());
    }
    let params = AggregateParams {
        excluded_chromosomes: excluded,
        mask_probe_chromosome: config.mask_probe_chromosome && !matches.get_flag("no-mask"),
        ..AggregateParams::new(kind, window, bin_size)
    };

    let fragments = load_fragments(matches)?;
    let bound = load_bound_probes(matches, &fragments, &config)?;
    let landmarks = LandmarkTable::try_from(landmarks_path.as_path())
        .with_context(|| format!("reading landmark table {}", landmarks_path.display()))?;
    let sizes = ChromosomeSizes::resolve(&landmarks, &fragments);
    let profile = BinnedProfile::from_tsv(&input)
        .with_context(|| format!("reading binned profile {}", input.display()))?;
    let normalization = match matches.get_one::<String>("inter-norm") {
        Some(path) => Some(
            ChromosomeDensity::from_tsv(path)
                .with_context(|| format!("reading inter-chromosomal densities {}", path))?,
        ),
        None => None,
    };

    let result = aggregate(
        &profile,
        &landmarks,
        &sizes,
        &bound,
        &params,
        normalization.as_ref(),
        &config.chromosome_order(),
    )
    .with_context(|| format!("aggregating around {}", kind.name()))?;

    let paths = SamplePaths::new(&output, &sample_id);
    for (statistic, table) in [
        ("mean", &result.mean),
        ("median", &result.median),
        ("std", &result.std),
    ] {
        table.write_tsv(paths.aggregated(&output, kind, statistic))?;
    }
    for probe in &result.window.probes {
        if let Some(table) = result.window.probe_table(probe) {
            table.write_tsv(paths.probe_window(&output, kind, probe))?;
        }
    }
    info!(
        "{} windows around {} aggregated, written to {}",
        result.window.slices.len(),
        kind.name(),
        output.display()
    );

    Ok(())
}
