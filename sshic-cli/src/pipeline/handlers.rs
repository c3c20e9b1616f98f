use anyhow::Result;
use clap::ArgMatches;
use log::info;

use sshic_pipeline::{SampleInputs, run_sample};

use crate::common::{apply_overrides, load_config, required_path};

pub fn run_pipeline(matches: &ArgMatches) -> Result<()> {
    let mut config = load_config(matches)?;
    if let Some(bin_sizes) = matches.get_many::<u64>("bin-size") {
        config.bin_sizes = bin_sizes.copied().collect();
    }
    if let Some(chromosomes) = matches.get_many::<String>("exclude") {
        config.excluded_chromosomes.extend(chromosomes.cloned());
    }
    if matches.get_flag("no-mask") {
        config.mask_probe_chromosome = false;
    }
    apply_overrides(&mut config, matches)?;

    let inputs = SampleInputs {
        contacts: required_path(matches, "contacts")?,
        fragments: required_path(matches, "fragments")?,
        probes: required_path(matches, "probes")?,
        landmarks: required_path(matches, "landmarks")?,
        sample_id: matches.get_one::<String>("sample-id").cloned(),
    };
    let output = required_path(matches, "output")?;

    let report = run_sample(&inputs, &config, &output)?;
    info!(
        "sample {}: {} files written, {} reused",
        report.sample_id,
        report.written.len(),
        report.skipped.len()
    );

    Ok(())
}
