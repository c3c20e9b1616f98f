use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use sshic_core::io::TsvWrite;
use sshic_core::models::{ContactList, UnbinnedProfile};
use sshic_pipeline::{SamplePaths, sample_id_from_path};
use sshic_stats::{
    ReferenceEfficiency, StatisticsContext, compare_to_references, compute_statistics,
};

use crate::common::{
    apply_overrides, load_bound_probes, load_config, load_fragments, load_sizes, required_path,
};

pub fn run_stats(matches: &ArgMatches) -> Result<()> {
    let mut config = load_config(matches)?;
    apply_overrides(&mut config, matches)?;

    let contacts_path = required_path(matches, "contacts")?;
    let unbinned_path = required_path(matches, "unbinned")?;
    let output = required_path(matches, "output")?;
    let sample_id = matches
        .get_one::<String>("sample-id")
        .cloned()
        .unwrap_or_else(|| sample_id_from_path(&contacts_path));

    let fragments = load_fragments(matches)?;
    let sizes = load_sizes(matches, &fragments)?;
    let bound = load_bound_probes(matches, &fragments, &config)?;
    let contacts = ContactList::try_from(contacts_path.as_path())
        .with_context(|| format!("reading contact list {}", contacts_path.display()))?;
    let profile = UnbinnedProfile::from_tsv(&unbinned_path)
        .with_context(|| format!("reading unbinned profile {}", unbinned_path.display()))?;

    let order = config.chromosome_order();
    let context = StatisticsContext::new(contacts.total(), &sizes, &order)
        .with_cis_range(config.cis_range)
        .with_reference_type(&config.reference_probe_type);
    let report = compute_statistics(&profile, &bound, &context);

    let references = config
        .references
        .iter()
        .map(|r| {
            ReferenceEfficiency::from_tsv(&r.name, &r.path)
                .with_context(|| format!("reading reference {} from {}", r.name, r.path.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    let global = compare_to_references(report.global, &references);

    let paths = SamplePaths {
        sample_id,
        sample_dir: output,
    };
    report.densities.write_tsv(paths.normalized_chr_freq())?;
    report.inter_densities.write_tsv(paths.normalized_inter_chr_freq())?;
    global.write_tsv(paths.global_statistics())?;
    info!(
        "statistics for {} probes written to {}",
        global.probes.len(),
        paths.sample_dir.display()
    );

    Ok(())
}
