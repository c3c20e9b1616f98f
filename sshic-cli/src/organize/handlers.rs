use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use sshic_contacts::{FilteredContacts, organize_contacts};
use sshic_core::io::TsvWrite;

use crate::common::{load_bound_probes, load_config, load_fragments, required_path};

pub fn run_organize(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let filtered_path = required_path(matches, "filtered")?;
    let output = required_path(matches, "output")?;

    let fragments = load_fragments(matches)?;
    let bound = load_bound_probes(matches, &fragments, &config)?;
    let filtered = FilteredContacts::from_tsv(&filtered_path)
        .with_context(|| format!("reading filtered contacts {}", filtered_path.display()))?;

    let profile = organize_contacts(&filtered, &bound, &config.chromosome_order());
    profile
        .write_tsv(&output)
        .with_context(|| format!("writing {}", output.display()))?;
    info!("{} fragments profiled, written to {}", profile.len(), output.display());

    if let Some(path) = matches.get_one::<String>("frequencies") {
        profile
            .frequencies()
            .write_tsv(path)
            .with_context(|| format!("writing {}", path))?;
    }

    Ok(())
}
