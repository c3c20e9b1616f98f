use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use sshic_contacts::rebin_contacts;
use sshic_core::io::TsvWrite;
use sshic_core::models::UnbinnedProfile;

use crate::common::{load_config, load_fragments, load_sizes, required_path};

pub fn run_rebin(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let input = required_path(matches, "input")?;
    let output = required_path(matches, "output")?;
    let bin_size = *matches
        .get_one::<u64>("bin-size")
        .context("the --bin-size argument is required")?;

    let profile = UnbinnedProfile::from_tsv(&input)
        .with_context(|| format!("reading unbinned profile {}", input.display()))?;

    let sizes = if matches.contains_id("landmarks") {
        let fragments = load_fragments(matches)?;
        Some(load_sizes(matches, &fragments)?)
    } else {
        None
    };

    let binned = rebin_contacts(&profile, bin_size, sizes.as_ref(), &config.chromosome_order())
        .with_context(|| format!("rebinning at {} bp", bin_size))?;
    binned
        .write_tsv(&output)
        .with_context(|| format!("writing {}", output.display()))?;
    info!("{} bins of {} bp, written to {}", binned.len(), bin_size, output.display());

    if let Some(path) = matches.get_one::<String>("frequencies") {
        binned
            .frequencies()
            .write_tsv(path)
            .with_context(|| format!("writing {}", path))?;
    }

    Ok(())
}
