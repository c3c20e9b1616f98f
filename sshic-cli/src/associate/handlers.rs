use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use sshic_core::io::TsvWrite;

use crate::common::{load_bound_probes, load_config, load_fragments, required_path};

pub fn run_associate(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let output = required_path(matches, "output")?;

    let fragments = load_fragments(matches)?;
    let bound = load_bound_probes(matches, &fragments, &config)?;

    bound
        .write_tsv(&output)
        .with_context(|| format!("writing {}", output.display()))?;
    info!("{} probes associated, written to {}", bound.len(), output.display());

    Ok(())
}
