use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use sshic_contacts::filter_contacts;
use sshic_core::io::TsvWrite;
use sshic_core::models::ContactList;

use crate::common::{load_bound_probes, load_config, load_fragments, required_path};

pub fn run_filter(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let contacts_path = required_path(matches, "contacts")?;
    let output = required_path(matches, "output")?;

    let fragments = load_fragments(matches)?;
    let bound = load_bound_probes(matches, &fragments, &config)?;
    let contacts = ContactList::try_from(contacts_path.as_path())
        .with_context(|| format!("reading contact list {}", contacts_path.display()))?;

    let filtered = filter_contacts(&fragments, &bound, &contacts).context("filtering contacts")?;
    filtered
        .write_tsv(&output)
        .with_context(|| format!("writing {}", output.display()))?;
    info!(
        "{} of {} contact rows kept, written to {}",
        filtered.len(),
        contacts.contacts.len(),
        output.display()
    );

    Ok(())
}
