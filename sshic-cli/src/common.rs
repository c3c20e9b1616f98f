//! Arguments and input loading shared by the subcommands.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, arg, value_parser};

use sshic_contacts::{ProbeFragments, associate_probes};
use sshic_core::models::{ChromosomeSizes, FragmentList, LandmarkTable, ProbeSet};
use sshic_pipeline::{PipelineConfig, ReferenceSample};

pub fn config_arg() -> Arg {
    arg!(--config <config> "Pipeline configuration file (toml or yaml)").required(false)
}

pub fn contacts_arg() -> Arg {
    arg!(-c --contacts <contacts> "Sparse contact list (frag_a, frag_b, contacts)")
}

pub fn fragments_arg() -> Arg {
    arg!(-f --fragments <fragments> "Restriction fragment list")
}

pub fn probes_arg() -> Arg {
    arg!(-p --probes <probes> "Capture probe list")
}

pub fn landmarks_arg() -> Arg {
    arg!(-l --landmarks <landmarks> "Chromosome coordinates table (centromeres and lengths)")
}

pub fn output_arg(help: &'static str) -> Arg {
    Arg::new("output").short('o').long("output").required(true).help(help)
}

pub fn cis_range_arg() -> Arg {
    Arg::new("cis-range")
        .long("cis-range")
        .value_parser(value_parser!(u64))
        .help("Distance around a probe counted as cis, in base pairs")
}

pub fn reference_arg() -> Arg {
    Arg::new("reference")
        .short('r')
        .long("reference")
        .action(ArgAction::Append)
        .help("Reference global statistics table, as name=path or a bare path")
}

pub fn load_config(matches: &ArgMatches) -> Result<PipelineConfig> {
    match matches.get_one::<String>("config") {
        Some(path) => PipelineConfig::try_from(Path::new(path))
            .with_context(|| format!("reading configuration {}", path)),
        None => Ok(PipelineConfig::default()),
    }
}

/// Apply the flags that override configuration fields, for those the subcommand defines.
pub fn apply_overrides(config: &mut PipelineConfig, matches: &ArgMatches) -> Result<()> {
    if let Ok(Some(cis_range)) = matches.try_get_one::<u64>("cis-range") {
        config.cis_range = *cis_range;
    }
    if let Ok(Some(references)) = matches.try_get_many::<String>("reference") {
        config
            .references
            .extend(references.map(|r| ReferenceSample::parse(r)));
    }
    config.validate().context("invalid configuration")?;
    Ok(())
}

pub fn required_path(matches: &ArgMatches, name: &str) -> Result<PathBuf> {
    matches
        .get_one::<String>(name)
        .map(PathBuf::from)
        .with_context(|| format!("the --{} argument is required", name))
}

pub fn load_fragments(matches: &ArgMatches) -> Result<FragmentList> {
    let path = required_path(matches, "fragments")?;
    FragmentList::try_from(path.as_path())
        .with_context(|| format!("reading fragment list {}", path.display()))
}

pub fn load_sizes(matches: &ArgMatches, fragments: &FragmentList) -> Result<ChromosomeSizes> {
    let path = required_path(matches, "landmarks")?;
    let landmarks = LandmarkTable::try_from(path.as_path())
        .with_context(|| format!("reading landmark table {}", path.display()))?;
    Ok(ChromosomeSizes::resolve(&landmarks, fragments))
}

/// Read the probe list and bind every probe to its fragment.
pub fn load_bound_probes(
    matches: &ArgMatches,
    fragments: &FragmentList,
    config: &PipelineConfig,
) -> Result<ProbeFragments> {
    let path = required_path(matches, "probes")?;
    let probes = ProbeSet::try_from(path.as_path())
        .with_context(|| format!("reading probe list {}", path.display()))?;
    associate_probes(
        fragments,
        &probes,
        &config.chromosome_order(),
        &config.association_options(),
    )
    .context("associating probes to fragments")
}
