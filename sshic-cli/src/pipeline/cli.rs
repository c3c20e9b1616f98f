use clap::{Arg, ArgAction, Command, arg, value_parser};

use crate::common::{
    cis_range_arg, config_arg, contacts_arg, fragments_arg, landmarks_arg, output_arg,
    probes_arg, reference_arg,
};

pub const PIPELINE_CMD: &str = "pipeline";

pub fn create_pipeline_cli() -> Command {
    Command::new(PIPELINE_CMD)
        .about("Run every stage for one sample, skipping stages whose outputs already exist.")
        .arg_required_else_help(true)
        .arg(contacts_arg())
        .arg(fragments_arg())
        .arg(probes_arg())
        .arg(landmarks_arg())
        .arg(output_arg("Root of the output tree; the sample gets its own directory"))
        .arg(arg!(--"sample-id" <sample_id> "Sample id (default: from the contact file name)").required(false))
        .arg(config_arg())
        .arg(cis_range_arg())
        .arg(reference_arg())
        .arg(
            Arg::new("bin-size")
                .short('b')
                .long("bin-size")
                .action(ArgAction::Append)
                .value_parser(value_parser!(u64))
                .help("Resolution to rebin at; replaces the configured list"),
        )
        .arg(
            Arg::new("exclude")
                .short('x')
                .long("exclude")
                .action(ArgAction::Append)
                .help("Chromosome to leave out of the aggregation"),
        )
        .arg(
            Arg::new("no-mask")
                .long("no-mask")
                .action(ArgAction::SetTrue)
                .help("Keep each probe's values on its own chromosome when aggregating"),
        )
}
