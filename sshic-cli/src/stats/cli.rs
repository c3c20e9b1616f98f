use clap::{Command, arg};

use crate::common::{
    cis_range_arg, config_arg, contacts_arg, fragments_arg, landmarks_arg, output_arg,
    probes_arg, reference_arg,
};

pub const STATS_CMD: &str = "stats";

pub fn create_stats_cli() -> Command {
    Command::new(STATS_CMD)
        .about("Per-probe capture statistics and chromosome contact densities.")
        .arg_required_else_help(true)
        .arg(contacts_arg())
        .arg(arg!(-u --unbinned <unbinned> "Unbinned contact profile"))
        .arg(fragments_arg())
        .arg(probes_arg())
        .arg(landmarks_arg())
        .arg(output_arg("Directory the statistics tables are written to"))
        .arg(arg!(--"sample-id" <sample_id> "Prefix of the output tables (default: from the contact file name)").required(false))
        .arg(cis_range_arg())
        .arg(reference_arg())
        .arg(config_arg())
}
