use clap::Command;

use crate::common::{config_arg, contacts_arg, fragments_arg, output_arg, probes_arg};

pub const FILTER_CMD: &str = "filter";

pub fn create_filter_cli() -> Command {
    Command::new(FILTER_CMD)
        .about("Keep the contacts involving a probe-bound fragment, joined with fragment and probe annotations.")
        .arg_required_else_help(true)
        .arg(contacts_arg())
        .arg(fragments_arg())
        .arg(probes_arg())
        .arg(output_arg("Filtered contact table to write"))
        .arg(config_arg())
}
