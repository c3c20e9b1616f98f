use clap::Command;

use crate::common::{config_arg, fragments_arg, output_arg, probes_arg};

pub const ASSOCIATE_CMD: &str = "associate";

pub fn create_associate_cli() -> Command {
    Command::new(ASSOCIATE_CMD)
        .about("Bind every capture probe to the restriction fragment containing its midpoint.")
        .arg_required_else_help(true)
        .arg(fragments_arg())
        .arg(probes_arg())
        .arg(output_arg("Probe to fragment table to write"))
        .arg(config_arg())
}
