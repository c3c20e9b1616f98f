use clap::{Command, arg};

use crate::common::{config_arg, fragments_arg, output_arg, probes_arg};

pub const ORGANIZE_CMD: &str = "organize";

pub fn create_organize_cli() -> Command {
    Command::new(ORGANIZE_CMD)
        .about("Pivot filtered contacts into a fragment x probe contact profile.")
        .arg_required_else_help(true)
        .arg(arg!(-i --filtered <filtered> "Filtered contact table"))
        .arg(fragments_arg())
        .arg(probes_arg())
        .arg(output_arg("Unbinned contact profile to write"))
        .arg(arg!(--frequencies <frequencies> "Also write the per-probe frequency profile here").required(false))
        .arg(config_arg())
}
