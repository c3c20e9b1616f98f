use clap::{Command, arg, value_parser};

use crate::common::{config_arg, output_arg};

pub const REBIN_CMD: &str = "rebin";

pub fn create_rebin_cli() -> Command {
    Command::new(REBIN_CMD)
        .about("Aggregate an unbinned contact profile into fixed-size genomic bins.")
        .arg_required_else_help(true)
        .arg(arg!(-i --input <input> "Unbinned contact profile"))
        .arg(arg!(-b --"bin-size" <bin_size> "Bin size in base pairs").value_parser(value_parser!(u64)))
        .arg(output_arg("Binned contact profile to write"))
        .arg(arg!(--frequencies <frequencies> "Also write the binned frequency profile here").required(false))
        .arg(
            arg!(-l --landmarks <landmarks> "Chromosome coordinates table; with --fragments, emit every bin including empty ones")
                .required(false)
                .requires("fragments"),
        )
        .arg(
            arg!(-f --fragments <fragments> "Restriction fragment list")
                .required(false)
                .requires("landmarks"),
        )
        .arg(config_arg())
}
