use clap::{Arg, ArgAction, Command, arg, value_parser};

use crate::common::{config_arg, fragments_arg, landmarks_arg, output_arg, probes_arg};

pub const AGGREGATE_CMD: &str = "aggregate";

pub fn create_aggregate_cli() -> Command {
    Command::new(AGGREGATE_CMD)
        .about("Average binned probe profiles in windows centered on centromeres or telomeres.")
        .arg_required_else_help(true)
        .arg(arg!(-i --input <input> "Binned frequency profile"))
        .arg(landmarks_arg())
        .arg(fragments_arg())
        .arg(probes_arg())
        .arg(
            arg!(-k --kind <kind> "Landmark the windows are centered on")
                .value_parser(["centromeres", "telomeres"]),
        )
        .arg(arg!(-w --window <window> "Window radius in base pairs").value_parser(value_parser!(u64)))
        .arg(arg!(-b --"bin-size" <bin_size> "Bin size of the input profile").value_parser(value_parser!(u64)))
        .arg(output_arg("Directory the aggregated tables are written to"))
        .arg(arg!(--"inter-norm" <inter_norm> "Inter-chromosomal density table to normalize by").required(false))
        .arg(arg!(--"sample-id" <sample_id> "Prefix of the output tables (default: from the input file name)").required(false))
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
                .help("Keep each probe's values on its own chromosome"),
        )
        .arg(config_arg())
}
