mod aggregate;
mod associate;
mod common;
mod filter;
mod organize;
mod pipeline;
mod rebin;
mod stats;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "sshic";
    pub const VERBOSE_ARG: &str = "verbose";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Probe-centric contact profiles, statistics and landmark aggregation for ssDNA capture Hi-C.")
        .subcommand_required(true)
        .arg(
            Arg::new(consts::VERBOSE_ARG)
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Log at debug level unless RUST_LOG says otherwise"),
        )
        .subcommand(pipeline::cli::create_pipeline_cli())
        .subcommand(associate::cli::create_associate_cli())
        .subcommand(filter::cli::create_filter_cli())
        .subcommand(organize::cli::create_organize_cli())
        .subcommand(rebin::cli::create_rebin_cli())
        .subcommand(stats::cli::create_stats_cli())
        .subcommand(aggregate::cli::create_aggregate_cli())
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    let level = if matches.get_flag(consts::VERBOSE_ARG) {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match matches.subcommand() {
        //
        // FULL PER-SAMPLE PIPELINE
        //
        Some((pipeline::cli::PIPELINE_CMD, matches)) => {
            pipeline::handlers::run_pipeline(matches)?;
        }

        //
        // SINGLE STAGES
        //
        Some((associate::cli::ASSOCIATE_CMD, matches)) => {
            associate::handlers::run_associate(matches)?;
        }
        Some((filter::cli::FILTER_CMD, matches)) => {
            filter::handlers::run_filter(matches)?;
        }
        Some((organize::cli::ORGANIZE_CMD, matches)) => {
            organize::handlers::run_organize(matches)?;
        }
        Some((rebin::cli::REBIN_CMD, matches)) => {
            rebin::handlers::run_rebin(matches)?;
        }
        Some((stats::cli::STATS_CMD, matches)) => {
            stats::handlers::run_stats(matches)?;
        }

        //
        // LANDMARK AGGREGATION
        //
        Some((aggregate::cli::AGGREGATE_CMD, matches)) => {
            aggregate::handlers::run_aggregate(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
