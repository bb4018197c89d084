use std::path::PathBuf;

use clap::{
    crate_description, crate_name, crate_version, value_parser, Arg, ArgAction, Command,
};

use anyhow::Context;

use utils::{init_log, LogLevel};

use crate::{config::Config, sample};

/// Set up definition of command options for clap
fn cli_model() -> Command {
    Command::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .arg(
            Arg::new("timestamp")
                .short('X')
                .long("timestamp")
                .value_parser(value_parser!(stderrlog::Timestamp))
                .value_name("GRANULARITY")
                .default_value("none")
                .help("Prepend log entries with a timestamp"),
        )
        .arg(
            Arg::new("loglevel")
                .short('l')
                .long("loglevel")
                .value_name("LOGLEVEL")
                .value_parser(value_parser!(LogLevel))
                .ignore_case(true)
                .default_value("warn")
                .help("Set log level"),
        )
        .arg(
            Arg::new("quiet")
                .action(ArgAction::SetTrue)
                .long("quiet")
                .conflicts_with("loglevel")
                .help("Silence all output"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .help("Report output file [default: stdout]"),
        )
        .arg(
            Arg::new("analysis_dir")
                .value_parser(value_parser!(PathBuf))
                .value_name("ANALYSIS_DIR")
                .help("Directory tree to scan for QualiMap BamQC results [default: current directory]"),
        )
}

/// Handle command line options.  Set up Config structure
pub fn handle_cli() -> anyhow::Result<Config> {
    // Get matches from command line
    let m = cli_model().get_matches();

    // Setup logging
    init_log(&m);

    debug!("Processing command line options");

    let analysis_dir = m
        .get_one::<PathBuf>("analysis_dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));

    // Scan for QualiMap result directories
    let samples = sample::find_qc_reports(&analysis_dir).with_context(|| {
        format!(
            "Error collecting QualiMap reports from {}",
            analysis_dir.display()
        )
    })?;

    info!("Found {} reports", samples.len());

    let mut cfg = Config::new(analysis_dir, samples);

    if let Some(p) = m.get_one::<PathBuf>("output") {
        cfg.set_output_file(p.to_owned())
    }

    Ok(cfg)
}
