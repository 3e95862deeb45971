use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, error};
use miette::{GraphicalReportHandler, GraphicalTheme};

use archmodel_cli::{Args, error_adapter::ErrorAdapter, run};

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level '{}', defaulting to 'warn'",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    if let Err(err) = run(&args) {
        error!(err:%; "Command failed");

        let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode());
        let mut output = String::new();
        let adapter = ErrorAdapter::new(&err);
        if handler.render_report(&mut output, &adapter).is_ok() {
            eprint!("{output}");
        } else {
            eprintln!("{err}");
        }
        process::exit(1);
    }
}
