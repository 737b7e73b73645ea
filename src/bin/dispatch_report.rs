//! dispatch-report - dispatch counter reports and heatmaps.

use std::process;

use clap::Parser;
use colored::Colorize;

use dispatch_report::cli::{self, Cli};

fn main() {
    let cli = Cli::parse();
    if let Err(e) = cli::run(&cli) {
        eprintln!("{} {e:#}", "error:".red().bold());
        process::exit(1);
    }
}
