//! Command-line surface and report printing.
//!
//! Mirrors the classic dispatch-report workflow: read the counters file,
//! warn about possibly saturated counters, then either print a ranking or
//! render the heatmap.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;

use crate::heatmap::DispatchHeatmap;
use crate::matrix::CounterMatrix;
use crate::rank::{top_bytecodes, top_pairs};
use crate::scale::Palette;
use crate::table::{counter_max, DispatchTable};
use crate::view;

/// Rendered pixels per inch of plot size.
const PX_PER_INCH: f32 = 100.0;

const DESCRIPTION: &str = "\
Process a dispatch counters JSON file and list top counters, or plot a
dispatch heatmap.

Note that handlers which may not or will never dispatch (e.g. a return or
throw handler) do not show up in the results.";

const HELP_EPILOGUE: &str = "\
examples:
  # Print the hottest bytecodes in descending order, reading from the
  # default filename dispatches.json (default mode)
  $ dispatch-report

  # Print the hottest 15 bytecode dispatch pairs reading from data.json
  $ dispatch-report -t -n 15 data.json

  # Save the heatmap to the default filename dispatches.svg
  $ dispatch-report -p

  # Save the heatmap to data.png
  $ dispatch-report -p -o data.png

  # Open the heatmap in an interactive viewer
  $ dispatch-report -p -i";

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "dispatch-report", version, about = DESCRIPTION, after_help = HELP_EPILOGUE)]
pub struct Cli {
    /// Dispatch counters JSON file
    #[arg(value_name = "<input filename>", default_value = "dispatches.json")]
    pub input_filename: PathBuf,

    /// Shorter side in inches of the output plot
    #[arg(long, short = 's', value_name = "N", default_value_t = 30.0)]
    pub plot_size: f32,

    /// Plot the dispatch pairs heatmap
    #[arg(long, short = 'p')]
    pub plot: bool,

    /// Open the heatmap in an interactive viewer, instead of writing to file
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Print the top bytecode dispatch pairs
    #[arg(long, short = 't')]
    pub top_bytecode_dispatch_pairs: bool,

    /// Print N top bytecode dispatch pairs when running with -t
    #[arg(long, short = 'n', value_name = "N", default_value_t = 10)]
    pub top_bytecode_dispatch_pairs_number: usize,

    /// File to save the plot to; the extension picks the format (svg, png, pdf)
    #[arg(
        long,
        short = 'o',
        value_name = "<output filename>",
        default_value = "dispatches.svg"
    )]
    pub output_filename: PathBuf,

    /// Counter width in bits for the saturation check
    #[arg(
        long,
        value_name = "N",
        default_value_t = 64,
        value_parser = clap::value_parser!(u8).range(1..=64)
    )]
    pub counter_bits: u8,

    /// Heatmap color palette
    #[arg(long, value_enum, default_value_t = Palette::Jet)]
    pub palette: Palette,
}

/// Execute one report run.
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    let table = DispatchTable::from_path(&cli.input_filename)
        .with_context(|| format!("failed to read {}", cli.input_filename.display()))?;

    warn_if_counters_saturated(&table, counter_max(cli.counter_bits));

    if cli.plot {
        anyhow::ensure!(cli.plot_size > 0.0, "plot size must be positive");
        let heatmap = DispatchHeatmap::new(CounterMatrix::from_table(&table))
            .side((cli.plot_size * PX_PER_INCH) as u32)
            .palette(cli.palette)
            .build()
            .context("cannot plot this table")?;

        if cli.interactive {
            view::show(&heatmap.to_framebuffer()?, "Dispatch heatmap")?;
        } else {
            heatmap
                .save(&cli.output_filename)
                .with_context(|| format!("failed to write {}", cli.output_filename.display()))?;
        }
    } else if cli.top_bytecode_dispatch_pairs {
        print!("{}", top_pairs_report(&table, cli.top_bytecode_dispatch_pairs_number));
    } else {
        print!("{}", top_bytecodes_report(&table));
    }

    Ok(())
}

/// Emit one advisory warning per counter sitting at `counter_max`.
///
/// Purely informational; computed results are unaffected.
pub fn warn_if_counters_saturated(table: &DispatchTable, counter_max: u64) {
    for (source, destination) in table.saturated_pairs(counter_max) {
        eprintln!(
            "{} {source} -> {destination} may have saturated.",
            "warning:".yellow().bold()
        );
    }
}

/// The default text report: every source ranked by total outgoing count.
#[must_use]
pub fn top_bytecodes_report(table: &DispatchTable) -> String {
    use std::fmt::Write;

    let mut out = String::from("Top bytecodes:\n");
    for ranked in top_bytecodes(table) {
        let _ = writeln!(out, "{:>12}\t{}", ranked.total, ranked.source);
    }
    out
}

/// The top-pairs text report: the `n` hottest dispatch pairs.
#[must_use]
pub fn top_pairs_report(table: &DispatchTable, n: usize) -> String {
    use std::fmt::Write;

    let mut out = format!("Top {n} bytecode dispatch pairs:\n");
    for pair in top_pairs(table, n) {
        let _ = writeln!(out, "{:>12}\t{} -> {}", pair.count, pair.source, pair.destination);
    }
    out
}
