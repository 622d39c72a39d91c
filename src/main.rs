// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::Parser;

mod cli;

use cli::analyze::{list_lines, run_analysis};
use cli::args::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Analyze(args) => run_analysis(args),
        Commands::Lines => list_lines(),
    }
}
