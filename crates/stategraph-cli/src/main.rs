//! stategraph CLI - compile the state-graph DSL and report diagnostics

mod cli;

use clap::Parser;

fn main() {
    let cli_args = cli::Cli::parse();

    if let Err(e) = cli::run(cli_args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
