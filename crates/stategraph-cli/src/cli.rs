//! Command-line interface for the stategraph compiler
//!
//! Provides a CLI to compile the state-graph DSL into a [`stategraph::StateGraph`]
//! and report diagnostics.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use stategraph::core::logging::init_logging;
use stategraph::{compile, EventService};

/// stategraph - compile a textual state-graph DSL into an executable IR
#[derive(Parser)]
#[command(name = "stategraph")]
#[command(about = "Compiles a textual state-graph DSL into an executable state machine IR")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a state-graph source file and report diagnostics
    Compile {
        /// Input file, or `-` to read from stdin
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Parse and report diagnostics only; do not print a graph summary
        #[arg(long)]
        check: bool,
    },
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| anyhow!("failed to read stdin: {e}"))?;
        Ok(buf)
    } else {
        fs::read_to_string(PathBuf::from(input))
            .map_err(|e| anyhow!("failed to read {input}: {e}"))
    }
}

/// Runs the parsed CLI invocation.
pub fn run(cli: Cli) -> Result<()> {
    init_logging(Some(cli.log_level.as_str()), Some(cli.log_format.as_str()))
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))?;

    match cli.command {
        Commands::Compile { input, check } => run_compile(&input, check),
    }
}

fn run_compile(input: &str, check: bool) -> Result<()> {
    let source = read_input(input)?;
    let events = EventService::new();

    match compile(&source, &events) {
        Ok(graph) => {
            tracing::debug!(states = graph.state_count(), "compiled state graph");
            if !check {
                println!(
                    "compiled {} state(s); init = {}, final = {}",
                    graph.state_count(),
                    graph.state_name(graph.init()),
                    graph.state_name(graph.fini()),
                );
                for name in graph.state_names() {
                    println!("  state {name}");
                }
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("{err}");
            Err(anyhow!("compilation failed"))
        }
    }
}
