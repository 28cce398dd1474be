//! Command line runner for `bdd-harness` feature suites.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use bdd_harness::{Config, DefaultTemplate, Harness, InMemorySources, RunResult};
use clap::{Parser, Subcommand};
use eyre::Result;

/// Discover, execute, and report on Gherkin feature suites.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Directory walked recursively for feature documents.
    #[arg(long, default_value = "features")]
    features_root: PathBuf,
    /// Directory receiving HTML and JUnit report files.
    #[arg(long, default_value = "test-result/bdd")]
    results_root: PathBuf,
    /// Fail a feature outright when a report sink cannot be written.
    #[arg(long)]
    strict_formatters: bool,
    #[command(subcommand)]
    command: Commands,
}

/// Supported commands.
#[derive(Subcommand)]
enum Commands {
    /// Run one feature by URI, or every discovered feature when omitted.
    Run {
        /// `/`-separated feature path relative to the features root.
        uri: Option<String>,
    },
    /// List the URIs of all discovered features.
    List,
}

fn exit_for(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = Config::new(cli.features_root, cli.results_root);
    if cli.strict_formatters {
        config.strict_formatters = true;
    }
    let sources = InMemorySources::new();
    let harness = Harness::new(config, &sources, &DefaultTemplate);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::List => {
            for feature in harness.load_features()? {
                writeln!(out, "{}", feature.uri())?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run { uri: Some(uri) } => {
            let result = harness.run_feature_with(&uri, &mut out)?;
            writeln!(out, "{} : {}", result.feature().uri(), result.status_label())?;
            Ok(exit_for(result.passed()))
        }
        Commands::Run { uri: None } => {
            let results = harness.run_all_features(&mut out)?;
            Ok(exit_for(results.iter().all(RunResult::passed)))
        }
    }
}
