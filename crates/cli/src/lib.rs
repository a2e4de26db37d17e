pub mod commands;
pub mod logging;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use salesai_core::config::{AppConfig, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "salesai",
    about = "SalesAI customer segmentation CLI",
    long_about = "Classify customer sales exports into sales tiers, BCG quadrants and lifecycle stages, and summarize a portfolio.",
    after_help = "Examples:\n  salesai classify --input customers.csv --manager 김영업\n  salesai stats --input customers.json\n  salesai config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a salesai.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Classify every customer in an export and return profiles with comments")]
    Classify(commands::classify::ClassifyArgs),
    #[command(about = "Summarize segment counts, average potential and at-risk customers")]
    Stats(commands::stats::StatsArgs),
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    // Config errors surface through the command envelope; only logging needs it here.
    let options = LoadOptions {
        config_path: cli.config.clone(),
        require_file: cli.config.is_some(),
        ..LoadOptions::default()
    };
    if let Ok(config) = AppConfig::load(options) {
        logging::init(&config.logging);
    }

    let result = match &cli.command {
        Command::Classify(args) => commands::classify::run(config_path, args),
        Command::Stats(args) => commands::stats::run(config_path, args),
        Command::Config => commands::config::run(config_path),
    };

    if let Err(error) = write_output(&result.output) {
        eprintln!("salesai: {error:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::from(result.exit_code)
}

fn write_output(output: &str) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{output}").context("failed to write command output")?;
    stdout.flush().context("failed to flush command output")
}
