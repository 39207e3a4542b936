//! Hack VM Translator Driver
//!
//! Reads a `.vm` file or a directory of them and writes one `.asm` file.

mod config;
mod sources;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::info;
use std::fs;
use std::path::PathBuf;
use vmt_backend::{translate_program, BootstrapPolicy};

#[derive(Parser)]
#[command(name = "vmt")]
#[command(about = "Hack VM Translator")]
#[command(version = "0.1.0")]
struct Cli {
    /// A .vm file or a directory containing .vm files
    source: PathBuf,

    /// Output assembly file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file with translation options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Omit the source comment before each command's instructions
    #[arg(long)]
    no_comments: bool,

    /// When to emit the bootstrap prefix (auto, always, never)
    #[arg(long, value_name = "POLICY")]
    bootstrap: Option<BootstrapPolicy>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// RUST_LOG wins over the -v count
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: &Cli) -> Result<()> {
    let mut options = config::load_options(cli.config.as_deref())?;
    config::apply_overrides(&mut options, cli.no_comments, cli.bootstrap);

    let files = sources::discover(&cli.source)?;
    let units = sources::read_units(&files)?;
    let program = translate_program(&units, options)
        .with_context(|| format!("failed to translate {}", cli.source.display()))?;

    let output = match &cli.output {
        Some(path) => path.clone(),
        None => sources::default_output(&cli.source)?,
    };
    fs::write(&output, program.to_asm())
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(
        "Wrote {} ({} instructions)",
        output.display(),
        program.executable_len()
    );
    Ok(())
}
