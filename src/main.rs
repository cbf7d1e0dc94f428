// src/main.rs

mod cli;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use cli::Cli;
use dylib_relocate::{ConfigFile, RelocateConfig, Relocator, XcodeTools, default_output_dir};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Exit status for a usage error, matching clap's own
const USAGE_EXIT: u8 = 2;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_target(false)
        .init();
}

/// Build the run configuration: defaults, then config file, then flags
fn build_config(cli: &Cli, prefix: &str) -> Result<RelocateConfig> {
    let file = match &cli.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };

    let mut config =
        RelocateConfig::layered(prefix, file, cli.output_dir.clone(), default_output_dir)
            .context("Failed to determine output directory")?;

    if let Some(otool) = &cli.otool {
        config = config.with_otool(otool);
    }
    if let Some(tool) = &cli.install_name_tool {
        config = config.with_install_name_tool(tool);
    }

    Ok(config)
}

fn run(cli: &Cli, prefix: &str, libraries: &[PathBuf]) -> Result<usize> {
    let config = build_config(cli, prefix)?;
    let tools = XcodeTools::locate(
        config.tools.otool.as_deref(),
        config.tools.install_name_tool.as_deref(),
    )?;

    info!(
        "Relocating {} libraries from {} into {}",
        libraries.len(),
        config.prefix,
        config.output_dir.display()
    );

    let report = Relocator::new(&config, &tools)
        .run(libraries)
        .context("Relocation failed")?;
    Ok(report.fix_count)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Checked before anything else so a short invocation never touches the
    // output directory
    let Some((prefix, libraries)) = cli.positional() else {
        eprintln!("{}", Cli::command().render_long_help());
        return ExitCode::from(USAGE_EXIT);
    };

    init_tracing(cli.verbose);

    match run(&cli, prefix, libraries) {
        Ok(fix_count) => {
            println!("Total {}", fix_count);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
