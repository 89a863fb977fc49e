mod cli;

use anyhow::{bail, Context};
use clap::Parser;
use cli::{Cli, Commands};
use std::fs;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use wcc_core::{loader, transform, SourceLayout};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut layout = match &cli.config {
        Some(path) => SourceLayout::load(path)?,
        None => SourceLayout::default(),
    };
    if let Some(dir) = cli.package_dir {
        layout = layout.with_package_dir(dir);
    }

    let tokens = wcc_core::generate(&layout).with_context(|| {
        format!(
            "failed to read upstream styles from {}",
            layout.package_dir.display()
        )
    })?;

    match cli.command {
        Commands::Tokens { out } => {
            let json = wcc_core::tokens::to_json(&tokens)?;
            match out {
                Some(path) => fs::write(&path, json)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{}", json),
            }
        }
        Commands::Build { specs, root } => {
            let specs = if specs.is_empty() {
                loader::discover_transformations(&root)?
            } else {
                specs
            };
            if specs.is_empty() {
                tracing::warn!("no transformation specs found under {}", root.display());
            }

            let report = transform::build_stylesheets(&specs, &tokens);
            for built in &report.built {
                println!("{}", built.host.display());
                println!("{}", built.root.display());
            }
            if !report.is_success() {
                bail!(
                    "{} of {} transformation files failed",
                    report.failed.len(),
                    specs.len()
                );
            }
        }
    }
    Ok(())
}

