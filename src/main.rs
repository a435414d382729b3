mod check;
mod cli;
mod config;
mod discover;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use config::{FileConfig, Settings};
use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            ui::error(&format!("{e:#}"));
            ExitCode::from(check::EXIT_CONFIG_ERROR)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let file_config = FileConfig::load(cli.config.as_deref())?;
    let settings = Settings::resolve(cli, file_config)?;
    log::debug!("Effective settings: {settings:?}");

    let connect = || {
        let backend = driftkit::KubeBackend::connect(&settings.connect_options())
            .context("Failed to create Kubernetes client")?;
        log::debug!("Using cluster {}", backend.cluster_identifier());
        Ok(driftkit::Client::with_backend(Box::new(backend)))
    };

    let mut stdout = io::stdout();
    let summary = check::run(&settings, connect, &mut stdout)?;
    stdout.flush().context("Failed to flush output")?;

    Ok(match summary {
        Some(summary) => summary.exit_code(settings.strict),
        None => ExitCode::SUCCESS,
    })
}

/// Log lines go to stdout alongside the report. Plain messages by default;
/// `--verbose` adds a timestamp and the source location.
fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Stdout)
        .parse_default_env();

    if verbose {
        builder.filter_module("kdrift", log::LevelFilter::Debug);
        builder.format(|buf, record| {
            writeln!(
                buf,
                "{} {}:{}: {}",
                buf.timestamp_seconds(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        });
    } else {
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    }

    builder.init();
}
