//! The comparison run: discover files, load, check each resource, report.

use anyhow::{Context, Result};
use driftkit::{CheckOutcome, Client, LocalResource, Verdict, loader, report};
use rayon::prelude::*;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use crate::config::Settings;
use crate::discover;

/// Exit status when differences were found (or fetches failed in strict mode).
pub const EXIT_DIFFERENCES: u8 = 1;
/// Exit status when the run could not be performed at all.
pub const EXIT_CONFIG_ERROR: u8 = 2;

/// Tally of a completed run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub verdict: Verdict,
    pub files: usize,
    pub unreadable_files: usize,
    pub rejected: usize,
    pub empty_documents: usize,
    pub compared: usize,
    pub not_found: usize,
    pub fetch_failures: usize,
}

impl RunSummary {
    /// Whether the run should fail.
    pub fn failed(&self, strict: bool) -> bool {
        self.verdict.has_differences() || (strict && self.fetch_failures > 0)
    }

    pub fn exit_code(&self, strict: bool) -> ExitCode {
        if self.failed(strict) {
            ExitCode::from(EXIT_DIFFERENCES)
        } else {
            ExitCode::SUCCESS
        }
    }

    /// One-line tally for debug output.
    pub fn tally(&self) -> String {
        format!(
            "Read {} file(s) ({} unreadable): {} compared, {} not found, {} fetch failure(s), \
             {} document(s) rejected, {} empty",
            self.files,
            self.unreadable_files,
            self.compared,
            self.not_found,
            self.fetch_failures,
            self.rejected,
            self.empty_documents
        )
    }

    /// Fold one resource outcome into the run, writing its report to `out`.
    fn record(
        &mut self,
        resource: &LocalResource,
        outcome: CheckOutcome,
        out: &mut dyn Write,
    ) -> Result<()> {
        let kind = resource.kind();
        let name = resource.name();
        let namespace = resource.namespace();

        match outcome {
            CheckOutcome::Compared(differences) => {
                let rendered = report::render(resource, &differences);
                out.write_all(rendered.text.as_bytes())
                    .context("Failed to write report")?;
                self.verdict = self.verdict.fold(rendered.verdict);
                self.compared += 1;
            }
            CheckOutcome::NotFound => {
                log::warn!("Deployed {kind} '{name}' in namespace '{namespace}' not found.");
                self.not_found += 1;
            }
            CheckOutcome::FetchFailed(err) => {
                log::error!(
                    "Error retrieving deployed {kind} '{name}' in namespace '{namespace}': {err}"
                );
                log::debug!("Failure category: {}", err.category().description());
                self.fetch_failures += 1;
            }
        }
        Ok(())
    }
}

/// Run a full comparison.
///
/// Returns `Ok(None)` when no manifest files were found; the cluster is not
/// contacted in that case. Any `Err` is a configuration error.
pub fn run<F>(settings: &Settings, connect: F, out: &mut dyn Write) -> Result<Option<RunSummary>>
where
    F: FnOnce() -> Result<Client>,
{
    let files = discover::find_files(&settings.dir, &settings.pattern)?;
    if files.is_empty() {
        log::info!("No YAML files matching the specified patterns were found in the directory.");
        return Ok(None);
    }
    log::debug!("Found {} manifest file(s)", files.len());

    let client = connect()?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.jobs)
        .build()
        .context("Failed to create worker pool")?;

    let mut summary = RunSummary::default();

    for file in &files {
        summary.files += 1;
        let display = display_name(file);
        log::info!("Processing file: {display}");

        let loaded = match loader::load_file(file) {
            Ok(loaded) => loaded,
            Err(e) => {
                log::error!("Error parsing YAML file '{display}': {e}");
                summary.unreadable_files += 1;
                continue;
            }
        };

        for rejection in &loaded.rejections {
            log::warn!("{rejection} in file '{display}'");
        }
        summary.rejected += loaded.rejections.len();
        summary.empty_documents += loaded.empty_documents;

        // Lookups may run concurrently; outcomes keep document order.
        let outcomes: Vec<CheckOutcome> = if settings.jobs > 1 {
            pool.install(|| {
                loaded
                    .resources
                    .par_iter()
                    .map(|resource| client.check(resource))
                    .collect()
            })
        } else {
            loaded
                .resources
                .iter()
                .map(|resource| client.check(resource))
                .collect()
        };

        for (resource, outcome) in loaded.resources.iter().zip(outcomes) {
            summary.record(resource, outcome, out)?;
        }
    }

    log::debug!("{}", summary.tally());

    if settings.strict && summary.fetch_failures > 0 {
        log::error!(
            "{} resource(s) could not be fetched; failing because strict mode is enabled",
            summary.fetch_failures
        );
    }

    writeln!(out, "{}", report::summary_line(summary.verdict))
        .context("Failed to write summary")?;

    Ok(Some(summary))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Tests
// ============================================================================
