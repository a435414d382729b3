//! Manifest file discovery.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Split a comma-separated pattern list and anchor each entry at `dir`.
///
/// Entries are trimmed and empty entries dropped. Glob metacharacters in
/// `dir` itself are escaped so only the pattern part is matched.
pub fn parse_patterns(pattern: &str, dir: &Path) -> Vec<String> {
    let base = glob::Pattern::escape(&dir.to_string_lossy());
    pattern
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| Path::new(&base).join(p).to_string_lossy().into_owned())
        .collect()
}

/// Find manifest files under `dir` matching any of the patterns.
///
/// Files are returned in pattern order (alphabetical within a pattern), and a
/// file matched by several patterns is returned once.
pub fn find_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let meta = std::fs::metadata(dir)
        .with_context(|| format!("Cannot read scan directory: {}", dir.display()))?;
    if !meta.is_dir() {
        anyhow::bail!("Scan path is not a directory: {}", dir.display());
    }

    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for full_pattern in parse_patterns(pattern, dir) {
        let entries = glob::glob(&full_pattern)
            .with_context(|| format!("Error processing pattern '{full_pattern}'"))?;

        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => {
                    if seen.insert(path.clone()) {
                        files.push(path);
                    }
                }
                Ok(_) => {}
                Err(e) => log::debug!("Skipping unreadable path: {e}"),
            }
        }
    }

    Ok(files)
}
