use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::{Cli, DEFAULT_PATTERN};

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "KDRIFT_CONFIG_DIR";

/// Get the kdrift config directory path
///
/// Priority:
/// 1. `KDRIFT_CONFIG_DIR` env var
/// 2. `XDG_CONFIG_HOME/kdrift`
/// 3. `~/.config/kdrift`
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        log::debug!("Using config dir from {}: {}", ENV_CONFIG_DIR, dir);
        return Ok(PathBuf::from(dir));
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("kdrift"));
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("kdrift"))
}

// ============================================================================
// Config File
// ============================================================================

/// Optional defaults read from `config.toml`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Comma-separated glob patterns
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub jobs: Option<usize>,
    #[serde(default)]
    pub strict: Option<bool>,
    /// Per-request API timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Load the config file.
    ///
    /// An explicit path must exist. The default location is optional and
    /// yields an empty config when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (config_dir()?.join("config.toml"), false),
        };

        if !path.exists() {
            if required {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Invalid TOML format in config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

// ============================================================================
// Resolved Settings
// ============================================================================

/// Effective settings for a run: CLI (and env) over config file over defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub dir: PathBuf,
    pub pattern: String,
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub jobs: usize,
    pub strict: bool,
    pub timeout: Option<Duration>,
}

impl Settings {
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self> {
        let jobs = cli.jobs.or(file.jobs).unwrap_or(1);
        if jobs == 0 {
            anyhow::bail!("--jobs must be at least 1");
        }

        Ok(Self {
            dir: cli.dir.clone(),
            pattern: cli
                .pattern
                .clone()
                .or(file.pattern)
                .unwrap_or_else(|| DEFAULT_PATTERN.to_string()),
            kubeconfig: cli.kubeconfig.clone().or(file.kubeconfig),
            context: cli.context.clone().or(file.context),
            jobs,
            strict: cli.strict || file.strict.unwrap_or(false),
            timeout: file.timeout_secs.map(Duration::from_secs),
        })
    }

    pub fn connect_options(&self) -> driftkit::ConnectOptions {
        driftkit::ConnectOptions {
            kubeconfig: self.kubeconfig.clone(),
            context: self.context.clone(),
            timeout: self.timeout,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
