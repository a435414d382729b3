use clap::Parser;
use std::path::PathBuf;

/// Default glob patterns for manifest discovery
pub const DEFAULT_PATTERN: &str = "*secret*.yaml,*secret*.yml,*config*.yaml,*config*.yml";

#[derive(Parser, Debug)]
#[command(name = "kdrift")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(
    about = "Compare local Secret/ConfigMap manifests against the objects deployed in a cluster",
    long_about = None
)]
pub struct Cli {
    /// Directory to scan for config and secret YAML files
    #[arg(long, env = "KDRIFT_DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Comma-separated glob patterns to identify secret & config YAML files
    /// [default: *secret*.yaml,*secret*.yml,*config*.yaml,*config*.yml]
    #[arg(long, env = "KDRIFT_PATTERN")]
    pub pattern: Option<String>,

    /// Enable verbose logging (timestamps and source locations)
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to the kubeconfig file
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use instead of the current one
    #[arg(long)]
    pub context: Option<String>,

    /// Number of resources to look up in parallel
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Treat failures to fetch a deployed resource as a failed run
    #[arg(long)]
    pub strict: bool,

    /// Config file (default: ~/.config/kdrift/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
