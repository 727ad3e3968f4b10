use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::{DistillError, DistillResult};
use crate::filters::compile_patterns;

/// Default number of log files read in parallel
pub const DEFAULT_PARALLEL: usize = 10;
/// Default maximum line length, some piuparts logs carry multi-megabyte progress lines
pub const DEFAULT_MAX_LINE_LEN: usize = 5 * 1024 * 1024;
/// Default suffix of candidate log files
pub const DEFAULT_LOG_SUFFIX: &str = ".log";

/// Configuration for a distill run.
///
/// # Configuration Locations
///
/// The configuration can be loaded from multiple locations in order of precedence:
/// 1. Custom config file specified via `--config` flag
/// 2. Local `.linkdistill.yaml` in the current directory
/// 3. Global `$HOME/.config/linkdistill/config.yaml`
///
/// # Configuration Format
///
/// ```yaml
/// # Directory containing piuparts logfiles
/// logs_dir: "/srv/piuparts.debian.org/htdocs"
///
/// # Where to write the gzip-compressed, JSON-encoded links
/// output: "/srv/manpages/piuparts-links.json.gz"
///
/// # Number of logfiles to read in parallel
/// parallel: 10
///
/// # Only files ending in this suffix are read
/// log_suffix: ".log"
///
/// # Lines longer than this many bytes fail the file
/// max_line_len: 5242880
///
/// # Candidates to skip (glob syntax)
/// ignore_patterns:
///   - "**/reserved/**"
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
///
/// Command-line values take precedence over config file values, see
/// [`DistillConfig::merge_with_cli`]. `output` and `logs_dir` have no default;
/// [`DistillConfig::validate`] rejects a configuration missing either.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DistillConfig {
    /// Root of the directory tree containing log files
    pub logs_dir: Option<PathBuf>,

    /// Destination of the compressed result
    pub output: Option<PathBuf>,

    /// Number of worker threads reading files
    pub parallel: NonZeroUsize,

    /// File name suffix of candidate log files
    pub log_suffix: String,

    /// Maximum accepted line length in bytes, excluding the line terminator
    pub max_line_len: usize,

    /// Patterns to ignore (glob syntax, matched against the walked path)
    pub ignore_patterns: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Values given on the command line; `None` keeps the file value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub logs_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub parallel: Option<NonZeroUsize>,
    pub log_suffix: Option<String>,
    pub max_line_len: Option<usize>,
    pub ignore_patterns: Vec<String>,
    pub log_level: Option<String>,
}

fn default_parallel() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_PARALLEL).unwrap_or(NonZeroUsize::MIN)
}

impl Default for DistillConfig {
    fn default() -> Self {
        Self {
            logs_dir: None,
            output: None,
            parallel: default_parallel(),
            log_suffix: DEFAULT_LOG_SUFFIX.to_string(),
            max_line_len: DEFAULT_MAX_LINE_LEN,
            ignore_patterns: Vec::new(),
            log_level: "info".to_string(),
        }
    }
}

impl DistillConfig {
    /// Creates a configuration for the given input tree and destination
    pub fn new(logs_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            logs_dir: Some(logs_dir.into()),
            output: Some(output.into()),
            ..Default::default()
        }
    }

    /// Loads configuration from the default locations plus a specific file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            // Global config
            dirs::config_dir().map(|p| p.join("linkdistill/config.yaml")),
            // Local config
            Some(PathBuf::from(".linkdistill.yaml")),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicit file must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.build()?.try_deserialize()
    }

    /// Merges command-line values over configuration file values
    pub fn merge_with_cli(mut self, cli: ConfigOverrides) -> Self {
        if let Some(logs_dir) = cli.logs_dir {
            self.logs_dir = Some(logs_dir);
        }
        if let Some(output) = cli.output {
            self.output = Some(output);
        }
        if let Some(parallel) = cli.parallel {
            self.parallel = parallel;
        }
        if let Some(suffix) = cli.log_suffix {
            self.log_suffix = suffix;
        }
        if let Some(max_line_len) = cli.max_line_len {
            self.max_line_len = max_line_len;
        }
        if !cli.ignore_patterns.is_empty() {
            self.ignore_patterns = cli.ignore_patterns;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        self
    }

    /// The destination path, required for every run
    pub fn output_path(&self) -> DistillResult<&Path> {
        self.output
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| DistillError::config_error("output must be specified"))
    }

    /// The input tree root, required for every run
    pub fn logs_root(&self) -> DistillResult<&Path> {
        self.logs_dir
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| DistillError::config_error("logs_dir must be specified"))
    }

    /// Checks everything a run needs before any work is started
    pub fn validate(&self) -> DistillResult<()> {
        self.output_path()?;
        self.logs_root()?;
        if self.max_line_len == 0 {
            return Err(DistillError::config_error(
                "max_line_len must be greater than zero",
            ));
        }
        if self.log_suffix.is_empty() {
            return Err(DistillError::config_error("log_suffix must not be empty"));
        }
        compile_patterns(&self.ignore_patterns)
            .map_err(|e| DistillError::config_error(format!("invalid ignore pattern: {}", e)))?;
        Ok(())
    }
}
