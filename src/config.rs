//! Configuration file schema.
//!
//! A YAML file in the scan root (`.codecontext.yaml` or `codecontext.yaml`)
//! or given with `--config`. Every field is optional.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::project::ExtractOptions;

/// File names searched in the scan root, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &[".codecontext.yaml", "codecontext.yaml"];

pub const DEFAULT_OUTPUT_PATH: &str = "AI_CONTEXT.md";
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
    Both,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Both => write!(f, "both"),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Keep interfaces and type aliases in the output.
    #[serde(default = "default_true")]
    pub include_types: bool,
    /// Keep import records in the output.
    #[serde(default = "default_true")]
    pub include_imports: bool,
    /// Output file, relative to the scan root unless absolute.
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default)]
    pub output_format: OutputFormat,
    /// Glob patterns matched against paths relative to the scan root
    /// (e.g. "**/generated/**", "legacy/*.js").
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Files larger than this many bytes are skipped.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            include_types: true,
            include_imports: true,
            output_path: default_output_path(),
            output_format: OutputFormat::default(),
            exclude: Vec::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            project_name: None,
        }
    }
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parse a config from YAML text. Empty text gives the defaults.
    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Find a config file in `root`.
    pub fn discover(root: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file())
    }

    /// Load the explicit config, else a discovered one, else the defaults.
    pub fn load(root: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit.map(Path::to_path_buf).or_else(|| Self::discover(root)) {
            Some(path) => {
                tracing::info!(config = %path.display(), "loading config");
                Self::parse_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Reject settings that would make a run meaningless.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_file_size == 0 {
            anyhow::bail!("max_file_size must be greater than zero");
        }
        if self.output_path.trim().is_empty() {
            anyhow::bail!("output_path must not be empty");
        }
        self.exclude_set()?;
        Ok(())
    }

    /// Compile the exclude patterns.
    pub fn exclude_set(&self) -> anyhow::Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude {
            let glob = Glob::new(pattern)
                .with_context(|| format!("invalid exclude pattern {:?}", pattern))?;
            builder.add(glob);
        }
        Ok(builder.build()?)
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            include_types: self.include_types,
            include_imports: self.include_imports,
        }
    }

    /// Files to write, resolved against `root`. `both` writes the Markdown
    /// file plus a `.json` sibling.
    pub fn output_targets(&self, root: &Path) -> Vec<(OutputFormat, PathBuf)> {
        let base = root.join(&self.output_path);
        match self.output_format {
            OutputFormat::Markdown => vec![(OutputFormat::Markdown, base)],
            OutputFormat::Json => vec![(OutputFormat::Json, base.with_extension("json"))],
            OutputFormat::Both => vec![
                (OutputFormat::Markdown, base.clone()),
                (OutputFormat::Json, base.with_extension("json")),
            ],
        }
    }

    /// YAML written by `init`.
    pub fn default_yaml() -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(&Self::default())?)
    }
}
