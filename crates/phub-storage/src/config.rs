use std::path::{Path, PathBuf};

use anyhow::Context;
use phub_core::{PerSource, SourceTag};
use serde::Deserialize;
use tokio::fs;
use tracing::debug;

pub const DATA_ROOT_CANDIDATES: [&str; 2] = ["./data/Propery_Hub_JSON", "/workspace/data/Propery_Hub_JSON"];
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_SOURCES_FILE: &str = "sources.yaml";

#[derive(Debug, Clone)]
pub struct HubConfig {
    pub data_root: PathBuf,
    pub port: u16,
    pub sources_file: PathBuf,
}

impl HubConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same resolution as [`HubConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_root = lookup("DATA_ROOT")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| resolve_data_root(&DATA_ROOT_CANDIDATES));
        let port = lookup("PHUB_PORT")
            .or_else(|| lookup("PORT"))
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let sources_file = lookup("PHUB_SOURCES_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCES_FILE));
        Self {
            data_root,
            port,
            sources_file,
        }
    }
}

/// First candidate that exists on disk, else the first candidate.
pub fn resolve_data_root(candidates: &[&str]) -> PathBuf {
    candidates
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_dir())
        .or_else(|| candidates.first().map(PathBuf::from))
        .unwrap_or_default()
}

/// Per-source sub-directory names inside a property directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceLayout {
    pub directories: PerSource<String>,
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            directories: PerSource {
                primary: "Yanolja".to_string(),
                secondary_a: "A".to_string(),
                secondary_b: "Y".to_string(),
            },
        }
    }
}

impl SourceLayout {
    pub fn directory(&self, tag: SourceTag) -> &str {
        self.directories.get(tag)
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(text).context("parsing source layout")
    }

    /// Built-in defaults when `path` does not exist.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        if !fs::try_exists(path)
            .await
            .with_context(|| format!("checking {}", path.display()))?
        {
            debug!(path = %path.display(), "no source layout file; using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing {}", path.display()))
    }
}
