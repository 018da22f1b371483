//! Scan configuration: CLI flags merged over an optional `scopemap.toml`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "scopemap.toml";

/// Fully resolved configuration for one scan.
#[derive(Clone, Debug)]
pub struct ScanConfig {
    /// Root directory of the walk.
    pub root: PathBuf,
    /// Relative subpaths excluded from the walk.
    pub skip: Vec<PathBuf>,
    /// Extra prefixes stripped when deriving module names.
    pub extra_search_paths: Vec<PathBuf>,
    pub parallel: bool,
    /// Worker threads; 0 means all cores.
    pub jobs: usize,
}

impl ScanConfig {
    /// Prefix list for module-name derivation; the scanned root always
    /// comes first.
    pub fn search_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.root.clone()];
        paths.extend(self.extra_search_paths.iter().cloned());
        paths
    }
}

/// On-disk configuration shape.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub scan: ScanSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScanSection {
    #[serde(default)]
    pub skip: Vec<PathBuf>,
    #[serde(default, rename = "search-paths")]
    pub search_paths: Vec<PathBuf>,
}

/// Load the config file. An explicitly named file must exist; the
/// auto-discovered `scopemap.toml` in the scanned root is optional.
pub fn load_file_config(explicit: Option<&Path>, root: &Path) -> Result<FileConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let candidate = root.join(CONFIG_FILE_NAME);
            candidate.is_file().then_some(candidate)
        }
    };

    match path {
        Some(path) => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("parsing config file {}", path.display()))
        }
        None => Ok(FileConfig::default()),
    }
}
