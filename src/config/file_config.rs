use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tracing::debug;

use crate::{Result, api::deserialize::MalformedPolicy};

pub fn read_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: FileConfig = serde_yml::from_str(&contents)
        .with_context(|| "Could not parse config (There is most likely an error in the config)")?;
    debug!("Read config: {:?}", config);
    Ok(config)
}

/// Everything that may be preset in the yaml config
///
/// Every key is optional, command line arguments take precedence.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    pub wstoken: Option<String>,
    pub course_id: Option<u64>,
    pub save_path: Option<PathBuf>,
    /// Replaces the default list of downloaded file endings
    pub file_extensions: Option<Vec<String>>,
    pub parallel_downloads: Option<usize>,
    pub assignments: Option<bool>,
    pub on_malformed: Option<MalformedPolicy>,
    pub log_file: Option<PathBuf>,
}
