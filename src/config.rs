//! Runtime configuration loaded from JSON.

use crate::digitizer::DigitizerParams;
use crate::error::DigitizeError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OutputConfig {
    pub json_out: Option<PathBuf>,
    pub debug_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RuntimeConfig {
    pub input_path: PathBuf,
    #[serde(default)]
    pub output: OutputConfig,
    pub digitizer: DigitizerParams,
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig, DigitizeError> {
    let contents = fs::read_to_string(path).map_err(|source| DigitizeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: RuntimeConfig = serde_json::from_str(&contents)
        .map_err(|e| DigitizeError::InvalidConfig(format!("parse {}: {e}", path.display())))?;
    config.digitizer.validate()?;
    Ok(config)
}
