//! Compiler configuration: JSON file, then CLI overrides.
use std::path::{Path, PathBuf};
use serde::Deserialize;
use thiserror::Error;
use crate::naming::NamingConfig;
use crate::path_de::{from_str_with_path, PathError};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub naming: NamingConfig,
    /// Objects without an explicit extra-property policy reject unknown keys.
    pub strict_objects: bool,
    /// Lower independent schemas on the rayon pool.
    pub parallel: bool,
    /// `format: date | date-time` strings load as the `date` primitive.
    pub dates: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid config file {}: {source}", path.display())]
    Invalid { path: PathBuf, source: PathError },
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            naming: NamingConfig::default(),
            strict_objects: false,
            parallel: true,
            dates: false,
        }
    }
}

impl CompilerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let src = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        from_str_with_path(&src)
            .map_err(|source| ConfigError::Invalid { path: path.to_path_buf(), source })
    }
}
