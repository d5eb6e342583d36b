//! Per-project settings loaded from `paignion.toml`.
//!
//! The file is optional. When it is absent every setting keeps its default,
//! which matches the Markdown dialect Paignion has always used.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::markdown::MarkdownOptions;

/// File name looked up in the project root.
pub const CONFIG_FILE: &str = "paignion.toml";

/// Settings for one project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Markdown extensions used for bodies, descriptions and `m"..."` literals
    pub markdown: MarkdownOptions,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ProjectConfig {
    /// Load `paignion.toml` from `project_dir`, or defaults if it is missing.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file exists but cannot be read or decoded.
    pub fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        let path = project_dir.join(CONFIG_FILE);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("no {CONFIG_FILE} in {}, using default settings", project_dir.display());
                return Ok(Self::default());
            },
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        let config = Self::from_toml(&text).map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
        info!("loaded settings from {}", path.display());
        Ok(config)
    }

    /// Decode settings from TOML text.
    ///
    /// # Errors
    /// Returns the decoder error for malformed TOML or unknown keys.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
