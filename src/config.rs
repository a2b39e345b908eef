use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::engine::Timing;
use crate::store::DEFAULT_SESSION_KEY;

pub const CONFIG_FILE: &str = "crypto-escape.toml";
pub const CONFIG_ENV: &str = "CRYPTO_ESCAPE_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    pub catalog_dir: PathBuf,
    pub save_dir: PathBuf,
    pub session_key: String,
    pub solved_clear_ms: u64,
    pub feedback_clear_ms: u64,
    pub log_file: PathBuf,
    pub log_filter: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            catalog_dir: PathBuf::from("puzzles/crypto_escape"),
            save_dir: PathBuf::from(".crypto-escape"),
            session_key: DEFAULT_SESSION_KEY.to_string(),
            solved_clear_ms: 2000,
            feedback_clear_ms: 3000,
            log_file: PathBuf::from(".crypto-escape/crypto-escape.log"),
            log_filter: "info".to_string(),
        }
    }
}

impl GameConfig {
    /// Reads the file named by `CRYPTO_ESCAPE_CONFIG`, else
    /// `crypto-escape.toml` in the working directory. A missing default file
    /// means defaults; a missing file named by the variable is an error.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => {
                let path = Path::new(CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn timing(&self) -> Timing {
        Timing {
            solved_clear: Duration::from_millis(self.solved_clear_ms),
            feedback_clear: Duration::from_millis(self.feedback_clear_ms),
        }
    }
}
