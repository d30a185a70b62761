use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONFIG_DIR_NAME: &str = "lorekeep";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("could not write config {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub log_json: bool,
    pub title_commit_delay_ms: u64,
    pub autosave_words: bool,
    pub word_autosave_delay_ms: u64,
    pub search_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
            title_commit_delay_ms: 400,
            autosave_words: true,
            word_autosave_delay_ms: 1500,
            search_delay_ms: 250,
        }
    }
}

/// Same shape as [`Config`] but every field optional, so a file only
/// overrides what it mentions.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigLayer {
    log_level: Option<String>,
    log_json: Option<bool>,
    title_commit_delay_ms: Option<u64>,
    autosave_words: Option<bool>,
    word_autosave_delay_ms: Option<u64>,
    search_delay_ms: Option<u64>,
}

impl Config {
    /// Defaults, then the user config file, then `explicit` if given.
    ///
    /// A missing file is skipped; a file that exists but does not parse is an error.
    pub fn load_hierarchy(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        if let Some(user_path) = Self::user_config_path()
            && let Some(layer) = Self::read_layer(&user_path)?
        {
            config.merge(layer);
        }
        if let Some(path) = explicit
            && let Some(layer) = Self::read_layer(path)?
        {
            config.merge(layer);
        }
        Ok(config)
    }

    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        if let Some(layer) = Self::read_layer(path)? {
            config.merge(layer);
        }
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn title_commit_delay(&self) -> Duration {
        Duration::from_millis(self.title_commit_delay_ms)
    }

    pub fn word_autosave_delay(&self) -> Duration {
        Duration::from_millis(self.word_autosave_delay_ms)
    }

    pub fn search_delay(&self) -> Duration {
        Duration::from_millis(self.search_delay_ms)
    }

    fn read_layer(path: &Path) -> Result<Option<ConfigLayer>, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    fn merge(&mut self, layer: ConfigLayer) {
        if let Some(log_level) = layer.log_level {
            self.log_level = log_level;
        }
        if let Some(log_json) = layer.log_json {
            self.log_json = log_json;
        }
        if let Some(delay) = layer.title_commit_delay_ms {
            self.title_commit_delay_ms = delay;
        }
        if let Some(autosave) = layer.autosave_words {
            self.autosave_words = autosave;
        }
        if let Some(delay) = layer.word_autosave_delay_ms {
            self.word_autosave_delay_ms = delay;
        }
        if let Some(delay) = layer.search_delay_ms {
            self.search_delay_ms = delay;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "title_commit_delay_ms = 50\nautosave_words = false\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.title_commit_delay_ms, 50);
        assert!(!config.autosave_words);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.search_delay_ms, 250);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "autosave_words = \"sometimes\"").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            word_autosave_delay_ms: 900,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }
}
