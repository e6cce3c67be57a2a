//! On-disk settings.
//!
//! `kiln init` writes `.kiln/config.json`; the other commands read it
//! back, falling back to defaults when no config exists yet.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory the config lives in, relative to the project root.
pub const CONFIG_DIR: &str = ".kiln";

/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.json";

/// Things that can go wrong reading or writing the config.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config directory or file could not be written.
    #[error("failed to write config '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON, or the fields have the wrong shapes.
    #[error("config '{path}' is not valid: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Settings for one watched project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder to watch, resolved against the project root when relative.
    pub watch_root: PathBuf,

    /// File extensions that count as source files. Empty means all files.
    pub extensions: Vec<String>,

    /// Whether subdirectories are watched too.
    pub recursive: bool,

    /// Rebuild command and its arguments.
    pub rebuild: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch_root: PathBuf::from("src"),
            extensions: vec!["rs".to_string()],
            recursive: true,
            rebuild: vec!["cargo".to_string(), "check".to_string()],
        }
    }
}

impl Config {
    /// Where the config file lives for a given project root.
    pub fn path_in(project: &Path) -> PathBuf {
        project.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Loads the project config. A missing file is not an error; a
    /// malformed one is, naming the offending path.
    pub fn load(project: &Path) -> Result<Self, ConfigError> {
        let path = Self::path_in(project);
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Malformed { path, source })
    }

    /// Writes the config, creating `.kiln/` if needed. Returns the path
    /// written.
    pub fn save(&self, project: &Path) -> Result<PathBuf, ConfigError> {
        let path = Self::path_in(project);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
                path: path.clone(),
                source,
            })?;
        }

        let raw = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Malformed {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, raw).map_err(|source| ConfigError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// The watch root as an actual location on disk.
    pub fn resolved_root(&self, project: &Path) -> PathBuf {
        if self.watch_root.is_absolute() {
            self.watch_root.clone()
        } else {
            project.join(&self.watch_root)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.watch_root, PathBuf::from("src"));
        assert_eq!(config.extensions, vec!["rs"]);
        assert!(config.recursive);
        assert_eq!(config.rebuild, vec!["cargo", "check"]);
    }

    #[test]
    fn test_missing_config_loads_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.rebuild, Config::default().rebuild);
    }

    #[test]
    fn test_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let config = Config {
            watch_root: PathBuf::from("scripts"),
            extensions: vec!["cs".to_string()],
            recursive: false,
            rebuild: vec!["make".to_string(), "build".to_string()],
        };
        config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.watch_root, PathBuf::from("scripts"));
        assert_eq!(loaded.extensions, vec!["cs"]);
        assert!(!loaded.recursive);
        assert_eq!(loaded.rebuild, vec!["make", "build"]);
    }

    #[test]
    fn test_partial_config_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = Config::path_in(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{ "watch_root": "lib" }"#).unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.watch_root, PathBuf::from("lib"));
        assert_eq!(config.extensions, vec!["rs"]);
    }

    #[test]
    fn test_malformed_config_names_the_path() {
        let dir = tempdir().unwrap();
        let path = Config::path_in(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json at all").unwrap();

        let err = Config::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }));
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn test_relative_watch_root_resolves_against_project() {
        let config = Config::default();
        let resolved = config.resolved_root(Path::new("/work/app"));
        assert_eq!(resolved, PathBuf::from("/work/app/src"));
    }

    #[test]
    fn test_absolute_watch_root_is_kept() {
        let config = Config {
            watch_root: PathBuf::from("/elsewhere/src"),
            ..Default::default()
        };
        let resolved = config.resolved_root(Path::new("/work/app"));
        assert_eq!(resolved, PathBuf::from("/elsewhere/src"));
    }
}
