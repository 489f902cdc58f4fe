use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Store-wide configuration, loadable from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub resources: ResourceConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            retention: RetentionConfig::default(),
            resources: ResourceConfig::default(),
        }
    }
}

/// How long trashed notes are kept before the sweeper purges them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    #[serde(default = "default_retention_days")]
    pub days: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            days: default_retention_days(),
        }
    }
}

/// Where resource files live relative to the profile directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    #[serde(default = "default_resource_dir_name")]
    pub dir_name: String,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            dir_name: default_resource_dir_name(),
        }
    }
}

const fn default_retention_days() -> u32 {
    7
}

fn default_resource_dir_name() -> String {
    "resources".to_string()
}

impl StoreConfig {
    /// Load configuration from a TOML file, falling back to defaults
    /// when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::StoreConfig;

    #[test]
    fn defaults_when_missing() {
        let config = StoreConfig::load(std::path::Path::new("/nonexistent/quill.toml"))
            .expect("load defaults");
        assert_eq!(config.retention.days, 7);
        assert_eq!(config.resources.dir_name, "resources");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("quill.toml");
        std::fs::write(&path, "[retention]\ndays = 30\n").expect("write config");

        let config = StoreConfig::load(&path).expect("load config");
        assert_eq!(config.retention.days, 30);
        assert_eq!(config.resources.dir_name, "resources");
    }

    #[test]
    fn rejects_malformed_toml() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("quill.toml");
        std::fs::write(&path, "retention = [").expect("write config");

        assert!(StoreConfig::load(&path).is_err());
    }
}
