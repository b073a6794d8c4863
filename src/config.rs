use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::agent::DEFAULT_ENDPOINT;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub endpoint: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    #[allow(dead_code)]
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Agent base URL: `IMPACTAI_ENDPOINT` env var wins, then the config
    /// file, then the built-in default.
    pub fn resolve_endpoint(&self) -> String {
        self.resolve_endpoint_with(std::env::var("IMPACTAI_ENDPOINT").ok())
    }

    fn resolve_endpoint_with(&self, env_endpoint: Option<String>) -> String {
        env_endpoint
            .or_else(|| self.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("impact-chat").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            endpoint: Some("http://example.com:9000".to_string()),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.endpoint.as_deref(), Some("http://example.com:9000"));
    }

    #[test]
    fn endpoint_resolution_order() {
        let config = Config {
            endpoint: Some("http://from-config:1".to_string()),
        };
        assert_eq!(
            config.resolve_endpoint_with(Some("http://from-env:2".to_string())),
            "http://from-env:2"
        );
        assert_eq!(config.resolve_endpoint_with(None), "http://from-config:1");
        assert_eq!(Config::default().resolve_endpoint_with(None), DEFAULT_ENDPOINT);
    }
}
