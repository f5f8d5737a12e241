use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, num::NonZeroUsize, path::Path};

use crate::{EngineError, EngineResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of call-site shapes whose method resolution is memoised.
    #[serde(default = "default_resolution_cache_capacity")]
    pub resolution_cache_capacity: usize,

    /// Unresolved non-quiet references fail the render instead of printing themselves.
    #[serde(default)]
    pub strict_references: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resolution_cache_capacity: default_resolution_cache_capacity(),
            strict_references: false,
        }
    }
}

impl EngineConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)
            .map_err(|e| EngineError::config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(s: &str) -> EngineResult<Self> {
        let config: Self = serde_json::from_str(s)
            .map_err(|e| EngineError::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        self.cache_capacity().map(|_| ())
    }

    pub fn cache_capacity(&self) -> EngineResult<NonZeroUsize> {
        NonZeroUsize::new(self.resolution_cache_capacity).ok_or_else(|| {
            EngineError::config("resolution_cache_capacity must be greater than zero")
        })
    }
}

fn default_resolution_cache_capacity() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.resolution_cache_capacity, 256);
        assert!(!config.strict_references);
    }

    #[test]
    fn test_overrides() {
        let config =
            EngineConfig::from_json(r#"{"resolution_cache_capacity": 8, "strict_references": true}"#)
                .unwrap();
        assert_eq!(config.cache_capacity().unwrap().get(), 8);
        assert!(config.strict_references);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let err = EngineConfig::from_json(r#"{"resolution_cache_capacity": 0}"#).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EngineConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));
    }
}
