//! Engine configuration.
//!
//! Every section is optional in the file; missing fields take their defaults.
//!
//! ```json
//! {
//!   "format": { "indent": "    " },
//!   "completion": { "include_keywords": false },
//!   "ranking": { "max_results": 20 }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::completion::ranking::RankingCriteria;
use crate::errors::ConfigError;
use crate::format::FormatOptions;

/// Which candidate sources a completion request draws from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Offer language keywords alongside symbols and functions
    pub include_keywords: bool,
    /// Offer `name=` completions inside call argument lists
    pub include_argument_names: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self { include_keywords: true, include_argument_names: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub format: FormatOptions,
    pub completion: CompletionConfig,
    /// Ranking weights; `max_results` caps the number of candidates returned
    pub ranking: RankingCriteria,
}

impl EngineConfig {
    /// Parse a configuration from JSON text. `origin` names the source in errors.
    pub fn from_json(text: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|source| ConfigError::Parse { path: origin.to_string(), source })
    }
}

/// Load a configuration file.
pub fn load(path: &Path) -> Result<EngineConfig, ConfigError> {
    let path_display = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path_display.clone(), source })?;
    let config = EngineConfig::from_json(&text, &path_display)?;
    debug!("loaded configuration from {}", path_display);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "format": {{ "indent": "  " }}, "ranking": {{ "max_results": 5 }} }}"#).unwrap();

        let config = load(file.path()).unwrap();
        assert_eq!(config.format.indent, "  ");
        assert_eq!(config.ranking.max_results, 5);
        assert_eq!(config.ranking.contiguous_bonus, RankingCriteria::default().contiguous_bonus);
        assert_eq!(config.completion, CompletionConfig::default());
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(EngineConfig::from_json("{}", "inline").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "ranking": {{ "max_results": "many" }} }}"#).unwrap();
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("invalid configuration in "));
    }
}
