//! Engine configuration.
//!
//! Every field has a default, so hosts can load partial JSON documents:
//!
//! ```rust
//! use corpus_match::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r##"{ "palette": ["#f00", "#0f0"] }"##).unwrap();
//! assert_eq!(config.palette.len(), 2);
//! assert!(config.scan.global);
//! ```

use crate::error::ConfigError;
use crate::grip::DragOptions;
use crate::intervals::{DEFAULT_COLOR, Palette};
use crate::layout::GridMetrics;
use crate::scanner::ScanOptions;
use serde::{Deserialize, Serialize};

/// Configuration for a [`MatchEngine`](crate::engine::MatchEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Colours assigned to matches in rotation.
    pub palette: Vec<String>,
    /// Colour used when `palette` is empty.
    pub default_color: String,
    /// Grid metrics of the text view.
    pub grid: GridMetrics,
    /// Pattern compilation/scan options.
    pub scan: ScanOptions,
    /// Boundary drag behaviour.
    pub drag: DragOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            palette: Vec::new(),
            default_color: DEFAULT_COLOR.to_string(),
            grid: GridMetrics::default(),
            scan: ScanOptions::default(),
            drag: DragOptions::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build the palette described by this configuration.
    pub fn build_palette(&self) -> Palette {
        Palette::with_fallback(self.palette.iter().cloned(), self.default_color.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_nested_partial_document() {
        let config = EngineConfig::from_json_str(
            r#"{ "grid": { "wrap_columns": 40 }, "drag": { "sticky_factor": 1.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.grid.wrap_columns, Some(40));
        assert_eq!(config.grid.line_height, 28.0);
        assert_eq!(config.drag.sticky_factor, Some(1.0));
    }

    #[test]
    fn test_invalid_document() {
        assert!(matches!(
            EngineConfig::from_json_str("{ palette: 1 }"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_round_trip_json() {
        let mut config = EngineConfig::default();
        config.palette = vec!["#111".into(), "#222".into()];
        let json = config.to_json_string().unwrap();
        assert_eq!(EngineConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_build_palette_fallback() {
        let config = EngineConfig {
            default_color: "gray".into(),
            ..EngineConfig::default()
        };
        assert_eq!(config.build_palette().next_color().as_str(), "gray");
    }
}
