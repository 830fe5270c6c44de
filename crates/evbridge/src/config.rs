// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bridge configuration.
//!
//! Supports both programmatic and file-based configuration.
//!
//! ```toml
//! [codec]
//! mode = "lenient"
//! max_depth = 32
//!
//! [export]
//! array_namespace = "http://schemas.microsoft.com/2003/10/Serialization/Arrays"
//! element_form = "qualified"
//! ```

use crate::schema::ElementForm;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Bridge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BridgeConfig {
    #[serde(default)]
    pub codec: CodecConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

impl BridgeConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.codec.max_depth == 0 {
            return Err(ConfigError::Invalid("codec.max_depth must be at least 1".into()));
        }
        if self.codec.max_depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "codec.max_depth {} exceeds {}",
                self.codec.max_depth, MAX_DEPTH_LIMIT
            )));
        }
        if self.export.array_namespace.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "export.array_namespace must not be empty".into(),
            ));
        }
        Ok(())
    }
}

const MAX_DEPTH_LIMIT: usize = 1024;

/// What the codec does with a wire type name it cannot resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// Fail with `UnknownType`.
    #[default]
    Strict,
    /// Return `None`.
    Lenient,
}

/// Event codec settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodecConfig {
    #[serde(default)]
    pub mode: DecodeMode,

    /// Nesting limit for JSON and dictionary payloads.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Pretty-print encoded envelopes.
    #[serde(default)]
    pub pretty: bool,
}

fn default_max_depth() -> usize {
    64
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            mode: DecodeMode::default(),
            max_depth: default_max_depth(),
            pretty: false,
        }
    }
}

/// Schema export settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    /// Namespace of `ArrayOf<primitive>` wrapper types.
    #[serde(default = "default_array_namespace")]
    pub array_namespace: String,

    #[serde(default)]
    pub element_form: ElementForm,
}

fn default_array_namespace() -> String {
    "http://schemas.microsoft.com/2003/10/Serialization/Arrays".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            array_namespace: default_array_namespace(),
            element_form: ElementForm::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.codec.mode, DecodeMode::Strict);
        assert_eq!(config.codec.max_depth, 64);
        assert_eq!(config.export.element_form, ElementForm::Qualified);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = BridgeConfig::from_toml_str("[codec]\nmode = \"lenient\"\n").expect("parse");
        assert_eq!(config.codec.mode, DecodeMode::Lenient);
        assert_eq!(config.codec.max_depth, 64);
        assert_eq!(config.export, ExportConfig::default());
    }

    #[test]
    fn test_validation() {
        let err = BridgeConfig::from_toml_str("[codec]\nmax_depth = 0\n").expect_err("zero depth");
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = BridgeConfig::from_toml_str("[export]\narray_namespace = \"  \"\n")
            .expect_err("blank namespace");
        assert!(matches!(err, ConfigError::Invalid(_)));

        assert!(matches!(
            BridgeConfig::from_toml_str("[codec]\nmode = \"sloppy\"\n"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "[codec]\npretty = true\n\n[export]\nelement_form = \"unqualified\"\narray_namespace = \"urn:arrays\""
        )
        .expect("write");

        let config = BridgeConfig::from_file(file.path()).expect("load");
        assert!(config.codec.pretty);
        assert_eq!(config.export.element_form, ElementForm::Unqualified);
        assert_eq!(config.export.array_namespace, "urn:arrays");
    }

    #[test]
    fn test_config_serialization() {
        let config = BridgeConfig::default();
        let text = toml::to_string(&config).expect("serialize");
        let parsed = BridgeConfig::from_toml_str(&text).expect("parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            BridgeConfig::from_file("/nonexistent/evbridge.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
