//! Configuration loading for mafnexus.
//! Reads mafnexus.toml from the current directory or the path in the MAFNEXUS_CONFIG env var.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

pub const CONFIG_ENV: &str = "MAFNEXUS_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "mafnexus.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub annotation: AnnotationConfig,
    #[serde(default)]
    pub merge: MergeConfig,
}

// ── Annotation ────────────────────────────────────────────────────────────────

/// How the canonical transcript is picked from a service response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalStrategy {
    /// First transcript in service order.
    #[default]
    Default,
    /// Prefer isoform-override transcripts, then the most severe consequence.
    IsoformOverride,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_isoform_source")]
    pub isoform_override_source: String,
    #[serde(default = "default_enrichment_fields")]
    pub enrichment_fields: Vec<String>,
    #[serde(default)]
    pub replace_symbol_entrez: bool,
    /// 0 sends one GET per record; anything else batches that many records per POST.
    #[serde(default)]
    pub post_interval_size: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub canonical_strategy: CanonicalStrategy,
    pub isoform_override_file: Option<String>,
    #[serde(default)]
    pub strict_maf_checks: bool,
}

fn default_base_url()        -> String { "https://www.genomenexus.org".to_string() }
fn default_isoform_source()  -> String { "uniprot".to_string() }
fn default_enrichment_fields() -> Vec<String> { vec!["annotation_summary".to_string()] }
fn default_timeout_secs()    -> u64    { 30 }

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            isoform_override_source: default_isoform_source(),
            enrichment_fields: default_enrichment_fields(),
            replace_symbol_entrez: false,
            post_interval_size: 0,
            timeout_secs: default_timeout_secs(),
            canonical_strategy: CanonicalStrategy::Default,
            isoform_override_file: None,
            strict_maf_checks: false,
        }
    }
}

impl AnnotationConfig {
    pub fn has_enrichment(&self, field: &str) -> bool {
        self.enrichment_fields.iter().any(|f| f == field)
    }
}

// ── Merge ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeConfig {
    #[serde(default)]
    pub strict: bool,
}


impl Config {
    /// Load configuration.
    /// Checks MAFNEXUS_CONFIG env var first, then the current directory.
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV)
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let mut config = if Path::new(&path).exists() {
            Self::from_path(&path)?
        } else {
            warn!("Config file not found: {}, using defaults", path);
            Config::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file; `.yaml`/`.yml` as YAML, anything else as TOML.
    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        debug!("Loaded config from {}", path);
        if path.ends_with(".yaml") || path.ends_with(".yml") {
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
                path: path.to_string(),
                source,
            })
        } else {
            toml::from_str(&content).map_err(|source| ConfigError::Toml {
                path: path.to_string(),
                source,
            })
        }
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("MAFNEXUS_ANNOTATION_URL") {
            self.annotation.base_url = url;
        }
        if let Ok(source) = std::env::var("MAFNEXUS_ISOFORM_OVERRIDE_SOURCE") {
            self.annotation.isoform_override_source = source;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = &self.annotation.base_url;
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "annotation.base_url".to_string(),
                message: format!("expected an http(s) URL, got '{}'", base),
            });
        }
        if self.annotation.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "annotation.timeout_secs".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
