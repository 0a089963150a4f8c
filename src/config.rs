//! Header manipulation configuration whose values carry formatter directives.

use crate::translator::{DirectiveTranslator, HeaderValueTranslator, TranslationOutcome};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Header manipulation configuration for requests and responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HeaderRewriteConfig {
    /// Configuration version
    pub version: String,
    /// Headers manipulated on the request path
    pub request_headers: HeaderTransform,
    /// Headers manipulated on the response path
    pub response_headers: HeaderTransform,
}

impl Default for HeaderRewriteConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            request_headers: HeaderTransform::default(),
            response_headers: HeaderTransform::default(),
        }
    }
}

/// Header transformation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct HeaderTransform {
    /// Headers to add (if not present)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add: Option<Vec<HeaderValue>>,
    /// Headers to set (overwrite)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<Vec<HeaderValue>>,
    /// Headers to remove
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove: Option<Vec<String>>,
}

/// Header name-value pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeaderValue {
    /// Header name
    pub name: String,
    /// Header value (formatter template)
    pub value: String,
}

/// Summary of translating every header value of a configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationReport {
    /// Header values inspected
    pub values: usize,
    /// Header values that changed
    pub values_changed: usize,
    /// Directives rewritten across all values
    pub rewrites: usize,
    /// Names of headers whose value holds a malformed metadata directive
    pub malformed: Vec<String>,
}

impl HeaderRewriteConfig {
    /// Parse a YAML configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file; `.yaml`/`.yml` is YAML, anything else JSON.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if is_yaml_path(path) {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Translate every added or set header value.
    pub fn translated(&self, translator: &HeaderValueTranslator<'_>) -> (Self, TranslationReport) {
        let mut report = TranslationReport::default();

        let translated = Self {
            version: self.version.clone(),
            request_headers: self.request_headers.translated(translator, &mut report),
            response_headers: self.response_headers.translated(translator, &mut report),
        };

        info!(
            values = report.values,
            values_changed = report.values_changed,
            rewrites = report.rewrites,
            malformed = report.malformed.len(),
            "Header values translated"
        );

        (translated, report)
    }
}

impl HeaderTransform {
    fn translated(
        &self,
        translator: &HeaderValueTranslator<'_>,
        report: &mut TranslationReport,
    ) -> Self {
        let mut translate_all = |headers: &Option<Vec<HeaderValue>>| {
            headers.as_ref().map(|headers| {
                headers
                    .iter()
                    .map(|h| h.translated(translator, report))
                    .collect::<Vec<_>>()
            })
        };

        let add = translate_all(&self.add);
        let set = translate_all(&self.set);

        Self {
            add,
            set,
            remove: self.remove.clone(),
        }
    }
}

impl HeaderValue {
    fn translated(
        &self,
        translator: &HeaderValueTranslator<'_>,
        report: &mut TranslationReport,
    ) -> Self {
        let translation = translator.translate(&self.value);

        report.values += 1;
        report.rewrites += translation.rewrites;
        if translation.changed() {
            report.values_changed += 1;
        }
        if let TranslationOutcome::Aborted(ref e) = translation.outcome {
            debug!(header = %self.name, error = %e, "Header value left partially translated");
            report.malformed.push(self.name.clone());
        }

        Self {
            name: self.name.clone(),
            value: translation.value,
        }
    }
}

fn is_yaml_path(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "yaml" || e == "yml")
}

/// Errors that can occur while loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}
