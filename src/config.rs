//! Configuration for ripple actions.

use crate::error::{Result, RippleError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Allow/deny pattern list matched against `PLATFORM.DATASET` probe strings.
///
/// A value is allowed when no deny pattern matches it and at least one allow
/// pattern does. The allow list defaults to match-all. Patterns that fail to
/// compile match nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowDenyPattern {
    /// Regexes granting a match (default: allow everything).
    #[serde(default = "default_allow")]
    pub allow: Vec<String>,
    /// Regexes revoking a match. Deny wins over allow.
    #[serde(default)]
    pub deny: Vec<String>,
}

fn default_allow() -> Vec<String> {
    vec![".*".to_string()]
}

impl Default for AllowDenyPattern {
    fn default() -> Self {
        Self {
            allow: default_allow(),
            deny: Vec::new(),
        }
    }
}

impl AllowDenyPattern {
    /// A pattern that allows everything.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Check whether a value passes the pattern.
    pub fn allowed(&self, value: &str) -> bool {
        if self.deny.iter().any(|pattern| matches(pattern, value)) {
            return false;
        }
        self.allow.iter().any(|pattern| matches(pattern, value))
    }

    /// Validate that every pattern compiles.
    pub fn validate(&self, field: &str) -> Result<()> {
        for pattern in self.allow.iter().chain(self.deny.iter()) {
            if Regex::new(pattern).is_err() {
                return Err(RippleError::InvalidConfig {
                    field: field.to_string(),
                    reason: format!("invalid pattern: {}", pattern),
                });
            }
        }
        Ok(())
    }
}

fn matches(pattern: &str, value: &str) -> bool {
    Regex::new(pattern)
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}

/// Lineage traversal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Upstream,
    Downstream,
}

impl Direction {
    /// Wire representation used in graph queries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Upstream => "UPSTREAM",
            Direction::Downstream => "DOWNSTREAM",
        }
    }
}

/// Configuration for the field description propagation action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// Whether field description propagation is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Parent dataset urns from which propagation is allowed.
    pub parent_pattern: AllowDenyPattern,
    /// Optional child dataset urns to exclude from propagation.
    #[serde(default)]
    pub child_pattern: Option<AllowDenyPattern>,
    /// Entity types to allow propagation to, lower-cased
    /// (e.g. dataset, chart, dashboard, dataflow, datajob).
    pub entity_types: Vec<String>,
    /// The direction in which propagation takes place.
    pub direction: Direction,
    /// Lineage degree labels to traverse, e.g. `["1"]` or `["1", "2", "3+"]`.
    pub dependency_levels: Vec<String>,
    /// Field paths that should not be propagated.
    #[serde(default)]
    pub exclude_fields: Option<Vec<String>>,
    /// Whether to propagate across platforms different from the parent's.
    #[serde(default)]
    pub platform_propagate: bool,
}

fn default_true() -> bool {
    true
}

impl PropagationConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.parent_pattern.validate("propagation.parent_pattern")?;
        if let Some(child_pattern) = &self.child_pattern {
            child_pattern.validate("propagation.child_pattern")?;
        }
        if self.entity_types.is_empty() {
            return Err(RippleError::InvalidConfig {
                field: "propagation.entity_types".to_string(),
                reason: "at least one entity type is required".to_string(),
            });
        }
        if self.dependency_levels.is_empty() {
            return Err(RippleError::InvalidConfig {
                field: "propagation.dependency_levels".to_string(),
                reason: "at least one dependency level is required".to_string(),
            });
        }
        Ok(())
    }
}

/// Connection settings for the metadata graph API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Base URL of the graph service, e.g. `http://localhost:8080`.
    pub endpoint: String,
    /// Optional bearer token.
    #[serde(default)]
    pub token: Option<String>,
}

impl GraphConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(RippleError::InvalidConfig {
                field: "graph.endpoint".to_string(),
                reason: "endpoint is required".to_string(),
            });
        }
        Ok(())
    }
}

/// Credentials for the analytics taxonomy API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AmplitudeConfig {
    pub api_key: String,
    pub secret_key: String,
}

impl AmplitudeConfig {
    /// Validate the configuration. Both keys are required.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(RippleError::InvalidConfig {
                field: "amplitude.api_key".to_string(),
                reason: "api key is required".to_string(),
            });
        }
        if self.secret_key.trim().is_empty() {
            return Err(RippleError::InvalidConfig {
                field: "amplitude.secret_key".to_string(),
                reason: "secret key is required".to_string(),
            });
        }
        Ok(())
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RippleConfig {
    /// Graph API connection.
    pub graph: GraphConfig,
    /// Field description propagation.
    pub propagation: PropagationConfig,
    /// Analytics taxonomy sync, if enabled.
    #[serde(default)]
    pub amplitude: Option<AmplitudeConfig>,
}

impl RippleConfig {
    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RippleError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| RippleError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        self.graph.validate()?;
        self.propagation.validate()?;
        if let Some(amplitude) = &self.amplitude {
            amplitude.validate()?;
        }
        Ok(())
    }

    /// Create a minimal development configuration.
    pub fn development() -> Self {
        Self {
            graph: GraphConfig {
                endpoint: "http://localhost:8080".to_string(),
                token: None,
            },
            propagation: PropagationConfig {
                enabled: true,
                parent_pattern: AllowDenyPattern::allow_all(),
                child_pattern: None,
                entity_types: vec!["dataset".to_string()],
                direction: Direction::Downstream,
                dependency_levels: vec!["1".to_string()],
                exclude_fields: None,
                platform_propagate: false,
            },
            amplitude: None,
        }
    }
}
