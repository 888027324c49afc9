//! Configuration I/O (YAML loading)
//!
//! Defines the YAML schema types. Loading itself lives in `analyzer_config.rs`.

use super::analyzer_config::{AnalysisMode, AnalyzerConfig};
use super::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigExportV1 {
    /// Schema version (always 1 for v1)
    pub version: Option<u32>,

    /// Base preset
    pub preset: String,

    /// Fine-grained overrides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<ConfigOverrides>,
}

/// Per-field overrides on top of the preset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<AnalysisMode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub propagation_depth_limit: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_type_set_limit: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub interrupt_granularity: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_merging: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_search_limit: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_degree_limit: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_tags: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dependencies: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_nodes: Option<bool>,
}

const OVERRIDE_FIELDS: &[&str] = &[
    "mode",
    "propagation_depth_limit",
    "small_type_set_limit",
    "interrupt_granularity",
    "domain_merging",
    "domain_search_limit",
    "array_degree_limit",
    "platform_tags",
    "log_dependencies",
    "tag_nodes",
];

impl ConfigOverrides {
    /// Reject unknown override keys with a spelling suggestion
    pub(crate) fn check_known_fields(raw: &serde_yaml::Value) -> ConfigResult<()> {
        let Some(overrides) = raw.get("overrides").and_then(|v| v.as_mapping()) else {
            return Ok(());
        };
        for key in overrides.keys() {
            let Some(name) = key.as_str() else {
                continue;
            };
            if !OVERRIDE_FIELDS.contains(&name) {
                return Err(ConfigError::unknown_field_with_suggestion(
                    name,
                    "overrides",
                    OVERRIDE_FIELDS.iter().map(|f| f.to_string()).collect(),
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn apply(self, config: &mut AnalyzerConfig) {
        if let Some(v) = self.mode {
            config.mode = v;
        }
        if let Some(v) = self.propagation_depth_limit {
            config.propagation_depth_limit = v;
        }
        if let Some(v) = self.small_type_set_limit {
            config.small_type_set_limit = v;
        }
        if let Some(v) = self.interrupt_granularity {
            config.interrupt_granularity = v;
        }
        if let Some(v) = self.domain_merging {
            config.domain_merging = v;
        }
        if let Some(v) = self.domain_search_limit {
            config.domain_search_limit = v;
        }
        if let Some(v) = self.array_degree_limit {
            config.array_degree_limit = v;
        }
        if let Some(v) = self.platform_tags {
            config.platform_tags = v;
        }
        if let Some(v) = self.log_dependencies {
            config.log_dependencies = v;
        }
        if let Some(v) = self.tag_nodes {
            config.tag_nodes = v;
        }
    }

    pub(crate) fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            mode: Some(config.mode),
            propagation_depth_limit: Some(config.propagation_depth_limit),
            small_type_set_limit: Some(config.small_type_set_limit),
            interrupt_granularity: Some(config.interrupt_granularity),
            domain_merging: Some(config.domain_merging),
            domain_search_limit: Some(config.domain_search_limit),
            array_degree_limit: Some(config.array_degree_limit),
            platform_tags: Some(config.platform_tags.clone()),
            log_dependencies: Some(config.log_dependencies),
            tag_nodes: Some(config.tag_nodes),
        }
    }
}
