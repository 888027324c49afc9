//! Dependency analyzer configuration
//!
//! Built from a [`Preset`], refined with builder methods, validated before use.

use super::error::{ConfigError, ConfigResult};
use super::io::{ConfigExportV1, ConfigOverrides};
use super::preset::Preset;
use crate::shared::constants::propagation;
use serde::{Deserialize, Serialize};

/// Node granularity used for virtual dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Per-variable nodes; every call site has its own receiver set
    Precise,

    /// One global instance node and one global class node; dispatch resolves
    /// against every instantiated subtype of the declaring class
    Fast,
}

impl Default for AnalysisMode {
    fn default() -> Self {
        AnalysisMode::Precise
    }
}

impl AnalysisMode {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "precise" => Ok(Self::Precise),
            "fast" => Ok(Self::Fast),
            _ => Err(format!("Unknown analysis mode '{}'. Valid modes: precise, fast", s)),
        }
    }
}

/// Dependency analyzer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Preset this configuration was derived from
    pub preset: Preset,

    /// Dispatch granularity
    pub mode: AnalysisMode,

    /// Nested propagation calls before work is queued (1..=10000)
    pub propagation_depth_limit: usize,

    /// Largest type set kept in inline storage (1..=64)
    pub small_type_set_limit: usize,

    /// Consumer tasks between interruptor checks (1..=1000000)
    pub interrupt_granularity: usize,

    /// Share one type set between nodes that provably hold the same types
    pub domain_merging: bool,

    /// Maximum nodes collected into a domain on split (1..=100000)
    pub domain_search_limit: usize,

    /// Array nesting depth tracked for item nodes (0..=16)
    pub array_degree_limit: usize,

    /// Target platform tags; symbols marked unsupported on any of them are rejected
    pub platform_tags: Vec<String>,

    /// Trace every propagation, connection and virtual-call resolution
    pub log_dependencies: bool,

    /// Give every node a readable tag (implied by `log_dependencies`)
    pub tag_nodes: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::preset(Preset::Balanced)
    }
}

impl AnalyzerConfig {
    /// Complete configuration for a preset
    pub fn preset(preset: Preset) -> Self {
        let base = Self {
            preset,
            mode: AnalysisMode::Precise,
            propagation_depth_limit: propagation::PROPAGATION_DEPTH_LIMIT,
            small_type_set_limit: propagation::SMALL_TYPE_SET_LIMIT,
            interrupt_granularity: propagation::INTERRUPT_GRANULARITY,
            domain_merging: true,
            domain_search_limit: propagation::DOMAIN_SEARCH_LIMIT,
            array_degree_limit: propagation::ARRAY_DEGREE_LIMIT,
            platform_tags: Vec::new(),
            log_dependencies: false,
            tag_nodes: false,
        };
        match preset {
            Preset::Fast => Self {
                mode: AnalysisMode::Fast,
                ..base
            },
            Preset::Balanced | Preset::Custom => base,
            Preset::Thorough => Self {
                domain_merging: false,
                tag_nodes: true,
                ..base
            },
        }
    }

    /// Whether nodes carry readable tags
    pub fn should_tag(&self) -> bool {
        self.tag_nodes || self.log_dependencies
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        check_range(
            "propagation_depth_limit",
            self.propagation_depth_limit,
            1,
            10_000,
            "Recursion must be allowed at least one level",
        )?;
        check_range(
            "small_type_set_limit",
            self.small_type_set_limit,
            1,
            64,
            "Inline type sets must hold at least one type",
        )?;
        check_range(
            "interrupt_granularity",
            self.interrupt_granularity,
            1,
            1_000_000,
            "Interruptor must be polled eventually",
        )?;
        check_range(
            "domain_search_limit",
            self.domain_search_limit,
            1,
            100_000,
            "Domain search must visit at least the splitting node",
        )?;
        check_range(
            "array_degree_limit",
            self.array_degree_limit,
            0,
            16,
            "Deep array nesting multiplies item nodes",
        )?;

        if self.platform_tags.iter().any(|tag| tag.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "platform_tags must not contain empty tags".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder: Set mode
    pub fn mode(mut self, v: AnalysisMode) -> Self {
        self.mode = v;
        self
    }

    /// Builder: Set propagation_depth_limit
    pub fn propagation_depth_limit(mut self, v: usize) -> Self {
        self.propagation_depth_limit = v;
        self
    }

    /// Builder: Set small_type_set_limit
    pub fn small_type_set_limit(mut self, v: usize) -> Self {
        self.small_type_set_limit = v;
        self
    }

    /// Builder: Set interrupt_granularity
    pub fn interrupt_granularity(mut self, v: usize) -> Self {
        self.interrupt_granularity = v;
        self
    }

    /// Builder: Enable/disable domain merging
    pub fn domain_merging(mut self, v: bool) -> Self {
        self.domain_merging = v;
        self
    }

    /// Builder: Set domain_search_limit
    pub fn domain_search_limit(mut self, v: usize) -> Self {
        self.domain_search_limit = v;
        self
    }

    /// Builder: Set array_degree_limit
    pub fn array_degree_limit(mut self, v: usize) -> Self {
        self.array_degree_limit = v;
        self
    }

    /// Builder: Add a platform tag
    pub fn platform_tag(mut self, tag: impl Into<String>) -> Self {
        self.platform_tags.push(tag.into());
        self
    }

    /// Builder: Enable/disable dependency logging
    pub fn log_dependencies(mut self, v: bool) -> Self {
        self.log_dependencies = v;
        self
    }

    /// Builder: Enable/disable node tagging
    pub fn tag_nodes(mut self, v: bool) -> Self {
        self.tag_nodes = v;
        self
    }

    /// Load and validate a YAML configuration file
    pub fn from_yaml(path: &str) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate YAML configuration text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let raw: serde_yaml::Value = serde_yaml::from_str(content)?;
        ConfigOverrides::check_known_fields(&raw)?;

        let export: ConfigExportV1 = serde_yaml::from_value(raw)?;
        let version = export.version.ok_or(ConfigError::MissingVersion)?;
        if version != 1 {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: vec![1],
            });
        }

        let preset = Preset::from_str(&export.preset)
            .map_err(|_| ConfigError::UnknownPreset(export.preset.clone()))?;

        let mut config = Self::preset(preset);
        if let Some(overrides) = export.overrides {
            overrides.apply(&mut config);
        }

        config.validate()?;
        Ok(config)
    }

    /// Export as YAML (v1 schema, every field as an override)
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: Some(1),
            preset: self.preset.as_str().to_string(),
            overrides: Some(ConfigOverrides::from_config(self)),
        };
        Ok(serde_yaml::to_string(&export)?)
    }
}

fn check_range(field: &str, value: usize, min: usize, max: usize, hint: &str) -> ConfigResult<()> {
    if value < min || value > max {
        return Err(ConfigError::range_with_hint(field, value, min, max, hint));
    }
    Ok(())
}
