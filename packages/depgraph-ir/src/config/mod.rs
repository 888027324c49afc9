//! Configuration System
//!
//! Two-tier configuration for the dependency analyzer:
//! - Level 1: Preset - Simple one-liner
//! - Level 2: YAML - Preset plus per-field overrides
//!
//! # Examples
//!
//! ```rust,ignore
//! use depgraph_ir::config::{AnalyzerConfig, Preset};
//!
//! // Level 1: Simple preset
//! let config = AnalyzerConfig::preset(Preset::Fast);
//!
//! // Builder refinements
//! let config = AnalyzerConfig::preset(Preset::Balanced)
//!     .propagation_depth_limit(20)
//!     .platform_tag("webassembly");
//! config.validate()?;
//!
//! // Level 2: YAML
//! let config = AnalyzerConfig::from_yaml("depgraph.yaml")?;
//! ```

pub mod analyzer_config;
pub mod error;
pub mod io;
pub mod preset;

// Re-exports
pub use analyzer_config::{AnalysisMode, AnalyzerConfig};
pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigExportV1, ConfigOverrides};
pub use preset::Preset;
