//! Source locations attached to call sites and diagnostics

use super::references::MethodReference;
use serde::{Deserialize, Serialize};
use std::fmt;

/// File and line of an instruction
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextLocation {
    pub file_name: String,
    pub line: u32,
}

impl TextLocation {
    pub fn new(file_name: impl Into<String>, line: u32) -> Self {
        Self {
            file_name: file_name.into(),
            line,
        }
    }
}

impl fmt::Display for TextLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_name, self.line)
    }
}

/// Where a dependency was requested from.
///
/// Both parts are optional: entry points and analyzer-internal requests carry no
/// caller, and instructions without debug info carry no text location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallLocation {
    pub method: Option<MethodReference>,
    pub source_location: Option<TextLocation>,
}

impl CallLocation {
    /// Location with no caller (roots)
    pub fn root() -> Self {
        Self::default()
    }

    pub fn in_method(method: MethodReference) -> Self {
        Self {
            method: Some(method),
            source_location: None,
        }
    }

    pub fn new(method: MethodReference, source_location: Option<TextLocation>) -> Self {
        Self {
            method: Some(method),
            source_location,
        }
    }

    pub fn is_root(&self) -> bool {
        self.method.is_none()
    }
}

impl fmt::Display for CallLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.method, &self.source_location) {
            (Some(method), Some(loc)) => write!(f, "{} at {}", method, loc),
            (Some(method), None) => write!(f, "{}", method),
            (None, Some(loc)) => write!(f, "{}", loc),
            (None, None) => write!(f, "<root>"),
        }
    }
}
