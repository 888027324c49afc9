//! Problems found while analysing dependencies

use crate::shared::models::CallLocation;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        }
    }
}

/// One reported problem, anchored at the call location that caused it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub severity: Severity,
    pub location: CallLocation,
    pub message: String,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity.as_str(), self.message)?;
        if !self.location.is_root() {
            write!(f, " at {}", self.location)?;
        }
        Ok(())
    }
}

/// Problems in order of discovery
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    problems: Vec<Problem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, location: CallLocation, message: impl Into<String>) {
        self.add(Severity::Error, location, message.into());
    }

    pub fn warning(&mut self, location: CallLocation, message: impl Into<String>) {
        self.add(Severity::Warning, location, message.into());
    }

    fn add(&mut self, severity: Severity, location: CallLocation, message: String) {
        tracing::warn!(%location, "{}", message);
        self.problems.push(Problem {
            severity,
            location,
            message,
        });
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn severe_problems(&self) -> impl Iterator<Item = &Problem> {
        self.problems.iter().filter(|p| p.severity == Severity::Error)
    }

    pub fn has_severe_problems(&self) -> bool {
        self.severe_problems().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}
