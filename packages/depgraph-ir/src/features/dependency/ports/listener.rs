//! Reachability listeners and per-method plugins

use crate::features::dependency::application::DependencyAnalyzer;
use crate::shared::models::{CallLocation, FieldReference, MethodReference};

/// Observer of analysis progress.
///
/// Callbacks receive the analyzer and may link further code; events raised
/// from inside a callback are delivered after it returns.
pub trait DependencyListener {
    /// Called once when the listener is registered
    fn started(&mut self, _analyzer: &mut DependencyAnalyzer) {}

    fn class_reached(
        &mut self,
        _analyzer: &mut DependencyAnalyzer,
        _class_name: &str,
        _location: &CallLocation,
    ) {
    }

    fn method_reached(
        &mut self,
        _analyzer: &mut DependencyAnalyzer,
        _method: &MethodReference,
        _location: &CallLocation,
    ) {
    }

    fn field_reached(
        &mut self,
        _analyzer: &mut DependencyAnalyzer,
        _field: &FieldReference,
        _location: &CallLocation,
    ) {
    }

    /// Fixed point reached; nodes are locked. Listeners may still submit bodies
    /// for reached native methods.
    fn completing(&mut self, _analyzer: &mut DependencyAnalyzer) {}
}

/// Hook attached to one method, invoked each time the method is reached from a
/// new call site
pub trait DependencyPlugin {
    fn method_reached(
        &mut self,
        analyzer: &mut DependencyAnalyzer,
        method: &MethodReference,
        location: &CallLocation,
    );
}

impl<F> DependencyPlugin for F
where
    F: FnMut(&mut DependencyAnalyzer, &MethodReference, &CallLocation),
{
    fn method_reached(
        &mut self,
        analyzer: &mut DependencyAnalyzer,
        method: &MethodReference,
        location: &CallLocation,
    ) {
        self(analyzer, method, location)
    }
}
