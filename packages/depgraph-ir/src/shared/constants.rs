//! Centralized constants
//!
//! Well-known class and method names the analysis links on its own, plus the
//! default tuning values the configuration presets start from.

/// Well-known runtime class names
pub mod classes {
    /// Root of the class hierarchy; every type is a subtype of it
    pub const OBJECT: &str = "java.lang.Object";

    /// Reflective class type, carried by class-constant and `getClass()` results
    pub const CLASS: &str = "java.lang.Class";

    pub const STRING: &str = "java.lang.String";

    pub const NULL_POINTER_EXCEPTION: &str = "java.lang.NullPointerException";
}

/// Well-known method names
pub mod methods {
    pub const CONSTRUCTOR: &str = "<init>";

    pub const CLASS_INITIALIZER: &str = "<clinit>";

    pub const GET_CLASS: &str = "getClass";

    pub const CLONE: &str = "clone";

    /// Runtime lock support, modeled as ordinary static methods on `java.lang.Object`
    pub const MONITOR_ENTER: &str = "monitorEnter";
    pub const MONITOR_ENTER_SYNC: &str = "monitorEnterSync";
    pub const MONITOR_EXIT: &str = "monitorExit";
    pub const MONITOR_EXIT_SYNC: &str = "monitorExitSync";
}

/// Propagation engine defaults
pub mod propagation {
    /// Recursive propagation depth before work is queued instead
    pub const PROPAGATION_DEPTH_LIMIT: usize = 50;

    /// Type sets up to this size are stored inline
    pub const SMALL_TYPE_SET_LIMIT: usize = 3;

    /// Consumer tasks between two interruptor checks
    pub const INTERRUPT_GRANULARITY: usize = 100;

    /// Nodes visited while collecting a merged domain
    pub const DOMAIN_SEARCH_LIMIT: usize = 100;

    /// Array nesting depth beyond which item nodes stop accepting types
    pub const ARRAY_DEGREE_LIMIT: usize = 2;
}
