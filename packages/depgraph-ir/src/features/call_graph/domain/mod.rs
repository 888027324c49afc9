//! Call graph domain types
//!
//! A node per reachable method; call sites record which callers reach which
//! callees and from where. Access sites record field reads/writes and class
//! references made by a method body.

use crate::shared::models::{FieldReference, MethodReference, TextLocation};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Index of a call site in the call graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallSiteId(pub u32);

impl CallSiteId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Caller to callee edge(s)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CallSite {
    /// Statically resolved or precise virtual edge: one caller, one callee
    Direct {
        caller: MethodReference,
        callee: MethodReference,
        locations: SmallVec<[TextLocation; 1]>,
    },
    /// Coarse virtual site: every caller of `method` may reach every callee
    Virtual {
        method: MethodReference,
        callers: IndexSet<MethodReference>,
        callees: IndexSet<MethodReference>,
        locations: IndexSet<TextLocation>,
    },
}

impl CallSite {
    pub fn direct(caller: MethodReference, callee: MethodReference) -> Self {
        CallSite::Direct {
            caller,
            callee,
            locations: SmallVec::new(),
        }
    }

    pub fn virtual_site(method: MethodReference) -> Self {
        CallSite::Virtual {
            method,
            callers: IndexSet::new(),
            callees: IndexSet::new(),
            locations: IndexSet::new(),
        }
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, CallSite::Virtual { .. })
    }

    pub fn callers(&self) -> Vec<&MethodReference> {
        match self {
            CallSite::Direct { caller, .. } => vec![caller],
            CallSite::Virtual { callers, .. } => callers.iter().collect(),
        }
    }

    pub fn callees(&self) -> Vec<&MethodReference> {
        match self {
            CallSite::Direct { callee, .. } => vec![callee],
            CallSite::Virtual { callees, .. } => callees.iter().collect(),
        }
    }

    pub fn locations(&self) -> Vec<&TextLocation> {
        match self {
            CallSite::Direct { locations, .. } => locations.iter().collect(),
            CallSite::Virtual { locations, .. } => locations.iter().collect(),
        }
    }

    pub(crate) fn add_location(&mut self, location: TextLocation) {
        match self {
            CallSite::Direct { locations, .. } => {
                if !locations.contains(&location) {
                    locations.push(location);
                }
            }
            CallSite::Virtual { locations, .. } => {
                locations.insert(location);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldAccessSite {
    pub caller: MethodReference,
    pub field: FieldReference,
    pub location: Option<TextLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassAccessSite {
    pub caller: MethodReference,
    pub class_name: String,
    pub location: Option<TextLocation>,
}

/// Per-method call graph node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallGraphNode {
    pub method: MethodReference,
    /// Sites where this method calls out
    pub call_sites: Vec<CallSiteId>,
    /// Sites through which this method is called
    pub caller_call_sites: Vec<CallSiteId>,
    pub field_access_sites: IndexSet<FieldAccessSite>,
    pub class_access_sites: IndexSet<ClassAccessSite>,
}

impl CallGraphNode {
    pub fn new(method: MethodReference) -> Self {
        Self {
            method,
            call_sites: Vec::new(),
            caller_call_sites: Vec::new(),
            field_access_sites: IndexSet::new(),
            class_access_sites: IndexSet::new(),
        }
    }
}
