//! Declared-type filters
//!
//! A filter answers "is this type the filter class or one of its subtypes".
//! Filters are interned per class name and memoise their answers per type.

use super::type_registry::TypeIndex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterId(pub u32);

impl FilterId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct SuperClassFilter {
    /// Dependency type name of the bound: a class name or an array descriptor
    pub super_class: String,
    pub(crate) super_type: TypeIndex,
    pub(crate) cache: FxHashMap<TypeIndex, bool>,
}

impl SuperClassFilter {
    pub fn new(super_class: impl Into<String>, super_type: TypeIndex) -> Self {
        Self {
            super_class: super_class.into(),
            super_type,
            cache: FxHashMap::default(),
        }
    }

    pub fn cached(&self, ty: TypeIndex) -> Option<bool> {
        if ty == self.super_type {
            return Some(true);
        }
        self.cache.get(&ty).copied()
    }
}
