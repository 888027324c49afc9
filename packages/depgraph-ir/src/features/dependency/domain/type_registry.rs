//! Interned dependency types
//!
//! Every type name that reaches a node gets a dense index; type sets store
//! indices only.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense index of an interned type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeIndex(pub u32);

impl TypeIndex {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct DependencyType {
    pub name: String,
    pub index: TypeIndex,
    /// Set once a reachable class names this type as a supertype
    pub has_known_subtype: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: Vec<DependencyType>,
    by_name: FxHashMap<String, TypeIndex>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `name`, interning it on first use
    pub fn intern(&mut self, name: &str) -> TypeIndex {
        if let Some(index) = self.by_name.get(name) {
            return *index;
        }
        let index = TypeIndex(self.types.len() as u32);
        self.types.push(DependencyType {
            name: name.to_string(),
            index,
            has_known_subtype: false,
        });
        self.by_name.insert(name.to_string(), index);
        index
    }

    pub fn lookup(&self, name: &str) -> Option<TypeIndex> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, index: TypeIndex) -> &DependencyType {
        &self.types[index.index()]
    }

    pub fn name(&self, index: TypeIndex) -> &str {
        &self.types[index.index()].name
    }

    pub fn is_array(&self, index: TypeIndex) -> bool {
        self.name(index).starts_with('[')
    }

    pub fn mark_has_known_subtype(&mut self, index: TypeIndex) {
        self.types[index.index()].has_known_subtype = true;
    }

    pub fn has_known_subtype(&self, index: TypeIndex) -> bool {
        self.types[index.index()].has_known_subtype
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DependencyType> {
        self.types.iter()
    }
}
