//! Class source used during analysis
//!
//! Wraps the input symbol table and overlays classes submitted while the analysis
//! runs (generated helpers, bodies given to native methods). Hierarchy lookups the
//! engine repeats for every propagated type are memoised here; any mutation
//! invalidates the memo tables.

use crate::features::class_model::domain::ClassInfo;
use crate::features::class_model::ports::ClassSource;
use crate::shared::models::{FieldReference, MethodReference};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

pub struct DependencyClassSource {
    inner: Box<dyn ClassSource>,
    generated: IndexMap<String, ClassInfo>,
    implementation_cache: FxHashMap<MethodReference, Option<MethodReference>>,
    method_cache: FxHashMap<MethodReference, Option<MethodReference>>,
    field_cache: FxHashMap<FieldReference, Option<FieldReference>>,
    subtype_cache: FxHashMap<(String, String), bool>,
}

impl DependencyClassSource {
    pub fn new(inner: Box<dyn ClassSource>) -> Self {
        Self {
            inner,
            generated: IndexMap::new(),
            implementation_cache: FxHashMap::default(),
            method_cache: FxHashMap::default(),
            field_cache: FxHashMap::default(),
            subtype_cache: FxHashMap::default(),
        }
    }

    /// Add a class created during analysis, replacing any earlier version
    pub fn submit(&mut self, cls: ClassInfo) {
        let cls = cls.normalized();
        self.generated.insert(cls.name.clone(), cls);
        self.invalidate();
    }

    /// Mutable access, copying the class out of the wrapped source on first write
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ClassInfo> {
        if !self.generated.contains_key(name) {
            let cls = self.inner.get(name)?.clone();
            self.generated.insert(name.to_string(), cls);
        }
        self.invalidate();
        self.generated.get_mut(name)
    }

    pub fn is_generated(&self, name: &str) -> bool {
        self.generated.contains_key(name) && self.inner.get(name).is_none()
    }

    /// Names of classes that exist only in the overlay
    pub fn generated_class_names(&self) -> Vec<String> {
        self.generated
            .keys()
            .filter(|name| self.inner.get(name).is_none())
            .cloned()
            .collect()
    }

    pub fn cached_implementation(&mut self, method: &MethodReference) -> Option<MethodReference> {
        if let Some(hit) = self.implementation_cache.get(method) {
            return hit.clone();
        }
        let resolved = self.resolve_implementation(method);
        self.implementation_cache.insert(method.clone(), resolved.clone());
        resolved
    }

    pub fn cached_method(&mut self, method: &MethodReference) -> Option<MethodReference> {
        if let Some(hit) = self.method_cache.get(method) {
            return hit.clone();
        }
        let resolved = self.resolve_method(method);
        self.method_cache.insert(method.clone(), resolved.clone());
        resolved
    }

    pub fn cached_field(&mut self, field: &FieldReference) -> Option<FieldReference> {
        if let Some(hit) = self.field_cache.get(field) {
            return hit.clone();
        }
        let resolved = self.resolve_field(field);
        self.field_cache.insert(field.clone(), resolved.clone());
        resolved
    }

    pub fn cached_is_super_type(&mut self, super_type: &str, sub_type: &str) -> bool {
        let key = (super_type.to_string(), sub_type.to_string());
        if let Some(hit) = self.subtype_cache.get(&key) {
            return *hit;
        }
        let result = self.is_super_type(super_type, sub_type);
        self.subtype_cache.insert(key, result);
        result
    }

    fn invalidate(&mut self) {
        self.implementation_cache.clear();
        self.method_cache.clear();
        self.field_cache.clear();
        self.subtype_cache.clear();
    }
}

impl ClassSource for DependencyClassSource {
    fn get(&self, name: &str) -> Option<&ClassInfo> {
        self.generated.get(name).or_else(|| self.inner.get(name))
    }

    fn class_names(&self) -> Vec<String> {
        let mut names = self.inner.class_names();
        names.extend(self.generated_class_names());
        names
    }
}

impl std::fmt::Debug for DependencyClassSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyClassSource")
            .field("generated", &self.generated.len())
            .finish_non_exhaustive()
    }
}
