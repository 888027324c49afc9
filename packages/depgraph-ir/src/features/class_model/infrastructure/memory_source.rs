//! In-memory symbol table, loadable from JSON

use crate::errors::Result;
use crate::features::class_model::domain::ClassInfo;
use crate::features::class_model::ports::ClassSource;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serialized class model: the input format of the `depgraph` CLI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassModel {
    #[serde(default)]
    pub classes: Vec<ClassInfo>,
}

/// Class source backed by an insertion-ordered map
#[derive(Debug, Clone, Default)]
pub struct InMemoryClassSource {
    classes: IndexMap<String, ClassInfo>,
}

impl InMemoryClassSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_classes(classes: impl IntoIterator<Item = ClassInfo>) -> Self {
        let mut source = Self::new();
        for cls in classes {
            source.add(cls);
        }
        source
    }

    pub fn from_model(model: ClassModel) -> Self {
        Self::from_classes(model.classes)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let model: ClassModel = serde_json::from_str(json)?;
        Ok(Self::from_model(model))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Add or replace a class
    pub fn add(&mut self, cls: ClassInfo) {
        let cls = cls.normalized();
        self.classes.insert(cls.name.clone(), cls);
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn to_model(&self) -> ClassModel {
        ClassModel {
            classes: self.classes.values().cloned().collect(),
        }
    }
}

impl ClassSource for InMemoryClassSource {
    fn get(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    fn class_names(&self) -> Vec<String> {
        self.classes.keys().cloned().collect()
    }
}
