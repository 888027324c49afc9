//! Class model domain types

use crate::features::program_model::Program;
use crate::shared::constants::classes;
use crate::shared::models::{FieldReference, MethodDescriptor, MethodReference, ValueType};
use serde::{Deserialize, Serialize};

/// Element modifiers relevant to dependency analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementModifier {
    Static,
    Abstract,
    Native,
    Synchronized,
    Interface,
    Final,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: ValueType,
    #[serde(default)]
    pub modifiers: Vec<ElementModifier>,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, field_type: ValueType) -> Self {
        Self {
            name: name.into(),
            field_type,
            modifiers: Vec::new(),
        }
    }

    pub fn has_modifier(&self, modifier: ElementModifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    #[serde(flatten)]
    pub descriptor: MethodDescriptor,
    #[serde(default)]
    pub modifiers: Vec<ElementModifier>,
    /// Absent for abstract and native methods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<Program>,
    /// Platform tags this method is unavailable on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unsupported_on: Vec<String>,
}

impl MethodInfo {
    pub fn new(descriptor: MethodDescriptor) -> Self {
        Self {
            descriptor,
            modifiers: Vec::new(),
            program: None,
            unsupported_on: Vec::new(),
        }
    }

    pub fn with_modifier(mut self, modifier: ElementModifier) -> Self {
        if !self.modifiers.contains(&modifier) {
            self.modifiers.push(modifier);
        }
        self
    }

    pub fn with_program(mut self, program: Program) -> Self {
        self.program = Some(program);
        self
    }

    pub fn has_modifier(&self, modifier: ElementModifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn remove_modifier(&mut self, modifier: ElementModifier) {
        self.modifiers.retain(|m| *m != modifier);
    }

    pub fn is_abstract(&self) -> bool {
        self.has_modifier(ElementModifier::Abstract)
    }

    pub fn is_static(&self) -> bool {
        self.has_modifier(ElementModifier::Static)
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    /// `None` only for the hierarchy root
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub modifiers: Vec<ElementModifier>,
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
    /// Platform tags this class is unavailable on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unsupported_on: Vec<String>,
}

impl ClassInfo {
    /// Class extending `java.lang.Object`
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let parent = (name != classes::OBJECT).then(|| classes::OBJECT.to_string());
        Self {
            name,
            parent,
            interfaces: Vec::new(),
            modifiers: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            unsupported_on: Vec::new(),
        }
    }

    /// Fill in the implicit `java.lang.Object` parent
    pub fn normalized(mut self) -> Self {
        if self.parent.is_none() && self.name != classes::OBJECT {
            self.parent = Some(classes::OBJECT.to_string());
        }
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_interface(mut self, iface: impl Into<String>) -> Self {
        self.interfaces.push(iface.into());
        self
    }

    pub fn with_modifier(mut self, modifier: ElementModifier) -> Self {
        if !self.modifiers.contains(&modifier) {
            self.modifiers.push(modifier);
        }
        self
    }

    pub fn with_field(mut self, field: FieldInfo) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: MethodInfo) -> Self {
        self.methods.push(method);
        self
    }

    pub fn has_modifier(&self, modifier: ElementModifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn is_interface(&self) -> bool {
        self.has_modifier(ElementModifier::Interface)
    }

    pub fn method(&self, descriptor: &MethodDescriptor) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| m.descriptor == *descriptor)
    }

    pub fn method_mut(&mut self, descriptor: &MethodDescriptor) -> Option<&mut MethodInfo> {
        self.methods.iter_mut().find(|m| m.descriptor == *descriptor)
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method_reference(&self, method: &MethodInfo) -> MethodReference {
        MethodReference::new(self.name.clone(), method.descriptor.clone())
    }

    pub fn field_reference(&self, field: &FieldInfo) -> FieldReference {
        FieldReference::new(self.name.clone(), field.name.clone())
    }

    /// Direct supertypes: parent first, then interfaces in declaration order
    pub fn supertypes(&self) -> impl Iterator<Item = &str> {
        self.parent
            .iter()
            .map(String::as_str)
            .chain(self.interfaces.iter().map(String::as_str))
    }

    pub fn is_unsupported_on(&self, tags: &[String]) -> bool {
        self.unsupported_on.iter().any(|t| tags.contains(t))
    }
}

impl MethodInfo {
    pub fn is_unsupported_on(&self, tags: &[String]) -> bool {
        self.unsupported_on.iter().any(|t| tags.contains(t))
    }
}
