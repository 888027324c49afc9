//! Ports (Interfaces) for the class model
//!
//! [`ClassSource`] is the symbol table the analyzer reads class, method and field
//! declarations from. Implementors only provide lookup; hierarchy queries are
//! provided methods built on top of it.

use crate::features::class_model::domain::{ClassInfo, FieldInfo, MethodInfo};
use crate::shared::constants::classes;
use crate::shared::models::{FieldReference, MethodDescriptor, MethodReference, ValueType};
use rustc_hash::FxHashSet;

/// Symbol table lookup
pub trait ClassSource {
    /// Class by fully qualified name
    fn get(&self, name: &str) -> Option<&ClassInfo>;

    /// Every class name this source knows, in a stable order
    fn class_names(&self) -> Vec<String>;

    /// Declared method, without hierarchy lookup
    fn get_method(&self, method: &MethodReference) -> Option<&MethodInfo> {
        self.get(&method.class_name)?.method(&method.descriptor)
    }

    /// Declared field, without hierarchy lookup
    fn get_field(&self, field: &FieldReference) -> Option<&FieldInfo> {
        self.get(&field.class_name)?.field(&field.field_name)
    }

    /// Class followed by its parent chain, root last
    fn parent_chain(&self, name: &str) -> Vec<&ClassInfo> {
        let mut chain = Vec::new();
        let mut seen = FxHashSet::default();
        let mut current = self.get(name);
        while let Some(cls) = current {
            if !seen.insert(cls.name.as_str()) {
                break;
            }
            chain.push(cls);
            current = cls.parent.as_deref().and_then(|p| self.get(p));
        }
        chain
    }

    /// Every interface implemented by the class or its parents, transitively
    fn all_interfaces(&self, name: &str) -> Vec<&ClassInfo> {
        let mut result = Vec::new();
        let mut seen = FxHashSet::default();
        let mut stack: Vec<&str> = Vec::new();
        for cls in self.parent_chain(name) {
            stack.extend(cls.interfaces.iter().rev().map(String::as_str));
            while let Some(iface) = stack.pop() {
                if !seen.insert(iface) {
                    continue;
                }
                if let Some(iface_cls) = self.get(iface) {
                    result.push(iface_cls);
                    stack.extend(iface_cls.interfaces.iter().rev().map(String::as_str));
                }
            }
        }
        result
    }

    /// Declaration a call to `method` binds to: the parent chain first, then
    /// interfaces, where non-abstract (default) methods win over abstract ones
    fn resolve_method(&self, method: &MethodReference) -> Option<MethodReference> {
        for cls in self.parent_chain(&method.class_name) {
            if let Some(m) = cls.method(&method.descriptor) {
                return Some(cls.method_reference(m));
            }
        }
        let mut abstract_candidate = None;
        for iface in self.all_interfaces(&method.class_name) {
            if let Some(m) = iface.method(&method.descriptor) {
                if !m.is_abstract() {
                    return Some(iface.method_reference(m));
                }
                if abstract_candidate.is_none() {
                    abstract_candidate = Some(iface.method_reference(m));
                }
            }
        }
        abstract_candidate
    }

    /// Most specific non-abstract method that runs when `method` is invoked on an
    /// instance of exactly `method.class_name`; falls back to [`Self::resolve_method`]
    fn resolve_implementation(&self, method: &MethodReference) -> Option<MethodReference> {
        let mut visited = FxHashSet::default();
        resolve_implementation_in(self, &method.class_name, &method.descriptor, &mut visited)
            .or_else(|| self.resolve_method(method))
    }

    /// Field declaration visible from `field.class_name`
    fn resolve_field(&self, field: &FieldReference) -> Option<FieldReference> {
        for cls in self.parent_chain(&field.class_name) {
            if let Some(f) = cls.field(&field.field_name) {
                return Some(cls.field_reference(f));
            }
        }
        for iface in self.all_interfaces(&field.class_name) {
            if let Some(f) = iface.field(&field.field_name) {
                return Some(iface.field_reference(f));
            }
        }
        None
    }

    /// Whether `sub_type` is `super_type` or one of its subtypes.
    ///
    /// Both arguments are dependency type names: plain class names or array
    /// descriptors (`[La.B;`). Arrays are covariant in their element type and
    /// every reference type is a subtype of `java.lang.Object`. Unknown classes
    /// are subtypes of nothing but themselves and the root.
    fn is_super_type(&self, super_type: &str, sub_type: &str) -> bool {
        if super_type == sub_type {
            return true;
        }
        let sub = ValueType::from_type_name(sub_type);
        if sub.is_primitive() {
            return false;
        }
        if super_type == classes::OBJECT {
            return true;
        }
        let sup = ValueType::from_type_name(super_type);
        match (&sup, &sub) {
            (ValueType::Array(sup_item), ValueType::Array(sub_item)) => {
                if sup_item.is_reference() && sub_item.is_reference() {
                    self.is_super_type(&sup_item.type_name(), &sub_item.type_name())
                } else {
                    sup_item == sub_item
                }
            }
            (ValueType::Object(_), ValueType::Object(sub_name)) => {
                let mut visited = FxHashSet::default();
                let mut stack = vec![sub_name.as_str()];
                while let Some(name) = stack.pop() {
                    if !visited.insert(name) {
                        continue;
                    }
                    let Some(cls) = self.get(name) else {
                        continue;
                    };
                    for parent in cls.supertypes() {
                        if parent == super_type {
                            return true;
                        }
                        stack.push(parent);
                    }
                }
                false
            }
            _ => false,
        }
    }

    /// Non-abstract redeclarations of `method` in proper subtypes of its owner
    fn overridden_methods(&self, method: &MethodReference) -> Vec<MethodReference> {
        let mut result = Vec::new();
        for name in self.class_names() {
            if name == method.class_name || !self.is_super_type(&method.class_name, &name) {
                continue;
            }
            if let Some(cls) = self.get(&name) {
                if let Some(m) = cls.method(&method.descriptor) {
                    if !m.is_abstract() {
                        result.push(cls.method_reference(m));
                    }
                }
            }
        }
        result
    }
}

fn resolve_implementation_in<S: ClassSource + ?Sized>(
    source: &S,
    class_name: &str,
    descriptor: &MethodDescriptor,
    visited: &mut FxHashSet<String>,
) -> Option<MethodReference> {
    if !visited.insert(class_name.to_string()) {
        return None;
    }
    let cls = source.get(class_name)?;
    if let Some(m) = cls.method(descriptor) {
        if !m.is_abstract() {
            return Some(cls.method_reference(m));
        }
    }
    let mut most_specific: Option<MethodReference> = None;
    for sup in cls.supertypes() {
        if let Some(found) = resolve_implementation_in(source, sup, descriptor, visited) {
            let more_specific = match &most_specific {
                None => true,
                Some(current) => source.is_super_type(&current.class_name, &found.class_name),
            };
            if more_specific {
                most_specific = Some(found);
            }
        }
    }
    most_specific
}
