//! Symbol references: methods, fields and their descriptors

use super::value_type::ValueType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Method name plus parameter and result types
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ValueType>,
    #[serde(default = "void")]
    pub result: ValueType,
}

fn void() -> ValueType {
    ValueType::Void
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>, parameters: Vec<ValueType>, result: ValueType) -> Self {
        Self {
            name: name.into(),
            parameters,
            result,
        }
    }

    /// `name()V`-style descriptor with no parameters
    pub fn void(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new(), ValueType::Void)
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn parameter_type(&self, index: usize) -> Option<&ValueType> {
        self.parameters.get(index)
    }

    /// JVM-like signature: `(Ljava.lang.Object;I)V`
    pub fn signature(&self) -> String {
        let mut out = String::from("(");
        for param in &self.parameters {
            out.push_str(&param.descriptor());
        }
        out.push(')');
        out.push_str(&self.result.descriptor());
        out
    }

    /// Parse `name(params)result` in descriptor spelling
    pub fn parse(text: &str) -> Option<Self> {
        let open = text.find('(')?;
        let close = text.rfind(')')?;
        if close < open {
            return None;
        }
        let name = &text[..open];
        let mut rest = &text[open + 1..close];
        let mut parameters = Vec::new();
        while !rest.is_empty() {
            let (ty, tail) = ValueType::parse_descriptor(rest)?;
            if ty == ValueType::Void {
                return None;
            }
            parameters.push(ty);
            rest = tail;
        }
        let (result, tail) = ValueType::parse_descriptor(&text[close + 1..])?;
        if !tail.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(name, parameters, result))
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.signature())
    }
}

/// Fully qualified method: owner class plus descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodReference {
    pub class_name: String,
    pub descriptor: MethodDescriptor,
}

impl MethodReference {
    pub fn new(class_name: impl Into<String>, descriptor: MethodDescriptor) -> Self {
        Self {
            class_name: class_name.into(),
            descriptor,
        }
    }

    pub fn of(
        class_name: impl Into<String>,
        name: impl Into<String>,
        parameters: Vec<ValueType>,
        result: ValueType,
    ) -> Self {
        Self::new(class_name, MethodDescriptor::new(name, parameters, result))
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn parameter_count(&self) -> usize {
        self.descriptor.parameter_count()
    }

    pub fn parameter_types(&self) -> &[ValueType] {
        &self.descriptor.parameters
    }

    pub fn result_type(&self) -> &ValueType {
        &self.descriptor.result
    }

    /// Same descriptor on a different owner
    pub fn with_class(&self, class_name: impl Into<String>) -> Self {
        Self::new(class_name, self.descriptor.clone())
    }
}

impl fmt::Display for MethodReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class_name, self.descriptor)
    }
}

impl FromStr for MethodReference {
    type Err = String;

    /// `pkg.Owner.name(Ljava.lang.String;)V`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let open = s
            .find('(')
            .ok_or_else(|| format!("missing '(' in method reference '{}'", s))?;
        let dot = s[..open]
            .rfind('.')
            .ok_or_else(|| format!("missing owner class in method reference '{}'", s))?;
        let descriptor = MethodDescriptor::parse(&s[dot + 1..])
            .ok_or_else(|| format!("malformed method descriptor in '{}'", s))?;
        Ok(Self::new(&s[..dot], descriptor))
    }
}

/// Fully qualified field
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldReference {
    pub class_name: String,
    pub field_name: String,
}

impl FieldReference {
    pub fn new(class_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            field_name: field_name.into(),
        }
    }
}

impl fmt::Display for FieldReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class_name, self.field_name)
    }
}
