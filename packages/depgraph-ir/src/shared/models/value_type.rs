//! Declared value types
//!
//! Two spellings are supported:
//! - **Source spelling** (`int`, `java.lang.String`, `java.lang.String[][]`) used by
//!   serialized class models, `Display` and `FromStr`.
//! - **Dependency type names** used by the type registry: plain class names for objects,
//!   descriptor form for arrays and primitives (`[Ljava.lang.String;`, `[I`, `I`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Primitive value kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    /// Single-letter descriptor
    pub fn descriptor(&self) -> char {
        match self {
            Self::Boolean => 'Z',
            Self::Byte => 'B',
            Self::Char => 'C',
            Self::Short => 'S',
            Self::Int => 'I',
            Self::Long => 'J',
            Self::Float => 'F',
            Self::Double => 'D',
        }
    }

    pub fn from_descriptor(c: char) -> Option<Self> {
        Some(match c {
            'Z' => Self::Boolean,
            'B' => Self::Byte,
            'C' => Self::Char,
            'S' => Self::Short,
            'I' => Self::Int,
            'J' => Self::Long,
            'F' => Self::Float,
            'D' => Self::Double,
            _ => return None,
        })
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        Some(match s {
            "boolean" => Self::Boolean,
            "byte" => Self::Byte,
            "char" => Self::Char,
            "short" => Self::Short,
            "int" => Self::Int,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            _ => return None,
        })
    }
}

/// Declared type of a value, field, parameter or method result
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ValueType {
    Void,
    Primitive(PrimitiveType),
    Object(String),
    Array(Box<ValueType>),
}

impl PartialOrd for PrimitiveType {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PrimitiveType {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.descriptor().cmp(&other.descriptor())
    }
}

impl ValueType {
    pub fn object(class_name: impl Into<String>) -> Self {
        ValueType::Object(class_name.into())
    }

    pub fn array(item: ValueType) -> Self {
        ValueType::Array(Box::new(item))
    }

    pub fn is_object(&self, class_name: &str) -> bool {
        matches!(self, ValueType::Object(name) if name == class_name)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ValueType::Array(_))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, ValueType::Primitive(_))
    }

    /// Object or array: values that can carry dependency types
    pub fn is_reference(&self) -> bool {
        matches!(self, ValueType::Object(_) | ValueType::Array(_))
    }

    pub fn item_type(&self) -> Option<&ValueType> {
        match self {
            ValueType::Array(item) => Some(item),
            _ => None,
        }
    }

    /// Innermost element type after stripping every array dimension
    pub fn innermost(&self) -> &ValueType {
        let mut current = self;
        while let ValueType::Array(item) = current {
            current = item;
        }
        current
    }

    /// Class name of the innermost element, if it is an object type
    pub fn innermost_class(&self) -> Option<&str> {
        match self.innermost() {
            ValueType::Object(name) => Some(name),
            _ => None,
        }
    }

    /// Descriptor form: `V`, `I`, `Ljava.lang.String;`, `[I`
    pub fn descriptor(&self) -> String {
        let mut out = String::new();
        self.write_descriptor(&mut out);
        out
    }

    fn write_descriptor(&self, out: &mut String) {
        match self {
            ValueType::Void => out.push('V'),
            ValueType::Primitive(p) => out.push(p.descriptor()),
            ValueType::Object(name) => {
                out.push('L');
                out.push_str(name);
                out.push(';');
            }
            ValueType::Array(item) => {
                out.push('[');
                item.write_descriptor(out);
            }
        }
    }

    /// Name of the dependency type that instances of this type carry
    pub fn type_name(&self) -> String {
        match self {
            ValueType::Object(name) => name.clone(),
            other => other.descriptor(),
        }
    }

    /// Inverse of [`ValueType::type_name`]
    pub fn from_type_name(name: &str) -> ValueType {
        if name.starts_with('[') {
            if let Some((ty, rest)) = Self::parse_descriptor(name) {
                if rest.is_empty() {
                    return ty;
                }
            }
        }
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(p) = PrimitiveType::from_descriptor(c) {
                return ValueType::Primitive(p);
            }
        }
        ValueType::Object(name.to_string())
    }

    /// Parse one descriptor from the front of `s`, returning the remainder
    pub fn parse_descriptor(s: &str) -> Option<(ValueType, &str)> {
        let mut chars = s.chars();
        let first = chars.next()?;
        match first {
            'V' => Some((ValueType::Void, &s[1..])),
            '[' => {
                let (item, rest) = Self::parse_descriptor(&s[1..])?;
                Some((ValueType::array(item), rest))
            }
            'L' => {
                let end = s.find(';')?;
                Some((ValueType::Object(s[1..end].to_string()), &s[end + 1..]))
            }
            c => PrimitiveType::from_descriptor(c).map(|p| (ValueType::Primitive(p), &s[1..])),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Void => write!(f, "void"),
            ValueType::Primitive(p) => write!(f, "{}", p.keyword()),
            ValueType::Object(name) => write!(f, "{}", name),
            ValueType::Array(item) => write!(f, "{}[]", item),
        }
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty type name".to_string());
        }
        if let Some(base) = s.strip_suffix("[]") {
            return Ok(ValueType::array(base.parse()?));
        }
        if s == "void" {
            return Ok(ValueType::Void);
        }
        if let Some(p) = PrimitiveType::from_keyword(s) {
            return Ok(ValueType::Primitive(p));
        }
        if s.contains(|c: char| c.is_whitespace() || c == '[' || c == ']') {
            return Err(format!("malformed type name '{}'", s));
        }
        Ok(ValueType::Object(s.to_string()))
    }
}

impl TryFrom<String> for ValueType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ValueType> for String {
    fn from(value: ValueType) -> Self {
        value.to_string()
    }
}
