//! Decoded instructions
//!
//! Only the instruction kinds that move references around are modeled;
//! arithmetic and branching are irrelevant to a flow-insensitive type analysis.

use crate::shared::models::{FieldReference, MethodDescriptor, MethodReference, TextLocation, ValueType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Program variable (SSA-style register)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variable(pub u32);

impl Variable {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// How a call is dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationType {
    /// Statically bound: static, constructor, private and super calls
    Special,
    /// Dispatched on the receiver's runtime type
    Virtual,
}

/// Constant operand of a dynamic call site's bootstrap method
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapArgument {
    Int(i64),
    String(String),
    Type(ValueType),
    Method(MethodReference),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    /// Debug location of the following instructions
    Location {
        location: Option<TextLocation>,
    },
    ClassConstant {
        receiver: Variable,
        constant: ValueType,
    },
    StringConstant {
        receiver: Variable,
        value: String,
    },
    NullConstant {
        receiver: Variable,
    },
    Assign {
        receiver: Variable,
        assignee: Variable,
    },
    Cast {
        receiver: Variable,
        value: Variable,
        target_type: ValueType,
    },
    Exit {
        #[serde(default)]
        value: Option<Variable>,
    },
    Raise {
        exception: Variable,
    },
    CreateArray {
        receiver: Variable,
        item_type: ValueType,
        size: Variable,
    },
    /// `array_type` is the type of the created value, one array level per dimension
    CreateMultiArray {
        receiver: Variable,
        array_type: ValueType,
        dimensions: Vec<Variable>,
    },
    Create {
        receiver: Variable,
        class_name: String,
    },
    GetField {
        receiver: Variable,
        #[serde(default)]
        instance: Option<Variable>,
        field: FieldReference,
        field_type: ValueType,
    },
    PutField {
        #[serde(default)]
        instance: Option<Variable>,
        field: FieldReference,
        value: Variable,
        field_type: ValueType,
    },
    CloneArray {
        receiver: Variable,
        array: Variable,
    },
    UnwrapArray {
        receiver: Variable,
        array: Variable,
    },
    GetElement {
        receiver: Variable,
        array: Variable,
        index: Variable,
    },
    PutElement {
        array: Variable,
        index: Variable,
        value: Variable,
    },
    Invoke {
        #[serde(default)]
        receiver: Option<Variable>,
        #[serde(default)]
        instance: Option<Variable>,
        method: MethodReference,
        #[serde(default)]
        arguments: Vec<Variable>,
        invocation: InvocationType,
    },
    InvokeDynamic {
        #[serde(default)]
        receiver: Option<Variable>,
        #[serde(default)]
        instance: Option<Variable>,
        method: MethodDescriptor,
        #[serde(default)]
        arguments: Vec<Variable>,
        bootstrap_method: MethodReference,
        #[serde(default)]
        bootstrap_arguments: Vec<BootstrapArgument>,
    },
    IsInstance {
        receiver: Variable,
        value: Variable,
        checked_type: ValueType,
    },
    InitClass {
        class_name: String,
    },
    NullCheck {
        receiver: Variable,
        value: Variable,
    },
    MonitorEnter {
        object: Variable,
    },
    MonitorExit {
        object: Variable,
    },
    /// Unconditional transfer to another block
    Jump {
        target: usize,
    },
}

impl Instruction {
    /// Variable written by this instruction, if any
    pub fn receiver(&self) -> Option<Variable> {
        match self {
            Instruction::ClassConstant { receiver, .. }
            | Instruction::StringConstant { receiver, .. }
            | Instruction::NullConstant { receiver }
            | Instruction::Assign { receiver, .. }
            | Instruction::Cast { receiver, .. }
            | Instruction::CreateArray { receiver, .. }
            | Instruction::CreateMultiArray { receiver, .. }
            | Instruction::Create { receiver, .. }
            | Instruction::GetField { receiver, .. }
            | Instruction::CloneArray { receiver, .. }
            | Instruction::UnwrapArray { receiver, .. }
            | Instruction::GetElement { receiver, .. }
            | Instruction::IsInstance { receiver, .. }
            | Instruction::NullCheck { receiver, .. } => Some(*receiver),
            Instruction::Invoke { receiver, .. } | Instruction::InvokeDynamic { receiver, .. } => {
                *receiver
            }
            _ => None,
        }
    }
}
