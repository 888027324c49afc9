//! Shared models

mod location;
mod references;
mod value_type;

pub use location::{CallLocation, TextLocation};
pub use references::{FieldReference, MethodDescriptor, MethodReference};
pub use value_type::{PrimitiveType, ValueType};
