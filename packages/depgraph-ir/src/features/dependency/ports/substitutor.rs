//! Dynamic call site substitution

use crate::features::program_model::{BootstrapArgument, ProgramEmitter, Variable};
use crate::shared::models::{MethodDescriptor, MethodReference};

/// A dynamic call site handed to a substitutor
#[derive(Debug, Clone)]
pub struct DynamicCallSite {
    pub caller: MethodReference,
    pub method: MethodDescriptor,
    pub instance: Option<Variable>,
    pub arguments: Vec<Variable>,
    pub bootstrap_method: MethodReference,
    pub bootstrap_arguments: Vec<BootstrapArgument>,
}

/// Replaces a dynamic call site with ordinary instructions.
///
/// The emitter is positioned where the call was; the returned variable, if any,
/// is assigned to the call's receiver.
pub trait BootstrapMethodSubstitutor {
    fn substitute(
        &self,
        call_site: &DynamicCallSite,
        emitter: &mut ProgramEmitter<'_>,
    ) -> Option<Variable>;
}

impl<F> BootstrapMethodSubstitutor for F
where
    F: Fn(&DynamicCallSite, &mut ProgramEmitter<'_>) -> Option<Variable>,
{
    fn substitute(
        &self,
        call_site: &DynamicCallSite,
        emitter: &mut ProgramEmitter<'_>,
    ) -> Option<Variable> {
        self(call_site, emitter)
    }
}
