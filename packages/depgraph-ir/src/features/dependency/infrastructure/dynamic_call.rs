//! Dynamic call site substitution
//!
//! Runs over a method body before its graph is built. Each `InvokeDynamic` is
//! handed to the substitutor registered for its bootstrap method: the block is
//! split after the call, the substitutor emits replacement code at the end of
//! the first half, and a jump continues into the second half. Call sites with
//! no substitutor are reported and replaced by a null constant.

use crate::features::dependency::application::DependencyAnalyzer;
use crate::features::dependency::ports::DynamicCallSite;
use crate::features::program_model::{Instruction, Program, ProgramEmitter};
use crate::shared::models::{CallLocation, MethodReference, TextLocation};
use tracing::{debug, warn};

impl DependencyAnalyzer {
    /// Rewrite every dynamic call site of `program`; returns whether anything changed
    pub(crate) fn process_invoke_dynamic(
        &mut self,
        caller: &MethodReference,
        program: &mut Program,
    ) -> bool {
        let mut changed = false;
        let mut block = 0;
        while block < program.blocks.len() {
            let mut location: Option<TextLocation> = None;
            let mut index = 0;
            while index < program.blocks[block].instructions.len() {
                let is_dynamic = match &program.blocks[block].instructions[index] {
                    Instruction::Location { location: at } => {
                        location = at.clone();
                        false
                    }
                    Instruction::InvokeDynamic { .. } => true,
                    _ => false,
                };
                if !is_dynamic {
                    index += 1;
                    continue;
                }
                changed = true;
                match self.substitute_call(caller, program, block, index, &location) {
                    Rewrite::Split => break,
                    Rewrite::Replaced => index += 1,
                    Rewrite::Removed => {}
                }
            }
            block += 1;
        }
        changed
    }

    /// Replace the dynamic call at `block[index]`
    fn substitute_call(
        &mut self,
        caller: &MethodReference,
        program: &mut Program,
        block: usize,
        index: usize,
        location: &Option<TextLocation>,
    ) -> Rewrite {
        let Instruction::InvokeDynamic {
            receiver,
            instance,
            method,
            arguments,
            bootstrap_method,
            bootstrap_arguments,
        } = program.blocks[block].instructions[index].clone()
        else {
            return Rewrite::Replaced;
        };

        let Some(substitutor) = self.substitutors.get(&bootstrap_method) else {
            let instructions = &mut program.blocks[block].instructions;
            let rewrite = match receiver {
                Some(receiver) => {
                    instructions[index] = Instruction::NullConstant { receiver };
                    Rewrite::Replaced
                }
                None => {
                    instructions.remove(index);
                    Rewrite::Removed
                }
            };
            warn!(bootstrap_method = %bootstrap_method, caller = %caller, "No substitutor for dynamic call site");
            self.diagnostics.error(
                CallLocation::new(caller.clone(), location.clone()),
                format!(
                    "Substitutor for bootstrap method {} was not found",
                    bootstrap_method
                ),
            );
            return rewrite;
        };

        let split = split_block(program, block, index, location);
        let call_site = DynamicCallSite {
            caller: caller.clone(),
            method,
            instance,
            arguments,
            bootstrap_method,
            bootstrap_arguments,
        };

        let mut emitter = ProgramEmitter::new(program, block);
        emitter.set_location(location.clone());
        let result = substitutor.substitute(&call_site, &mut emitter);
        if let (Some(receiver), Some(result)) = (receiver, result) {
            emitter.assign(receiver, result);
        }
        emitter.jump(split);

        debug!(
            caller = %caller,
            bootstrap_method = %call_site.bootstrap_method,
            "Dynamic call site substituted"
        );
        Rewrite::Split
    }
}

/// What happened to a dynamic call site
enum Rewrite {
    /// The rest of the block moved to a new one
    Split,
    Replaced,
    Removed,
}

/// Move everything after `block[index]` into a new block, dropping the
/// instruction at `index`; returns the new block
fn split_block(
    program: &mut Program,
    block: usize,
    index: usize,
    location: &Option<TextLocation>,
) -> usize {
    let tail = program.blocks[block].instructions.split_off(index + 1);
    program.blocks[block].instructions.truncate(index);
    let try_catches = program.blocks[block].try_catches.clone();

    let split = program.create_block();
    let target = &mut program.blocks[split];
    if location.is_some() {
        target.instructions.push(Instruction::Location {
            location: location.clone(),
        });
    }
    target.instructions.extend(tail);
    target.try_catches = try_catches;

    // control leaving the old block now leaves from the split one
    for (i, other) in program.blocks.iter_mut().enumerate() {
        if i == split {
            continue;
        }
        for phi in &mut other.phis {
            for incoming in &mut phi.incomings {
                if incoming.source == block {
                    incoming.source = split;
                }
            }
        }
    }
    split
}
