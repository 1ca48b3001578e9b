//! Single-store elimination for function-local variables.
//!
//! A `Function`-storage variable that is written exactly once carries no
//! state worth keeping at its whole-value loads: every load the write
//! dominates can use the stored value directly. A declaration initializer
//! counts as the one write, at the declaration site. After rewriting, the
//! store, the variable and their debug names are removed when nothing else
//! references the variable.
//!
//! Partial accesses through `OpAccessChain`/`OpCopyObject`-derived pointers
//! do not disqualify the variable: its direct whole-value loads are still
//! folded, the partial accesses themselves are left untouched, and they keep
//! the variable, its store and its name alive. A write or escape through a
//! derived pointer does disqualify it — the single store would no longer
//! describe the variable's whole content.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::context::IrContext;
use crate::module::InstId;
use crate::passes::{Pass, PassStatus};
use crate::spirv::Opcode;
use crate::Result;

/// Replaces loads of single-store local variables with the stored value.
#[derive(Debug, Default)]
pub struct LocalSingleStoreElimPass;

impl LocalSingleStoreElimPass {
    /// Creates the pass.
    #[must_use]
    pub fn new() -> Self {
        LocalSingleStoreElimPass
    }
}

impl Pass for LocalSingleStoreElimPass {
    fn name(&self) -> &'static str {
        "local-single-store-elim"
    }

    fn description(&self) -> &'static str {
        "Rewrites loads of locals with exactly one dominating store"
    }

    fn run(&mut self, ctx: &mut IrContext) -> Result<PassStatus> {
        let mut modified = false;
        for index in 0..ctx.module().functions().len() {
            modified |= process_function(ctx, index);
        }
        Ok(if modified {
            PassStatus::SuccessChanged
        } else {
            PassStatus::SuccessNoChange
        })
    }
}

fn process_function(ctx: &mut IrContext, function_index: usize) -> bool {
    let dominators = ctx.dominators(function_index);

    // Block index and position of every body instruction, for the
    // same-block ordering test.
    let mut position: FxHashMap<InstId, (usize, usize)> = FxHashMap::default();
    let mut variables = Vec::new();
    for (block_index, block) in ctx.module().function(function_index).blocks().iter().enumerate() {
        for (offset, inst_id) in block.instructions(ctx.module()).enumerate() {
            position.insert(inst_id, (block_index, offset));
            if ctx.module().inst(inst_id).opcode() == Opcode::Variable {
                variables.push(inst_id);
            }
        }
    }

    let mut modified = false;
    'variables: for var_inst in variables {
        let var = ctx.module().inst(var_inst);
        let Some(var_id) = var.result_id() else {
            continue;
        };
        // An initializer is an implicit store at the declaration site.
        let initializer = var.input_id(1);

        let mut stores = Vec::new();
        let mut loads = Vec::new();
        let mut partial_reads = false;
        let mut seen = FxHashSet::default();
        for user in ctx.users_snapshot(var_id) {
            if !seen.insert(user) {
                continue;
            }
            let opcode = ctx.module().inst(user).opcode();
            match opcode {
                Opcode::Store => {
                    // The variable must be the pointer, never the value.
                    let inst = ctx.module().inst(user);
                    if inst.input_id(0) != Some(var_id) || inst.input_id(1) == Some(var_id) {
                        continue 'variables;
                    }
                    stores.push(user);
                }
                Opcode::Load => loads.push(user),
                // Derived pointers are fine as long as everything behind
                // them only reads; they keep the variable alive below.
                Opcode::AccessChain
                | Opcode::InBoundsAccessChain
                | Opcode::PtrAccessChain
                | Opcode::InBoundsPtrAccessChain
                | Opcode::CopyObject => {
                    let derived = ctx.module().inst(user).result_id();
                    match derived {
                        Some(derived) if only_read_through(ctx, derived) => {
                            partial_reads = true;
                        }
                        _ => continue 'variables,
                    }
                }
                opcode if opcode.is_annotation() || opcode.is_debug() => {}
                _ => continue 'variables,
            }
        }

        // Exactly one write: a single explicit store, or the initializer.
        let (store, value_id, store_position) = match (stores.as_slice(), initializer) {
            (&[store], None) => {
                let Some(value) = ctx.module().inst(store).input_id(1) else {
                    continue;
                };
                let Some(&pos) = position.get(&store) else {
                    continue;
                };
                (Some(store), value, pos)
            }
            (&[], Some(init)) => {
                let Some(&pos) = position.get(&var_inst) else {
                    continue;
                };
                (None, init, pos)
            }
            _ => continue,
        };

        let (store_block, store_offset) = store_position;
        for &load in &loads {
            let Some(&(load_block, load_offset)) = position.get(&load) else {
                continue 'variables;
            };
            let dominated = if store_block == load_block {
                store_offset < load_offset
            } else {
                dominators.dominates(store_block, load_block)
            };
            if !dominated {
                continue 'variables;
            }
        }

        for &load in &loads {
            if let Some(load_result) = ctx.module().inst(load).result_id() {
                ctx.replace_all_uses_with(load_result, value_id);
            }
            ctx.kill_inst(load);
        }
        if !loads.is_empty() {
            modified = true;
        }

        // The store and the declaration go only when nothing still reads
        // the variable's memory.
        if partial_reads {
            continue;
        }
        if let Some(store) = store {
            ctx.kill_inst(store);
        }
        for user in ctx.users_snapshot(var_id) {
            let opcode = ctx.module().inst(user).opcode();
            if opcode.is_annotation() || opcode.is_debug() {
                ctx.kill_inst(user);
            }
        }
        if ctx.num_users(var_id) == 0 {
            ctx.kill_inst(var_inst);
        }
        modified = true;
    }

    modified
}

/// Whether every transitive user of a derived pointer only reads through it.
fn only_read_through(ctx: &mut IrContext, ptr_id: crate::Id) -> bool {
    for user in ctx.users_snapshot(ptr_id) {
        let opcode = ctx.module().inst(user).opcode();
        match opcode {
            Opcode::Load => {}
            Opcode::AccessChain
            | Opcode::InBoundsAccessChain
            | Opcode::PtrAccessChain
            | Opcode::InBoundsPtrAccessChain
            | Opcode::CopyObject => {
                let derived = ctx.module().inst(user).result_id();
                match derived {
                    Some(derived) => {
                        if !only_read_through(ctx, derived) {
                            return false;
                        }
                    }
                    None => return false,
                }
            }
            opcode if opcode.is_annotation() || opcode.is_debug() => {}
            _ => return false,
        }
    }
    true
}
