//! Unreachable-block removal.
//!
//! The dead-code kill phase intentionally strands blocks: when a whole
//! structured construct dies, its header is rewired straight to the merge
//! block and the construct body becomes unreachable. This pass removes such
//! blocks, pruning phi operands that referenced them first so the def/use
//! invariants keep holding.

use rustc_hash::FxHashSet;

use crate::analysis::Cfg;
use crate::context::IrContext;
use crate::passes::{Pass, PassStatus};
use crate::spirv::Opcode;
use crate::Result;

/// Removes blocks unreachable from each function's entry.
#[derive(Debug, Default)]
pub struct CfgCleanupPass;

impl CfgCleanupPass {
    /// Creates the pass.
    #[must_use]
    pub fn new() -> Self {
        CfgCleanupPass
    }
}

impl Pass for CfgCleanupPass {
    fn name(&self) -> &'static str {
        "cfg-cleanup"
    }

    fn description(&self) -> &'static str {
        "Removes basic blocks unreachable from the function entry"
    }

    fn run(&mut self, ctx: &mut IrContext) -> Result<PassStatus> {
        let mut modified = false;
        for index in 0..ctx.module().functions().len() {
            modified |= cleanup_function(ctx, index);
        }
        Ok(if modified {
            PassStatus::SuccessChanged
        } else {
            PassStatus::SuccessNoChange
        })
    }
}

/// Removes the unreachable blocks of one function. Returns whether anything
/// changed.
pub(crate) fn cleanup_function(ctx: &mut IrContext, function_index: usize) -> bool {
    let cfg = Cfg::build(ctx.module(), ctx.module().function(function_index));
    let block_count = cfg.block_count();
    let reachable: FxHashSet<usize> = cfg.reverse_postorder().iter().copied().collect();
    if reachable.len() == block_count {
        return false;
    }

    // Labels of the blocks about to go away.
    let mut removed_labels = FxHashSet::default();
    for block_index in 0..block_count {
        if !reachable.contains(&block_index) {
            let label = ctx.module().function(function_index).blocks()[block_index]
                .id(ctx.module())
                .get();
            removed_labels.insert(label);
        }
    }

    // Prune phi operands naming removed predecessors.
    for &block_index in &reachable {
        let insts: Vec<_> = ctx.module().function(function_index).blocks()[block_index]
            .instructions(ctx.module())
            .collect();
        for inst_id in insts {
            if ctx.module().inst(inst_id).opcode() != Opcode::Phi {
                continue;
            }
            // Walk (value, parent) pairs back to front so removal keeps
            // earlier indices stable.
            let mut pair = ctx.module().inst(inst_id).num_operands();
            while pair >= 2 {
                pair -= 2;
                let parent = ctx.module().inst(inst_id).operand_word(pair + 1);
                if parent.is_some_and(|label| removed_labels.contains(&label)) {
                    ctx.remove_operand(inst_id, pair + 1);
                    ctx.remove_operand(inst_id, pair);
                }
            }
        }
    }

    // Kill the stranded instructions, labels included.
    for block_index in 0..block_count {
        if reachable.contains(&block_index) {
            continue;
        }
        let block = &ctx.module().function(function_index).blocks()[block_index];
        let mut doomed: Vec<_> = block.instructions(ctx.module()).collect();
        doomed.push(block.label());
        for inst in doomed {
            ctx.kill_inst(inst);
        }
    }

    // Drop the block entries and fix the parent back-references.
    let mut index = 0;
    ctx.module_mut()
        .function_mut(function_index)
        .blocks_mut()
        .retain(|_| {
            let keep = reachable.contains(&index);
            index += 1;
            keep
        });
    ctx.module_mut().reindex_function_blocks(function_index);

    true
}
