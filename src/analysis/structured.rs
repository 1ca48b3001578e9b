//! Structured-construct maps.
//!
//! SPIR-V structured control flow pairs each header block's branch with a
//! merge instruction. This analysis walks the structured order once with a
//! stack of open constructs and produces:
//!
//! - `branch_to_merge`: each structured header's branch → its merge
//!   instruction;
//! - `block_to_header_branch`: each block → the branch of the innermost
//!   enclosing header, or `None` at function scope;
//! - `order_index`: each block's position in the structured order.
//!
//! The stack discipline decides which construct a header block itself maps
//! to: loop headers push *before* mapping the header (a loop header belongs
//! to its own loop), selection headers push *after* (an if header belongs to
//! its parent construct).

use rustc_hash::FxHashMap;

use crate::analysis::Cfg;
use crate::module::{Function, InstId, Module};
use crate::spirv::Opcode;

/// Construct maps for one function; see the module documentation.
#[derive(Debug, Clone, Default)]
pub struct StructuredCfg {
    branch_to_merge: FxHashMap<InstId, InstId>,
    block_to_header_branch: Vec<Option<InstId>>,
    order_index: Vec<usize>,
}

impl StructuredCfg {
    /// Builds the construct maps from the function's structured order.
    #[must_use]
    pub fn build(module: &Module, function: &Function, cfg: &Cfg) -> Self {
        let blocks = function.blocks();
        let mut analysis = StructuredCfg {
            branch_to_merge: FxHashMap::default(),
            block_to_header_branch: vec![None; blocks.len()],
            order_index: vec![usize::MAX; blocks.len()],
        };

        // Stack of open header branches; the sentinel None represents
        // function scope. `current_merge_id` is the label id that closes the
        // innermost construct.
        let mut header_stack: Vec<Option<InstId>> = vec![None];
        let mut current_merge_id: u32 = 0;

        for (position, &block_index) in cfg.structured_order().iter().enumerate() {
            analysis.order_index[block_index] = position;
            let block = &blocks[block_index];

            // Reaching the current construct's merge block closes it.
            if block.id(module).get() == current_merge_id {
                header_stack.pop();
                current_merge_id = match header_stack.last() {
                    Some(Some(branch)) => {
                        let merge = analysis.branch_to_merge[branch];
                        module.inst(merge).operand_word(0).unwrap_or(0)
                    }
                    _ => 0,
                };
            }

            let header = block.merge_inst(module).and_then(|merge| {
                let branch = block.terminator(module)?;
                let merge_block_id = module.inst(merge).operand_word(0)?;
                Some((merge, branch, merge_block_id))
            });

            // A loop header maps to its own construct.
            if let Some((merge, branch, merge_block_id)) = header {
                if module.inst(merge).opcode() == Opcode::LoopMerge {
                    header_stack.push(Some(branch));
                    analysis.branch_to_merge.insert(branch, merge);
                    current_merge_id = merge_block_id;
                }
            }

            analysis.block_to_header_branch[block_index] =
                header_stack.last().copied().flatten();

            // A selection header maps to its parent construct.
            if let Some((merge, branch, merge_block_id)) = header {
                if module.inst(merge).opcode() == Opcode::SelectionMerge {
                    header_stack.push(Some(branch));
                    analysis.branch_to_merge.insert(branch, merge);
                    current_merge_id = merge_block_id;
                }
            }
        }

        analysis
    }

    /// The merge instruction controlled by a structured header's branch.
    #[must_use]
    pub fn merge_of_branch(&self, branch: InstId) -> Option<InstId> {
        self.branch_to_merge.get(&branch).copied()
    }

    /// The branch of the innermost header enclosing `block`, or `None` at
    /// function scope.
    #[must_use]
    pub fn header_branch_of_block(&self, block: usize) -> Option<InstId> {
        self.block_to_header_branch.get(block).copied().flatten()
    }

    /// The block's position in the structured order; `usize::MAX` when the
    /// block is unreachable.
    #[must_use]
    pub fn order_index(&self, block: usize) -> usize {
        self.order_index.get(block).copied().unwrap_or(usize::MAX)
    }
}
