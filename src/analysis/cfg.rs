//! Per-function control flow graph.
//!
//! Blocks are referred to by their index within the function. The graph
//! provides successor/predecessor lists, a depth-first reverse postorder
//! (unreachable blocks excluded), and the *structured order*: reverse
//! postorder over structured successors, where a structured header lists its
//! merge block first (and, for loops, the continue target second) ahead of
//! its branch targets. Walking the structured order visits a construct as
//! header, body in reverse postorder, continue target, merge block — the
//! traversal every structured analysis and the dead-code passes are built on.

use rustc_hash::FxHashMap;

use crate::module::{Function, Module};
use crate::spirv::Opcode;

/// Control flow graph of one function.
#[derive(Debug, Clone)]
pub struct Cfg {
    succs: Vec<Vec<usize>>,
    preds: Vec<Vec<usize>>,
    rpo: Vec<usize>,
    structured_order: Vec<usize>,
    label_to_block: FxHashMap<u32, usize>,
}

impl Cfg {
    /// Builds the CFG for `function`.
    ///
    /// Functions without a body produce an empty graph.
    #[must_use]
    pub fn build(module: &Module, function: &Function) -> Self {
        let blocks = function.blocks();
        let block_count = blocks.len();

        let mut label_to_block = FxHashMap::default();
        for (index, block) in blocks.iter().enumerate() {
            label_to_block.insert(block.id(module).get(), index);
        }

        let mut succs: Vec<Vec<usize>> = vec![Vec::new(); block_count];
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); block_count];
        for (index, block) in blocks.iter().enumerate() {
            for label in block.successor_ids(module) {
                if let Some(&target) = label_to_block.get(&label.get()) {
                    succs[index].push(target);
                    preds[target].push(index);
                }
            }
        }

        // Structured successors: a header lists its merge block (and loop
        // continue target) ahead of its branch targets.
        let mut structured_succs: Vec<Vec<usize>> = vec![Vec::new(); block_count];
        for (index, block) in blocks.iter().enumerate() {
            if let Some(merge) = block.merge_inst(module) {
                let merge_inst = module.inst(merge);
                if let Some(merge_label) = merge_inst.input_id(0) {
                    if let Some(&target) = label_to_block.get(&merge_label.get()) {
                        structured_succs[index].push(target);
                    }
                }
                if merge_inst.opcode() == Opcode::LoopMerge {
                    if let Some(continue_label) = merge_inst.input_id(1) {
                        if let Some(&target) = label_to_block.get(&continue_label.get()) {
                            structured_succs[index].push(target);
                        }
                    }
                }
            }
            structured_succs[index].extend_from_slice(&succs[index]);
        }

        let (rpo, structured_order) = if block_count == 0 {
            (Vec::new(), Vec::new())
        } else {
            (
                reverse_postorder(&succs, 0),
                reverse_postorder(&structured_succs, 0),
            )
        };

        Cfg {
            succs,
            preds,
            rpo,
            structured_order,
            label_to_block,
        }
    }

    /// Number of blocks in the function (reachable or not).
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.succs.len()
    }

    /// Successor block indices of `block`.
    #[must_use]
    pub fn successors(&self, block: usize) -> &[usize] {
        &self.succs[block]
    }

    /// Predecessor block indices of `block`.
    #[must_use]
    pub fn predecessors(&self, block: usize) -> &[usize] {
        &self.preds[block]
    }

    /// Reverse postorder over branch successors from the entry. Unreachable
    /// blocks are excluded.
    #[must_use]
    pub fn reverse_postorder(&self) -> &[usize] {
        &self.rpo
    }

    /// The structured order; see the module documentation.
    #[must_use]
    pub fn structured_order(&self) -> &[usize] {
        &self.structured_order
    }

    /// The block index defining the given raw label id.
    #[must_use]
    pub fn block_of_label(&self, label: u32) -> Option<usize> {
        self.label_to_block.get(&label).copied()
    }

    /// All successor lists, indexed by block. Used by the dominator
    /// computations.
    #[must_use]
    pub fn successor_lists(&self) -> &[Vec<usize>] {
        &self.succs
    }

    /// All predecessor lists, indexed by block.
    #[must_use]
    pub fn predecessor_lists(&self) -> &[Vec<usize>] {
        &self.preds
    }
}

/// Iterative depth-first traversal emitting reachable nodes in reverse
/// postorder. Successors are entered in list order, so the first successor's
/// subtree completes first and lands last in the result.
fn reverse_postorder(succs: &[Vec<usize>], entry: usize) -> Vec<usize> {
    let mut visited = vec![false; succs.len()];
    let mut postorder = Vec::new();
    // (node, index of the next successor to enter)
    let mut stack: Vec<(usize, usize)> = vec![(entry, 0)];
    visited[entry] = true;

    while let Some((node, cursor)) = stack.last_mut() {
        let node = *node;
        if let Some(&next) = succs[node].get(*cursor) {
            *cursor += 1;
            if !visited[next] {
                visited[next] = true;
                stack.push((next, 0));
            }
        } else {
            postorder.push(node);
            stack.pop();
        }
    }

    postorder.reverse();
    postorder
}
