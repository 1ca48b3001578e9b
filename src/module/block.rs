//! Basic blocks.

use crate::module::{InstId, Module};
use crate::spirv::Opcode;
use crate::Id;

/// A basic block: a label instruction plus a non-empty ordered body ending in
/// exactly one terminator.
///
/// The block stores instruction handles, not instructions; the owning
/// [`Module`] arena holds the data. The label is kept out of the body, so
/// iteration over [`instructions`](Self::instructions) never yields it — the
/// same split the per-function analyses rely on.
#[derive(Debug, Clone)]
pub struct BasicBlock {
    label: InstId,
    body: Vec<InstId>,
}

impl BasicBlock {
    /// Creates a block from its label and body handles.
    #[must_use]
    pub fn new(label: InstId, body: Vec<InstId>) -> Self {
        BasicBlock { label, body }
    }

    /// The handle of the block's `OpLabel`.
    #[must_use]
    pub fn label(&self) -> InstId {
        self.label
    }

    /// The id the block's label defines.
    ///
    /// # Panics
    ///
    /// Panics if the label handle does not refer to a labeled instruction;
    /// the loader guarantees it does.
    #[must_use]
    pub fn id(&self, module: &Module) -> Id {
        module
            .inst(self.label)
            .result_id()
            .expect("block label carries a result id")
    }

    /// Handles of the body instructions (excluding the label), dead slots
    /// filtered out.
    pub fn instructions<'a>(&'a self, module: &'a Module) -> impl Iterator<Item = InstId> + 'a {
        self.body.iter().copied().filter(|&id| module.is_live(id))
    }

    /// Raw body handles including killed slots. Crate-internal.
    pub(crate) fn raw_body(&self) -> &[InstId] {
        &self.body
    }

    /// Appends an instruction handle to the body. Crate-internal.
    pub(crate) fn push(&mut self, inst: InstId) {
        self.body.push(inst);
    }

    /// The block's terminator: the last live body instruction, when it is one
    /// of the terminator opcodes.
    #[must_use]
    pub fn terminator(&self, module: &Module) -> Option<InstId> {
        let last = self.instructions(module).last()?;
        module.inst(last).is_terminator().then_some(last)
    }

    /// The block's merge instruction: a live `OpSelectionMerge` or
    /// `OpLoopMerge` immediately preceding the terminator. A block with one
    /// is a structured header.
    #[must_use]
    pub fn merge_inst(&self, module: &Module) -> Option<InstId> {
        let mut iter = self.instructions(module);
        let mut last = iter.next()?;
        let mut second_last = None;
        for inst in iter {
            second_last = Some(last);
            last = inst;
        }
        let candidate = second_last?;
        module.inst(candidate).is_merge().then_some(candidate)
    }

    /// Whether this block is a structured header (carries a merge
    /// instruction).
    #[must_use]
    pub fn is_structured_header(&self, module: &Module) -> bool {
        self.merge_inst(module).is_some()
    }

    /// Ids of the labels this block's terminator transfers control to.
    #[must_use]
    pub fn successor_ids(&self, module: &Module) -> Vec<Id> {
        let Some(terminator) = self.terminator(module) else {
            return Vec::new();
        };
        let inst = module.inst(terminator);
        match inst.opcode() {
            Opcode::Branch => inst.input_ids().collect(),
            // Skip the condition / selector; every other id operand is a label.
            Opcode::BranchConditional | Opcode::Switch => inst.input_ids().skip(1).collect(),
            _ => Vec::new(),
        }
    }
}
