//! Functions.

use crate::module::{BasicBlock, InstId, Module};
use crate::spirv::Opcode;
use crate::Id;

/// A function: its `OpFunction`, the header instructions between it and the
/// first block (parameters, debug lines), an ordered list of basic blocks
/// (the first is the entry), and its `OpFunctionEnd`.
#[derive(Debug, Clone)]
pub struct Function {
    def: InstId,
    header: Vec<InstId>,
    blocks: Vec<BasicBlock>,
    end: InstId,
}

impl Function {
    /// Creates a function from its parts.
    #[must_use]
    pub fn new(def: InstId, header: Vec<InstId>, blocks: Vec<BasicBlock>, end: InstId) -> Self {
        Function {
            def,
            header,
            blocks,
            end,
        }
    }

    /// The handle of the `OpFunction` instruction.
    #[must_use]
    pub fn def(&self) -> InstId {
        self.def
    }

    /// The handle of the `OpFunctionEnd` instruction.
    #[must_use]
    pub fn end(&self) -> InstId {
        self.end
    }

    /// The function's result id.
    ///
    /// # Panics
    ///
    /// Panics if the def handle does not carry a result id; the loader
    /// guarantees it does.
    #[must_use]
    pub fn result_id(&self, module: &Module) -> Id {
        module
            .inst(self.def)
            .result_id()
            .expect("OpFunction carries a result id")
    }

    /// Header instruction handles (live only): parameters and any debug
    /// lines preceding the first block.
    pub fn header<'a>(&'a self, module: &'a Module) -> impl Iterator<Item = InstId> + 'a {
        self.header.iter().copied().filter(|&id| module.is_live(id))
    }

    /// The function's `OpFunctionParameter` handles, in declaration order.
    pub fn parameters<'a>(&'a self, module: &'a Module) -> impl Iterator<Item = InstId> + 'a {
        self.header(module)
            .filter(|&id| module.inst(id).opcode() == Opcode::FunctionParameter)
    }

    /// The function's basic blocks. The first block is the entry.
    #[must_use]
    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    /// Mutable access to the blocks. Crate-internal.
    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<BasicBlock> {
        &mut self.blocks
    }

    /// Raw header handles including killed slots. Crate-internal.
    pub(crate) fn raw_header(&self) -> &[InstId] {
        &self.header
    }

    /// The entry block, or `None` for a bodyless declaration.
    #[must_use]
    pub fn entry(&self) -> Option<&BasicBlock> {
        self.blocks.first()
    }

    /// Index of the block defining the given label id.
    #[must_use]
    pub fn block_index_of(&self, module: &Module, label: Id) -> Option<usize> {
        self.blocks
            .iter()
            .position(|block| block.id(module) == label)
    }

    /// Calls `f` with every live instruction handle of the function:
    /// def, header, blocks (labels included), end.
    pub fn for_each_inst(&self, module: &Module, mut f: impl FnMut(InstId)) {
        if module.is_live(self.def) {
            f(self.def);
        }
        for inst in self.header(module) {
            f(inst);
        }
        for block in &self.blocks {
            if module.is_live(block.label()) {
                f(block.label());
            }
            for inst in block.instructions(module) {
                f(inst);
            }
        }
        if module.is_live(self.end) {
            f(self.end);
        }
    }
}
