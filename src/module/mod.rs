//! The in-memory module container.
//!
//! A [`Module`] owns every instruction in a central arena and exposes them
//! through stable handles ([`InstId`]). Section lists, function headers and
//! block bodies all store handles; killing an instruction tombstones its
//! arena slot in O(1) and every list simply skips dead slots on iteration.
//! Handles are allocated monotonically and never reused, so a handle doubles
//! as the stable sequence number used for total orderings (annotation
//! tie-breaks).
//!
//! Parent back-references (instruction → block → function) are plain indices
//! maintained by the container; nothing in the arena owns anything else.

mod block;
mod emit;
mod function;
mod loader;

pub use block::BasicBlock;
pub use emit::{emit_bytes, emit_words};
pub use function::Function;
pub use loader::{load_module, ModuleLoader};

use std::fmt;

use crate::file::Endianness;
use crate::spirv::{Capability, Instruction, Operand};
use crate::Id;

/// A stable handle to an instruction in a module's arena.
///
/// Handles are assigned in construction order and never reused, which makes
/// them usable as the unique sequence number for total orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstId(u32);

impl InstId {
    /// The arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The raw sequence number.
    #[must_use]
    pub fn sequence(self) -> u32 {
        self.0
    }
}

impl fmt::Display for InstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The module-level sections, in their required layout order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Section {
    /// `OpCapability` declarations.
    Capabilities,
    /// `OpExtension` declarations.
    Extensions,
    /// `OpExtInstImport` declarations.
    ExtInstImports,
    /// The single `OpMemoryModel`.
    MemoryModel,
    /// `OpEntryPoint` declarations.
    EntryPoints,
    /// `OpExecutionMode` declarations.
    ExecutionModes,
    /// Debug instructions: sources, strings, names, module-processed.
    Debug,
    /// Annotation instructions.
    Annotations,
    /// Types, constants and module-scope variables.
    TypesValues,
}

/// All sections in emission order.
pub(crate) const SECTION_ORDER: [Section; 9] = [
    Section::Capabilities,
    Section::Extensions,
    Section::ExtInstImports,
    Section::MemoryModel,
    Section::EntryPoints,
    Section::ExecutionModes,
    Section::Debug,
    Section::Annotations,
    Section::TypesValues,
];

/// Where an instruction lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    /// Not yet attached to any list.
    Detached,
    /// A module-level section.
    Module(Section),
    /// A function header (the `OpFunction`, parameters, `OpFunctionEnd`).
    Function(usize),
    /// A basic block of a function.
    Block {
        /// Index of the owning function.
        function: usize,
        /// Index of the owning block within the function.
        block: usize,
    },
}

/// An in-memory SPIR-V module.
#[derive(Debug)]
pub struct Module {
    arena: Vec<Instruction>,
    dead: Vec<bool>,
    parents: Vec<Parent>,

    version: (u8, u8),
    generator: u32,
    id_bound: u32,
    schema: u32,
    endian: Endianness,

    sections: [Vec<InstId>; 9],
    functions: Vec<Function>,
}

impl Module {
    /// Creates an empty module with default header values (SPIR-V 1.0,
    /// little-endian).
    #[must_use]
    pub fn new() -> Self {
        Module {
            arena: Vec::new(),
            dead: Vec::new(),
            parents: Vec::new(),
            version: (1, 0),
            generator: 0,
            id_bound: 0,
            schema: 0,
            endian: Endianness::Little,
            sections: Default::default(),
            functions: Vec::new(),
        }
    }

    /// Sets the header fields.
    pub fn set_header(
        &mut self,
        version: (u8, u8),
        generator: u32,
        id_bound: u32,
        schema: u32,
        endian: Endianness,
    ) {
        self.version = version;
        self.generator = generator;
        self.id_bound = id_bound;
        self.schema = schema;
        self.endian = endian;
    }

    /// SPIR-V version as `(major, minor)`.
    #[must_use]
    pub fn version(&self) -> (u8, u8) {
        self.version
    }

    /// The generator magic from the header.
    #[must_use]
    pub fn generator(&self) -> u32 {
        self.generator
    }

    /// Exclusive upper bound on all ids in the module.
    #[must_use]
    pub fn id_bound(&self) -> u32 {
        self.id_bound
    }

    /// Reserved header word.
    #[must_use]
    pub fn schema(&self) -> u32 {
        self.schema
    }

    /// Byte order the module was encoded in (and re-emits in).
    #[must_use]
    pub fn endian(&self) -> Endianness {
        self.endian
    }

    /// Appends an instruction to a module-level section, returning its
    /// handle.
    pub fn append(&mut self, section: Section, inst: Instruction) -> InstId {
        let id = self.alloc(inst, Parent::Module(section));
        self.sections[section as usize].push(id);
        id
    }

    /// Allocates an instruction without attaching it to any list.
    ///
    /// Used while assembling functions: collect the handles, then attach them
    /// via [`add_function`](Self::add_function), which fixes up the parents.
    pub fn alloc_detached(&mut self, inst: Instruction) -> InstId {
        self.alloc(inst, Parent::Detached)
    }

    /// Adds a function and re-parents all of its instruction handles.
    ///
    /// Returns the function's index.
    pub fn add_function(&mut self, function: Function) -> usize {
        let index = self.functions.len();
        self.parents[function.def().index()] = Parent::Function(index);
        for &inst in function.raw_header() {
            self.parents[inst.index()] = Parent::Function(index);
        }
        for (block_index, block) in function.blocks().iter().enumerate() {
            let parent = Parent::Block {
                function: index,
                block: block_index,
            };
            self.parents[block.label().index()] = parent;
            for &inst in block.raw_body() {
                self.parents[inst.index()] = parent;
            }
        }
        self.parents[function.end().index()] = Parent::Function(index);
        self.functions.push(function);
        index
    }

    fn alloc(&mut self, inst: Instruction, parent: Parent) -> InstId {
        let id = InstId(u32::try_from(self.arena.len()).expect("arena exhausted"));
        self.arena.push(inst);
        self.dead.push(false);
        self.parents.push(parent);
        id
    }

    /// The instruction behind a handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle is from another module.
    #[must_use]
    pub fn inst(&self, id: InstId) -> &Instruction {
        &self.arena[id.index()]
    }

    /// Mutable access to an instruction. Crate-internal: all operand rewrites
    /// must go through the context so the def/use database stays consistent.
    pub(crate) fn inst_mut(&mut self, id: InstId) -> &mut Instruction {
        &mut self.arena[id.index()]
    }

    /// Whether the handle's slot is still live.
    #[must_use]
    pub fn is_live(&self, id: InstId) -> bool {
        !self.dead[id.index()]
    }

    /// Tombstones a slot: the instruction becomes `OpNop` and every list
    /// skips it from now on. Crate-internal; [`IrContext`](crate::IrContext)
    /// wraps this together with the def/use erasure.
    pub(crate) fn kill_slot(&mut self, id: InstId) {
        self.arena[id.index()].clear_to_nop();
        self.dead[id.index()] = true;
    }

    /// Where the instruction lives.
    #[must_use]
    pub fn parent_of(&self, id: InstId) -> Parent {
        self.parents[id.index()]
    }

    /// The `(function, block)` indices of the instruction's block, if it is
    /// inside one.
    #[must_use]
    pub fn block_of(&self, id: InstId) -> Option<(usize, usize)> {
        match self.parents[id.index()] {
            Parent::Block { function, block } => Some((function, block)),
            _ => None,
        }
    }

    pub(crate) fn set_parent(&mut self, id: InstId, parent: Parent) {
        self.parents[id.index()] = parent;
    }

    /// Live instruction handles of a module-level section, in order.
    pub fn section(&self, section: Section) -> impl Iterator<Item = InstId> + '_ {
        self.sections[section as usize]
            .iter()
            .copied()
            .filter(|&id| self.is_live(id))
    }

    /// The functions of the module, in declaration order.
    #[must_use]
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// A function by index.
    #[must_use]
    pub fn function(&self, index: usize) -> &Function {
        &self.functions[index]
    }

    pub(crate) fn function_mut(&mut self, index: usize) -> &mut Function {
        &mut self.functions[index]
    }

    /// Drops the functions whose indices are not in `keep`, re-parenting the
    /// survivors. Crate-internal; callers kill the dropped functions'
    /// instructions first.
    pub(crate) fn retain_functions(&mut self, keep: &[usize]) {
        let mut kept = Vec::with_capacity(keep.len());
        for (old_index, function) in std::mem::take(&mut self.functions).into_iter().enumerate() {
            if keep.contains(&old_index) {
                kept.push(function);
            }
        }
        self.functions = kept;
        // Parents carry function indices; rebuild them for the survivors.
        for index in 0..self.functions.len() {
            let function = self.functions[index].clone();
            self.parents[function.def().index()] = Parent::Function(index);
            for &inst in function.raw_header() {
                self.parents[inst.index()] = Parent::Function(index);
            }
            for (block_index, block) in function.blocks().iter().enumerate() {
                let parent = Parent::Block {
                    function: index,
                    block: block_index,
                };
                self.parents[block.label().index()] = parent;
                for &inst in block.raw_body() {
                    self.parents[inst.index()] = parent;
                }
            }
            self.parents[function.end().index()] = Parent::Function(index);
        }
    }

    /// Rebuilds the block parent indices of one function after its block
    /// list changed. Crate-internal.
    pub(crate) fn reindex_function_blocks(&mut self, function_index: usize) {
        let blocks = self.functions[function_index].blocks().to_vec();
        for (block_index, block) in blocks.iter().enumerate() {
            let parent = Parent::Block {
                function: function_index,
                block: block_index,
            };
            self.parents[block.label().index()] = parent;
            for &inst in block.raw_body() {
                self.parents[inst.index()] = parent;
            }
        }
    }

    /// Calls `f` with every live instruction handle: module sections in
    /// layout order, then each function.
    pub fn for_each_inst(&self, mut f: impl FnMut(InstId)) {
        for section in SECTION_ORDER {
            for inst in self.section(section) {
                f(inst);
            }
        }
        for function in &self.functions {
            function.for_each_inst(self, &mut f);
        }
    }

    /// Whether the module declares the given capability.
    #[must_use]
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.section(Section::Capabilities).any(|id| {
            self.inst(id)
                .operand_word(0)
                .is_some_and(|word| word == capability.as_u32())
        })
    }

    /// The extension name strings the module declares.
    #[must_use]
    pub fn extension_names(&self) -> Vec<&str> {
        self.section(Section::Extensions)
            .filter_map(|id| match self.inst(id).operand(0) {
                Operand::String(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The function ids named by `OpEntryPoint` declarations.
    #[must_use]
    pub fn entry_point_ids(&self) -> Vec<Id> {
        self.section(Section::EntryPoints)
            .filter_map(|id| self.inst(id).input_id(1))
            .collect()
    }

    /// Index of the function defining `id`, if any.
    #[must_use]
    pub fn function_index_of(&self, id: Id) -> Option<usize> {
        self.functions
            .iter()
            .position(|f| self.is_live(f.def()) && f.result_id(self) == id)
    }

    /// Total number of arena slots, live or dead. Handles compare by slot
    /// index, so this is also the next sequence number.
    #[must_use]
    pub fn arena_len(&self) -> usize {
        self.arena.len()
    }
}

impl Default for Module {
    fn default() -> Self {
        Module::new()
    }
}
