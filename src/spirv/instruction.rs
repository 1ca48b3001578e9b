//! The in-memory instruction representation.
//!
//! An [`Instruction`] is an opcode, an optional result-type id, an optional
//! result id, and an ordered list of tagged operands. The result-type and
//! result-id words are stored out-of-band, so operand index 0 is the first
//! *input* operand — matching how the word positions after the two optional
//! header words are numbered throughout the analyses.
//!
//! Operand mutation is crate-internal: all rewrites must flow through the
//! [`IrContext`](crate::IrContext) helpers so the def/use database stays the
//! single point of truth for id-use relations.

use smallvec::SmallVec;

use crate::spirv::{Opcode, Operand};
use crate::Id;

/// A single SPIR-V instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    opcode: Opcode,
    type_id: Option<Id>,
    result_id: Option<Id>,
    operands: SmallVec<[Operand; 4]>,
}

impl Instruction {
    /// Creates a new instruction.
    #[must_use]
    pub fn new(
        opcode: Opcode,
        type_id: Option<Id>,
        result_id: Option<Id>,
        operands: impl IntoIterator<Item = Operand>,
    ) -> Self {
        Instruction {
            opcode,
            type_id,
            result_id,
            operands: operands.into_iter().collect(),
        }
    }

    /// The instruction's opcode.
    #[must_use]
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// The result-type id, if the opcode produces a typed result.
    #[must_use]
    pub fn type_id(&self) -> Option<Id> {
        self.type_id
    }

    /// The result id, if the opcode defines one.
    #[must_use]
    pub fn result_id(&self) -> Option<Id> {
        self.result_id
    }

    /// All input operands in order, with kind tags.
    #[must_use]
    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    /// The number of input operands.
    #[must_use]
    pub fn num_operands(&self) -> usize {
        self.operands.len()
    }

    /// The operand at position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn operand(&self, index: usize) -> &Operand {
        &self.operands[index]
    }

    /// The id referenced by the operand at position `index`, or `None` when
    /// the operand is not an id reference (or out of bounds).
    #[must_use]
    pub fn input_id(&self, index: usize) -> Option<Id> {
        self.operands.get(index).and_then(Operand::id_ref)
    }

    /// The single-word value of the operand at `index`: the id for id
    /// references, the raw word for literals and enums.
    ///
    /// Returns `None` for strings and out-of-bounds indices.
    #[must_use]
    pub fn operand_word(&self, index: usize) -> Option<u32> {
        match self.operands.get(index)? {
            Operand::IdRef(id) => Some(id.get()),
            Operand::Literal32(value) | Operand::Enum(value) => Some(*value),
            Operand::String(_) => None,
        }
    }

    /// Iterates all id references among the input operands, in operand order.
    pub fn input_ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.operands.iter().filter_map(Operand::id_ref)
    }

    /// Calls `f` for every id this instruction references: the result type
    /// (if any) followed by every id-ref input operand.
    pub fn for_each_ref_id(&self, mut f: impl FnMut(Id)) {
        if let Some(type_id) = self.type_id {
            f(type_id);
        }
        for id in self.input_ids() {
            f(id);
        }
    }

    /// Replaces the operand at `index` in place.
    ///
    /// Crate-internal: callers must keep the def/use database consistent.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub(crate) fn set_operand(&mut self, index: usize, operand: Operand) {
        self.operands[index] = operand;
    }

    /// Appends a trailing operand. Crate-internal, see [`set_operand`](Self::set_operand).
    pub(crate) fn push_operand(&mut self, operand: Operand) {
        self.operands.push(operand);
    }

    /// Removes the operand at `index`, shifting the tail down.
    /// Crate-internal, see [`set_operand`](Self::set_operand).
    pub(crate) fn remove_operand(&mut self, index: usize) -> Operand {
        self.operands.remove(index)
    }

    /// Replaces the result type. Crate-internal.
    pub(crate) fn set_type_id(&mut self, type_id: Option<Id>) {
        self.type_id = type_id;
    }

    /// Rewrites the instruction into `OpNop`, dropping all operands.
    /// Crate-internal; used when an instruction is killed.
    pub(crate) fn clear_to_nop(&mut self) {
        self.opcode = Opcode::Nop;
        self.type_id = None;
        self.result_id = None;
        self.operands.clear();
    }

    /// Whether this instruction terminates a basic block.
    #[must_use]
    pub fn is_terminator(&self) -> bool {
        self.opcode.is_terminator()
    }

    /// Whether this instruction branches to labels.
    #[must_use]
    pub fn is_branch(&self) -> bool {
        self.opcode.is_branch()
    }

    /// Whether this instruction is a merge declaration.
    #[must_use]
    pub fn is_merge(&self) -> bool {
        self.opcode.is_merge()
    }

    /// Whether this instruction is a combinator (side-effect free).
    #[must_use]
    pub fn is_combinator(&self) -> bool {
        self.opcode.is_combinator()
    }

    /// Total encoded size in words, including the leading count/opcode word.
    #[must_use]
    pub fn word_count(&self) -> usize {
        let mut count = 1;
        if self.type_id.is_some() {
            count += 1;
        }
        if self.result_id.is_some() {
            count += 1;
        }
        count + self.operands.iter().map(Operand::word_count).sum::<usize>()
    }

    /// Appends the instruction's binary encoding to `words`.
    ///
    /// # Panics
    ///
    /// Panics if the encoded size exceeds the 16-bit word count field, which
    /// cannot happen for instructions accepted by the loader.
    pub fn encode(&self, words: &mut Vec<u32>) {
        let count = u32::try_from(self.word_count()).expect("instruction too large");
        assert!(count <= 0xFFFF, "instruction exceeds 65535 words");
        words.push((count << 16) | u32::from(self.opcode.as_u16()));
        if let Some(type_id) = self.type_id {
            words.push(type_id.get());
        }
        if let Some(result_id) = self.result_id {
            words.push(result_id.get());
        }
        for operand in &self.operands {
            operand.encode(words);
        }
    }
}
