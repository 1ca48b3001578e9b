//! Building a validated [`Module`] from a parsed instruction stream.
//!
//! The [`ModuleLoader`] is the standard [`InstructionSink`]: it receives
//! decoded instructions in stream order and enforces, while building,
//!
//! - the SPIR-V logical layout: monotonic section order, exactly one memory
//!   model, parameters before blocks, blocks ending in exactly one
//!   terminator, merge instructions immediately before the terminator
//!   ([`InvalidLayout`](crate::Error::InvalidLayout));
//! - the id rules: defining ids below the header bound and unique, every
//!   reference defined before use except the explicitly forward-referencing
//!   positions, which must resolve by end of module
//!   ([`InvalidId`](crate::Error::InvalidId)).

use rustc_hash::FxHashMap;

use crate::diagnostic::{DiagnosticSink, Position, Severity};
use crate::file::{Header, InstructionSink, Parser};
use crate::module::{BasicBlock, Function, InstId, Module, Section};
use crate::spirv::{Instruction, Opcode, StorageClass};
use crate::{Error, OptimizerOptions, Result};

/// Parses and loads a module from bytes, reporting failures to `sink`.
///
/// This is the front door of the crate: endianness and header validation,
/// instruction decoding, layout and id checking, all in one pass over the
/// stream.
///
/// # Errors
///
/// Any parse or validation error is reported to `sink` as a fatal diagnostic
/// and returned.
pub fn load_module(
    bytes: &[u8],
    options: &OptimizerOptions,
    sink: &mut DiagnosticSink,
) -> Result<Module> {
    let parser = match Parser::new(bytes, options.target_env) {
        Ok(parser) => parser,
        Err(error) => {
            sink.report(Severity::Fatal, Position::Word(0), &error.to_string());
            return Err(error);
        }
    };

    let mut loader = ModuleLoader::new();
    if let Err(error) = parser.parse_into(&mut loader) {
        sink.report(
            Severity::Fatal,
            Position::Word(loader.last_word_index),
            &error.to_string(),
        );
        return Err(error);
    }
    match loader.finish() {
        Ok(module) => Ok(module),
        Err(error) => {
            sink.report(Severity::Fatal, Position::Module, &error.to_string());
            Err(error)
        }
    }
}

/// Streaming module builder; see [`load_module`].
#[derive(Debug)]
pub struct ModuleLoader {
    module: Module,
    rank: u8,
    current_section: Section,
    function: Option<FunctionInProgress>,
    defined: FxHashMap<u32, InstId>,
    deferred: Vec<u32>,
    memory_model_seen: bool,
    last_word_index: usize,
}

#[derive(Debug)]
struct FunctionInProgress {
    def: InstId,
    header: Vec<InstId>,
    blocks: Vec<BasicBlock>,
    block: Option<BlockInProgress>,
}

#[derive(Debug)]
struct BlockInProgress {
    label: InstId,
    body: Vec<InstId>,
}

/// Layout rank of each module-level section; function bodies rank last.
fn rank_of(section: Section) -> u8 {
    section as u8
}

const FUNCTION_RANK: u8 = 9;

/// The module-level section an opcode belongs to, or `None` for opcodes only
/// valid inside functions.
fn section_for(opcode: Opcode) -> Option<Section> {
    if opcode.is_annotation() {
        return Some(Section::Annotations);
    }
    if opcode.is_debug() {
        return Some(Section::Debug);
    }
    if opcode.is_type_decl() || opcode.is_constant_decl() {
        return Some(Section::TypesValues);
    }
    match opcode {
        Opcode::Capability => Some(Section::Capabilities),
        Opcode::Extension => Some(Section::Extensions),
        Opcode::ExtInstImport => Some(Section::ExtInstImports),
        Opcode::MemoryModel => Some(Section::MemoryModel),
        Opcode::EntryPoint => Some(Section::EntryPoints),
        Opcode::ExecutionMode => Some(Section::ExecutionModes),
        Opcode::Variable | Opcode::Undef => Some(Section::TypesValues),
        _ => None,
    }
}

/// Whether the id at `operand_index` of `opcode` may reference a definition
/// that appears later in the module.
fn forward_allowed(opcode: Opcode, operand_index: usize) -> bool {
    match opcode {
        // Phi operands and all structured-control-flow labels.
        Opcode::Phi
        | Opcode::Branch
        | Opcode::LoopMerge
        | Opcode::SelectionMerge => true,
        // Labels yes, condition / selector no.
        Opcode::BranchConditional | Opcode::Switch => operand_index > 0,
        // Debug and annotation targets.
        Opcode::Name | Opcode::MemberName => true,
        Opcode::Decorate
        | Opcode::MemberDecorate
        | Opcode::GroupDecorate
        | Opcode::GroupMemberDecorate
        | Opcode::DecorateId => true,
        // Mode setting names functions declared below.
        Opcode::EntryPoint | Opcode::ExecutionMode => true,
        // Forward pointer declarations and their uses.
        Opcode::TypeForwardPointer | Opcode::TypeStruct => true,
        Opcode::TypePointer => operand_index == 1,
        // Callee may be declared later.
        Opcode::FunctionCall => operand_index == 0,
        _ => false,
    }
}

impl ModuleLoader {
    /// Creates an empty loader.
    #[must_use]
    pub fn new() -> Self {
        ModuleLoader {
            module: Module::new(),
            rank: 0,
            current_section: Section::Capabilities,
            function: None,
            defined: FxHashMap::default(),
            deferred: Vec::new(),
            memory_model_seen: false,
            last_word_index: 0,
        }
    }

    /// Finalizes the module.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidLayout`] if a function is still open or no memory
    ///   model was declared.
    /// - [`Error::InvalidId`] if a forward reference never resolved.
    pub fn finish(self) -> Result<Module> {
        if self.function.is_some() {
            return Err(layout_error!("module ends inside a function"));
        }
        if !self.memory_model_seen {
            return Err(layout_error!("module declares no memory model"));
        }
        for raw in &self.deferred {
            if !self.defined.contains_key(raw) {
                return Err(Error::InvalidId(*raw));
            }
        }
        Ok(self.module)
    }

    fn check_ids(&mut self, inst: &Instruction) -> Result<()> {
        let bound = self.module.id_bound();
        let in_bound = |raw: u32| -> Result<u32> {
            if bound != 0 && raw >= bound {
                return Err(Error::InvalidId(raw));
            }
            Ok(raw)
        };

        if let Some(type_id) = inst.type_id() {
            let raw = in_bound(type_id.get())?;
            // Result types always precede their uses.
            if !self.defined.contains_key(&raw) {
                return Err(Error::InvalidId(raw));
            }
        }
        if let Some(result) = inst.result_id() {
            let raw = in_bound(result.get())?;
            if self.defined.contains_key(&raw) {
                return Err(Error::InvalidId(raw));
            }
        }
        for (index, operand) in inst.operands().iter().enumerate() {
            let Some(id) = operand.id_ref() else { continue };
            let raw = in_bound(id.get())?;
            if self.defined.contains_key(&raw) {
                continue;
            }
            if forward_allowed(inst.opcode(), index) {
                self.deferred.push(raw);
            } else {
                return Err(Error::InvalidId(raw));
            }
        }
        Ok(())
    }

    fn record_definition(&mut self, inst_id: InstId, result: Option<crate::Id>) {
        if let Some(result) = result {
            self.defined.insert(result.get(), inst_id);
        }
    }

    fn close_block(&mut self, block: BlockInProgress) -> Result<()> {
        // A merge instruction is only legal immediately before the terminator.
        let body_len = block.body.len();
        for (index, &inst) in block.body.iter().enumerate() {
            if self.module.inst(inst).is_merge() && index + 2 != body_len {
                return Err(layout_error!(
                    "merge instruction is not immediately before the terminator"
                ));
            }
        }
        let function = self.function.as_mut().expect("block outside function");
        function.blocks.push(BasicBlock::new(block.label, block.body));
        Ok(())
    }

    fn module_level(&mut self, inst: Instruction) -> Result<()> {
        let opcode = inst.opcode();

        // Debug lines keep the current section so emission preserves order.
        let section = if opcode.is_debug_line() || opcode == Opcode::Nop {
            if self.rank < rank_of(Section::Debug) {
                Section::Debug
            } else {
                self.current_section
            }
        } else if let Some(section) = section_for(opcode) {
            section
        } else {
            return Err(layout_error!("{opcode} is not valid at module scope"));
        };

        if rank_of(section) < self.rank {
            return Err(layout_error!("{opcode} appears after its section"));
        }
        if self.rank >= FUNCTION_RANK {
            return Err(layout_error!("{opcode} appears after the first function"));
        }

        if opcode == Opcode::MemoryModel {
            if self.memory_model_seen {
                return Err(layout_error!("module declares two memory models"));
            }
            self.memory_model_seen = true;
        }
        if opcode == Opcode::Variable {
            let class = inst.operand_word(0).and_then(StorageClass::from_u32);
            if class == Some(StorageClass::Function) {
                return Err(layout_error!(
                    "module-scope variable declares Function storage"
                ));
            }
        }

        let result = inst.result_id();
        let inst_id = self.module.append(section, inst);
        self.record_definition(inst_id, result);
        self.rank = rank_of(section);
        self.current_section = section;
        Ok(())
    }

    fn function_level(&mut self, inst: Instruction) -> Result<()> {
        let opcode = inst.opcode();
        let result = inst.result_id();

        match opcode {
            Opcode::FunctionParameter => {
                let inst_id = self.module.alloc_detached(inst);
                self.record_definition(inst_id, result);
                let function = self.function.as_mut().expect("checked by caller");
                if function.block.is_some() || !function.blocks.is_empty() {
                    return Err(layout_error!("function parameter after the first block"));
                }
                function.header.push(inst_id);
            }
            Opcode::Label => {
                let function = self.function.as_mut().expect("checked by caller");
                if function.block.is_some() {
                    return Err(layout_error!("label inside an unterminated block"));
                }
                let inst_id = self.module.alloc_detached(inst);
                self.record_definition(inst_id, result);
                self.function.as_mut().unwrap().block = Some(BlockInProgress {
                    label: inst_id,
                    body: Vec::new(),
                });
            }
            Opcode::FunctionEnd => {
                let function = self.function.as_mut().expect("checked by caller");
                if function.block.is_some() {
                    return Err(layout_error!("function ends inside an unterminated block"));
                }
                let inst_id = self.module.alloc_detached(inst);
                let function = self.function.take().unwrap();
                let built = Function::new(function.def, function.header, function.blocks, inst_id);
                self.module.add_function(built);
            }
            Opcode::Line | Opcode::NoLine => {
                let inst_id = self.module.alloc_detached(inst);
                let function = self.function.as_mut().expect("checked by caller");
                match function.block.as_mut() {
                    Some(block) => block.body.push(inst_id),
                    None => function.header.push(inst_id),
                }
            }
            _ => {
                if opcode == Opcode::Variable {
                    let class = inst.operand_word(0).and_then(StorageClass::from_u32);
                    if class != Some(StorageClass::Function) {
                        return Err(layout_error!(
                            "function-scope variable must declare Function storage"
                        ));
                    }
                }
                let terminates = opcode.is_terminator();
                let inst_id = self.module.alloc_detached(inst);
                self.record_definition(inst_id, result);
                let function = self.function.as_mut().expect("checked by caller");
                let Some(block) = function.block.as_mut() else {
                    return Err(layout_error!("{opcode} outside a basic block"));
                };
                block.body.push(inst_id);
                if terminates {
                    let block = function.block.take().unwrap();
                    self.close_block(block)?;
                }
            }
        }
        Ok(())
    }
}

impl Default for ModuleLoader {
    fn default() -> Self {
        ModuleLoader::new()
    }
}

impl InstructionSink for ModuleLoader {
    fn header(&mut self, header: &Header) -> Result<()> {
        self.module.set_header(
            header.version,
            header.generator,
            header.id_bound,
            header.schema,
            header.endian,
        );
        Ok(())
    }

    fn instruction(&mut self, inst: Instruction, word_index: usize) -> Result<()> {
        self.last_word_index = word_index;
        self.check_ids(&inst)?;

        if inst.opcode() == Opcode::Function {
            if self.function.is_some() {
                return Err(layout_error!("nested function definition"));
            }
            self.rank = FUNCTION_RANK;
            let result = inst.result_id();
            let inst_id = self.module.alloc_detached(inst);
            self.record_definition(inst_id, result);
            self.function = Some(FunctionInProgress {
                def: inst_id,
                header: Vec::new(),
                blocks: Vec::new(),
                block: None,
            });
            return Ok(());
        }

        if self.function.is_some() {
            self.function_level(inst)
        } else {
            self.module_level(inst)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::io::words_to_bytes;
    use crate::file::{Endianness, MAGIC};

    fn load(words: &[u32]) -> Result<Module> {
        let bytes = words_to_bytes(words, Endianness::Little);
        load_module(
            &bytes,
            &OptimizerOptions::default(),
            &mut DiagnosticSink::ignore(),
        )
    }

    fn minimal_prefix(id_bound: u32) -> Vec<u32> {
        let mut words = vec![MAGIC, 0x0001_0000, 0, id_bound, 0];
        words.extend([(2 << 16) | 17, 1]); // OpCapability Shader
        words.extend([(3 << 16) | 14, 0, 1]); // OpMemoryModel Logical GLSL450
        words
    }

    #[test]
    fn test_minimal_module_loads() {
        let module = load(&minimal_prefix(10)).unwrap();
        assert!(module.has_capability(crate::spirv::Capability::Shader));
        assert_eq!(module.functions().len(), 0);
    }

    #[test]
    fn test_missing_memory_model_rejected() {
        let mut words = vec![MAGIC, 0x0001_0000, 0, 10, 0];
        words.extend([(2 << 16) | 17, 1]);
        assert!(matches!(load(&words), Err(Error::InvalidLayout { .. })));
    }

    #[test]
    fn test_section_order_enforced() {
        let mut words = minimal_prefix(10);
        // OpCapability after the memory model.
        words.extend([(2 << 16) | 17, 2]);
        assert!(matches!(load(&words), Err(Error::InvalidLayout { .. })));
    }

    #[test]
    fn test_duplicate_definition_rejected() {
        let mut words = minimal_prefix(10);
        words.extend([(2 << 16) | 19, 2]); // %2 = OpTypeVoid
        words.extend([(2 << 16) | 19, 2]); // %2 = OpTypeVoid again
        assert!(matches!(load(&words), Err(Error::InvalidId(2))));
    }

    #[test]
    fn test_id_above_bound_rejected() {
        let mut words = minimal_prefix(4);
        words.extend([(2 << 16) | 19, 7]); // %7 = OpTypeVoid, bound is 4
        assert!(matches!(load(&words), Err(Error::InvalidId(7))));
    }

    #[test]
    fn test_use_before_def_rejected() {
        let mut words = minimal_prefix(10);
        // %3 = OpTypeVector %9 4 where %9 is never defined before use
        words.extend([(4 << 16) | 23, 3, 9, 4]);
        assert!(matches!(load(&words), Err(Error::InvalidId(9))));
    }

    fn simple_function_words(id_bound: u32) -> Vec<u32> {
        let mut words = minimal_prefix(id_bound);
        words.extend([(2 << 16) | 19, 2]); // %2 = OpTypeVoid
        words.extend([(3 << 16) | 33, 3, 2]); // %3 = OpTypeFunction %2
        words.extend([(5 << 16) | 54, 2, 4, 0, 3]); // %4 = OpFunction %2 None %3
        words.extend([(2 << 16) | 248, 5]); // %5 = OpLabel
        words.extend([(1 << 16) | 253]); // OpReturn
        words.extend([(1 << 16) | 56]); // OpFunctionEnd
        words
    }

    #[test]
    fn test_function_with_block_loads() {
        let module = load(&simple_function_words(10)).unwrap();
        assert_eq!(module.functions().len(), 1);
        let function = module.function(0);
        assert_eq!(function.blocks().len(), 1);
        let block = &function.blocks()[0];
        assert_eq!(block.id(&module).get(), 5);
        let terminator = block.terminator(&module).unwrap();
        assert_eq!(module.inst(terminator).opcode(), Opcode::Return);
    }

    #[test]
    fn test_unterminated_block_rejected() {
        let mut words = minimal_prefix(10);
        words.extend([(2 << 16) | 19, 2]);
        words.extend([(3 << 16) | 33, 3, 2]);
        words.extend([(5 << 16) | 54, 2, 4, 0, 3]);
        words.extend([(2 << 16) | 248, 5]); // OpLabel, never terminated
        words.extend([(1 << 16) | 56]); // OpFunctionEnd
        assert!(matches!(load(&words), Err(Error::InvalidLayout { .. })));
    }

    #[test]
    fn test_misplaced_merge_rejected() {
        let mut words = minimal_prefix(20);
        words.extend([(2 << 16) | 19, 2]);
        words.extend([(3 << 16) | 33, 3, 2]);
        words.extend([(5 << 16) | 54, 2, 4, 0, 3]);
        words.extend([(2 << 16) | 248, 5]); // %5 = OpLabel
        words.extend([(3 << 16) | 247, 6, 0]); // OpSelectionMerge %6 None
        words.extend([(1 << 16) | 0]); // OpNop between merge and terminator
        words.extend([(2 << 16) | 249, 6]); // OpBranch %6
        words.extend([(2 << 16) | 248, 6]); // %6 = OpLabel
        words.extend([(1 << 16) | 253]); // OpReturn
        words.extend([(1 << 16) | 56]);
        assert!(matches!(load(&words), Err(Error::InvalidLayout { .. })));
    }

    #[test]
    fn test_forward_branch_reference_resolves() {
        // The simple function's OpBranchConditional-free case is covered by
        // test_function_with_block_loads; here a branch references the label
        // of a later block.
        let mut words = minimal_prefix(10);
        words.extend([(2 << 16) | 19, 2]);
        words.extend([(3 << 16) | 33, 3, 2]);
        words.extend([(5 << 16) | 54, 2, 4, 0, 3]);
        words.extend([(2 << 16) | 248, 5]);
        words.extend([(2 << 16) | 249, 6]); // OpBranch %6 (forward)
        words.extend([(2 << 16) | 248, 6]);
        words.extend([(1 << 16) | 253]);
        words.extend([(1 << 16) | 56]);
        let module = load(&words).unwrap();
        assert_eq!(module.function(0).blocks().len(), 2);
    }

    #[test]
    fn test_unresolved_forward_reference_rejected() {
        let mut words = minimal_prefix(10);
        // OpEntryPoint referencing a function that never appears.
        words.extend([(4 << 16) | 15, 4, 9, u32::from_le_bytes(*b"f\0\0\0")]);
        assert!(matches!(load(&words), Err(Error::InvalidId(9))));
    }

    #[test]
    fn test_module_variable_storage_checked() {
        let mut words = minimal_prefix(10);
        words.extend([(3 << 16) | 22, 2, 32]); // %2 = OpTypeFloat 32
        words.extend([(4 << 16) | 32, 3, 7, 2]); // %3 = OpTypePointer Function %2
        words.extend([(4 << 16) | 59, 3, 4, 7]); // %4 = OpVariable %3 Function at module scope
        assert!(matches!(load(&words), Err(Error::InvalidLayout { .. })));
    }
}
