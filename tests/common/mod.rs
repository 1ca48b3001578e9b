//! Shared helpers for building test modules programmatically.
//!
//! Tests construct modules the way the loader would, with explicit ids, so
//! each scenario reads like the disassembly it models.

#![allow(dead_code)]

use spirscope::module::Section;
use spirscope::prelude::*;

/// Shorthand for a non-zero id.
pub fn id(raw: u32) -> Id {
    Id::new(raw).expect("test ids are non-zero")
}

/// `Operand::IdRef` shorthand.
pub fn idr(raw: u32) -> Operand {
    Operand::IdRef(id(raw))
}

/// `Operand::Literal32` shorthand.
pub fn lit(value: u32) -> Operand {
    Operand::Literal32(value)
}

/// `Operand::Enum` shorthand.
pub fn en(value: u32) -> Operand {
    Operand::Enum(value)
}

/// `Operand::String` shorthand.
pub fn text(value: &str) -> Operand {
    Operand::String(value.to_string())
}

pub fn branch(target: u32) -> Instruction {
    Instruction::new(Opcode::Branch, None, None, [idr(target)])
}

pub fn branch_cond(cond: u32, if_true: u32, if_false: u32) -> Instruction {
    Instruction::new(
        Opcode::BranchConditional,
        None,
        None,
        [idr(cond), idr(if_true), idr(if_false)],
    )
}

pub fn selection_merge(merge: u32) -> Instruction {
    Instruction::new(Opcode::SelectionMerge, None, None, [idr(merge), en(0)])
}

pub fn loop_merge(merge: u32, cont: u32) -> Instruction {
    Instruction::new(
        Opcode::LoopMerge,
        None,
        None,
        [idr(merge), idr(cont), en(0)],
    )
}

pub fn ret() -> Instruction {
    Instruction::new(Opcode::Return, None, None, [])
}

pub fn store(ptr: u32, value: u32) -> Instruction {
    Instruction::new(Opcode::Store, None, None, [idr(ptr), idr(value)])
}

pub fn load(result_type: u32, result: u32, ptr: u32) -> Instruction {
    Instruction::new(Opcode::Load, Some(id(result_type)), Some(id(result)), [idr(ptr)])
}

pub fn iadd(result_type: u32, result: u32, a: u32, b: u32) -> Instruction {
    Instruction::new(
        Opcode::IAdd,
        Some(id(result_type)),
        Some(id(result)),
        [idr(a), idr(b)],
    )
}

pub fn variable(ptr_type: u32, result: u32, storage: StorageClass) -> Instruction {
    Instruction::new(
        Opcode::Variable,
        Some(id(ptr_type)),
        Some(id(result)),
        [en(storage.as_u32())],
    )
}

/// Fluent builder for shader-shaped test modules.
pub struct ModuleBuilder {
    pub module: Module,
}

impl ModuleBuilder {
    /// A module declaring `Shader` and the logical GLSL450 memory model.
    pub fn shader() -> Self {
        let mut module = Module::new();
        module.append(
            Section::Capabilities,
            Instruction::new(Opcode::Capability, None, None, [en(1)]),
        );
        module.append(
            Section::MemoryModel,
            Instruction::new(Opcode::MemoryModel, None, None, [en(0), en(1)]),
        );
        ModuleBuilder { module }
    }

    pub fn capability(&mut self, value: u32) -> &mut Self {
        self.module.append(
            Section::Capabilities,
            Instruction::new(Opcode::Capability, None, None, [en(value)]),
        );
        self
    }

    pub fn extension(&mut self, name: &str) -> &mut Self {
        self.module.append(
            Section::Extensions,
            Instruction::new(Opcode::Extension, None, None, [text(name)]),
        );
        self
    }

    /// `OpEntryPoint Fragment %function "name" <interface...>`
    pub fn entry_point(&mut self, function: u32, name: &str, interface: &[u32]) -> &mut Self {
        let mut operands = vec![en(4), idr(function), text(name)];
        operands.extend(interface.iter().map(|&i| idr(i)));
        self.module.append(
            Section::EntryPoints,
            Instruction::new(Opcode::EntryPoint, None, None, operands),
        );
        self
    }

    pub fn execution_mode(&mut self, function: u32, mode: u32) -> &mut Self {
        self.module.append(
            Section::ExecutionModes,
            Instruction::new(Opcode::ExecutionMode, None, None, [idr(function), en(mode)]),
        );
        self
    }

    pub fn name(&mut self, target: u32, name: &str) -> &mut Self {
        self.module.append(
            Section::Debug,
            Instruction::new(Opcode::Name, None, None, [idr(target), text(name)]),
        );
        self
    }

    pub fn annotation(&mut self, inst: Instruction) -> &mut Self {
        self.module.append(Section::Annotations, inst);
        self
    }

    pub fn global(&mut self, inst: Instruction) -> &mut Self {
        self.module.append(Section::TypesValues, inst);
        self
    }

    /// Common scalar types: `%2 = OpTypeVoid`, `%3 = OpTypeFunction %2`,
    /// `%4 = OpTypeBool`, `%5 = OpTypeInt 32 0`, `%6 = OpTypeFloat 32`.
    pub fn standard_types(&mut self) -> &mut Self {
        self.global(Instruction::new(Opcode::TypeVoid, None, Some(id(2)), []))
            .global(Instruction::new(
                Opcode::TypeFunction,
                None,
                Some(id(3)),
                [idr(2)],
            ))
            .global(Instruction::new(Opcode::TypeBool, None, Some(id(4)), []))
            .global(Instruction::new(
                Opcode::TypeInt,
                None,
                Some(id(5)),
                [lit(32), lit(0)],
            ))
            .global(Instruction::new(
                Opcode::TypeFloat,
                None,
                Some(id(6)),
                [lit(32)],
            ))
    }

    /// Starts a `void`-returning function: `%result = OpFunction %2 None %3`.
    pub fn function(&mut self, result: u32) -> FunctionBuilder<'_> {
        let def = self.module.alloc_detached(Instruction::new(
            Opcode::Function,
            Some(id(2)),
            Some(id(result)),
            [en(0), idr(3)],
        ));
        FunctionBuilder {
            module: &mut self.module,
            def,
            header: Vec::new(),
            blocks: Vec::new(),
        }
    }

    pub fn finish(self) -> Module {
        self.module
    }
}

/// Builder for one function's header and blocks.
pub struct FunctionBuilder<'a> {
    module: &'a mut Module,
    def: InstId,
    header: Vec<InstId>,
    blocks: Vec<BasicBlock>,
}

impl FunctionBuilder<'_> {
    pub fn block(mut self, label: u32, body: Vec<Instruction>) -> Self {
        let label = self
            .module
            .alloc_detached(Instruction::new(Opcode::Label, None, Some(id(label)), []));
        let body = body
            .into_iter()
            .map(|inst| self.module.alloc_detached(inst))
            .collect();
        self.blocks.push(BasicBlock::new(label, body));
        self
    }

    pub fn finish(self) -> usize {
        let end = self
            .module
            .alloc_detached(Instruction::new(Opcode::FunctionEnd, None, None, []));
        self.module
            .add_function(Function::new(self.def, self.header, self.blocks, end))
    }
}

/// Asserts the def/use soundness property on a freshly built index: every
/// id reference of every live instruction resolves to a live definition.
pub fn assert_def_use_sound(module: &Module) {
    let mut ctx = IrContext::new(clone_by_reload(module));
    let mut refs: Vec<(InstId, Id)> = Vec::new();
    ctx.module().for_each_inst(|inst_id| {
        let inst = ctx.module().inst(inst_id);
        if let Some(type_id) = inst.type_id() {
            refs.push((inst_id, type_id));
        }
        for operand in inst.operands() {
            if let Operand::IdRef(r) = operand {
                refs.push((inst_id, *r));
            }
        }
    });
    for (user, r) in refs {
        let def = ctx
            .def_use()
            .get_def(r)
            .unwrap_or_else(|| panic!("{r} referenced by a live instruction has no definition"));
        assert!(
            ctx.module().is_live(def),
            "{r} referenced by {user} resolves to a dead definition"
        );
        assert!(
            ctx.def_use().users(r).contains(&user),
            "{user} missing from the user set of {r}"
        );
    }
}

/// Round-trips the module through its binary form, producing an
/// independently-owned copy.
fn clone_by_reload(module: &Module) -> Module {
    let bytes = emit_bytes(module);
    load_module(
        &bytes,
        &OptimizerOptions::default(),
        &mut DiagnosticSink::ignore(),
    )
    .expect("emitted module reloads")
}

/// Asserts every block of every function ends in exactly one terminator and
/// any merge instruction sits immediately before it.
pub fn assert_structural_invariant(module: &Module) {
    for function in module.functions() {
        for block in function.blocks() {
            let insts: Vec<InstId> = block.instructions(module).collect();
            assert!(
                !insts.is_empty(),
                "block {} has an empty body",
                block.id(module)
            );
            let terminator_count = insts
                .iter()
                .filter(|&&i| module.inst(i).is_terminator())
                .count();
            assert_eq!(
                terminator_count,
                1,
                "block {} must have exactly one terminator",
                block.id(module)
            );
            assert!(
                module.inst(*insts.last().unwrap()).is_terminator(),
                "block {} does not end in its terminator",
                block.id(module)
            );
            for (offset, &inst) in insts.iter().enumerate() {
                if module.inst(inst).is_merge() {
                    assert_eq!(
                        offset,
                        insts.len() - 2,
                        "merge in block {} is not immediately before the terminator",
                        block.id(module)
                    );
                }
            }
        }
    }
}
