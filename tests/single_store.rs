//! Local single-store elimination scenarios.
//!
//! Models the classic positive-and-negative shape: a local written once is
//! folded into its loads; a local written on two paths is left alone.
//!
//! ```glsl
//! in vec4 BaseColor;
//! in float fi;
//! void main() {
//!     vec4 v = BaseColor;
//!     float f = fi;
//!     if (f < 0) f = 0.0;
//!     gl_FragColor = v + f;
//! }
//! ```

mod common;

use common::*;
use spirscope::module::Section;
use spirscope::prelude::*;

/// Ids: %2 void, %3 fnty, %4 float, %5 v4float, %6 ptr_Function_v4float,
/// %7 ptr_Input_v4float, %8 BaseColor, %9 ptr_Function_float,
/// %10 ptr_Input_float, %11 fi, %12 float_0, %13 bool,
/// %14 ptr_Output_v4float, %15 gl_FragColor, %20 main,
/// %31 v, %32 f.
fn positive_and_negative_module() -> Module {
    let mut b = ModuleBuilder::shader();
    b.entry_point(20, "main", &[8, 11, 15]);
    b.name(31, "v").name(32, "f");
    b.global(Instruction::new(Opcode::TypeVoid, None, Some(id(2)), []))
        .global(Instruction::new(
            Opcode::TypeFunction,
            None,
            Some(id(3)),
            vec![idr(2)],
        ))
        .global(Instruction::new(
            Opcode::TypeFloat,
            None,
            Some(id(4)),
            vec![lit(32)],
        ))
        .global(Instruction::new(
            Opcode::TypeVector,
            None,
            Some(id(5)),
            vec![idr(4), lit(4)],
        ))
        .global(Instruction::new(
            Opcode::TypePointer,
            None,
            Some(id(6)),
            vec![en(7), idr(5)],
        ))
        .global(Instruction::new(
            Opcode::TypePointer,
            None,
            Some(id(7)),
            vec![en(1), idr(5)],
        ))
        .global(variable(7, 8, StorageClass::Input))
        .global(Instruction::new(
            Opcode::TypePointer,
            None,
            Some(id(9)),
            vec![en(7), idr(4)],
        ))
        .global(Instruction::new(
            Opcode::TypePointer,
            None,
            Some(id(10)),
            vec![en(1), idr(4)],
        ))
        .global(variable(10, 11, StorageClass::Input))
        .global(Instruction::new(
            Opcode::Constant,
            Some(id(4)),
            Some(id(12)),
            vec![lit(0)],
        ))
        .global(Instruction::new(Opcode::TypeBool, None, Some(id(13)), []))
        .global(Instruction::new(
            Opcode::TypePointer,
            None,
            Some(id(14)),
            vec![en(3), idr(5)],
        ))
        .global(variable(14, 15, StorageClass::Output));
    b.function(20)
        .block(
            30,
            vec![
                variable(6, 31, StorageClass::Function),
                variable(9, 32, StorageClass::Function),
                load(5, 33, 8),
                store(31, 33),
                load(4, 34, 11),
                store(32, 34),
                load(4, 35, 32),
                Instruction::new(
                    Opcode::FOrdLessThan,
                    Some(id(13)),
                    Some(id(36)),
                    vec![idr(35), idr(12)],
                ),
                selection_merge(40),
                branch_cond(36, 41, 40),
            ],
        )
        .block(41, vec![store(32, 12), branch(40)])
        .block(
            40,
            vec![
                load(5, 42, 31),
                load(4, 43, 32),
                Instruction::new(
                    Opcode::CompositeConstruct,
                    Some(id(5)),
                    Some(id(44)),
                    vec![idr(43), idr(43), idr(43), idr(43)],
                ),
                Instruction::new(
                    Opcode::FAdd,
                    Some(id(5)),
                    Some(id(45)),
                    vec![idr(42), idr(44)],
                ),
                store(15, 45),
                ret(),
            ],
        )
        .finish();
    b.finish()
}

fn run_pass(module: Module) -> (Module, PassStatus) {
    let mut ctx = IrContext::new(module);
    let mut pass = LocalSingleStoreElimPass::new();
    let status = pass.run(&mut ctx).expect("pass does not fail");
    (ctx.into_module(), status)
}

#[test]
fn single_store_local_is_folded_into_its_load() {
    let (module, status) = run_pass(positive_and_negative_module());
    assert_eq!(status, PassStatus::SuccessChanged);

    let mut ctx = IrContext::new(module);

    // %v (%31) and its store/load are gone; the add reads %33 directly.
    assert!(ctx.get_def(id(31)).is_none(), "%v must be eliminated");
    assert!(ctx.get_def(id(42)).is_none(), "the load of %v must be gone");
    let fadd = ctx.get_def(id(45)).unwrap();
    assert_eq!(ctx.module().inst(fadd).input_id(0), Some(id(33)));

    let module = ctx.into_module();
    assert_def_use_sound(&module);
    assert_structural_invariant(&module);
}

#[test]
fn multi_store_local_is_left_alone() {
    let (module, _) = run_pass(positive_and_negative_module());
    let mut ctx = IrContext::new(module);

    // %f (%32) has two stores; both they and its loads survive.
    assert!(ctx.get_def(id(32)).is_some(), "%f must survive");
    assert!(ctx.get_def(id(43)).is_some(), "the load of %f must survive");
    let stores_of_f = ctx
        .users_snapshot(id(32))
        .into_iter()
        .filter(|&u| ctx.module().inst(u).opcode() == Opcode::Store)
        .count();
    assert_eq!(stores_of_f, 2);
}

#[test]
fn names_of_eliminated_objects_are_removed() {
    let (module, _) = run_pass(positive_and_negative_module());

    let names: Vec<String> = module
        .section(Section::Debug)
        .filter_map(|inst| match module.inst(inst).operand(1) {
            Operand::String(s) => Some(s.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["f".to_string()], "only %f keeps its name");
}

/// Models `v[3]` read through an access chain alongside a whole-value load:
///
/// ```glsl
/// in vec4 BaseColor;
/// void main() {
///     vec4 v = BaseColor;
///     float f = v[3];
///     gl_FragColor = v * f;
/// }
/// ```
#[test]
fn partial_access_does_not_block_whole_load_folding() {
    let mut b = ModuleBuilder::shader();
    b.entry_point(20, "main", &[8, 15]);
    b.name(31, "v").name(32, "f");
    b.global(Instruction::new(Opcode::TypeVoid, None, Some(id(2)), []))
        .global(Instruction::new(
            Opcode::TypeFunction,
            None,
            Some(id(3)),
            vec![idr(2)],
        ))
        .global(Instruction::new(
            Opcode::TypeFloat,
            None,
            Some(id(4)),
            vec![lit(32)],
        ))
        .global(Instruction::new(
            Opcode::TypeVector,
            None,
            Some(id(5)),
            vec![idr(4), lit(4)],
        ))
        .global(Instruction::new(
            Opcode::TypePointer,
            None,
            Some(id(6)),
            vec![en(7), idr(5)],
        ))
        .global(Instruction::new(
            Opcode::TypePointer,
            None,
            Some(id(7)),
            vec![en(1), idr(5)],
        ))
        .global(variable(7, 8, StorageClass::Input))
        .global(Instruction::new(
            Opcode::TypePointer,
            None,
            Some(id(9)),
            vec![en(7), idr(4)],
        ))
        .global(Instruction::new(
            Opcode::TypeInt,
            None,
            Some(id(16)),
            vec![lit(32), lit(0)],
        ))
        .global(Instruction::new(
            Opcode::Constant,
            Some(id(16)),
            Some(id(17)),
            vec![lit(3)],
        ))
        .global(Instruction::new(
            Opcode::TypePointer,
            None,
            Some(id(14)),
            vec![en(3), idr(5)],
        ))
        .global(variable(14, 15, StorageClass::Output));
    b.function(20)
        .block(
            30,
            vec![
                variable(6, 31, StorageClass::Function),
                variable(9, 32, StorageClass::Function),
                load(5, 33, 8),
                store(31, 33),
                Instruction::new(
                    Opcode::AccessChain,
                    Some(id(9)),
                    Some(id(34)),
                    vec![idr(31), idr(17)],
                ),
                load(4, 35, 34),
                store(32, 35),
                load(5, 36, 31),
                load(4, 37, 32),
                Instruction::new(
                    Opcode::VectorTimesScalar,
                    Some(id(5)),
                    Some(id(38)),
                    vec![idr(36), idr(37)],
                ),
                store(15, 38),
                ret(),
            ],
        )
        .finish();

    let (module, status) = run_pass(b.finish());
    assert_eq!(status, PassStatus::SuccessChanged);

    let mut ctx = IrContext::new(module);

    // The whole-value load of %v folds to the stored value even though %v
    // is also read through an access chain.
    assert!(ctx.get_def(id(36)).is_none(), "the whole load of %v is gone");
    let vts = ctx.get_def(id(38)).unwrap();
    assert_eq!(ctx.module().inst(vts).input_id(0), Some(id(33)));

    // The partial access keeps %v, its store and the chain alive.
    assert!(ctx.get_def(id(31)).is_some(), "%v must survive");
    assert!(ctx.get_def(id(34)).is_some(), "the access chain must survive");
    assert!(ctx.get_def(id(35)).is_some(), "the partial load must survive");
    let stores_of_v = ctx
        .users_snapshot(id(31))
        .into_iter()
        .filter(|&u| ctx.module().inst(u).opcode() == Opcode::Store)
        .count();
    assert_eq!(stores_of_v, 1, "the store feeding %v must survive");

    // %f has no partial uses and folds away completely.
    assert!(ctx.get_def(id(32)).is_none(), "%f must be eliminated");
    assert!(ctx.get_def(id(37)).is_none(), "the load of %f must be gone");
    assert_eq!(ctx.module().inst(vts).input_id(1), Some(id(35)));

    // Only the surviving variable keeps its name.
    let names: Vec<String> = ctx
        .module()
        .section(Section::Debug)
        .filter_map(|inst| match ctx.module().inst(inst).operand(1) {
            Operand::String(s) => Some(s.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["v".to_string()]);

    let module = ctx.into_module();
    assert_def_use_sound(&module);
    assert_structural_invariant(&module);
}

/// Models an initialized local with no explicit store:
///
/// ```glsl
/// void main() {
///     float f = 0.0;
///     gl_FragColor = vec4(f);
/// }
/// ```
#[test]
fn initializer_is_treated_as_the_single_store() {
    let mut b = ModuleBuilder::shader();
    b.entry_point(20, "main", &[15]);
    b.name(31, "f");
    b.global(Instruction::new(Opcode::TypeVoid, None, Some(id(2)), []))
        .global(Instruction::new(
            Opcode::TypeFunction,
            None,
            Some(id(3)),
            vec![idr(2)],
        ))
        .global(Instruction::new(
            Opcode::TypeFloat,
            None,
            Some(id(4)),
            vec![lit(32)],
        ))
        .global(Instruction::new(
            Opcode::Constant,
            Some(id(4)),
            Some(id(12)),
            vec![lit(0)],
        ))
        .global(Instruction::new(
            Opcode::TypeVector,
            None,
            Some(id(5)),
            vec![idr(4), lit(4)],
        ))
        .global(Instruction::new(
            Opcode::TypePointer,
            None,
            Some(id(9)),
            vec![en(7), idr(4)],
        ))
        .global(Instruction::new(
            Opcode::TypePointer,
            None,
            Some(id(14)),
            vec![en(3), idr(5)],
        ))
        .global(variable(14, 15, StorageClass::Output));
    b.function(20)
        .block(
            30,
            vec![
                Instruction::new(
                    Opcode::Variable,
                    Some(id(9)),
                    Some(id(31)),
                    vec![en(StorageClass::Function.as_u32()), idr(12)],
                ),
                load(4, 33, 31),
                Instruction::new(
                    Opcode::CompositeConstruct,
                    Some(id(5)),
                    Some(id(34)),
                    vec![idr(33), idr(33), idr(33), idr(33)],
                ),
                store(15, 34),
                ret(),
            ],
        )
        .finish();

    let (module, status) = run_pass(b.finish());
    assert_eq!(status, PassStatus::SuccessChanged);

    let mut ctx = IrContext::new(module);

    // The load folds to the initializer value; variable and load are gone.
    assert!(ctx.get_def(id(31)).is_none(), "%f must be eliminated");
    assert!(ctx.get_def(id(33)).is_none(), "the load of %f must be gone");
    let construct = ctx.get_def(id(34)).unwrap();
    for index in 0..4 {
        assert_eq!(ctx.module().inst(construct).input_id(index), Some(id(12)));
    }

    // Its name went with it.
    assert_eq!(ctx.module().section(Section::Debug).count(), 0);

    let module = ctx.into_module();
    assert_def_use_sound(&module);
    assert_structural_invariant(&module);
}

#[test]
fn store_that_does_not_dominate_the_load_is_kept() {
    // The single store sits in one arm of an if; the load in the merge block
    // is not dominated, so nothing may be rewritten.
    let mut b = ModuleBuilder::shader();
    b.entry_point(20, "main", &[15]);
    b.global(Instruction::new(Opcode::TypeVoid, None, Some(id(2)), []))
        .global(Instruction::new(
            Opcode::TypeFunction,
            None,
            Some(id(3)),
            vec![idr(2)],
        ))
        .global(Instruction::new(Opcode::TypeBool, None, Some(id(13)), []))
        .global(Instruction::new(
            Opcode::ConstantTrue,
            Some(id(13)),
            Some(id(16)),
            Vec::new(),
        ))
        .global(Instruction::new(
            Opcode::TypeFloat,
            None,
            Some(id(4)),
            vec![lit(32)],
        ))
        .global(Instruction::new(
            Opcode::Constant,
            Some(id(4)),
            Some(id(12)),
            vec![lit(0)],
        ))
        .global(Instruction::new(
            Opcode::TypePointer,
            None,
            Some(id(9)),
            vec![en(7), idr(4)],
        ))
        .global(Instruction::new(
            Opcode::TypePointer,
            None,
            Some(id(14)),
            vec![en(3), idr(4)],
        ))
        .global(variable(14, 15, StorageClass::Output));
    b.function(20)
        .block(
            30,
            vec![
                variable(9, 31, StorageClass::Function),
                selection_merge(40),
                branch_cond(16, 41, 40),
            ],
        )
        .block(41, vec![store(31, 12), branch(40)])
        .block(40, vec![load(4, 42, 31), store(15, 42), ret()])
        .finish();

    let (module, status) = run_pass(b.finish());
    assert_eq!(status, PassStatus::SuccessNoChange);
    let mut ctx = IrContext::new(module);
    assert!(ctx.get_def(id(31)).is_some());
    assert!(ctx.get_def(id(42)).is_some());
}
