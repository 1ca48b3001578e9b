//! Def/use soundness across mutation sequences.

mod common;

use common::*;
use spirscope::prelude::*;

/// A function computing `%32 = %30 + %31` and storing it to an output.
fn arithmetic_module() -> Module {
    let mut b = ModuleBuilder::shader();
    b.entry_point(20, "main", &[9]);
    b.standard_types()
        .global(Instruction::new(
            Opcode::Constant,
            Some(id(5)),
            Some(id(7)),
            vec![lit(40)],
        ))
        .global(Instruction::new(
            Opcode::Constant,
            Some(id(5)),
            Some(id(8)),
            vec![lit(2)],
        ))
        .global(Instruction::new(
            Opcode::TypePointer,
            None,
            Some(id(10)),
            vec![en(3), idr(5)],
        ))
        .global(variable(10, 9, StorageClass::Output));
    b.function(20)
        .block(
            21,
            vec![
                iadd(5, 30, 7, 8),
                iadd(5, 31, 30, 30),
                store(9, 31),
                ret(),
            ],
        )
        .finish();
    b.finish()
}

#[test]
fn kill_inst_removes_user_entries_everywhere() {
    let mut ctx = IrContext::new(arithmetic_module());

    let second_add = ctx.get_def(id(31)).unwrap();
    assert_eq!(ctx.num_users(id(30)), 2);

    ctx.kill_inst(second_add);

    // The killed instruction appears in no user set.
    assert_eq!(ctx.num_users(id(30)), 0);
    assert_eq!(ctx.get_def(id(31)), None);

    // Everything else is untouched: %7 and %8 still feed the first add.
    let first_add = ctx.get_def(id(30)).unwrap();
    assert_eq!(ctx.def_use().users(id(7)), &[first_add]);
    assert_eq!(ctx.def_use().users(id(8)), &[first_add]);
}

#[test]
fn replace_all_uses_rewrites_every_slot() {
    let mut ctx = IrContext::new(arithmetic_module());

    // Point every use of %30 at %7 instead.
    let replaced = ctx.replace_all_uses_with(id(30), id(7));
    assert_eq!(replaced, 2, "both operand slots of the second add");

    assert_eq!(ctx.num_users(id(30)), 0);
    let second_add = ctx.get_def(id(31)).unwrap();
    let inst = ctx.module().inst(second_add);
    assert_eq!(inst.input_id(0), Some(id(7)));
    assert_eq!(inst.input_id(1), Some(id(7)));

    // The user sets reflect the rewrite.
    assert!(ctx.def_use().users(id(7)).contains(&second_add));
}

#[test]
fn snapshot_iteration_tolerates_killing_users() {
    let mut ctx = IrContext::new(arithmetic_module());

    // %30 is used twice by the second add; kill it while iterating.
    let users = ctx.users_snapshot(id(30));
    assert_eq!(users.len(), 2);
    let mut visited = 0;
    for user in users {
        visited += 1;
        ctx.kill_inst(user);
    }
    assert_eq!(visited, 2);
    assert_eq!(ctx.num_users(id(30)), 0);
}

#[test]
fn module_stays_sound_after_mutation_sequence() {
    let mut ctx = IrContext::new(arithmetic_module());

    ctx.replace_all_uses_with(id(31), id(30));
    let dead = ctx.get_def(id(31)).unwrap();
    ctx.kill_inst(dead);

    let module = ctx.into_module();
    assert_def_use_sound(&module);
    assert_structural_invariant(&module);
}
