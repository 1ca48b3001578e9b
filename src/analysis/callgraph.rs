//! Static call graph traversal.
//!
//! SPIR-V has no indirect calls, so the call graph is exactly the set of
//! `OpFunctionCall` callees per function. The passes only ever need one
//! traversal: the functions reachable from the entry points, in post-order
//! (callees before callers).

use rustc_hash::FxHashSet;

use crate::module::Module;
use crate::spirv::Opcode;

/// Function indices reachable from the module's entry points, in post-order
/// over the static call graph (callees before callers).
///
/// Each function appears once, however many call sites reach it.
#[must_use]
pub fn entry_point_call_tree_post_order(module: &Module) -> Vec<usize> {
    let mut order = Vec::new();
    let mut visited = FxHashSet::default();

    for entry_id in module.entry_point_ids() {
        let Some(root) = module.function_index_of(entry_id) else {
            continue;
        };
        visit(module, root, &mut visited, &mut order);
    }

    order
}

fn visit(module: &Module, index: usize, visited: &mut FxHashSet<usize>, order: &mut Vec<usize>) {
    if !visited.insert(index) {
        return;
    }
    for callee in callees(module, index) {
        visit(module, callee, visited, order);
    }
    order.push(index);
}

/// Indices of the functions called by `function`, in call-site order with
/// duplicates removed.
fn callees(module: &Module, index: usize) -> Vec<usize> {
    let mut seen = FxHashSet::default();
    let mut result = Vec::new();
    let function = module.function(index);
    for block in function.blocks() {
        for inst in block.instructions(module) {
            let inst = module.inst(inst);
            if inst.opcode() != Opcode::FunctionCall {
                continue;
            }
            let Some(callee_id) = inst.input_id(0) else {
                continue;
            };
            if let Some(callee) = module.function_index_of(callee_id) {
                if seen.insert(callee) {
                    result.push(callee);
                }
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{BasicBlock, Function, Section};
    use crate::spirv::{Instruction, Operand};
    use crate::Id;

    fn id(raw: u32) -> Id {
        Id::new(raw).unwrap()
    }

    /// Builds a module with functions %10, %11, %12 where %10 is the entry
    /// point, %10 calls %11, and %12 is unreachable.
    fn make_module() -> Module {
        let mut module = Module::new();
        module.append(
            Section::EntryPoints,
            Instruction::new(
                Opcode::EntryPoint,
                None,
                None,
                [
                    Operand::Enum(4),
                    Operand::IdRef(id(10)),
                    Operand::String("main".to_string()),
                ],
            ),
        );
        module.append(
            Section::TypesValues,
            Instruction::new(Opcode::TypeVoid, None, Some(id(1)), []),
        );

        let mut add_function = |fn_id: u32, callee: Option<u32>, next_id: u32| {
            let def = module.alloc_detached(Instruction::new(
                Opcode::Function,
                Some(id(1)),
                Some(id(fn_id)),
                [Operand::Enum(0), Operand::IdRef(id(1))],
            ));
            let label =
                module.alloc_detached(Instruction::new(Opcode::Label, None, Some(id(next_id)), []));
            let mut body = Vec::new();
            if let Some(callee) = callee {
                body.push(module.alloc_detached(Instruction::new(
                    Opcode::FunctionCall,
                    Some(id(1)),
                    Some(id(next_id + 1)),
                    [Operand::IdRef(id(callee))],
                )));
            }
            body.push(module.alloc_detached(Instruction::new(Opcode::Return, None, None, [])));
            let end = module.alloc_detached(Instruction::new(Opcode::FunctionEnd, None, None, []));
            module.add_function(Function::new(
                def,
                Vec::new(),
                vec![BasicBlock::new(label, body)],
                end,
            ));
        };

        add_function(10, Some(11), 20);
        add_function(11, None, 30);
        add_function(12, None, 40);
        module
    }

    #[test]
    fn test_post_order_visits_callees_first() {
        let module = make_module();
        let order = entry_point_call_tree_post_order(&module);
        // %11 (index 1) before %10 (index 0); %12 (index 2) unreachable.
        assert_eq!(order, vec![1, 0]);
    }
}
