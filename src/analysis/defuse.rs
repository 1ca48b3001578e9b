//! The def/use database.
//!
//! For every id in a module: the instruction that defines it and the
//! instructions that use it. The user list has multiset semantics — an
//! instruction appears once per operand slot that references the id, so a
//! single rewrite of one slot removes exactly one entry.
//!
//! The index is maintained incrementally: [`analyze_inst`](DefUseIndex::analyze_inst)
//! when an instruction enters the module, [`erase_inst`](DefUseIndex::erase_inst)
//! when it is killed. Queries on unknown ids return empty results rather than
//! failing, because forward references legitimately transit through that
//! state while a module is being built.
//!
//! Iteration under mutation follows the snapshot contract: user iteration
//! walks a copy of the user list taken at entry, so the callback may kill the
//! current user (through the context) without invalidating the traversal.

use rustc_hash::FxHashMap;

use crate::module::{InstId, Module};
use crate::spirv::Instruction;
use crate::Id;

/// Def/use index over a module's ids.
#[derive(Debug, Clone, Default)]
pub struct DefUseIndex {
    /// Map from raw id to its defining instruction.
    defs: FxHashMap<u32, InstId>,
    /// Map from raw id to its using instructions, one entry per operand slot.
    users: FxHashMap<u32, Vec<InstId>>,
}

impl DefUseIndex {
    /// Builds the index from every live instruction in the module.
    ///
    /// This is an O(n) operation in the total operand count.
    #[must_use]
    pub fn build(module: &Module) -> Self {
        let mut index = DefUseIndex::default();
        module.for_each_inst(|inst| index.analyze_inst(module, inst));
        index
    }

    /// Records one instruction: its definition (if it has a result id) and a
    /// user entry for every id it references (result type included).
    pub fn analyze_inst(&mut self, module: &Module, inst_id: InstId) {
        let inst = module.inst(inst_id);
        if let Some(result) = inst.result_id() {
            self.defs.insert(result.get(), inst_id);
        }
        inst.for_each_ref_id(|id| {
            self.users.entry(id.get()).or_default().push(inst_id);
        });
    }

    /// Erases one instruction's entries: every user slot it contributed, and
    /// its definition entry when it still owns one.
    ///
    /// The caller passes the instruction data because erasure happens just
    /// before the arena slot is tombstoned.
    pub fn erase_inst(&mut self, inst_id: InstId, inst: &Instruction) {
        inst.for_each_ref_id(|id| {
            if let Some(users) = self.users.get_mut(&id.get()) {
                if let Some(position) = users.iter().position(|&u| u == inst_id) {
                    users.swap_remove(position);
                }
            }
        });
        if let Some(result) = inst.result_id() {
            if self.defs.get(&result.get()) == Some(&inst_id) {
                self.defs.remove(&result.get());
            }
        }
    }

    /// The instruction defining `id`, or `None` for unknown ids.
    #[must_use]
    pub fn get_def(&self, id: Id) -> Option<InstId> {
        self.defs.get(&id.get()).copied()
    }

    /// The instructions using `id`, one entry per referencing operand slot.
    /// Empty for unknown ids.
    #[must_use]
    pub fn users(&self, id: Id) -> &[InstId] {
        self.users.get(&id.get()).map_or(&[], Vec::as_slice)
    }

    /// The number of user entries for `id`.
    #[must_use]
    pub fn num_users(&self, id: Id) -> usize {
        self.users(id).len()
    }

    /// A snapshot of the user list, safe to iterate while users are killed.
    #[must_use]
    pub fn users_snapshot(&self, id: Id) -> Vec<InstId> {
        self.users(id).to_vec()
    }

    /// Calls `f` for each user of `id` over a snapshot taken at entry; `f`
    /// may remove users (via the context) without disturbing the iteration.
    pub fn for_each_user(&self, id: Id, mut f: impl FnMut(InstId)) {
        for user in self.users_snapshot(id) {
            f(user);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Section;
    use crate::spirv::{Opcode, Operand};

    fn id(raw: u32) -> Id {
        Id::new(raw).unwrap()
    }

    /// %1 = OpTypeInt 32 0 ; %2 = OpConstant %1 40 ; %3 = OpConstant %1 2
    /// plus a detached %4 = OpIAdd %1 %2 %2 (uses %2 twice).
    fn make_test_module() -> (Module, InstId, InstId, InstId, InstId) {
        let mut module = Module::new();
        let ty = module.append(
            Section::TypesValues,
            Instruction::new(
                Opcode::TypeInt,
                None,
                Some(id(1)),
                [Operand::Literal32(32), Operand::Literal32(0)],
            ),
        );
        let c40 = module.append(
            Section::TypesValues,
            Instruction::new(
                Opcode::Constant,
                Some(id(1)),
                Some(id(2)),
                [Operand::Literal32(40)],
            ),
        );
        let c2 = module.append(
            Section::TypesValues,
            Instruction::new(
                Opcode::Constant,
                Some(id(1)),
                Some(id(3)),
                [Operand::Literal32(2)],
            ),
        );
        let add = module.append(
            Section::TypesValues,
            Instruction::new(
                Opcode::SpecConstantOp,
                Some(id(1)),
                Some(id(4)),
                [
                    Operand::Enum(128),
                    Operand::IdRef(id(2)),
                    Operand::IdRef(id(2)),
                ],
            ),
        );
        (module, ty, c40, c2, add)
    }

    #[test]
    fn test_build_records_defs() {
        let (module, ty, c40, c2, add) = make_test_module();
        let index = DefUseIndex::build(&module);

        assert_eq!(index.get_def(id(1)), Some(ty));
        assert_eq!(index.get_def(id(2)), Some(c40));
        assert_eq!(index.get_def(id(3)), Some(c2));
        assert_eq!(index.get_def(id(4)), Some(add));
        assert_eq!(index.get_def(id(9)), None);
    }

    #[test]
    fn test_multiset_user_semantics() {
        let (module, _ty, _c40, _c2, add) = make_test_module();
        let index = DefUseIndex::build(&module);

        // %2 is used twice by the same instruction: two entries.
        let users = index.users(id(2));
        assert_eq!(users, &[add, add]);
        assert_eq!(index.num_users(id(2)), 2);

        // %1 is used as result type by three instructions.
        assert_eq!(index.num_users(id(1)), 3);

        // %3 is defined but unused.
        assert_eq!(index.num_users(id(3)), 0);

        // Unknown ids never fail.
        assert!(index.users(id(100)).is_empty());
    }

    #[test]
    fn test_erase_inst_removes_all_entries() {
        let (module, _ty, _c40, _c2, add) = make_test_module();
        let mut index = DefUseIndex::build(&module);

        let inst = module.inst(add).clone();
        index.erase_inst(add, &inst);

        assert_eq!(index.num_users(id(2)), 0);
        assert_eq!(index.get_def(id(4)), None);
        // Unrelated entries survive.
        assert_eq!(index.num_users(id(1)), 2);
    }

    #[test]
    fn test_snapshot_tolerates_removal() {
        let (module, _ty, _c40, _c2, _add) = make_test_module();
        let mut index = DefUseIndex::build(&module);

        let mut visited = 0;
        let snapshot = index.users_snapshot(id(2));
        for user in snapshot {
            visited += 1;
            // Killing the user mid-iteration must not disturb the walk.
            let inst = module.inst(user).clone();
            index.erase_inst(user, &inst);
        }
        assert_eq!(visited, 2);
        assert_eq!(index.num_users(id(2)), 0);
    }
}
