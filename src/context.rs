//! The per-module analysis context.
//!
//! [`IrContext`] owns a module together with its derived analyses and a
//! diagnostic sink. It is the single mutation gateway: killing instructions,
//! rewriting uses and synthesizing branches all go through the context so the
//! def/use database stays the single point of truth for id-use relations.
//! Analyses carry validity bits ([`AnalysisFlags`]); anything not preserved
//! by a mutating pass is dropped and lazily recomputed on next access.
//!
//! There is no global state anywhere in the crate — everything lives here,
//! and the diagnostic consumer is an injected dependency.

use bitflags::bitflags;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::analysis::{Cfg, DefUseIndex, DominatorTree, PostDominatorTree, StructuredCfg};
use crate::diagnostic::DiagnosticSink;
use crate::module::{InstId, Module, Parent};
use crate::spirv::{Instruction, Opcode, Operand};
use crate::Id;

bitflags! {
    /// Validity bits for the context's cached analyses.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AnalysisFlags: u32 {
        /// The incremental def/use database.
        const DEF_USE = 1;
        /// Per-function control flow graphs.
        const CFG = 1 << 1;
        /// Per-function structured-construct maps.
        const STRUCTURED = 1 << 2;
        /// Per-function dominator trees.
        const DOMINATORS = 1 << 3;
        /// Per-function post-dominator trees.
        const POST_DOMINATORS = 1 << 4;
    }
}

/// A module plus its lazily-computed analyses and diagnostics.
#[derive(Debug)]
pub struct IrContext {
    module: Module,
    sink: DiagnosticSink,
    def_use: Option<DefUseIndex>,
    cfgs: FxHashMap<usize, Cfg>,
    structured: FxHashMap<usize, StructuredCfg>,
    dominators: FxHashMap<usize, DominatorTree>,
    post_dominators: FxHashMap<usize, PostDominatorTree>,
}

impl IrContext {
    /// Wraps a module with a silent diagnostic sink.
    #[must_use]
    pub fn new(module: Module) -> Self {
        IrContext::with_sink(module, DiagnosticSink::ignore())
    }

    /// Wraps a module with the given diagnostic sink.
    #[must_use]
    pub fn with_sink(module: Module, sink: DiagnosticSink) -> Self {
        IrContext {
            module,
            sink,
            def_use: None,
            cfgs: FxHashMap::default(),
            structured: FxHashMap::default(),
            dominators: FxHashMap::default(),
            post_dominators: FxHashMap::default(),
        }
    }

    /// The wrapped module.
    #[must_use]
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Direct module mutation for the passes in this crate. Anything that
    /// touches operands or kills instructions must use the context helpers
    /// instead.
    pub(crate) fn module_mut(&mut self) -> &mut Module {
        &mut self.module
    }

    /// Unwraps the module, dropping all analyses.
    #[must_use]
    pub fn into_module(self) -> Module {
        self.module
    }

    /// The diagnostic sink.
    pub fn sink(&mut self) -> &mut DiagnosticSink {
        &mut self.sink
    }

    /// Which analyses are currently valid.
    #[must_use]
    pub fn valid_analyses(&self) -> AnalysisFlags {
        let mut flags = AnalysisFlags::empty();
        if self.def_use.is_some() {
            flags |= AnalysisFlags::DEF_USE;
        }
        if !self.cfgs.is_empty() {
            flags |= AnalysisFlags::CFG;
        }
        if !self.structured.is_empty() {
            flags |= AnalysisFlags::STRUCTURED;
        }
        if !self.dominators.is_empty() {
            flags |= AnalysisFlags::DOMINATORS;
        }
        if !self.post_dominators.is_empty() {
            flags |= AnalysisFlags::POST_DOMINATORS;
        }
        flags
    }

    /// Drops every analysis not named in `preserved`.
    pub fn invalidate_all_except(&mut self, preserved: AnalysisFlags) {
        if !preserved.contains(AnalysisFlags::DEF_USE) {
            self.def_use = None;
        }
        if !preserved.contains(AnalysisFlags::CFG) {
            self.cfgs.clear();
        }
        if !preserved.contains(AnalysisFlags::STRUCTURED) {
            self.structured.clear();
        }
        if !preserved.contains(AnalysisFlags::DOMINATORS) {
            self.dominators.clear();
        }
        if !preserved.contains(AnalysisFlags::POST_DOMINATORS) {
            self.post_dominators.clear();
        }
    }

    fn invalidate_control_flow(&mut self) {
        self.cfgs.clear();
        self.structured.clear();
        self.dominators.clear();
        self.post_dominators.clear();
    }

    /// The def/use database, built on first access.
    pub fn def_use(&mut self) -> &DefUseIndex {
        if self.def_use.is_none() {
            self.def_use = Some(DefUseIndex::build(&self.module));
        }
        self.def_use.as_ref().expect("just built")
    }

    /// The instruction defining `id`, or `None`.
    pub fn get_def(&mut self, id: Id) -> Option<InstId> {
        self.def_use().get_def(id)
    }

    /// Number of user entries for `id`.
    pub fn num_users(&mut self, id: Id) -> usize {
        self.def_use().num_users(id)
    }

    /// A snapshot of the users of `id`; safe to iterate while killing users.
    pub fn users_snapshot(&mut self, id: Id) -> Vec<InstId> {
        self.def_use().users_snapshot(id)
    }

    /// The CFG of function `index`, built on first access. Returned by value
    /// so callers can keep it across mutations; it reflects the module at
    /// the time of the call.
    pub fn cfg(&mut self, index: usize) -> Cfg {
        if !self.cfgs.contains_key(&index) {
            let cfg = Cfg::build(&self.module, self.module.function(index));
            self.cfgs.insert(index, cfg);
        }
        self.cfgs[&index].clone()
    }

    /// The structured-construct maps of function `index`.
    pub fn structured_cfg(&mut self, index: usize) -> StructuredCfg {
        if !self.structured.contains_key(&index) {
            let cfg = self.cfg(index);
            let built = StructuredCfg::build(&self.module, self.module.function(index), &cfg);
            self.structured.insert(index, built);
        }
        self.structured[&index].clone()
    }

    /// The dominator tree of function `index`.
    pub fn dominators(&mut self, index: usize) -> DominatorTree {
        if !self.dominators.contains_key(&index) {
            let cfg = self.cfg(index);
            let tree = DominatorTree::compute(cfg.successor_lists(), cfg.predecessor_lists(), 0);
            self.dominators.insert(index, tree);
        }
        self.dominators[&index].clone()
    }

    /// The post-dominator tree of function `index`.
    pub fn post_dominators(&mut self, index: usize) -> PostDominatorTree {
        if !self.post_dominators.contains_key(&index) {
            let cfg = self.cfg(index);
            let tree = PostDominatorTree::compute(cfg.successor_lists(), cfg.predecessor_lists());
            self.post_dominators.insert(index, tree);
        }
        self.post_dominators[&index].clone()
    }

    /// Kills an instruction: erases its def/use entries, tombstones its
    /// arena slot, and invalidates the control-flow analyses.
    ///
    /// Killing an already-dead handle is a no-op, so worklists holding stale
    /// handles are safe.
    pub fn kill_inst(&mut self, inst_id: InstId) {
        if !self.module.is_live(inst_id) {
            return;
        }
        let inst = self.module.inst(inst_id).clone();
        if let Some(def_use) = self.def_use.as_mut() {
            def_use.erase_inst(inst_id, &inst);
        }
        self.module.kill_slot(inst_id);
        if inst.is_terminator() || inst.is_merge() || inst.opcode() == Opcode::Label {
            self.invalidate_control_flow();
        }
    }

    /// Rewrites every use of `before` to `after`, keeping the def/use
    /// database consistent. Returns the number of rewritten operand slots
    /// (result-type slots included).
    pub fn replace_all_uses_with(&mut self, before: Id, after: Id) -> usize {
        self.def_use();
        let users = self
            .def_use
            .as_ref()
            .expect("just built")
            .users_snapshot(before);

        let mut replaced = 0;
        let mut processed = FxHashSet::default();
        for user in users {
            if !processed.insert(user) || !self.module.is_live(user) {
                continue;
            }
            let old = self.module.inst(user).clone();
            self.def_use
                .as_mut()
                .expect("built above")
                .erase_inst(user, &old);
            {
                let inst = self.module.inst_mut(user);
                if inst.type_id() == Some(before) {
                    inst.set_type_id(Some(after));
                    replaced += 1;
                }
                for index in 0..inst.num_operands() {
                    if inst.operand(index) == &Operand::IdRef(before) {
                        inst.set_operand(index, Operand::IdRef(after));
                        replaced += 1;
                    }
                }
            }
            self.def_use
                .as_mut()
                .expect("built above")
                .analyze_inst(&self.module, user);
        }
        replaced
    }

    /// Appends a synthesized `OpBranch` to `target` at the end of the given
    /// block, registering it with the def/use database.
    pub fn add_branch(&mut self, target: Id, function: usize, block: usize) -> InstId {
        let branch = Instruction::new(Opcode::Branch, None, None, [Operand::IdRef(target)]);
        let inst_id = self.module.alloc_detached(branch);
        self.module.set_parent(inst_id, Parent::Block { function, block });
        self.module
            .function_mut(function)
            .blocks_mut()[block]
            .push(inst_id);
        if let Some(def_use) = self.def_use.as_mut() {
            def_use.analyze_inst(&self.module, inst_id);
        }
        self.invalidate_control_flow();
        inst_id
    }

    /// Prunes an annotation operand in place (used when group decoration
    /// targets die), keeping the def/use database consistent.
    pub(crate) fn remove_operand(&mut self, inst_id: InstId, operand_index: usize) {
        let old = self.module.inst(inst_id).clone();
        if let Some(def_use) = self.def_use.as_mut() {
            def_use.erase_inst(inst_id, &old);
        }
        self.module.inst_mut(inst_id).remove_operand(operand_index);
        if let Some(def_use) = self.def_use.as_mut() {
            def_use.analyze_inst(&self.module, inst_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Section;

    fn id(raw: u32) -> Id {
        Id::new(raw).unwrap()
    }

    fn make_module() -> Module {
        let mut module = Module::new();
        module.append(
            Section::TypesValues,
            Instruction::new(
                Opcode::TypeInt,
                None,
                Some(id(1)),
                [Operand::Literal32(32), Operand::Literal32(1)],
            ),
        );
        module.append(
            Section::TypesValues,
            Instruction::new(
                Opcode::Constant,
                Some(id(1)),
                Some(id(2)),
                [Operand::Literal32(7)],
            ),
        );
        module.append(
            Section::TypesValues,
            Instruction::new(
                Opcode::Constant,
                Some(id(1)),
                Some(id(3)),
                [Operand::Literal32(8)],
            ),
        );
        module.append(
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
        module
    }

    #[test]
    fn test_kill_inst_updates_def_use() {
        let mut ctx = IrContext::new(make_module());
        let op = ctx.get_def(id(4)).unwrap();
        assert_eq!(ctx.num_users(id(2)), 2);

        ctx.kill_inst(op);
        assert_eq!(ctx.num_users(id(2)), 0);
        assert_eq!(ctx.get_def(id(4)), None);
        assert!(!ctx.module().is_live(op));

        // Stale worklist entries are harmless.
        ctx.kill_inst(op);
    }

    #[test]
    fn test_replace_all_uses_with() {
        let mut ctx = IrContext::new(make_module());
        let replaced = ctx.replace_all_uses_with(id(2), id(3));
        assert_eq!(replaced, 2);
        assert_eq!(ctx.num_users(id(2)), 0);
        assert_eq!(ctx.num_users(id(3)), 2);

        let op = ctx.get_def(id(4)).unwrap();
        let inst = ctx.module().inst(op);
        assert_eq!(inst.input_id(1), Some(id(3)));
        assert_eq!(inst.input_id(2), Some(id(3)));
    }

    #[test]
    fn test_analysis_invalidation() {
        let mut ctx = IrContext::new(make_module());
        let _ = ctx.def_use();
        assert!(ctx.valid_analyses().contains(AnalysisFlags::DEF_USE));

        ctx.invalidate_all_except(AnalysisFlags::empty());
        assert!(ctx.valid_analyses().is_empty());

        let _ = ctx.def_use();
        ctx.invalidate_all_except(AnalysisFlags::DEF_USE);
        assert!(ctx.valid_analyses().contains(AnalysisFlags::DEF_USE));
    }
}
