//! Aggressive dead-code elimination.
//!
//! Liveness-based elimination over structured SPIR-V: everything is dead
//! until proven live, starting from instructions with externally visible
//! effects and closing transitively over operands, result types, enclosing
//! structured constructs, and the stores feeding live loads of local
//! variables. Dead instructions are then killed; a structured construct that
//! dies entirely is replaced by a direct branch to its merge block, and the
//! stranded body is removed by the CFG cleanup.
//!
//! Preconditions: the module declares `Shader`, does not declare `Addresses`
//! (logical addressing is assumed throughout the pointer tracking), and
//! every declared extension is on the allow-list. Otherwise the pass reports
//! an informational diagnostic and leaves the module untouched.
//!
//! Known limitation: `Private` variables are treated as function-local in an
//! entry point without calls, evaluated per function. Two entry points
//! sharing a `Private` variable each apply the heuristic independently.

use std::collections::{BTreeSet, VecDeque};

use rustc_hash::FxHashSet;

use crate::analysis::{entry_point_call_tree_post_order, Cfg, StructuredCfg};
use crate::context::IrContext;
use crate::module::{InstId, Module, Section};
use crate::passes::{cfg_cleanup, Pass, PassStatus};
use crate::spirv::{BuiltIn, Capability, Decoration, Opcode, StorageClass};
use crate::{Error, Id, OptimizerOptions, Result};

const LOOP_MERGE_MERGE_BLOCK_IN_IDX: usize = 0;
const LOOP_MERGE_CONTINUE_BLOCK_IN_IDX: usize = 1;
const SELECTION_MERGE_MERGE_BLOCK_IN_IDX: usize = 0;
const ENTRY_POINT_FUNCTION_ID_IN_IDX: usize = 1;

/// The aggressive dead-code elimination pass.
pub struct AggressiveDcePass {
    extensions_allow_list: BTreeSet<String>,

    /// Instructions proven live.
    live: FxHashSet<InstId>,
    /// Live instructions whose consequences are still unprocessed.
    worklist: VecDeque<InstId>,
    /// Local variables whose stores have already been injected.
    live_local_vars: FxHashSet<u32>,
    /// Everything to kill once liveness is complete.
    to_kill: Vec<InstId>,

    // Per-function state.
    current_function: usize,
    cfg: Option<Cfg>,
    structured: StructuredCfg,
    private_stores: Vec<InstId>,
    call_in_func: bool,
    func_is_entry_point: bool,
    private_like_local: bool,
}

impl AggressiveDcePass {
    /// Creates the pass with the default extension allow-list.
    #[must_use]
    pub fn new() -> Self {
        AggressiveDcePass::with_options(&OptimizerOptions::default())
    }

    /// Creates the pass with the allow-list from `options`.
    #[must_use]
    pub fn with_options(options: &OptimizerOptions) -> Self {
        AggressiveDcePass {
            extensions_allow_list: options.extensions_allow_list.clone(),
            live: FxHashSet::default(),
            worklist: VecDeque::new(),
            live_local_vars: FxHashSet::default(),
            to_kill: Vec::new(),
            current_function: 0,
            cfg: None,
            structured: StructuredCfg::default(),
            private_stores: Vec::new(),
            call_in_func: false,
            func_is_entry_point: false,
            private_like_local: false,
        }
    }

    fn reset(&mut self) {
        self.live.clear();
        self.worklist.clear();
        self.live_local_vars.clear();
        self.to_kill.clear();
        self.cfg = None;
        self.structured = StructuredCfg::default();
        self.private_stores.clear();
    }

    fn add_to_worklist(&mut self, inst: InstId) {
        // Marking live on insertion deduplicates the worklist; stale handles
        // popped later are ignored naturally.
        if self.live.insert(inst) {
            self.worklist.push_back(inst);
        }
    }

    fn is_live(&self, inst: InstId) -> bool {
        self.live.contains(&inst)
    }

    /// Dead means not live — except branches outside structured headers,
    /// which must survive so every block keeps its terminator.
    fn is_dead(&self, module: &Module, inst_id: InstId) -> bool {
        if self.is_live(inst_id) {
            return false;
        }
        let inst = module.inst(inst_id);
        if inst.is_branch() {
            let header = module.block_of(inst_id).is_some_and(|(function, block)| {
                module.function(function).blocks()[block].is_structured_header(module)
            });
            if !header {
                return false;
            }
        }
        true
    }

    fn is_var_of_storage(
        &self,
        ctx: &mut IrContext,
        var_id: Option<Id>,
        class: StorageClass,
    ) -> bool {
        let Some(var_id) = var_id else { return false };
        let Some(def) = ctx.get_def(var_id) else {
            return false;
        };
        let inst = ctx.module().inst(def);
        if inst.opcode() != Opcode::Variable {
            return false;
        }
        let Some(type_id) = inst.type_id() else {
            return false;
        };
        let Some(type_def) = ctx.get_def(type_id) else {
            return false;
        };
        let type_inst = ctx.module().inst(type_def);
        type_inst.opcode() == Opcode::TypePointer
            && type_inst.operand_word(0) == Some(class.as_u32())
    }

    fn is_local_var(&self, ctx: &mut IrContext, var_id: Option<Id>) -> bool {
        self.is_var_of_storage(ctx, var_id, StorageClass::Function)
            || (self.private_like_local
                && self.is_var_of_storage(ctx, var_id, StorageClass::Private))
    }

    /// Walks access chains and object copies back to the base pointer.
    fn get_ptr(&self, ctx: &mut IrContext, mut id: Id) -> Id {
        loop {
            let Some(def) = ctx.get_def(id) else { return id };
            match ctx.module().inst(def).opcode() {
                Opcode::AccessChain
                | Opcode::InBoundsAccessChain
                | Opcode::PtrAccessChain
                | Opcode::InBoundsPtrAccessChain
                | Opcode::CopyObject => match ctx.module().inst(def).input_id(0) {
                    Some(base) => id = base,
                    None => return id,
                },
                _ => return id,
            }
        }
    }

    fn is_ptr(&self, ctx: &mut IrContext, id: Id) -> bool {
        let Some(def) = ctx.get_def(id) else {
            return false;
        };
        if ctx.module().inst(def).opcode() == Opcode::Variable {
            return true;
        }
        let Some(type_id) = ctx.module().inst(def).type_id() else {
            return false;
        };
        let Some(type_def) = ctx.get_def(type_id) else {
            return false;
        };
        ctx.module().inst(type_def).opcode() == Opcode::TypePointer
    }

    /// Marks everything that may write through `ptr_id` live: stores, calls,
    /// and anything else that is not a plain load, chasing derived pointers.
    fn add_stores(&mut self, ctx: &mut IrContext, ptr_id: Id) {
        for user in ctx.users_snapshot(ptr_id) {
            match ctx.module().inst(user).opcode() {
                Opcode::AccessChain
                | Opcode::InBoundsAccessChain
                | Opcode::PtrAccessChain
                | Opcode::InBoundsPtrAccessChain
                | Opcode::CopyObject => {
                    if let Some(result) = ctx.module().inst(user).result_id() {
                        self.add_stores(ctx, result);
                    }
                }
                Opcode::Load => {}
                // Stores, and anything that might store (calls, ext-inst
                // output parameters).
                _ => self.add_to_worklist(user),
            }
        }
    }

    /// A live load of a local variable makes all of the variable's stores
    /// live, once per variable.
    fn process_load(&mut self, ctx: &mut IrContext, var_id: Id) {
        if !self.is_local_var(ctx, Some(var_id)) {
            return;
        }
        if !self.live_local_vars.insert(var_id.get()) {
            return;
        }
        self.add_stores(ctx, var_id);
    }

    fn all_extensions_supported(&self, module: &Module) -> bool {
        module
            .extension_names()
            .iter()
            .all(|name| self.extensions_allow_list.contains(*name))
    }

    /// Module-level seeds: execution modes, entry points, and the
    /// `BuiltIn WorkgroupSize` decoration.
    fn initialize_module_scope_live(&mut self, ctx: &IrContext) {
        let module = ctx.module();
        for inst in module.section(Section::ExecutionModes) {
            self.add_to_worklist(inst);
        }
        for inst in module.section(Section::EntryPoints) {
            self.add_to_worklist(inst);
        }
        for inst in module.section(Section::Annotations) {
            let anno = module.inst(inst);
            if anno.opcode() == Opcode::Decorate
                && anno.operand_word(1) == Some(Decoration::BuiltIn.as_u32())
                && anno.operand_word(2) == Some(BuiltIn::WorkgroupSize.as_u32())
            {
                self.add_to_worklist(inst);
            }
        }
    }

    /// Removes functions unreachable from every entry point.
    fn eliminate_dead_functions(&mut self, ctx: &mut IrContext) -> bool {
        let live: Vec<usize> = entry_point_call_tree_post_order(ctx.module());
        let total = ctx.module().functions().len();
        if live.len() == total {
            return false;
        }

        for index in 0..total {
            if live.contains(&index) {
                continue;
            }
            let mut doomed = Vec::new();
            ctx.module()
                .function(index)
                .for_each_inst(ctx.module(), |inst| doomed.push(inst));
            for inst in doomed {
                ctx.kill_inst(inst);
            }
        }
        ctx.module_mut().retain_functions(&live);
        true
    }

    /// Seeds, closes and kills over one function. Returns whether the kill
    /// list grew.
    fn process_function(&mut self, ctx: &mut IrContext, index: usize) -> bool {
        self.current_function = index;
        self.private_stores.clear();
        self.call_in_func = false;

        // Function header and parameters are always live.
        let def = ctx.module().function(index).def();
        self.add_to_worklist(def);
        let params: Vec<InstId> = ctx
            .module()
            .function(index)
            .parameters(ctx.module())
            .collect();
        for param in params {
            self.add_to_worklist(param);
        }

        let function_id = ctx.module().function(index).result_id(ctx.module());
        self.func_is_entry_point = ctx.module().section(Section::EntryPoints).any(|ep| {
            ctx.module().inst(ep).input_id(ENTRY_POINT_FUNCTION_ID_IN_IDX) == Some(function_id)
        });

        let cfg = Cfg::build(ctx.module(), ctx.module().function(index));
        self.structured = StructuredCfg::build(ctx.module(), ctx.module().function(index), &cfg);
        let order = cfg.structured_order().to_vec();
        self.cfg = Some(cfg);

        self.seed_function(ctx, &order);

        // An entry point without calls cannot leak Private state, so its
        // Private variables behave like locals. Otherwise every recorded
        // Private store is an external effect.
        self.private_like_local = self.func_is_entry_point && !self.call_in_func;
        if !self.private_like_local {
            let stores = std::mem::take(&mut self.private_stores);
            for store in stores {
                self.add_to_worklist(store);
            }
        }

        self.compute_closure(ctx);
        self.kill_dead_instructions(ctx, &order)
    }

    /// The per-block seeding scan over the structured order.
    fn seed_function(&mut self, ctx: &mut IrContext, order: &[usize]) {
        // When immediately inside an if- or loop-construct, branches start
        // out dead; everywhere else they are live. The sentinel entries
        // cover function scope.
        let mut assume_branches_live = vec![true];
        let mut current_merge_stack = vec![0u32];

        for &block_index in order {
            let block_id = ctx.module().function(self.current_function).blocks()[block_index]
                .id(ctx.module())
                .get();
            if block_id == *current_merge_stack.last().expect("sentinel") {
                assume_branches_live.pop();
                current_merge_stack.pop();
            }

            let insts: Vec<InstId> = ctx.module().function(self.current_function).blocks()
                [block_index]
                .instructions(ctx.module())
                .collect();
            for inst_id in insts {
                let opcode = ctx.module().inst(inst_id).opcode();
                match opcode {
                    Opcode::Store => {
                        let ptr = ctx.module().inst(inst_id).input_id(0);
                        let var = ptr.map(|p| self.get_ptr(ctx, p));
                        if self.is_var_of_storage(ctx, var, StorageClass::Private) {
                            self.private_stores.push(inst_id);
                        } else if !self.is_var_of_storage(ctx, var, StorageClass::Function) {
                            self.add_to_worklist(inst_id);
                        }
                    }
                    Opcode::LoopMerge => {
                        assume_branches_live.push(false);
                        current_merge_stack.push(
                            ctx.module()
                                .inst(inst_id)
                                .operand_word(LOOP_MERGE_MERGE_BLOCK_IN_IDX)
                                .unwrap_or(0),
                        );
                    }
                    Opcode::SelectionMerge => {
                        assume_branches_live.push(false);
                        current_merge_stack.push(
                            ctx.module()
                                .inst(inst_id)
                                .operand_word(SELECTION_MERGE_MERGE_BLOCK_IN_IDX)
                                .unwrap_or(0),
                        );
                    }
                    Opcode::Branch | Opcode::BranchConditional | Opcode::Switch => {
                        if *assume_branches_live.last().expect("sentinel") {
                            self.add_to_worklist(inst_id);
                        }
                    }
                    _ => {
                        if !opcode.is_combinator() {
                            self.add_to_worklist(inst_id);
                        }
                        if opcode == Opcode::FunctionCall {
                            self.call_in_func = true;
                        }
                    }
                }
            }
        }
    }

    /// Worklist propagation until the live set stops growing.
    fn compute_closure(&mut self, ctx: &mut IrContext) {
        while let Some(live_inst) = self.worklist.pop_front() {
            let inst = ctx.module().inst(live_inst).clone();
            let is_branch = inst.is_branch();

            // Operand definitions become live — except labels of branches,
            // which would pull in enclosing structure unnecessarily.
            for id in inst.input_ids() {
                if let Some(def) = ctx.get_def(id) {
                    if is_branch && ctx.module().inst(def).opcode() == Opcode::Label {
                        continue;
                    }
                    self.add_to_worklist(def);
                }
            }
            if let Some(type_id) = inst.type_id() {
                if let Some(def) = ctx.get_def(type_id) {
                    self.add_to_worklist(def);
                }
            }

            // Inside a structured construct, the controlling branch and its
            // merge are live; a live loop keeps its breaks and continues.
            if let Some((function, block)) = ctx.module().block_of(live_inst) {
                if function == self.current_function {
                    if let Some(branch) = self.structured.header_branch_of_block(block) {
                        self.add_to_worklist(branch);
                        if let Some(merge) = self.structured.merge_of_branch(branch) {
                            self.add_to_worklist(merge);
                            if ctx.module().inst(merge).opcode() == Opcode::LoopMerge {
                                self.add_breaks_and_continues(ctx, merge);
                            }
                        }
                    }
                }
            }

            match inst.opcode() {
                Opcode::Load => {
                    if let Some(ptr) = inst.input_id(0) {
                        let var = self.get_ptr(ctx, ptr);
                        self.process_load(ctx, var);
                    }
                }
                // A call may load through any pointer argument.
                Opcode::FunctionCall => {
                    for id in inst.input_ids() {
                        if self.is_ptr(ctx, id) {
                            let var = self.get_ptr(ctx, id);
                            self.process_load(ctx, var);
                        }
                    }
                }
                // A pointer parameter behaves like a load of its storage.
                Opcode::FunctionParameter => {
                    if let Some(result) = inst.result_id() {
                        if self.is_ptr(ctx, result) {
                            let var = self.get_ptr(ctx, result);
                            self.process_load(ctx, var);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// A live loop keeps its break and continue branches, detected
    /// structurally from the merge and continue targets.
    fn add_breaks_and_continues(&mut self, ctx: &mut IrContext, loop_merge: InstId) {
        let Some((function, header_block)) = ctx.module().block_of(loop_merge) else {
            return;
        };
        if function != self.current_function {
            return;
        }
        let cfg = self.cfg.as_ref().expect("set by process_function");
        let header_index = self.structured.order_index(header_block);

        let Some(merge_raw) = ctx
            .module()
            .inst(loop_merge)
            .operand_word(LOOP_MERGE_MERGE_BLOCK_IN_IDX)
        else {
            return;
        };
        let Some(merge_block) = cfg.block_of_label(merge_raw) else {
            return;
        };
        let merge_index = self.structured.order_index(merge_block);
        let Some(merge_label) = Id::new(merge_raw) else {
            return;
        };

        // A break is a branch from strictly inside the loop to the merge.
        for user in ctx.users_snapshot(merge_label) {
            if !ctx.module().inst(user).is_branch() {
                continue;
            }
            let Some((f, block)) = ctx.module().block_of(user) else {
                continue;
            };
            if f != self.current_function {
                continue;
            }
            let index = self.structured.order_index(block);
            if header_index < index && index < merge_index {
                self.add_to_worklist(user);
                if let Some(user_merge) = self.structured.merge_of_branch(user) {
                    self.add_to_worklist(user_merge);
                }
            }
        }

        let Some(cont_raw) = ctx
            .module()
            .inst(loop_merge)
            .operand_word(LOOP_MERGE_CONTINUE_BLOCK_IN_IDX)
        else {
            return;
        };
        let Some(cont_label) = Id::new(cont_raw) else {
            return;
        };

        for user in ctx.users_snapshot(cont_label) {
            match ctx.module().inst(user).opcode() {
                Opcode::BranchConditional | Opcode::Switch => {
                    // Not a continue when the branch merely completes its own
                    // selection whose merge is the continue target.
                    if let Some(hdr_merge) = self.structured.merge_of_branch(user) {
                        if ctx.module().inst(hdr_merge).opcode() == Opcode::SelectionMerge {
                            let hdr_merge_id = ctx
                                .module()
                                .inst(hdr_merge)
                                .operand_word(SELECTION_MERGE_MERGE_BLOCK_IN_IDX);
                            if hdr_merge_id == Some(cont_raw) {
                                continue;
                            }
                            self.add_to_worklist(hdr_merge);
                        }
                    }
                    self.add_to_worklist(user);
                }
                Opcode::Branch => {
                    // An unconditional branch is a continue only when it is
                    // not branching to its own construct's merge block.
                    let Some((f, block)) = ctx.module().block_of(user) else {
                        continue;
                    };
                    if f != self.current_function {
                        continue;
                    }
                    let Some(hdr_branch) = self.structured.header_branch_of_block(block) else {
                        continue;
                    };
                    let Some(hdr_merge) = self.structured.merge_of_branch(hdr_branch) else {
                        continue;
                    };
                    if ctx.module().inst(hdr_merge).opcode() == Opcode::LoopMerge {
                        continue;
                    }
                    if ctx
                        .module()
                        .inst(hdr_merge)
                        .operand_word(SELECTION_MERGE_MERGE_BLOCK_IN_IDX)
                        == Some(cont_raw)
                    {
                        continue;
                    }
                    self.add_to_worklist(user);
                }
                _ => {}
            }
        }
    }

    /// Collects the dead instructions of one function. When a structured
    /// header dies, a branch to its merge block replaces it and everything
    /// up to the merge block is skipped — the CFG cleanup removes the
    /// stranded blocks afterwards.
    fn kill_dead_instructions(&mut self, ctx: &mut IrContext, order: &[usize]) -> bool {
        let mut modified = false;
        let mut position = 0;
        while position < order.len() {
            let block_index = order[position];
            let insts: Vec<InstId> = ctx.module().function(self.current_function).blocks()
                [block_index]
                .instructions(ctx.module())
                .collect();

            let mut merge_block_raw = 0u32;
            for inst_id in insts {
                if !self.is_dead(ctx.module(), inst_id) {
                    continue;
                }
                let inst = ctx.module().inst(inst_id);
                if inst.opcode() == Opcode::Label {
                    continue;
                }
                if inst.is_merge() {
                    merge_block_raw = inst.operand_word(0).unwrap_or(0);
                }
                self.to_kill.push(inst_id);
                modified = true;
            }

            if let Some(merge_label) = Id::new(merge_block_raw) {
                ctx.add_branch(merge_label, self.current_function, block_index);
                // Skip forward to the merge block; the blocks in between are
                // now unreachable.
                position += 1;
                while position < order.len() {
                    let id = ctx.module().function(self.current_function).blocks()
                        [order[position]]
                        .id(ctx.module())
                        .get();
                    if id == merge_block_raw {
                        break;
                    }
                    position += 1;
                }
            } else {
                position += 1;
            }
        }
        modified
    }

    /// Whether the annotation's target id is dead. Decoration groups are
    /// dead once no group decorate references them.
    fn is_target_dead(&mut self, ctx: &mut IrContext, anno: InstId) -> bool {
        let Some(target) = ctx.module().inst(anno).input_id(0) else {
            return false;
        };
        let Some(def) = ctx.get_def(target) else {
            // The definition was already killed (dead function bodies).
            return true;
        };
        if ctx.module().inst(def).opcode().is_annotation() {
            let Some(group_id) = ctx.module().inst(def).result_id() else {
                return true;
            };
            let mut dead = true;
            for user in ctx.users_snapshot(group_id) {
                let opcode = ctx.module().inst(user).opcode();
                if opcode == Opcode::GroupDecorate || opcode == Opcode::GroupMemberDecorate {
                    dead = false;
                }
            }
            return dead;
        }
        self.is_dead(ctx.module(), def)
    }

    /// Debug and annotation cleanup, then dead globals onto the kill list.
    fn process_global_values(&mut self, ctx: &mut IrContext) -> bool {
        let mut modified = false;

        // Names whose targets died go first, while the def/use database
        // still knows the dead definitions.
        let names: Vec<InstId> = ctx.module().section(Section::Debug).collect();
        for name in names {
            if ctx.module().inst(name).opcode() != Opcode::Name {
                continue;
            }
            if self.is_target_dead(ctx, name) {
                ctx.kill_inst(name);
                modified = true;
            }
        }

        // Annotations in dependency-safe order: group decorates before the
        // decorations they shield, decoration groups last. Ties break on the
        // stable sequence number.
        let mut annotations: Vec<InstId> = ctx.module().section(Section::Annotations).collect();
        annotations.sort_by(|a, b| {
            decoration_rank(ctx.module().inst(*a).opcode())
                .cmp(&decoration_rank(ctx.module().inst(*b).opcode()))
                .then(a.cmp(b))
        });

        for anno in annotations {
            if !ctx.module().is_live(anno) {
                continue;
            }
            match ctx.module().inst(anno).opcode() {
                Opcode::Decorate | Opcode::MemberDecorate | Opcode::DecorateId => {
                    if self.is_target_dead(ctx, anno) {
                        ctx.kill_inst(anno);
                        modified = true;
                    }
                }
                Opcode::GroupDecorate => {
                    // Prune dead targets in place; drop the whole
                    // instruction only when no target survives.
                    let mut dead = true;
                    let mut index = 1;
                    while index < ctx.module().inst(anno).num_operands() {
                        if self.group_target_dead(ctx, anno, index) {
                            ctx.remove_operand(anno, index);
                            modified = true;
                        } else {
                            index += 1;
                            dead = false;
                        }
                    }
                    if dead {
                        ctx.kill_inst(anno);
                        modified = true;
                    }
                }
                Opcode::GroupMemberDecorate => {
                    // Targets come in (id, member) pairs.
                    let mut dead = true;
                    let mut index = 1;
                    while index < ctx.module().inst(anno).num_operands() {
                        if self.group_target_dead(ctx, anno, index) {
                            ctx.remove_operand(anno, index + 1);
                            ctx.remove_operand(anno, index);
                            modified = true;
                        } else {
                            index += 2;
                            dead = false;
                        }
                    }
                    if dead {
                        ctx.kill_inst(anno);
                        modified = true;
                    }
                }
                Opcode::DecorationGroup => {
                    // Everything that can target a group was processed above,
                    // so a group without users is dead.
                    let group_id = ctx.module().inst(anno).result_id();
                    if group_id.map_or(true, |id| ctx.num_users(id) == 0) {
                        ctx.kill_inst(anno);
                        modified = true;
                    }
                }
                _ => {}
            }
        }

        // Types, constants and globals with no liveness left.
        let globals: Vec<InstId> = ctx.module().section(Section::TypesValues).collect();
        for global in globals {
            if self.is_dead(ctx.module(), global) {
                self.to_kill.push(global);
                modified = true;
            }
        }

        modified
    }

    fn group_target_dead(&mut self, ctx: &mut IrContext, anno: InstId, index: usize) -> bool {
        let target = ctx.module().inst(anno).input_id(index);
        let Some(target) = target else { return true };
        match ctx.get_def(target) {
            Some(def) => self.is_dead(ctx.module(), def),
            None => true,
        }
    }
}

impl Default for AggressiveDcePass {
    fn default() -> Self {
        AggressiveDcePass::new()
    }
}

/// Annotation processing priority; see `process_global_values`.
fn decoration_rank(opcode: Opcode) -> u8 {
    match opcode {
        Opcode::GroupDecorate => 0,
        Opcode::GroupMemberDecorate => 1,
        Opcode::Decorate => 2,
        Opcode::MemberDecorate => 3,
        Opcode::DecorateId => 4,
        Opcode::DecorationGroup => 5,
        _ => 6,
    }
}

impl Pass for AggressiveDcePass {
    fn name(&self) -> &'static str {
        "aggressive-dce"
    }

    fn description(&self) -> &'static str {
        "Eliminates instructions that provably contribute no observable effect"
    }

    fn run(&mut self, ctx: &mut IrContext) -> Result<PassStatus> {
        self.reset();

        if !ctx.module().has_capability(Capability::Shader) {
            ctx.sink()
                .info("aggressive-dce: module does not declare Shader, leaving unchanged");
            return Ok(PassStatus::SuccessNoChange);
        }
        if ctx.module().has_capability(Capability::Addresses) {
            ctx.sink()
                .info("aggressive-dce: module declares Addresses, leaving unchanged");
            return Ok(PassStatus::SuccessNoChange);
        }
        if !self.all_extensions_supported(ctx.module()) {
            ctx.sink()
                .info("aggressive-dce: module declares an extension outside the allow-list");
            return Ok(PassStatus::SuccessNoChange);
        }

        let mut modified = self.eliminate_dead_functions(ctx);

        self.initialize_module_scope_live(ctx);

        for index in entry_point_call_tree_post_order(ctx.module()) {
            modified |= self.process_function(ctx, index);
            if ctx.sink().has_fatal() {
                return Err(Error::Internal(
                    "fatal diagnostic reported during dead-code elimination".to_string(),
                ));
            }
        }

        modified |= self.process_global_values(ctx);

        let to_kill = std::mem::take(&mut self.to_kill);
        for inst in to_kill {
            ctx.kill_inst(inst);
        }

        for index in 0..ctx.module().functions().len() {
            modified |= cfg_cleanup::cleanup_function(ctx, index);
        }

        Ok(if modified {
            PassStatus::SuccessChanged
        } else {
            PassStatus::SuccessNoChange
        })
    }
}
