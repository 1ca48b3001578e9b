//! Program analyses over a loaded module.
//!
//! All analyses are derived views: they hold block indices and instruction
//! handles, never instruction data. Any mutation that may alter control flow
//! invalidates the CFG-derived ones; the [`IrContext`](crate::IrContext)
//! tracks validity and rebuilds lazily on next access.

mod callgraph;
mod cfg;
mod defuse;
mod dominators;
mod structured;

pub use callgraph::entry_point_call_tree_post_order;
pub use cfg::Cfg;
pub use defuse::DefUseIndex;
pub use dominators::{DominatorTree, PostDominatorTree};
pub use structured::StructuredCfg;
