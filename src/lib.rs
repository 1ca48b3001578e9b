// Copyright 2025-2026 spirscope contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![allow(dead_code)]

//! # spirscope
//!
//! A framework for analyzing, validating and transforming SPIR-V binary
//! modules. Built in pure Rust, `spirscope` parses SPIR-V word streams into a
//! handle-based in-memory representation, maintains an incremental def/use
//! database and structured control-flow analyses over it, and runs
//! semantics-preserving optimization passes — without any dependency on a
//! graphics driver or the reference toolchain.
//!
//! # Architecture
//!
//! The library is organized into layers that build on one another:
//!
//! - **File Layer**: endian-aware word stream parsing and emission
//! - **Instruction Layer**: the opcode table, tagged operands, instructions
//! - **Module Layer**: the arena-backed module container with layout and id
//!   validation at load time
//! - **Analysis Layer**: def/use database, CFG, structured-construct maps,
//!   dominator and post-dominator trees, call graph traversal
//! - **Pass Layer**: the pass manager and the optimization passes
//!   (aggressive dead-code elimination, local single-store elimination,
//!   unreachable-block cleanup)
//!
//! ## Key Components
//!
//! - [`load_module`] - Parse and validate a binary into a [`Module`]
//! - [`Module`] - The instruction container; [`emit_bytes`] serializes back
//! - [`IrContext`] - A module plus its analyses; the mutation gateway
//! - [`PassManager`] - Runs passes with analysis invalidation
//! - [`Error`] and [`Result`] - Comprehensive error handling
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use spirscope::{
//!     load_module, emit_bytes, AggressiveDcePass, DiagnosticSink, IrContext,
//!     OptimizerOptions, PassManager,
//! };
//!
//! let bytes = std::fs::read("shader.spv")?;
//! let options = OptimizerOptions::default();
//! let module = load_module(&bytes, &options, &mut DiagnosticSink::ignore())?;
//!
//! let mut ctx = IrContext::new(module);
//! let mut manager = PassManager::new();
//! manager.add_pass(AggressiveDcePass::with_options(&options));
//! manager.run(&mut ctx)?;
//!
//! std::fs::write("shader.opt.spv", emit_bytes(&ctx.into_module()))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[macro_use]
mod error;

mod config;
mod context;
mod diagnostic;

pub mod analysis;
pub mod file;
pub mod module;
pub mod passes;
pub mod spirv;

pub use config::{OptimizerOptions, TargetEnv};
pub use context::{AnalysisFlags, IrContext};
pub use diagnostic::{DiagnosticSink, MessageConsumer, Position, Severity};
pub use error::Error;
pub use module::{emit_bytes, emit_words, load_module, Module};
pub use passes::{
    AggressiveDcePass, CfgCleanupPass, LocalSingleStoreElimPass, Pass, PassManager, PassStatus,
};
pub use spirv::Id;

/// Result type alias for operations that can fail with a [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Convenient re-exports of the most commonly used types.
pub mod prelude {
    pub use crate::analysis::{Cfg, DefUseIndex, DominatorTree, StructuredCfg};
    pub use crate::module::{emit_bytes, load_module, BasicBlock, Function, InstId, Module};
    pub use crate::spirv::{Id, Instruction, Opcode, Operand, StorageClass};
    pub use crate::{
        AggressiveDcePass, DiagnosticSink, Error, IrContext, LocalSingleStoreElimPass,
        OptimizerOptions, Pass, PassManager, PassStatus, Result, TargetEnv,
    };
}
