//! Optimization passes and the pass manager.
//!
//! A pass receives the module context and reports whether it changed the
//! module. The manager runs passes in registration order, invalidating every
//! analysis a changing pass did not declare preserved, and aborts when the
//! diagnostic sink latches a fatal message — the cooperative cancellation
//! model: no timeouts, one execution stream.

mod adce;
mod cfg_cleanup;
mod local_single_store_elim;

pub use adce::AggressiveDcePass;
pub use cfg_cleanup::CfgCleanupPass;
pub use local_single_store_elim::LocalSingleStoreElimPass;

use crate::context::{AnalysisFlags, IrContext};
use crate::{Error, Result};

/// Outcome of a successful pass run. Failures are reported as errors from
/// [`Pass::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStatus {
    /// The pass ran and left the module untouched.
    SuccessNoChange,
    /// The pass ran and modified the module.
    SuccessChanged,
}

/// An optimization pass over a module.
///
/// Passes run on validated modules; structural surprises are internal errors,
/// not user-facing diagnostics. A pass that declines to run (unsupported
/// capability, unknown extension) returns
/// [`PassStatus::SuccessNoChange`] and reports an informational diagnostic —
/// never silent truncation.
pub trait Pass {
    /// Unique name for logging and debugging.
    fn name(&self) -> &'static str;

    /// Get a description of what this pass does.
    fn description(&self) -> &'static str {
        "No description available"
    }

    /// Which analyses survive this pass when it reports
    /// [`PassStatus::SuccessChanged`]. Everything else is invalidated.
    fn preserved(&self) -> AnalysisFlags {
        AnalysisFlags::empty()
    }

    /// Runs the pass.
    ///
    /// # Errors
    ///
    /// Returns an error when the pass cannot complete; the manager stops the
    /// pipeline.
    fn run(&mut self, ctx: &mut IrContext) -> Result<PassStatus>;
}

/// Runs a sequence of passes over one module context.
#[derive(Default)]
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        PassManager { passes: Vec::new() }
    }

    /// Appends a pass to the pipeline.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Number of registered passes.
    #[must_use]
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Runs every registered pass in order.
    ///
    /// # Errors
    ///
    /// Returns the first pass error, or [`Error::Internal`] when a pass left
    /// a fatal diagnostic in the sink.
    pub fn run(&mut self, ctx: &mut IrContext) -> Result<PassStatus> {
        let mut overall = PassStatus::SuccessNoChange;
        for pass in &mut self.passes {
            let status = pass.run(ctx)?;
            if ctx.sink().has_fatal() {
                return Err(Error::Internal(format!(
                    "pass {} reported a fatal diagnostic",
                    pass.name()
                )));
            }
            if status == PassStatus::SuccessChanged {
                overall = PassStatus::SuccessChanged;
                ctx.invalidate_all_except(pass.preserved());
            }
        }
        Ok(overall)
    }
}
