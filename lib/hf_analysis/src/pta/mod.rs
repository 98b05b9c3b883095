//! Context-sensitive inclusion-based (Andersen-style) points-to analysis.
//!
//! The analysis starts from the entry method of the program and discovers
//! reachable methods on the fly: instance calls are resolved on the
//! abstract objects that flow into their receivers.

pub mod context;
pub mod elements;
pub mod heap;
pub mod pfg;
pub mod pts;
pub mod result;
mod solver;
mod worklist;

#[cfg(test)]
mod tests;

use crate::errors::AnalysisResult;
use crate::pta::context::{ContextSensitivity, Insensitive, KCallSite, KObject, KType};
use crate::pta::heap::AllocationSiteModel;
use crate::pta::solver::Solver;
use hf_ir::Program;

pub use context::{Context, ContextSelector};
pub use heap::{HeapModel, Obj};
pub use result::{PointerAnalysisResult, PtaStats};

/// Options of a points-to analysis run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PtaOptions {
    pub sensitivity: ContextSensitivity,
}

impl PtaOptions {
    #[must_use]
    pub fn new(sensitivity: ContextSensitivity) -> Self {
        Self { sensitivity }
    }
}

/// Runs the points-to analysis on a program, with the allocation-site heap
/// abstraction.
///
/// # Errors
///
/// The analysis stops on the first call that cannot be resolved
/// (`UnresolvedDispatch`, `MethodNotFound`), on `invokedynamic` calls
/// (`UnrecognizedCallKind`), and if the program has no entry method.
pub fn analyze(
    program: &Program,
    options: PtaOptions,
) -> AnalysisResult<PointerAnalysisResult<'_>> {
    log::info!(
        "running points-to analysis ({} context sensitivity)",
        options.sensitivity
    );
    match options.sensitivity {
        ContextSensitivity::Insensitive => analyze_with(program, Insensitive, AllocationSiteModel),
        ContextSensitivity::CallSite(k) => {
            analyze_with(program, KCallSite::new(k), AllocationSiteModel)
        }
        ContextSensitivity::Object(k) => analyze_with(program, KObject::new(k), AllocationSiteModel),
        ContextSensitivity::Type(k) => analyze_with(program, KType::new(k), AllocationSiteModel),
    }
}

/// Runs the points-to analysis with custom context and heap abstractions.
///
/// # Errors
///
/// See [`analyze`].
pub fn analyze_with<S, H>(
    program: &Program,
    selector: S,
    heap_model: H,
) -> AnalysisResult<PointerAnalysisResult<'_>>
where
    S: ContextSelector,
    H: HeapModel,
{
    Solver::new(program, selector, heap_model).solve()
}
