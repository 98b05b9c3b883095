//! Method dispatch and callee resolution, shared by the class hierarchy
//! analysis and the pointer analysis.

use crate::errors::{AnalysisError, AnalysisResult};
use hf_ir::repo::{ClassUid, MethodUid, StmtUid};
use hf_ir::stmt::{CallKind, Invoke};
use hf_ir::types::Subsignature;
use hf_ir::Program;
use std::collections::{BTreeSet, VecDeque};

/// Finds the non-abstract method with the given subsignature that an object
/// of class `class` would execute: first along the superclass chain, then
/// among the default methods of its super-interfaces.
pub fn dispatch(program: &Program, class: ClassUid, subsig: &Subsignature) -> Option<MethodUid> {
    let mut current = Some(class);
    while let Some(cuid) = current {
        let cls = &program[cuid];
        if let Some(muid) = cls.declared_method(subsig) {
            if !program[muid].is_abstract() {
                return Some(muid);
            }
        }
        current = cls.superclass();
    }

    program
        .hierarchy()
        .all_parents(class)
        .into_iter()
        .filter(|parent| program[*parent].is_interface())
        .filter_map(|itf| program[itf].declared_method(subsig))
        .find(|muid| {
            let method = &program[*muid];
            !method.is_abstract() && !method.is_static()
        })
}

/// Returns every class an object statically typed as `root` may have at
/// runtime: `root` itself and all its transitive subtypes, in breadth-first
/// order.
pub fn candidate_classes(program: &Program, root: ClassUid) -> Vec<ClassUid> {
    let hierarchy = program.hierarchy();
    let mut visited = BTreeSet::new();
    let mut candidates = Vec::new();
    let mut queue = VecDeque::new();
    visited.insert(root);
    queue.push_back(root);

    while let Some(cuid) = queue.pop_front() {
        candidates.push(cuid);
        let subtypes = if program[cuid].is_interface() {
            let mut subtypes = hierarchy.direct_implementors_of(cuid);
            subtypes.extend(hierarchy.direct_subinterfaces_of(cuid));
            subtypes
        } else {
            hierarchy.direct_subclasses_of(cuid)
        };
        for sub in subtypes {
            if visited.insert(sub) {
                queue.push_back(sub);
            }
        }
    }
    candidates
}

pub(crate) fn invoke_at(program: &Program, call_site: StmtUid) -> AnalysisResult<&Invoke> {
    program[call_site].as_invoke().ok_or_else(|| {
        AnalysisError::Internal(format!(
            "{} is not a call site",
            program.stmt_label(call_site)
        ))
    })
}

fn unresolved(program: &Program, call_site: StmtUid, class: ClassUid, subsig: &Subsignature) -> AnalysisError {
    AnalysisError::UnresolvedDispatch {
        call_site: program.stmt_label(call_site),
        receiver: program[class].name().to_string(),
        subsignature: subsig.to_string(),
    }
}

/// Resolves the method executed at a call site.
///
/// `receiver` is the runtime class of the receiver object, for instance
/// calls analyzed by the pointer analysis. Without receiver, virtual and
/// interface calls dispatch on the class named by the method reference.
pub fn resolve_callee(
    program: &Program,
    receiver: Option<ClassUid>,
    call_site: StmtUid,
) -> AnalysisResult<MethodUid> {
    let invoke = invoke_at(program, call_site)?;
    let mref = invoke.method_ref();
    let subsig = mref.subsignature();
    match invoke.kind() {
        CallKind::Static => dispatch(program, mref.class(), subsig).ok_or_else(|| {
            AnalysisError::MethodNotFound(format!("{}->{}", program[mref.class()], subsig))
        }),
        CallKind::Special => dispatch(program, mref.class(), subsig)
            .ok_or_else(|| unresolved(program, call_site, mref.class(), subsig)),
        CallKind::Virtual | CallKind::Interface => {
            let class = receiver.unwrap_or_else(|| mref.class());
            dispatch(program, class, subsig)
                .ok_or_else(|| unresolved(program, call_site, class, subsig))
        }
        CallKind::Dynamic => Err(AnalysisError::UnrecognizedCallKind {
            call_site: program.stmt_label(call_site),
            kind: invoke.kind().to_string(),
        }),
    }
}
