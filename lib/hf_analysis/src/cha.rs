//! Call graph construction by class hierarchy analysis (CHA): instance
//! calls may reach the implementation of any subtype of the class named
//! at the call site.

use crate::callgraph::{CallGraph, Edge};
use crate::dispatch::{candidate_classes, dispatch, invoke_at, resolve_callee};
use crate::errors::{AnalysisError, AnalysisResult};
use hf_ir::repo::{MethodUid, StmtUid};
use hf_ir::stmt::CallKind;
use hf_ir::Program;
use std::collections::{BTreeSet, VecDeque};

/// Builds the call graph of the methods reachable from the program entry.
pub fn build_call_graph(program: &Program) -> AnalysisResult<CallGraph<StmtUid, MethodUid>> {
    let entry = program
        .entry_method()
        .map_err(|_| AnalysisError::NoEntryMethod)?;
    let mut cg = CallGraph::new();
    cg.add_entry_method(entry);

    let mut worklist = VecDeque::new();
    worklist.push_back(entry);
    while let Some(method) = worklist.pop_front() {
        let call_sites = program[method].call_sites();
        if !cg.add_reachable_method(method, call_sites.iter().copied()) {
            continue;
        }
        log::debug!("new reachable method {}", program[method]);
        for site in call_sites {
            let kind = invoke_at(program, *site)?.kind();
            for callee in resolve(program, *site)? {
                if cg.add_edge(Edge::new(kind, *site, callee)) {
                    log::trace!("{} -> {}", program.stmt_label(*site), program[callee]);
                }
                worklist.push_back(callee);
            }
        }
    }

    log::info!(
        "CHA call graph: {} reachable methods, {} edges",
        cg.nb_reachable_methods(),
        cg.nb_edges()
    );
    Ok(cg)
}

/// Resolves the possible targets of a call site. Candidate classes without
/// an implementation of the method (abstract classes, interfaces) do not
/// contribute any target.
pub fn resolve(program: &Program, call_site: StmtUid) -> AnalysisResult<BTreeSet<MethodUid>> {
    let invoke = invoke_at(program, call_site)?;
    let mut targets = BTreeSet::new();
    match invoke.kind() {
        CallKind::Static | CallKind::Special | CallKind::Dynamic => {
            targets.insert(resolve_callee(program, None, call_site)?);
        }
        CallKind::Virtual | CallKind::Interface => {
            let mref = invoke.method_ref();
            for class in candidate_classes(program, mref.class()) {
                if let Some(target) = dispatch(program, class, mref.subsignature()) {
                    targets.insert(target);
                }
            }
        }
    }
    Ok(targets)
}
