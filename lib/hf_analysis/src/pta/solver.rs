//! The inclusion-based points-to solver, with on-the-fly call graph
//! construction.

use crate::callgraph::{CallGraph, Edge};
use crate::dispatch::{invoke_at, resolve_callee};
use crate::errors::{AnalysisError, AnalysisResult};
use crate::pta::context::ContextSelector;
use crate::pta::elements::{CsCallSite, CsMethod, CsObjId, CsVar, Elements, Pointer, PointerId};
use crate::pta::heap::HeapModel;
use crate::pta::pfg::PointerFlowGraph;
use crate::pta::pts::PointsToSet;
use crate::pta::result::PointerAnalysisResult;
use crate::pta::worklist::Worklist;
use hf_ir::repo::StmtUid;
use hf_ir::stmt::{CallKind, Stmt};
use hf_ir::Program;

pub(crate) struct Solver<'p, S, H> {
    program: &'p Program,
    selector: S,
    heap_model: H,
    elements: Elements,
    pfg: PointerFlowGraph,
    worklist: Worklist,
    call_graph: CallGraph<CsCallSite, CsMethod>,
}

impl<'p, S: ContextSelector, H: HeapModel> Solver<'p, S, H> {
    pub(crate) fn new(program: &'p Program, selector: S, heap_model: H) -> Self {
        Self {
            program,
            selector,
            heap_model,
            elements: Elements::new(),
            pfg: PointerFlowGraph::new(),
            worklist: Worklist::new(),
            call_graph: CallGraph::new(),
        }
    }

    /// Runs the analysis up to the fixed point.
    pub(crate) fn solve(mut self) -> AnalysisResult<PointerAnalysisResult<'p>> {
        self.initialize()?;
        self.analyze()?;
        log::info!(
            "points-to analysis done: {} reachable methods, {} call edges, {} pointers",
            self.call_graph.nb_reachable_methods(),
            self.call_graph.nb_edges(),
            self.elements.nb_pointers()
        );
        Ok(PointerAnalysisResult::new(
            self.program,
            self.elements,
            self.pfg,
            self.call_graph,
        ))
    }

    fn initialize(&mut self) -> AnalysisResult<()> {
        let entry = self
            .program
            .entry_method()
            .map_err(|_| AnalysisError::NoEntryMethod)?;
        let empty = self.selector.empty_context();
        let ctx = self.elements.context_id(empty);
        let cs_entry = CsMethod::new(ctx, entry);
        self.call_graph.add_entry_method(cs_entry);
        self.add_reachable(cs_entry)
    }

    fn add_reachable(&mut self, cs_method: CsMethod) -> AnalysisResult<()> {
        if self.call_graph.contains(cs_method) {
            return Ok(());
        }
        let program = self.program;
        let method = &program[cs_method.method()];
        let ctx = cs_method.context();
        self.call_graph.add_reachable_method(
            cs_method,
            method
                .call_sites()
                .iter()
                .map(|site| CsCallSite::new(ctx, *site)),
        );
        log::debug!(
            "new reachable method {} in context {}",
            method,
            self.elements.context(ctx).display(program)
        );

        for stmt in method.statements() {
            self.process_stmt(cs_method, *stmt)?;
        }
        Ok(())
    }

    fn process_stmt(&mut self, cs_method: CsMethod, stmt: StmtUid) -> AnalysisResult<()> {
        let program = self.program;
        let ctx = cs_method.context();
        match &program[stmt] {
            Stmt::New { target, .. } => {
                let obj = self.heap_model.obj_for(program, stmt)?;
                let heap_ctx = self
                    .selector
                    .select_heap_context(self.elements.context(ctx), &obj);
                let heap_ctx = self.elements.context_id(heap_ctx);
                let obj = self.elements.object_id(obj);
                let cs_obj = self.elements.cs_object_id(heap_ctx, obj);
                let ptr = self.elements.var_pointer(ctx, *target);
                self.worklist.push(ptr, PointsToSet::singleton(cs_obj));
            }
            Stmt::Copy { target, source } => {
                let source = self.elements.var_pointer(ctx, *source);
                let target = self.elements.var_pointer(ctx, *target);
                self.add_pfg_edge(source, target);
            }
            Stmt::LoadField {
                target,
                base: None,
                field,
            } => {
                let source = self.elements.static_field_pointer(*field);
                let target = self.elements.var_pointer(ctx, *target);
                self.add_pfg_edge(source, target);
            }
            Stmt::StoreField {
                base: None,
                field,
                source,
            } => {
                let source = self.elements.var_pointer(ctx, *source);
                let target = self.elements.static_field_pointer(*field);
                self.add_pfg_edge(source, target);
            }
            Stmt::Invoke(invoke) => match invoke.kind() {
                CallKind::Static => self.process_static_call(cs_method, stmt)?,
                CallKind::Dynamic => {
                    return Err(AnalysisError::UnrecognizedCallKind {
                        call_site: program.stmt_label(stmt),
                        kind: invoke.kind().to_string(),
                    })
                }
                // instance calls are processed when receiver objects are discovered
                CallKind::Special | CallKind::Virtual | CallKind::Interface => (),
            },
            // connected when base objects are discovered
            Stmt::LoadField { base: Some(_), .. }
            | Stmt::StoreField { base: Some(_), .. }
            | Stmt::LoadArray { .. }
            | Stmt::StoreArray { .. } => (),
            // return variables are listed by the method itself
            Stmt::Return(_) => (),
        }
        Ok(())
    }

    fn process_static_call(&mut self, cs_method: CsMethod, site: StmtUid) -> AnalysisResult<()> {
        let callee = resolve_callee(self.program, None, site)?;
        let ctx = cs_method.context();
        let callee_ctx =
            self.selector
                .select_static_context(self.elements.context(ctx), site, callee);
        let callee_ctx = self.elements.context_id(callee_ctx);
        let cs_site = CsCallSite::new(ctx, site);
        let cs_callee = CsMethod::new(callee_ctx, callee);
        self.add_call_edge(CallKind::Static, cs_site, cs_callee)
    }

    fn add_call_edge(
        &mut self,
        kind: CallKind,
        cs_site: CsCallSite,
        cs_callee: CsMethod,
    ) -> AnalysisResult<()> {
        if self
            .call_graph
            .add_edge(Edge::new(kind, cs_site, cs_callee))
        {
            log::debug!(
                "new {} call edge {} -> {}",
                kind,
                self.program.stmt_label(cs_site.site()),
                self.program[cs_callee.method()]
            );
            self.add_reachable(cs_callee)?;
            self.wire_call(cs_site, cs_callee)?;
        }
        Ok(())
    }

    /// Connects arguments to parameters, and return variables to the call
    /// result.
    fn wire_call(&mut self, cs_site: CsCallSite, cs_callee: CsMethod) -> AnalysisResult<()> {
        let program = self.program;
        let invoke = invoke_at(program, cs_site.site())?;
        let callee = &program[cs_callee.method()];
        let (caller_ctx, callee_ctx) = (cs_site.context(), cs_callee.context());

        for (arg, param) in invoke.args().iter().zip(callee.params()) {
            let source = self.elements.var_pointer(caller_ctx, *arg);
            let target = self.elements.var_pointer(callee_ctx, *param);
            self.add_pfg_edge(source, target);
        }
        if let Some(result) = invoke.result() {
            let target = self.elements.var_pointer(caller_ctx, result);
            for ret in callee.return_vars() {
                let source = self.elements.var_pointer(callee_ctx, *ret);
                self.add_pfg_edge(source, target);
            }
        }
        Ok(())
    }

    /// Adds a flow edge. A new edge receives the whole current points-to set
    /// of its source.
    fn add_pfg_edge(&mut self, source: PointerId, target: PointerId) {
        if self.pfg.add_edge(source, target) {
            let pts = self.elements.points_to(source);
            if !pts.is_empty() {
                self.worklist.push(target, pts.clone());
            }
        }
    }

    fn analyze(&mut self) -> AnalysisResult<()> {
        let program = self.program;
        while let Some((ptr, pts)) = self.worklist.pop() {
            let delta = self.propagate(ptr, &pts);
            if delta.is_empty() {
                continue;
            }
            let Pointer::Var(cs_var) = self.elements.pointer(ptr) else {
                continue;
            };
            let var = &program[cs_var.var()];
            let ctx = cs_var.context();
            for obj in delta.iter() {
                for stmt in var.store_fields() {
                    if let Stmt::StoreField { field, source, .. } = &program[*stmt] {
                        let source = self.elements.var_pointer(ctx, *source);
                        let target = self.elements.instance_field_pointer(obj, *field);
                        self.add_pfg_edge(source, target);
                    }
                }
                for stmt in var.load_fields() {
                    if let Stmt::LoadField { target, field, .. } = &program[*stmt] {
                        let source = self.elements.instance_field_pointer(obj, *field);
                        let target = self.elements.var_pointer(ctx, *target);
                        self.add_pfg_edge(source, target);
                    }
                }
                for stmt in var.store_arrays() {
                    if let Stmt::StoreArray { source, .. } = &program[*stmt] {
                        let source = self.elements.var_pointer(ctx, *source);
                        let target = self.elements.array_index_pointer(obj);
                        self.add_pfg_edge(source, target);
                    }
                }
                for stmt in var.load_arrays() {
                    if let Stmt::LoadArray { target, .. } = &program[*stmt] {
                        let source = self.elements.array_index_pointer(obj);
                        let target = self.elements.var_pointer(ctx, *target);
                        self.add_pfg_edge(source, target);
                    }
                }
                self.process_call(cs_var, obj)?;
            }
        }
        debug_assert!(self.worklist.is_empty());
        Ok(())
    }

    /// Merges `pts` into the points-to set of `ptr` and forwards the new
    /// objects to its successors. Returns the new objects.
    fn propagate(&mut self, ptr: PointerId, pts: &PointsToSet) -> PointsToSet {
        let delta = self.elements.points_to_mut(ptr).union_delta(pts);
        if !delta.is_empty() {
            log::trace!("{} new object(s) for pointer {:?}", delta.len(), ptr);
            for succ in self.pfg.successors(ptr) {
                self.worklist.push(succ, delta.clone());
            }
        }
        delta
    }

    /// Processes the instance calls on `recv` now that it may point to
    /// `recv_obj`.
    fn process_call(&mut self, recv: CsVar, recv_obj: CsObjId) -> AnalysisResult<()> {
        let program = self.program;
        let ctx = recv.context();
        let (heap_ctx, obj) = self.elements.cs_object(recv_obj);
        let obj = self.elements.object(obj).clone();

        for site in program[recv.var()].invokes() {
            let invoke = invoke_at(program, *site)?;
            let callee = resolve_callee(program, Some(obj.class()), *site)?;
            let callee_ctx = self.selector.select_instance_context(
                self.elements.context(ctx),
                *site,
                self.elements.context(heap_ctx),
                &obj,
                callee,
            );
            let callee_ctx = self.elements.context_id(callee_ctx);
            if let Some(this) = program[callee].this() {
                let this = self.elements.var_pointer(callee_ctx, this);
                self.worklist.push(this, PointsToSet::singleton(recv_obj));
            }
            self.add_call_edge(
                invoke.kind(),
                CsCallSite::new(ctx, *site),
                CsMethod::new(callee_ctx, callee),
            )?;
        }
        Ok(())
    }
}
