//! Results of a points-to analysis run.

use crate::callgraph::{CallGraph, Edge};
use crate::pta::context::Context;
use crate::pta::elements::{
    ContextId, CsCallSite, CsMethod, CsObjId, CsVar, Elements, ObjId, Pointer, PointerId,
};
use crate::pta::heap::Obj;
use crate::pta::pfg::PointerFlowGraph;
use crate::pta::pts::PointsToSet;
use hf_ir::repo::{FieldUid, MethodUid, StmtUid, VarUid};
use hf_ir::Program;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Counters summarizing an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PtaStats {
    pub reachable_methods: usize,
    pub call_edges: usize,
    pub pointers: usize,
    pub objects: usize,
    pub cs_objects: usize,
    pub flow_edges: usize,
    pub contexts: usize,
}

impl fmt::Display for PtaStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "reachable methods:   {}", self.reachable_methods)?;
        writeln!(f, "call graph edges:    {}", self.call_edges)?;
        writeln!(f, "pointers:            {}", self.pointers)?;
        writeln!(f, "abstract objects:    {}", self.objects)?;
        writeln!(f, "objects in contexts: {}", self.cs_objects)?;
        writeln!(f, "flow edges:          {}", self.flow_edges)?;
        write!(f, "contexts:            {}", self.contexts)
    }
}

/// The finalized call graph and points-to sets. Nothing changes once the
/// solver has returned it.
pub struct PointerAnalysisResult<'p> {
    program: &'p Program,
    elements: Elements,
    pfg: PointerFlowGraph,
    call_graph: CallGraph<CsCallSite, CsMethod>,
    ci_call_graph: CallGraph<StmtUid, MethodUid>,
    // pointers of each variable, one per context
    var_pointers: BTreeMap<VarUid, Vec<PointerId>>,
}

impl<'p> PointerAnalysisResult<'p> {
    pub(crate) fn new(
        program: &'p Program,
        elements: Elements,
        pfg: PointerFlowGraph,
        call_graph: CallGraph<CsCallSite, CsMethod>,
    ) -> Self {
        let mut ci_call_graph = CallGraph::new();
        for entry in call_graph.entry_methods() {
            ci_call_graph.add_entry_method(entry.method());
        }
        for cs_method in call_graph.reachable_methods() {
            let method = cs_method.method();
            ci_call_graph.add_reachable_method(method, program[method].call_sites().iter().copied());
        }
        for edge in call_graph.edges() {
            ci_call_graph.add_edge(Edge::new(
                edge.kind(),
                edge.call_site().site(),
                edge.callee().method(),
            ));
        }

        let mut var_pointers: BTreeMap<VarUid, Vec<PointerId>> = BTreeMap::new();
        for (id, pointer) in elements.iter_pointers() {
            if let Pointer::Var(cs_var) = pointer {
                var_pointers.entry(cs_var.var()).or_default().push(id);
            }
        }

        Self {
            program,
            elements,
            pfg,
            call_graph,
            ci_call_graph,
            var_pointers,
        }
    }

    #[inline]
    pub fn program(&self) -> &'p Program {
        self.program
    }

    /// The call graph over methods qualified by their contexts.
    #[inline]
    pub fn call_graph(&self) -> &CallGraph<CsCallSite, CsMethod> {
        &self.call_graph
    }

    /// The call graph where contexts have been merged.
    #[inline]
    pub fn ci_call_graph(&self) -> &CallGraph<StmtUid, MethodUid> {
        &self.ci_call_graph
    }

    #[inline]
    pub fn points_to(&self, pointer: PointerId) -> &PointsToSet {
        self.elements.points_to(pointer)
    }

    #[inline]
    pub fn pointer(&self, pointer: PointerId) -> Pointer {
        self.elements.pointer(pointer)
    }

    /// Iterates over every pointer of the analysis with its points-to set.
    pub fn pointers(&self) -> impl Iterator<Item = (PointerId, Pointer, &PointsToSet)> {
        self.elements
            .iter_pointers()
            .map(|(id, pointer)| (id, pointer, self.elements.points_to(id)))
    }

    /// Edges of the pointer flow graph.
    pub fn flow_edges(&self) -> impl Iterator<Item = (PointerId, PointerId)> + '_ {
        self.pfg.edges()
    }

    /// Points-to set of a variable in a given context.
    pub fn cs_var_points_to(&self, context: ContextId, var: VarUid) -> Option<&PointsToSet> {
        self.elements
            .find_pointer(&Pointer::Var(CsVar::new(context, var)))
            .map(|id| self.elements.points_to(id))
    }

    fn project<'a, I>(&self, sets: I) -> BTreeSet<ObjId>
    where
        I: Iterator<Item = &'a PointsToSet>,
    {
        sets.flat_map(PointsToSet::iter)
            .map(|cs_obj| self.elements.cs_object(cs_obj).1)
            .collect()
    }

    /// Abstract objects a variable may point to, in any context.
    pub fn var_points_to(&self, var: VarUid) -> BTreeSet<ObjId> {
        self.project(
            self.var_pointers
                .get(&var)
                .into_iter()
                .flatten()
                .map(|id| self.elements.points_to(*id)),
        )
    }

    /// Abstract objects a static field may point to.
    pub fn field_points_to(&self, field: FieldUid) -> BTreeSet<ObjId> {
        self.project(
            self.elements
                .find_pointer(&Pointer::StaticField(field))
                .map(|id| self.elements.points_to(id))
                .into_iter(),
        )
    }

    /// Objects the field of a context-qualified object may point to.
    pub fn instance_field_points_to(&self, obj: CsObjId, field: FieldUid) -> Option<&PointsToSet> {
        self.elements
            .find_pointer(&Pointer::InstanceField(obj, field))
            .map(|id| self.elements.points_to(id))
    }

    /// Abstract objects the field may point to, for any base object
    /// allocated at `base` and in any context.
    pub fn object_field_points_to(&self, base: ObjId, field: FieldUid) -> BTreeSet<ObjId> {
        self.project(self.pointers().filter_map(|(_, pointer, pts)| match pointer {
            Pointer::InstanceField(obj, f)
                if f == field && self.elements.cs_object(obj).1 == base =>
            {
                Some(pts)
            }
            _ => None,
        }))
    }

    /// Allocation sites of the abstract objects a variable may point to.
    pub fn var_points_to_sites(&self, var: VarUid) -> BTreeSet<StmtUid> {
        self.var_points_to(var)
            .into_iter()
            .map(|obj| self.object(obj).site())
            .collect()
    }

    #[inline]
    pub fn object(&self, id: ObjId) -> &Obj {
        self.elements.object(id)
    }

    #[inline]
    pub fn cs_object(&self, id: CsObjId) -> (ContextId, ObjId) {
        self.elements.cs_object(id)
    }

    #[inline]
    pub fn context(&self, id: ContextId) -> &Context {
        self.elements.context(id)
    }

    /// Contexts under which a method has been analyzed.
    pub fn contexts_of(&self, method: MethodUid) -> Vec<ContextId> {
        self.call_graph
            .reachable_methods()
            .filter(|cs_method| cs_method.method() == method)
            .map(|cs_method| cs_method.context())
            .collect()
    }

    #[must_use]
    pub fn stats(&self) -> PtaStats {
        PtaStats {
            reachable_methods: self.call_graph.nb_reachable_methods(),
            call_edges: self.call_graph.nb_edges(),
            pointers: self.elements.nb_pointers(),
            objects: self.elements.nb_objects(),
            cs_objects: self.elements.nb_cs_objects(),
            flow_edges: self.pfg.nb_edges(),
            contexts: self.elements.nb_contexts(),
        }
    }

    pub fn cs_object_label(&self, id: CsObjId) -> String {
        let (ctx, obj) = self.elements.cs_object(id);
        let ctx = self.elements.context(ctx);
        let obj = self.elements.object(obj).display(self.program);
        if ctx.is_empty() {
            obj.to_string()
        } else {
            format!("{}:{}", ctx.display(self.program), obj)
        }
    }

    pub fn pointer_label(&self, id: PointerId) -> String {
        let program = self.program;
        match self.elements.pointer(id) {
            Pointer::Var(cs_var) => {
                let var = &program[cs_var.var()];
                let ctx = self.elements.context(cs_var.context());
                let name = format!("{}/{}", program[var.method()], var.name());
                if ctx.is_empty() {
                    name
                } else {
                    format!("{}:{}", ctx.display(program), name)
                }
            }
            Pointer::StaticField(field) => program[field].to_string(),
            Pointer::InstanceField(obj, field) => {
                format!("{}.{}", self.cs_object_label(obj), program[field].name())
            }
            Pointer::ArrayIndex(obj) => format!("{}[*]", self.cs_object_label(obj)),
        }
    }

    pub fn cs_method_label(&self, cs_method: CsMethod) -> String {
        let ctx = self.elements.context(cs_method.context());
        let method = &self.program[cs_method.method()];
        if ctx.is_empty() {
            method.to_string()
        } else {
            format!("{}:{}", ctx.display(self.program), method)
        }
    }

    /// Exports the pointer flow graph in Graphviz format.
    pub fn pfg_to_dot(&self) -> String {
        self.pfg.to_dot(|id| self.pointer_label(id))
    }

    /// Exports the context-qualified call graph in Graphviz format.
    pub fn call_graph_to_dot(&self) -> String {
        self.call_graph.to_dot(|m| self.cs_method_label(m))
    }

    /// Exports the context-insensitive call graph in Graphviz format.
    pub fn ci_call_graph_to_dot(&self) -> String {
        self.ci_call_graph
            .to_dot(|m| self.program[m].to_string())
    }
}
