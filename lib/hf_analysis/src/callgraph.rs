//! Graph representations of the calls between reachable methods.
//!
//! The call graph is generic over call sites and methods, so that it holds
//! plain methods (class hierarchy analysis) as well as methods qualified by
//! a context (pointer analysis).

use hf_ir::stmt::CallKind;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

/// A call edge, from a call site to the method it may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge<CS, M> {
    kind: CallKind,
    call_site: CS,
    callee: M,
}

impl<CS: Copy, M: Copy> Edge<CS, M> {
    pub fn new(kind: CallKind, call_site: CS, callee: M) -> Self {
        Self {
            kind,
            call_site,
            callee,
        }
    }

    #[inline]
    pub fn kind(&self) -> CallKind {
        self.kind
    }

    #[inline]
    pub fn call_site(&self) -> CS {
        self.call_site
    }

    #[inline]
    pub fn callee(&self) -> M {
        self.callee
    }
}

#[derive(Debug)]
pub struct CallGraph<CS, M> {
    entries: Vec<M>,
    // reachable methods in discovery order
    reachable: Vec<M>,
    reachable_set: BTreeSet<M>,
    call_sites: BTreeMap<M, Vec<CS>>,
    // method whose body contains the call site
    containers: BTreeMap<CS, M>,
    edges: BTreeSet<Edge<CS, M>>,
    callees: BTreeMap<CS, BTreeSet<M>>,
    callers: BTreeMap<M, BTreeSet<CS>>,
}

impl<CS, M> Default for CallGraph<CS, M> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            reachable: Vec::new(),
            reachable_set: BTreeSet::new(),
            call_sites: BTreeMap::new(),
            containers: BTreeMap::new(),
            edges: BTreeSet::new(),
            callees: BTreeMap::new(),
            callers: BTreeMap::new(),
        }
    }
}

impl<CS: Copy + Ord, M: Copy + Ord> CallGraph<CS, M> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry_method(&mut self, method: M) {
        if !self.entries.contains(&method) {
            self.entries.push(method);
        }
    }

    /// Marks a method as reachable, along with the call sites of its body.
    /// Returns `false` if the method was already reachable.
    pub fn add_reachable_method<I>(&mut self, method: M, call_sites: I) -> bool
    where
        I: IntoIterator<Item = CS>,
    {
        if !self.reachable_set.insert(method) {
            return false;
        }
        self.reachable.push(method);
        let call_sites: Vec<CS> = call_sites.into_iter().collect();
        for cs in &call_sites {
            self.containers.insert(*cs, method);
        }
        self.call_sites.insert(method, call_sites);
        true
    }

    #[inline]
    pub fn contains(&self, method: M) -> bool {
        self.reachable_set.contains(&method)
    }

    /// Inserts a call edge. Returns `false` if the edge already exists.
    pub fn add_edge(&mut self, edge: Edge<CS, M>) -> bool {
        if !self.edges.insert(edge) {
            return false;
        }
        self.callees
            .entry(edge.call_site)
            .or_default()
            .insert(edge.callee);
        self.callers
            .entry(edge.callee)
            .or_default()
            .insert(edge.call_site);
        true
    }

    pub fn entry_methods(&self) -> impl Iterator<Item = M> + '_ {
        self.entries.iter().copied()
    }

    /// Returns the reachable methods, in the order they were discovered.
    pub fn reachable_methods(&self) -> impl Iterator<Item = M> + '_ {
        self.reachable.iter().copied()
    }

    pub fn call_sites_in(&self, method: M) -> impl Iterator<Item = CS> + '_ {
        self.call_sites
            .get(&method)
            .into_iter()
            .flat_map(|sites| sites.iter().copied())
    }

    pub fn container_of(&self, call_site: CS) -> Option<M> {
        self.containers.get(&call_site).copied()
    }

    pub fn callees_of(&self, call_site: CS) -> impl Iterator<Item = M> + '_ {
        self.callees
            .get(&call_site)
            .into_iter()
            .flat_map(|callees| callees.iter().copied())
    }

    pub fn callers_of(&self, method: M) -> impl Iterator<Item = CS> + '_ {
        self.callers
            .get(&method)
            .into_iter()
            .flat_map(|callers| callers.iter().copied())
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge<CS, M>> {
        self.edges.iter()
    }

    #[must_use]
    pub fn nb_reachable_methods(&self) -> usize {
        self.reachable.len()
    }

    #[must_use]
    pub fn nb_edges(&self) -> usize {
        self.edges.len()
    }

    /// Restricts the graph to the methods satisfying the predicate. Edges are
    /// kept only when both the caller and the callee are kept.
    #[must_use]
    pub fn filter<P>(&self, keep: P) -> Self
    where
        P: Fn(M) -> bool,
    {
        let mut filtered = Self::new();
        for method in self.entries.iter().copied().filter(|m| keep(*m)) {
            filtered.add_entry_method(method);
        }
        for method in self.reachable.iter().copied().filter(|m| keep(*m)) {
            filtered.add_reachable_method(method, self.call_sites_in(method));
        }
        for edge in &self.edges {
            if filtered.contains(edge.callee)
                && filtered.containers.contains_key(&edge.call_site)
            {
                filtered.add_edge(*edge);
            }
        }
        filtered
    }

    /// Exports the method-level graph in Graphviz format. Entry methods are
    /// drawn in blue, and edges are labelled by their call kind.
    pub fn to_dot<F>(&self, label: F) -> String
    where
        F: Fn(M) -> String,
    {
        let mut graph: DiGraph<String, CallKind> = DiGraph::new();
        let mut ids: BTreeMap<M, NodeIndex> = BTreeMap::new();
        for method in &self.reachable {
            ids.insert(*method, graph.add_node(label(*method)));
        }
        let mut links = BTreeSet::new();
        for edge in &self.edges {
            let (Some(caller), Some(callee)) = (
                self.containers.get(&edge.call_site).and_then(|m| ids.get(m)),
                ids.get(&edge.callee),
            ) else {
                continue;
            };
            if links.insert((*caller, *callee, edge.kind)) {
                graph.add_edge(*caller, *callee, edge.kind);
            }
        }
        let entries: BTreeSet<NodeIndex> =
            self.entries.iter().filter_map(|m| ids.get(m).copied()).collect();

        let mut res = String::new();
        res.push_str("digraph {\n");
        res.push_str("  rankdir=LR;\n");
        let _ = write!(
            res,
            "{}",
            Dot::with_attr_getters(
                &graph,
                &[Config::GraphContentOnly, Config::EdgeNoLabel],
                &|_, edge| format!("label=\"{}\"", edge.weight()),
                &|_, (id, _)| {
                    let color = if entries.contains(&id) { "blue" } else { "black" };
                    format!("color={color},shape=box")
                }
            )
        );
        res.push('}');
        res
    }
}
