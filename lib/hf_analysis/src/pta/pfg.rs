use crate::pta::elements::PointerId;
use petgraph::dot::{Config, Dot};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;

/// The pointer flow graph: an edge `s -> t` means every object pointed to
/// by `s` may be pointed to by `t`. Edges are only ever added.
#[derive(Debug, Default)]
pub struct PointerFlowGraph {
    inner: DiGraphMap<PointerId, ()>,
}

impl PointerFlowGraph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the edge was not already in the graph.
    pub(crate) fn add_edge(&mut self, source: PointerId, target: PointerId) -> bool {
        if self.inner.contains_edge(source, target) {
            return false;
        }
        self.inner.add_edge(source, target, ());
        true
    }

    pub fn successors(&self, pointer: PointerId) -> Vec<PointerId> {
        self.inner
            .neighbors_directed(pointer, Direction::Outgoing)
            .collect()
    }

    pub fn edges(&self) -> impl Iterator<Item = (PointerId, PointerId)> + '_ {
        self.inner.all_edges().map(|(source, target, _)| (source, target))
    }

    pub fn nb_edges(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn to_dot<F>(&self, label: F) -> String
    where
        F: Fn(PointerId) -> String,
    {
        let named = self
            .inner
            .clone()
            .into_graph::<u32>()
            .map(|_, p| label(*p), |_, _| String::new());
        format!(
            "{}",
            Dot::with_attr_getters(
                &named,
                &[Config::EdgeNoLabel],
                &|_, _| String::new(),
                &|_, _| "shape=box".to_string()
            )
        )
    }
}
