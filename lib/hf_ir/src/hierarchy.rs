//! Classes hierarchy graph representation.

use crate::errors::{IrError, IrResult};
use crate::repo::{ClassUid, Program};
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Kind of an inheritance link. Links go from the subtype to the supertype.
///
/// A class extends its superclass and implements its interfaces, while an
/// interface extends its super-interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inheritance {
    Extends,
    Implements,
}

impl fmt::Display for Inheritance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Extends => write!(f, "<extends>"),
            Self::Implements => write!(f, "<implements>"),
        }
    }
}

#[derive(Debug, Default)]
pub struct Hierarchy {
    inner: DiGraph<ClassUid, Inheritance>,
    node_ids: BTreeMap<ClassUid, NodeIndex>,
}

impl Hierarchy {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_class(&mut self, class: ClassUid) -> IrResult<()> {
        if self.node_ids.contains_key(&class) {
            return Err(IrError::Internal(
                "duplicate object in hierarchy graph".to_string(),
            ));
        }
        let id = self.inner.add_node(class);
        self.node_ids.insert(class, id);
        Ok(())
    }

    pub(crate) fn insert_extends(&mut self, class: ClassUid, superclass: ClassUid) -> IrResult<()> {
        self.insert_link(class, superclass, Inheritance::Extends)
    }

    pub(crate) fn insert_implements(
        &mut self,
        class: ClassUid,
        interface: ClassUid,
    ) -> IrResult<()> {
        self.insert_link(class, interface, Inheritance::Implements)
    }

    fn insert_link(&mut self, from: ClassUid, to: ClassUid, link: Inheritance) -> IrResult<()> {
        let src = self.node_id(from)?;
        let dst = self.node_id(to)?;
        if self.inner.find_edge(src, dst).is_none() {
            self.inner.add_edge(src, dst, link);
        }
        Ok(())
    }

    fn node_id(&self, class: ClassUid) -> IrResult<NodeIndex> {
        self.node_ids
            .get(&class)
            .copied()
            .ok_or_else(|| IrError::Internal(format!("{class:?} missing from hierarchy graph")))
    }

    fn direct_subtypes(&self, class: ClassUid, link: Inheritance) -> Vec<ClassUid> {
        let Some(id) = self.node_ids.get(&class) else {
            return Vec::new();
        };
        let mut subtypes: Vec<ClassUid> = self
            .inner
            .edges_directed(*id, Direction::Incoming)
            .filter(|edge| *edge.weight() == link)
            .map(|edge| self.inner[edge.source()])
            .collect();
        subtypes.sort();
        subtypes
    }

    /// Classes whose superclass is the given class.
    #[must_use]
    pub fn direct_subclasses_of(&self, class: ClassUid) -> Vec<ClassUid> {
        self.direct_subtypes(class, Inheritance::Extends)
    }

    /// Interfaces that directly extend the given interface.
    #[must_use]
    pub fn direct_subinterfaces_of(&self, interface: ClassUid) -> Vec<ClassUid> {
        self.direct_subtypes(interface, Inheritance::Extends)
    }

    /// Classes that directly implement the given interface.
    #[must_use]
    pub fn direct_implementors_of(&self, interface: ClassUid) -> Vec<ClassUid> {
        self.direct_subtypes(interface, Inheritance::Implements)
    }

    /// Returns every supertype (superclasses and interfaces, transitively)
    /// of the class, including the class itself.
    #[must_use]
    pub fn all_parents(&self, class: ClassUid) -> BTreeSet<ClassUid> {
        let mut parents = BTreeSet::new();
        let Some(id) = self.node_ids.get(&class) else {
            return parents;
        };
        let mut dfs = Dfs::new(&self.inner, *id);
        while let Some(id) = dfs.next(&self.inner) {
            parents.insert(self.inner[id]);
        }
        parents
    }

    #[must_use]
    pub fn nb_links(&self) -> usize {
        self.inner.edge_count()
    }

    #[must_use]
    pub fn to_dot(&self, program: &Program) -> String {
        let named = self.inner.map(
            |_, class| program[*class].name().to_string(),
            |_, link| *link,
        );
        format!(
            "{}",
            Dot::with_attr_getters(
                &named,
                &[Config::EdgeNoLabel],
                &|_, edge| {
                    let style = match edge.weight() {
                        Inheritance::Extends => "solid",
                        Inheritance::Implements => "dashed",
                    };
                    format!("arrowType=empty,style={style}")
                },
                &|_, (id, _)| {
                    let class = &program[self.inner[id]];
                    let (color, shape) = if class.is_defined() {
                        if class.is_interface() {
                            ("#00000088", "box")
                        } else {
                            ("black", "box")
                        }
                    } else {
                        ("black", "none")
                    };
                    format!("color={color},shape={shape}")
                }
            )
        )
    }
}
