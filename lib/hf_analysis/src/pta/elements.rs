//! Interning of the context-qualified elements the solver works on.
//!
//! Every context, abstract object, context-qualified object and pointer is
//! given a stable id the first time it is seen. Each pointer owns exactly
//! one points-to set.

use crate::pta::context::Context;
use crate::pta::heap::Obj;
use crate::pta::pts::PointsToSet;
use hf_ir::repo::{FieldUid, MethodUid, StmtUid, VarUid};
use std::collections::BTreeMap;
use std::num::NonZeroUsize;

/// Unique id to identify an interned context
#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct ContextId(NonZeroUsize);

impl ContextId {
    fn idx(self) -> usize {
        self.0.get() - 1
    }

    fn from_idx(idx: usize) -> Self {
        Self(NonZeroUsize::new(idx + 1).expect("index + 1 cannot be 0"))
    }
}

/// Unique id to identify an abstract object
#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct ObjId(NonZeroUsize);

impl ObjId {
    fn idx(self) -> usize {
        self.0.get() - 1
    }

    fn from_idx(idx: usize) -> Self {
        Self(NonZeroUsize::new(idx + 1).expect("index + 1 cannot be 0"))
    }
}

/// Unique id to identify an abstract object qualified by a heap context
#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct CsObjId(NonZeroUsize);

impl CsObjId {
    pub(crate) fn idx(self) -> usize {
        self.0.get() - 1
    }

    pub(crate) fn from_idx(idx: usize) -> Self {
        Self(NonZeroUsize::new(idx + 1).expect("index + 1 cannot be 0"))
    }
}

/// Unique id to identify a pointer
#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct PointerId(NonZeroUsize);

impl PointerId {
    fn idx(self) -> usize {
        self.0.get() - 1
    }

    fn from_idx(idx: usize) -> Self {
        Self(NonZeroUsize::new(idx + 1).expect("index + 1 cannot be 0"))
    }
}

/// A method analyzed under a context.
#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct CsMethod {
    context: ContextId,
    method: MethodUid,
}

impl CsMethod {
    pub fn new(context: ContextId, method: MethodUid) -> Self {
        Self { context, method }
    }

    #[inline]
    pub fn context(&self) -> ContextId {
        self.context
    }

    #[inline]
    pub fn method(&self) -> MethodUid {
        self.method
    }
}

/// A call site of a method analyzed under a context.
#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct CsCallSite {
    context: ContextId,
    site: StmtUid,
}

impl CsCallSite {
    pub fn new(context: ContextId, site: StmtUid) -> Self {
        Self { context, site }
    }

    #[inline]
    pub fn context(&self) -> ContextId {
        self.context
    }

    #[inline]
    pub fn site(&self) -> StmtUid {
        self.site
    }
}

/// A variable of a method analyzed under a context.
#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct CsVar {
    context: ContextId,
    var: VarUid,
}

impl CsVar {
    pub fn new(context: ContextId, var: VarUid) -> Self {
        Self { context, var }
    }

    #[inline]
    pub fn context(&self) -> ContextId {
        self.context
    }

    #[inline]
    pub fn var(&self) -> VarUid {
        self.var
    }
}

/// The memory locations points-to sets are computed for.
#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub enum Pointer {
    Var(CsVar),
    StaticField(FieldUid),
    InstanceField(CsObjId, FieldUid),
    /// All the elements of an array object, indices are not distinguished.
    ArrayIndex(CsObjId),
}

#[derive(Debug, Default)]
pub struct Elements {
    contexts: Vec<Context>,
    context_ids: BTreeMap<Context, ContextId>,
    objects: Vec<Obj>,
    object_ids: BTreeMap<StmtUid, ObjId>,
    cs_objects: Vec<(ContextId, ObjId)>,
    cs_object_ids: BTreeMap<(ContextId, ObjId), CsObjId>,
    pointers: Vec<Pointer>,
    pointer_ids: BTreeMap<Pointer, PointerId>,
    // points-to set of each pointer, indexed as `pointers`
    pts: Vec<PointsToSet>,
}

impl Elements {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn context_id(&mut self, context: Context) -> ContextId {
        if let Some(id) = self.context_ids.get(&context) {
            return *id;
        }
        let id = ContextId::from_idx(self.contexts.len());
        self.contexts.push(context.clone());
        self.context_ids.insert(context, id);
        id
    }

    #[inline]
    pub fn context(&self, id: ContextId) -> &Context {
        &self.contexts[id.idx()]
    }

    /// Interns an abstract object, identified by its allocation site.
    pub(crate) fn object_id(&mut self, obj: Obj) -> ObjId {
        if let Some(id) = self.object_ids.get(&obj.site()) {
            return *id;
        }
        let id = ObjId::from_idx(self.objects.len());
        self.object_ids.insert(obj.site(), id);
        self.objects.push(obj);
        id
    }

    #[inline]
    pub fn object(&self, id: ObjId) -> &Obj {
        &self.objects[id.idx()]
    }

    pub(crate) fn cs_object_id(&mut self, heap_context: ContextId, obj: ObjId) -> CsObjId {
        let key = (heap_context, obj);
        if let Some(id) = self.cs_object_ids.get(&key) {
            return *id;
        }
        let id = CsObjId::from_idx(self.cs_objects.len());
        self.cs_objects.push(key);
        self.cs_object_ids.insert(key, id);
        id
    }

    /// Heap context and abstract object of a context-qualified object.
    #[inline]
    pub fn cs_object(&self, id: CsObjId) -> (ContextId, ObjId) {
        self.cs_objects[id.idx()]
    }

    pub(crate) fn pointer_id(&mut self, pointer: Pointer) -> PointerId {
        if let Some(id) = self.pointer_ids.get(&pointer) {
            return *id;
        }
        let id = PointerId::from_idx(self.pointers.len());
        self.pointers.push(pointer);
        self.pointer_ids.insert(pointer, id);
        self.pts.push(PointsToSet::new());
        id
    }

    pub(crate) fn var_pointer(&mut self, context: ContextId, var: VarUid) -> PointerId {
        self.pointer_id(Pointer::Var(CsVar::new(context, var)))
    }

    pub(crate) fn static_field_pointer(&mut self, field: FieldUid) -> PointerId {
        self.pointer_id(Pointer::StaticField(field))
    }

    pub(crate) fn instance_field_pointer(&mut self, obj: CsObjId, field: FieldUid) -> PointerId {
        self.pointer_id(Pointer::InstanceField(obj, field))
    }

    pub(crate) fn array_index_pointer(&mut self, array: CsObjId) -> PointerId {
        self.pointer_id(Pointer::ArrayIndex(array))
    }

    /// Looks up a pointer without creating it.
    pub fn find_pointer(&self, pointer: &Pointer) -> Option<PointerId> {
        self.pointer_ids.get(pointer).copied()
    }

    #[inline]
    pub fn pointer(&self, id: PointerId) -> Pointer {
        self.pointers[id.idx()]
    }

    #[inline]
    pub fn points_to(&self, id: PointerId) -> &PointsToSet {
        &self.pts[id.idx()]
    }

    #[inline]
    pub(crate) fn points_to_mut(&mut self, id: PointerId) -> &mut PointsToSet {
        &mut self.pts[id.idx()]
    }

    pub fn iter_pointers(&self) -> impl Iterator<Item = (PointerId, Pointer)> + '_ {
        self.pointers
            .iter()
            .enumerate()
            .map(|(idx, pointer)| (PointerId::from_idx(idx), *pointer))
    }

    pub fn nb_contexts(&self) -> usize {
        self.contexts.len()
    }

    pub fn nb_objects(&self) -> usize {
        self.objects.len()
    }

    pub fn nb_cs_objects(&self) -> usize {
        self.cs_objects.len()
    }

    pub fn nb_pointers(&self) -> usize {
        self.pointers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pta::context::ContextElem;
    use crate::pta::heap::{AllocationSiteModel, HeapModel};
    use hf_ir::repo::{ClassFlags, MethodFlags};
    use hf_ir::stmt::Stmt;
    use hf_ir::types::{Subsignature, Type};
    use hf_ir::ProgramBuilder;

    #[test]
    fn interning_is_idempotent() {
        let mut builder = ProgramBuilder::new();
        let main = builder.add_class("Main", ClassFlags::empty()).unwrap();
        let m = builder
            .add_method(
                main,
                Subsignature::new("main", vec![], Type::Void),
                MethodFlags::ACC_STATIC,
                &[],
            )
            .unwrap();
        let a = builder.new_var(m, "a", Type::class("A")).unwrap();
        let site = builder
            .push(m, Stmt::new_instance(a, Type::class("A")))
            .unwrap();
        let program = builder.finish().unwrap();

        let mut elements = Elements::new();
        let empty = elements.context_id(Context::empty());
        let other = elements.context_id(Context::empty().append(ContextElem::CallSite(site), 1));
        assert_eq!(elements.context_id(Context::empty()), empty);
        assert_ne!(empty, other);
        assert_eq!(elements.nb_contexts(), 2);

        let obj = AllocationSiteModel.obj_for(&program, site).unwrap();
        let o1 = elements.object_id(obj.clone());
        assert_eq!(elements.object_id(obj), o1);
        let cs1 = elements.cs_object_id(empty, o1);
        let cs2 = elements.cs_object_id(other, o1);
        assert_ne!(cs1, cs2);
        assert_eq!(elements.cs_object_id(empty, o1), cs1);
        assert_eq!(elements.cs_object(cs2), (other, o1));

        let p1 = elements.var_pointer(empty, a);
        let p2 = elements.var_pointer(other, a);
        assert_ne!(p1, p2);
        assert_eq!(elements.var_pointer(empty, a), p1);
        assert_eq!(elements.array_index_pointer(cs1), elements.array_index_pointer(cs1));
        assert_eq!(elements.nb_pointers(), 3);
        assert!(elements.points_to(p1).is_empty());
        assert_eq!(
            elements.find_pointer(&Pointer::Var(CsVar::new(other, a))),
            Some(p2)
        );
    }
}
