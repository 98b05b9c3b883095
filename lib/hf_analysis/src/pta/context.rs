//! Context abstraction: the policies that qualify methods and objects
//! with calling contexts.

use crate::errors::AnalysisError;
use crate::pta::heap::Obj;
use hf_ir::repo::{ClassUid, MethodUid, StmtUid};
use hf_ir::Program;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContextElem {
    CallSite(StmtUid),
    AllocSite(StmtUid),
    Type(ClassUid),
}

/// A calling (or heap) context: a bounded sequence of context elements,
/// most recent last.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Context {
    elems: Vec<ContextElem>,
}

impl Context {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn elems(&self) -> &[ContextElem] {
        &self.elems
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Keeps the `k` most recent elements.
    #[must_use]
    pub fn truncate(&self, k: usize) -> Self {
        let start = self.elems.len().saturating_sub(k);
        Self {
            elems: self.elems[start..].to_vec(),
        }
    }

    /// Appends an element, then keeps the `k` most recent elements.
    #[must_use]
    pub fn append(&self, elem: ContextElem, k: usize) -> Self {
        let mut elems = self.elems.clone();
        elems.push(elem);
        let start = elems.len().saturating_sub(k);
        Self {
            elems: elems.split_off(start),
        }
    }

    pub fn display<'p>(&'p self, program: &'p Program) -> ContextDisplay<'p> {
        ContextDisplay {
            ctx: self,
            program,
        }
    }
}

pub struct ContextDisplay<'p> {
    ctx: &'p Context,
    program: &'p Program,
}

impl<'p> fmt::Display for ContextDisplay<'p> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, elem) in self.ctx.elems.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match elem {
                ContextElem::CallSite(site) => write!(f, "{}", self.program.stmt_label(*site))?,
                ContextElem::AllocSite(site) => {
                    write!(f, "new@{}", self.program.stmt_label(*site))?;
                }
                ContextElem::Type(class) => write!(f, "{}", self.program[*class])?,
            }
        }
        write!(f, "]")
    }
}

/// Produces contexts for methods and heap objects. Implementations must be
/// pure: equal inputs give equal contexts.
pub trait ContextSelector {
    fn empty_context(&self) -> Context {
        Context::empty()
    }

    /// Context of an object allocated in a method analyzed under
    /// `method_ctx`.
    fn select_heap_context(&self, method_ctx: &Context, obj: &Obj) -> Context;

    /// Context of the callee of a static call.
    fn select_static_context(
        &self,
        caller_ctx: &Context,
        call_site: StmtUid,
        callee: MethodUid,
    ) -> Context;

    /// Context of the callee of an instance call, on a receiver object
    /// `recv` allocated under the heap context `recv_ctx`.
    fn select_instance_context(
        &self,
        caller_ctx: &Context,
        call_site: StmtUid,
        recv_ctx: &Context,
        recv: &Obj,
        callee: MethodUid,
    ) -> Context;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Insensitive;

impl ContextSelector for Insensitive {
    fn select_heap_context(&self, _: &Context, _: &Obj) -> Context {
        Context::empty()
    }

    fn select_static_context(&self, _: &Context, _: StmtUid, _: MethodUid) -> Context {
        Context::empty()
    }

    fn select_instance_context(
        &self,
        _: &Context,
        _: StmtUid,
        _: &Context,
        _: &Obj,
        _: MethodUid,
    ) -> Context {
        Context::empty()
    }
}

/// k-limited call-site sensitivity.
#[derive(Debug, Clone, Copy)]
pub struct KCallSite {
    k: usize,
}

impl KCallSite {
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl ContextSelector for KCallSite {
    fn select_heap_context(&self, method_ctx: &Context, _: &Obj) -> Context {
        method_ctx.truncate(self.k.saturating_sub(1))
    }

    fn select_static_context(&self, caller_ctx: &Context, call_site: StmtUid, _: MethodUid) -> Context {
        caller_ctx.append(ContextElem::CallSite(call_site), self.k)
    }

    fn select_instance_context(
        &self,
        caller_ctx: &Context,
        call_site: StmtUid,
        _: &Context,
        _: &Obj,
        _: MethodUid,
    ) -> Context {
        caller_ctx.append(ContextElem::CallSite(call_site), self.k)
    }
}

/// k-limited object sensitivity.
#[derive(Debug, Clone, Copy)]
pub struct KObject {
    k: usize,
}

impl KObject {
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl ContextSelector for KObject {
    fn select_heap_context(&self, method_ctx: &Context, _: &Obj) -> Context {
        method_ctx.truncate(self.k.saturating_sub(1))
    }

    fn select_static_context(&self, caller_ctx: &Context, _: StmtUid, _: MethodUid) -> Context {
        caller_ctx.clone()
    }

    fn select_instance_context(
        &self,
        _: &Context,
        _: StmtUid,
        recv_ctx: &Context,
        recv: &Obj,
        _: MethodUid,
    ) -> Context {
        recv_ctx.append(ContextElem::AllocSite(recv.site()), self.k)
    }
}

/// k-limited type sensitivity: like object sensitivity, with allocation
/// sites replaced by the class containing them.
#[derive(Debug, Clone, Copy)]
pub struct KType {
    k: usize,
}

impl KType {
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl ContextSelector for KType {
    fn select_heap_context(&self, method_ctx: &Context, _: &Obj) -> Context {
        method_ctx.truncate(self.k.saturating_sub(1))
    }

    fn select_static_context(&self, caller_ctx: &Context, _: StmtUid, _: MethodUid) -> Context {
        caller_ctx.clone()
    }

    fn select_instance_context(
        &self,
        _: &Context,
        _: StmtUid,
        recv_ctx: &Context,
        recv: &Obj,
        _: MethodUid,
    ) -> Context {
        recv_ctx.append(ContextElem::Type(recv.container_class()), self.k)
    }
}

/// The context sensitivity variants, as chosen on the command line:
/// `ci`, `<k>-call`, `<k>-obj` or `<k>-type` (with `k > 0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSensitivity {
    Insensitive,
    CallSite(usize),
    Object(usize),
    Type(usize),
}

impl Default for ContextSensitivity {
    fn default() -> Self {
        Self::Insensitive
    }
}

impl fmt::Display for ContextSensitivity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Insensitive => write!(f, "ci"),
            Self::CallSite(k) => write!(f, "{k}-call"),
            Self::Object(k) => write!(f, "{k}-obj"),
            Self::Type(k) => write!(f, "{k}-type"),
        }
    }
}

impl FromStr for ContextSensitivity {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AnalysisError::InvalidContextSensitivity(s.to_string());

        if s == "ci" {
            return Ok(Self::Insensitive);
        }
        let (k, kind) = s.split_once('-').ok_or_else(invalid)?;
        let k: usize = k.parse().map_err(|_| invalid())?;
        if k == 0 {
            return Err(invalid());
        }
        match kind {
            "call" => Ok(Self::CallSite(k)),
            "obj" => Ok(Self::Object(k)),
            "type" => Ok(Self::Type(k)),
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pta::heap::{AllocationSiteModel, HeapModel};
    use hf_ir::repo::{ClassFlags, MethodFlags};
    use hf_ir::stmt::Stmt;
    use hf_ir::types::{Subsignature, Type};
    use hf_ir::ProgramBuilder;

    fn sample() -> (Program, Vec<StmtUid>, MethodUid) {
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
        let mut sites = Vec::new();
        for _ in 0..3 {
            sites.push(builder.push(m, Stmt::new_instance(a, Type::class("A"))).unwrap());
        }
        (builder.finish().unwrap(), sites, m)
    }

    #[test]
    fn truncation_keeps_most_recent() {
        let (_, sites, _) = sample();
        let ctx = Context::empty()
            .append(ContextElem::CallSite(sites[0]), 2)
            .append(ContextElem::CallSite(sites[1]), 2)
            .append(ContextElem::CallSite(sites[2]), 2);
        assert_eq!(
            ctx.elems(),
            &[ContextElem::CallSite(sites[1]), ContextElem::CallSite(sites[2])]
        );
        assert_eq!(ctx.truncate(1).elems(), &[ContextElem::CallSite(sites[2])]);
        assert!(ctx.truncate(0).is_empty());
        assert_eq!(ctx.truncate(5), ctx);
    }

    #[test]
    fn policies() {
        let (program, sites, m) = sample();
        let obj = AllocationSiteModel.obj_for(&program, sites[0]).unwrap();
        let caller = Context::empty().append(ContextElem::CallSite(sites[1]), 2);
        let recv_ctx = Context::empty().append(ContextElem::AllocSite(sites[2]), 2);

        let ci = Insensitive;
        assert!(ci
            .select_instance_context(&caller, sites[0], &recv_ctx, &obj, m)
            .is_empty());
        assert!(ci.select_heap_context(&caller, &obj).is_empty());

        let call = KCallSite::new(2);
        assert_eq!(
            call.select_static_context(&caller, sites[0], m).elems(),
            &[ContextElem::CallSite(sites[1]), ContextElem::CallSite(sites[0])]
        );
        assert_eq!(call.select_heap_context(&caller, &obj), caller);

        let obj_sens = KObject::new(1);
        assert_eq!(obj_sens.select_static_context(&caller, sites[0], m), caller);
        assert_eq!(
            obj_sens
                .select_instance_context(&caller, sites[0], &recv_ctx, &obj, m)
                .elems(),
            &[ContextElem::AllocSite(sites[0])]
        );
        assert!(obj_sens.select_heap_context(&caller, &obj).is_empty());

        let type_sens = KType::new(2);
        assert_eq!(
            type_sens
                .select_instance_context(&caller, sites[0], &recv_ctx, &obj, m)
                .elems(),
            &[
                ContextElem::AllocSite(sites[2]),
                ContextElem::Type(obj.container_class())
            ]
        );
    }

    #[test]
    fn sensitivity_parsing() {
        assert_eq!(
            "ci".parse::<ContextSensitivity>().unwrap(),
            ContextSensitivity::Insensitive
        );
        assert_eq!(
            "2-obj".parse::<ContextSensitivity>().unwrap(),
            ContextSensitivity::Object(2)
        );
        assert_eq!(
            "1-call".parse::<ContextSensitivity>().unwrap(),
            ContextSensitivity::CallSite(1)
        );
        assert_eq!(
            "3-type".parse::<ContextSensitivity>().unwrap(),
            ContextSensitivity::Type(3)
        );
        assert!("0-obj".parse::<ContextSensitivity>().is_err());
        assert!("2-foo".parse::<ContextSensitivity>().is_err());
        assert!("obj".parse::<ContextSensitivity>().is_err());
        assert_eq!(ContextSensitivity::Object(2).to_string(), "2-obj");
    }
}
