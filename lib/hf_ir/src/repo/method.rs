use crate::repo::{ClassUid, MethodUid, StmtUid, VarUid};
use crate::types::{Subsignature, Type};
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Method access flags, with JVM values.
    pub struct MethodFlags: u32 {
        const ACC_PUBLIC = 0x1;
        const ACC_PRIVATE = 0x2;
        const ACC_PROTECTED = 0x4;
        const ACC_STATIC = 0x8;
        const ACC_FINAL = 0x10;
        const ACC_SYNCHRONIZED = 0x20;
        const ACC_BRIDGE = 0x40;
        const ACC_VARARGS = 0x80;
        const ACC_NATIVE = 0x100;
        const ACC_ABSTRACT = 0x400;
        const ACC_SYNTHETIC = 0x1000;
        const ACC_CONSTRUCTOR = 0x10000;
    }
}

/// A method of the program, with its (possibly empty) body.
#[derive(Debug, Clone)]
pub struct Method {
    // Unique identifier in the program
    uid: MethodUid,
    // Declaring class
    class: ClassUid,
    flags: MethodFlags,
    // Cache of names and types that identify the method
    descriptor: MethodDescr,
    // Receiver variable, for instance methods only
    this: Option<VarUid>,
    params: Vec<VarUid>,
    // Every local variable, including `this` and parameters
    vars: Vec<VarUid>,
    // Body, in program order
    stmts: Vec<StmtUid>,
    // Variables appearing in return statements
    return_vars: Vec<VarUid>,
    // Call sites of the body
    invokes: Vec<StmtUid>,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.descriptor.fmt(f)
    }
}

impl Method {
    pub(crate) fn new(
        uid: MethodUid,
        class: ClassUid,
        descriptor: MethodDescr,
        flags: MethodFlags,
    ) -> Self {
        Self {
            uid,
            class,
            flags,
            descriptor,
            this: None,
            params: Vec::new(),
            vars: Vec::new(),
            stmts: Vec::new(),
            return_vars: Vec::new(),
            invokes: Vec::new(),
        }
    }

    pub(crate) fn set_this(&mut self, this: VarUid) {
        self.this = Some(this);
        self.vars.push(this);
    }

    pub(crate) fn push_param(&mut self, param: VarUid) {
        self.params.push(param);
        self.vars.push(param);
    }

    pub(crate) fn push_var(&mut self, var: VarUid) {
        self.vars.push(var);
    }

    pub(crate) fn push_stmt(&mut self, stmt: StmtUid) -> usize {
        self.stmts.push(stmt);
        self.stmts.len() - 1
    }

    pub(crate) fn push_return_var(&mut self, var: VarUid) {
        if !self.return_vars.contains(&var) {
            self.return_vars.push(var);
        }
    }

    pub(crate) fn push_invoke(&mut self, stmt: StmtUid) {
        self.invokes.push(stmt);
    }

    #[inline]
    pub fn uid(&self) -> MethodUid {
        self.uid
    }

    #[inline]
    pub fn class(&self) -> ClassUid {
        self.class
    }

    #[inline]
    pub fn descriptor(&self) -> &MethodDescr {
        &self.descriptor
    }

    #[inline]
    pub fn subsignature(&self) -> &Subsignature {
        self.descriptor.subsignature()
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.subsignature().name()
    }

    #[inline]
    pub fn return_type(&self) -> &Type {
        self.subsignature().return_type()
    }

    #[inline]
    pub fn parameters_types(&self) -> &[Type] {
        self.subsignature().parameters_types()
    }

    #[inline]
    pub fn this(&self) -> Option<VarUid> {
        self.this
    }

    #[inline]
    pub fn params(&self) -> &[VarUid] {
        &self.params
    }

    #[inline]
    pub fn param(&self, i: usize) -> Option<VarUid> {
        self.params.get(i).copied()
    }

    #[inline]
    pub fn vars(&self) -> &[VarUid] {
        &self.vars
    }

    #[inline]
    pub fn statements(&self) -> &[StmtUid] {
        &self.stmts
    }

    #[inline]
    pub fn return_vars(&self) -> &[VarUid] {
        &self.return_vars
    }

    /// Returns the call sites of the method body, in program order.
    #[inline]
    pub fn call_sites(&self) -> &[StmtUid] {
        &self.invokes
    }

    #[inline]
    #[must_use]
    pub const fn flags(&self) -> MethodFlags {
        self.flags
    }

    #[inline]
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.flags.contains(MethodFlags::ACC_STATIC)
    }

    #[inline]
    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.flags.contains(MethodFlags::ACC_ABSTRACT)
    }

    #[inline]
    #[must_use]
    pub const fn is_native(&self) -> bool {
        self.flags.contains(MethodFlags::ACC_NATIVE)
    }

    #[inline]
    #[must_use]
    pub const fn is_private(&self) -> bool {
        self.flags.contains(MethodFlags::ACC_PRIVATE)
    }
}

/// A wrapper to cache prototype information of a method and to allow
/// deriving of eq and ord traits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MethodDescr {
    definer: String,
    subsignature: Subsignature,
}

impl fmt::Display for MethodDescr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}->{}", self.definer, self.subsignature)
    }
}

impl MethodDescr {
    pub(crate) fn new(definer: &str, subsignature: Subsignature) -> Self {
        Self {
            definer: definer.to_string(),
            subsignature,
        }
    }

    /// Name of the declaring class.
    #[inline]
    pub fn definer(&self) -> &str {
        &self.definer
    }

    #[inline]
    pub fn subsignature(&self) -> &Subsignature {
        &self.subsignature
    }
}
