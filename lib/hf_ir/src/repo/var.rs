use crate::repo::{MethodUid, StmtUid, VarUid};
use crate::types::Type;
use std::fmt;

/// A local variable of a method body.
///
/// Besides its declaration, a variable caches the statements that use it as
/// base of an instance field access, as array reference, or as receiver of
/// an invocation. These reverse indices are filled in while statements are
/// pushed in the program.
#[derive(Debug, Clone)]
pub struct Var {
    uid: VarUid,
    method: MethodUid,
    name: String,
    type_: Type,
    load_fields: Vec<StmtUid>,
    store_fields: Vec<StmtUid>,
    load_arrays: Vec<StmtUid>,
    store_arrays: Vec<StmtUid>,
    invokes: Vec<StmtUid>,
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Var {
    pub(crate) fn new(uid: VarUid, method: MethodUid, name: &str, type_: Type) -> Self {
        Self {
            uid,
            method,
            name: name.to_string(),
            type_,
            load_fields: Vec::new(),
            store_fields: Vec::new(),
            load_arrays: Vec::new(),
            store_arrays: Vec::new(),
            invokes: Vec::new(),
        }
    }

    pub(crate) fn push_load_field(&mut self, stmt: StmtUid) {
        self.load_fields.push(stmt);
    }

    pub(crate) fn push_store_field(&mut self, stmt: StmtUid) {
        self.store_fields.push(stmt);
    }

    pub(crate) fn push_load_array(&mut self, stmt: StmtUid) {
        self.load_arrays.push(stmt);
    }

    pub(crate) fn push_store_array(&mut self, stmt: StmtUid) {
        self.store_arrays.push(stmt);
    }

    pub(crate) fn push_invoke(&mut self, stmt: StmtUid) {
        self.invokes.push(stmt);
    }

    #[inline]
    pub fn uid(&self) -> VarUid {
        self.uid
    }

    /// Method declaring the variable.
    #[inline]
    pub fn method(&self) -> MethodUid {
        self.method
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn type_(&self) -> &Type {
        &self.type_
    }

    /// Instance field loads `y = x.f` where this variable is `x`.
    #[inline]
    pub fn load_fields(&self) -> &[StmtUid] {
        &self.load_fields
    }

    /// Instance field stores `x.f = y` where this variable is `x`.
    #[inline]
    pub fn store_fields(&self) -> &[StmtUid] {
        &self.store_fields
    }

    /// Array loads `y = x[i]` where this variable is `x`.
    #[inline]
    pub fn load_arrays(&self) -> &[StmtUid] {
        &self.load_arrays
    }

    /// Array stores `x[i] = y` where this variable is `x`.
    #[inline]
    pub fn store_arrays(&self) -> &[StmtUid] {
        &self.store_arrays
    }

    /// Invocations `x.m(...)` where this variable is the receiver `x`.
    #[inline]
    pub fn invokes(&self) -> &[StmtUid] {
        &self.invokes
    }
}
