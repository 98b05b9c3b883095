//! A program centralizes every class, method, variable and statement to
//! analyze. Elements are stored once and referenced by their uids.

use crate::errors::{IrError, IrResult};
use crate::hierarchy::Hierarchy;
use crate::repo::*;
use crate::stmt::Stmt;
use crate::types::Subsignature;
use std::collections::BTreeMap;
use std::ops;

#[derive(Debug)]
pub struct Program {
    pub(crate) classes: Vec<Class>,
    pub(crate) methods: Vec<Method>,
    pub(crate) fields: Vec<Field>,
    pub(crate) vars: Vec<Var>,
    pub(crate) stmts: Vec<Stmt>,
    // Container method and position in its body, for each statement
    pub(crate) stmt_info: Vec<(MethodUid, usize)>,
    pub(crate) class_ids: BTreeMap<String, ClassUid>,
    pub(crate) hierarchy: Hierarchy,
    pub(crate) entry: Option<MethodUid>,
    pub(crate) counters: ProgramCounters,
}

impl Default for Program {
    fn default() -> Self {
        Self {
            classes: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            vars: Vec::new(),
            stmts: Vec::new(),
            stmt_info: Vec::new(),
            class_ids: BTreeMap::new(),
            hierarchy: Hierarchy::new(),
            entry: None,
            counters: ProgramCounters::new(),
        }
    }
}

impl ops::Index<ClassUid> for Program {
    type Output = Class;

    fn index(&self, cuid: ClassUid) -> &Class {
        &self.classes[cuid.idx()]
    }
}

impl ops::Index<MethodUid> for Program {
    type Output = Method;

    fn index(&self, muid: MethodUid) -> &Method {
        &self.methods[muid.idx()]
    }
}

impl ops::Index<FieldUid> for Program {
    type Output = Field;

    fn index(&self, fuid: FieldUid) -> &Field {
        &self.fields[fuid.idx()]
    }
}

impl ops::Index<VarUid> for Program {
    type Output = Var;

    fn index(&self, vuid: VarUid) -> &Var {
        &self.vars[vuid.idx()]
    }
}

impl ops::Index<StmtUid> for Program {
    type Output = Stmt;

    fn index(&self, suid: StmtUid) -> &Stmt {
        &self.stmts[suid.idx()]
    }
}

impl Program {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the class with the given name, creating a phantom class if
    /// it has never been seen.
    pub(crate) fn class_or_phantom(&mut self, name: &str) -> IrResult<ClassUid> {
        if let Some(uid) = self.class_ids.get(name) {
            return Ok(*uid);
        }
        log::trace!("registering phantom class '{}'", name);
        let uid = self.counters.new_class_uid();
        self.classes.push(Class::new_no_def(uid, name));
        self.class_ids.insert(name.to_string(), uid);
        self.hierarchy.insert_class(uid)?;
        Ok(uid)
    }

    pub(crate) fn class_mut(&mut self, cuid: ClassUid) -> &mut Class {
        &mut self.classes[cuid.idx()]
    }

    pub(crate) fn method_mut(&mut self, muid: MethodUid) -> &mut Method {
        &mut self.methods[muid.idx()]
    }

    pub(crate) fn var_mut(&mut self, vuid: VarUid) -> &mut Var {
        &mut self.vars[vuid.idx()]
    }

    /// The method the analyses start from.
    pub fn entry_method(&self) -> IrResult<MethodUid> {
        self.entry.ok_or(IrError::NoEntryMethod)
    }

    #[inline]
    #[must_use]
    pub const fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    #[inline]
    pub fn iter_classes(&self) -> impl Iterator<Item = &Class> {
        self.classes.iter()
    }

    pub fn iter_missing_classes(&self) -> impl Iterator<Item = &str> {
        self.classes
            .iter()
            .filter_map(|class| (!class.is_defined()).then(|| class.name()))
    }

    pub fn iter_methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter()
    }

    pub fn get_class_by_name(&self, name: &str) -> Option<&Class> {
        self.class_ids.get(name).map(|cuid| &self[*cuid])
    }

    /// Looks up a method by its declaring class name and subsignature.
    pub fn get_method(&self, class_name: &str, subsig: &Subsignature) -> Option<&Method> {
        let class = self.get_class_by_name(class_name)?;
        class.declared_method(subsig).map(|muid| &self[muid])
    }

    /// Looks up a variable by name in the given method.
    pub fn get_var(&self, method: MethodUid, name: &str) -> Option<&Var> {
        self[method]
            .vars()
            .iter()
            .map(|vuid| &self[*vuid])
            .find(|var| var.name() == name)
    }

    /// Method whose body contains the statement.
    #[inline]
    pub fn container_of(&self, stmt: StmtUid) -> MethodUid {
        self.stmt_info[stmt.idx()].0
    }

    /// Position of the statement in the body of its container.
    #[inline]
    pub fn index_of(&self, stmt: StmtUid) -> usize {
        self.stmt_info[stmt.idx()].1
    }

    /// A human readable label for a statement, such as `Main->main()V[3]`.
    pub fn stmt_label(&self, stmt: StmtUid) -> String {
        let (method, index) = self.stmt_info[stmt.idx()];
        format!("{}[{}]", self[method], index)
    }

    /// Checks whether `sub` is `sup` or inherits (directly or not) from it.
    pub fn is_subtype_of(&self, sub: ClassUid, sup: ClassUid) -> bool {
        sub == sup || self.hierarchy.all_parents(sub).contains(&sup)
    }

    pub fn nb_classes(&self) -> usize {
        self.counters.nb_classes()
    }

    pub fn nb_methods(&self) -> usize {
        self.counters.nb_methods()
    }

    pub fn nb_fields(&self) -> usize {
        self.counters.nb_fields()
    }

    pub fn nb_vars(&self) -> usize {
        self.counters.nb_vars()
    }

    pub fn nb_stmts(&self) -> usize {
        self.counters.nb_stmts()
    }
}
