//! Incremental construction of a [`Program`].
//!
//! Classes may be referenced (as superclass, interface, allocated type or
//! call target) before being defined: they are then registered as phantom
//! classes, and completed if their definition shows up later.

use crate::errors::{IrError, IrResult};
use crate::repo::*;
use crate::stmt::{CallKind, MethodRef, Stmt};
use crate::types::{Subsignature, Type};

pub const JAVA_LANG_OBJECT: &str = "java/lang/Object";

pub struct ProgramBuilder {
    program: Program,
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: Program::new(),
        }
    }

    /// Read-only view on the program being built.
    #[inline]
    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn add_class(&mut self, name: &str, flags: ClassFlags) -> IrResult<ClassUid> {
        log::trace!("pushing class '{}' in program", name);
        if let Some(uid) = self.program.class_ids.get(name).copied() {
            let class = self.program.class_mut(uid);
            if class.is_defined() {
                return Err(IrError::DuplicateClass(name.to_string()));
            }
            class.define(flags);
            return Ok(uid);
        }

        let uid = self.program.counters.new_class_uid();
        self.program.classes.push(Class::new(uid, name, flags));
        self.program.class_ids.insert(name.to_string(), uid);
        self.program.hierarchy.insert_class(uid)?;
        Ok(uid)
    }

    pub fn set_superclass(&mut self, class: ClassUid, superclass: &str) -> IrResult<ClassUid> {
        let super_uid = self.program.class_or_phantom(superclass)?;
        self.program.class_mut(class).set_superclass(super_uid);
        self.program.hierarchy.insert_extends(class, super_uid)?;
        Ok(super_uid)
    }

    /// Registers a direct super-interface of a class or interface.
    pub fn add_interface(&mut self, class: ClassUid, interface: &str) -> IrResult<ClassUid> {
        let itf_uid = self.program.class_or_phantom(interface)?;
        self.program.class_mut(class).push_interface(itf_uid);
        if self.program[class].is_interface() {
            self.program.hierarchy.insert_extends(class, itf_uid)?;
        } else {
            self.program.hierarchy.insert_implements(class, itf_uid)?;
        }
        Ok(itf_uid)
    }

    pub fn add_field(
        &mut self,
        class: ClassUid,
        name: &str,
        type_: Type,
        flags: FieldFlags,
    ) -> IrResult<FieldUid> {
        let class_name = self.program[class].name().to_string();
        if self.program[class].get_field(name, &self.program).is_some() {
            return Err(IrError::DuplicateField(format!("{class_name}.{name}")));
        }

        let uid = self.program.counters.new_field_uid();
        let descr = FieldDescr::new(&class_name, name, type_);
        self.program.fields.push(Field::new(uid, class, descr, flags));
        self.program.class_mut(class).push_field(uid);
        Ok(uid)
    }

    /// Declares a method in a class. A `this` variable is created for
    /// instance methods, and one variable per parameter, named after
    /// `param_names` (or `p0`, `p1`, ... when no name is given).
    pub fn add_method(
        &mut self,
        class: ClassUid,
        subsig: Subsignature,
        mut flags: MethodFlags,
        param_names: &[&str],
    ) -> IrResult<MethodUid> {
        let class_name = self.program[class].name().to_string();
        let descr = MethodDescr::new(&class_name, subsig.clone());
        if self.program[class].declared_method(&subsig).is_some() {
            return Err(IrError::DuplicateMethod(descr.to_string()));
        }
        let nb_params = subsig.parameters_types().len();
        if !param_names.is_empty() && param_names.len() != nb_params {
            return Err(IrError::ParameterCount {
                method: descr.to_string(),
                expected: nb_params,
                found: param_names.len(),
            });
        }
        if subsig.is_constructor() {
            flags |= MethodFlags::ACC_CONSTRUCTOR;
        }

        let uid = self.program.counters.new_method_uid();
        self.program
            .methods
            .push(Method::new(uid, class, descr, flags));
        self.program.class_mut(class).push_method(subsig.clone(), uid);

        if !flags.contains(MethodFlags::ACC_STATIC) {
            let this = self.alloc_var(uid, "this", Type::class(&class_name));
            self.program.method_mut(uid).set_this(this);
        }
        for (i, type_) in subsig.parameters_types().iter().enumerate() {
            let name = param_names
                .get(i)
                .map_or_else(|| format!("p{i}"), |name| (*name).to_string());
            let param = self.alloc_var(uid, &name, type_.clone());
            self.program.method_mut(uid).push_param(param);
        }
        Ok(uid)
    }

    fn alloc_var(&mut self, method: MethodUid, name: &str, type_: Type) -> VarUid {
        let uid = self.program.counters.new_var_uid();
        self.program.vars.push(Var::new(uid, method, name, type_));
        uid
    }

    /// Declares a local variable in a method body.
    pub fn new_var(&mut self, method: MethodUid, name: &str, type_: Type) -> IrResult<VarUid> {
        if self.program.get_var(method, name).is_some() {
            return Err(IrError::MalformedStatement {
                method: self.program[method].to_string(),
                reason: format!("variable '{name}' is declared twice"),
            });
        }
        let uid = self.alloc_var(method, name, type_);
        self.program.method_mut(method).push_var(uid);
        Ok(uid)
    }

    /// Looks up a variable (local, parameter or `this`) by name.
    pub fn var(&self, method: MethodUid, name: &str) -> IrResult<VarUid> {
        self.program
            .get_var(method, name)
            .map(Var::uid)
            .ok_or_else(|| {
                IrError::VariableNotFound(format!("{} in {}", name, self.program[method]))
            })
    }

    pub fn this(&self, method: MethodUid) -> IrResult<VarUid> {
        self.program[method]
            .this()
            .ok_or_else(|| IrError::VariableNotFound(format!("this in {}", self.program[method])))
    }

    pub fn param(&self, method: MethodUid, i: usize) -> IrResult<VarUid> {
        self.program[method].param(i).ok_or_else(|| {
            IrError::VariableNotFound(format!("parameter {} in {}", i, self.program[method]))
        })
    }

    /// Builds a symbolic reference to a method of a (possibly phantom) class.
    pub fn method_ref(&mut self, class_name: &str, subsig: &Subsignature) -> IrResult<MethodRef> {
        let class = self.program.class_or_phantom(class_name)?;
        Ok(MethodRef::new(class, subsig.clone()))
    }

    /// Resolves a field reference, looking up in superclasses when the
    /// named class does not declare the field itself.
    pub fn field(&self, class_name: &str, field_name: &str) -> IrResult<FieldUid> {
        let mut current = self.program.get_class_by_name(class_name);
        while let Some(class) = current {
            if let Some(field) = class.get_field(field_name, &self.program) {
                return Ok(field.uid());
            }
            current = class.superclass().map(|cuid| &self.program[cuid]);
        }
        Err(IrError::FieldNotFound(format!("{class_name}.{field_name}")))
    }

    pub fn set_entry(&mut self, method: MethodUid) {
        self.program.entry = Some(method);
    }

    /// Appends a statement to the body of a method.
    pub fn push(&mut self, method: MethodUid, stmt: Stmt) -> IrResult<StmtUid> {
        self.check_stmt(method, &stmt)?;

        if let Stmt::New {
            type_: Type::Class(name),
            ..
        } = &stmt
        {
            self.program.class_or_phantom(name)?;
        }

        let uid = self.program.counters.new_stmt_uid();
        let index = self.program.method_mut(method).push_stmt(uid);
        self.program.stmt_info.push((method, index));
        match &stmt {
            Stmt::LoadField {
                base: Some(base), ..
            } => self.program.var_mut(*base).push_load_field(uid),
            Stmt::StoreField {
                base: Some(base), ..
            } => self.program.var_mut(*base).push_store_field(uid),
            Stmt::LoadArray { array, .. } => self.program.var_mut(*array).push_load_array(uid),
            Stmt::StoreArray { array, .. } => self.program.var_mut(*array).push_store_array(uid),
            Stmt::Invoke(invoke) => {
                if let Some(receiver) = invoke.receiver() {
                    self.program.var_mut(receiver).push_invoke(uid);
                }
                self.program.method_mut(method).push_invoke(uid);
            }
            Stmt::Return(Some(var)) => self.program.method_mut(method).push_return_var(*var),
            _ => (),
        }
        self.program.stmts.push(stmt);
        Ok(uid)
    }

    fn check_stmt(&self, method: MethodUid, stmt: &Stmt) -> IrResult<()> {
        let meth = &self.program[method];
        if meth.is_abstract() || meth.is_native() {
            return Err(IrError::AbstractBody(meth.to_string()));
        }
        let malformed = |reason: String| IrError::MalformedStatement {
            method: meth.to_string(),
            reason,
        };

        for var in stmt.variables() {
            if var.idx() >= self.program.vars.len() {
                return Err(IrError::VariableNotFound(format!("{var:?}")));
            }
            let var = &self.program[var];
            if var.method() != method {
                return Err(IrError::ForeignVariable {
                    var: var.name().to_string(),
                    method: meth.to_string(),
                });
            }
        }

        match stmt {
            Stmt::New { type_, .. } if !type_.is_reference() => {
                Err(malformed(format!("cannot allocate non-reference type {type_}")))
            }
            Stmt::LoadField { base, field, .. } | Stmt::StoreField { base, field, .. } => {
                let field = &self.program[*field];
                match (base, field.is_static()) {
                    (None, false) => Err(malformed(format!(
                        "instance field {field} accessed without base"
                    ))),
                    (Some(_), true) => Err(malformed(format!(
                        "static field {field} accessed through a base variable"
                    ))),
                    _ => Ok(()),
                }
            }
            Stmt::Invoke(invoke) => {
                let expected = invoke.method_ref().subsignature().parameters_types().len();
                if invoke.args().len() != expected {
                    return Err(malformed(format!(
                        "call to {} with {} arguments",
                        invoke.method_ref().subsignature(),
                        invoke.args().len()
                    )));
                }
                match (invoke.kind(), invoke.receiver()) {
                    (CallKind::Static, Some(_)) => {
                        Err(malformed("static call with a receiver".to_string()))
                    }
                    (CallKind::Special | CallKind::Virtual | CallKind::Interface, None) => Err(
                        malformed(format!("{} call without receiver", invoke.kind())),
                    ),
                    _ => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }

    /// Closes the class hierarchy and returns the program.
    ///
    /// Every class without superclass (except `java/lang/Object` and
    /// interfaces) is linked to `java/lang/Object`, which is registered as a
    /// phantom class if needed.
    pub fn finish(mut self) -> IrResult<Program> {
        let object = self.program.class_or_phantom(JAVA_LANG_OBJECT)?;
        let orphans: Vec<ClassUid> = self
            .program
            .iter_classes()
            .filter(|class| {
                class.uid() != object && class.superclass().is_none() && !class.is_interface()
            })
            .map(Class::uid)
            .collect();
        for orphan in orphans {
            log::debug!(
                "add missing java.lang.Object inheritance to {}",
                self.program[orphan].name()
            );
            self.set_superclass(orphan, JAVA_LANG_OBJECT)?;
        }
        for missing in self.program.iter_missing_classes() {
            if missing != JAVA_LANG_OBJECT {
                log::warn!("class {missing} is referenced but not defined");
            }
        }

        log::info!(
            "program built: {} classes, {} methods, {} fields, {} statements",
            self.program.nb_classes(),
            self.program.nb_methods(),
            self.program.nb_fields(),
            self.program.nb_stmts()
        );
        Ok(self.program)
    }
}
