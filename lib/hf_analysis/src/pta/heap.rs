//! Heap abstraction: how allocation statements are mapped to abstract
//! objects.

use crate::errors::{AnalysisError, AnalysisResult};
use hf_ir::builder::JAVA_LANG_OBJECT;
use hf_ir::errors::IrError;
use hf_ir::repo::{ClassUid, MethodUid, StmtUid};
use hf_ir::stmt::Stmt;
use hf_ir::types::Type;
use hf_ir::Program;
use std::fmt;

/// An abstract object, standing for every runtime object created at the
/// same allocation site.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Obj {
    site: StmtUid,
    type_: Type,
    // Runtime class, used for dispatch (java/lang/Object for arrays)
    class: ClassUid,
    container: MethodUid,
    container_class: ClassUid,
}

impl Obj {
    /// Allocation statement.
    #[inline]
    pub fn site(&self) -> StmtUid {
        self.site
    }

    #[inline]
    pub fn type_(&self) -> &Type {
        &self.type_
    }

    /// Class an invocation on this object dispatches on.
    #[inline]
    pub fn class(&self) -> ClassUid {
        self.class
    }

    /// Method containing the allocation statement.
    #[inline]
    pub fn container(&self) -> MethodUid {
        self.container
    }

    /// Class declaring the method containing the allocation statement.
    #[inline]
    pub fn container_class(&self) -> ClassUid {
        self.container_class
    }

    pub fn display<'p>(&'p self, program: &'p Program) -> ObjDisplay<'p> {
        ObjDisplay { obj: self, program }
    }
}

pub struct ObjDisplay<'p> {
    obj: &'p Obj,
    program: &'p Program,
}

impl<'p> fmt::Display for ObjDisplay<'p> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "new {}@{}",
            self.obj.type_.to_java_string(),
            self.program.stmt_label(self.obj.site)
        )
    }
}

/// Maps allocation statements to abstract objects.
pub trait HeapModel {
    /// Returns the abstract object for the allocation statement `site`.
    /// Equal sites must give equal objects.
    ///
    /// # Errors
    ///
    /// This method should return an error if `site` is not an allocation
    /// statement, or if the allocated type is unknown in the program.
    fn obj_for(&self, program: &Program, site: StmtUid) -> AnalysisResult<Obj>;
}

/// The allocation-site abstraction: one abstract object per allocation
/// statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationSiteModel;

impl HeapModel for AllocationSiteModel {
    fn obj_for(&self, program: &Program, site: StmtUid) -> AnalysisResult<Obj> {
        let Stmt::New { type_, .. } = &program[site] else {
            return Err(AnalysisError::Internal(format!(
                "{} is not an allocation site",
                program.stmt_label(site)
            )));
        };
        let class_name = match type_ {
            Type::Class(name) => name.as_str(),
            Type::Array(..) => JAVA_LANG_OBJECT,
            _ => {
                return Err(AnalysisError::Internal(format!(
                    "allocation of primitive type {type_}"
                )))
            }
        };
        let class = program
            .get_class_by_name(class_name)
            .ok_or_else(|| IrError::ClassNotFound(class_name.to_string()))?
            .uid();
        let container = program.container_of(site);
        Ok(Obj {
            site,
            type_: type_.clone(),
            class,
            container,
            container_class: program[container].class(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_ir::repo::{ClassFlags, MethodFlags};
    use hf_ir::types::Subsignature;
    use hf_ir::ProgramBuilder;

    #[test]
    fn allocation_sites() {
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
        let arr = builder
            .new_var(m, "arr", Type::Array(1, Box::new(Type::class("A"))))
            .unwrap();
        let s1 = builder
            .push(m, Stmt::new_instance(a, Type::class("A")))
            .unwrap();
        let s2 = builder
            .push(m, Stmt::new_instance(arr, Type::Array(1, Box::new(Type::class("A")))))
            .unwrap();
        let s3 = builder.push(m, Stmt::copy(a, a)).unwrap();
        let program = builder.finish().unwrap();

        let model = AllocationSiteModel;
        let o1 = model.obj_for(&program, s1).unwrap();
        assert_eq!(o1, model.obj_for(&program, s1).unwrap());
        assert_eq!(o1.site(), s1);
        assert_eq!(o1.container(), m);
        assert_eq!(o1.container_class(), main);
        assert_eq!(program[o1.class()].name(), "A");
        assert_eq!(o1.display(&program).to_string(), "new A@Main->main()V[0]");

        let o2 = model.obj_for(&program, s2).unwrap();
        assert_eq!(program[o2.class()].name(), JAVA_LANG_OBJECT);
        assert!(model.obj_for(&program, s3).is_err());
    }
}
