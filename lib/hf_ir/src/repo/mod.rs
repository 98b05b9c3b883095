//! Program elements (classes, methods, fields and variables) and the
//! program that stores them.

mod class;
mod field;
mod method;
mod program;
mod uids;
mod var;

pub use class::{Class, ClassFlags};
pub use field::{Field, FieldDescr, FieldFlags};
pub use method::{Method, MethodDescr, MethodFlags};
pub use program::Program;
pub use uids::{ClassUid, FieldUid, MethodUid, ProgramCounters, StmtUid, VarUid};
pub use var::Var;
