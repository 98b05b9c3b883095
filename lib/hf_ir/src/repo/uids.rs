use std::fmt;
use std::num::NonZeroUsize;

/// Unique id to identify a class in the program
#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct ClassUid(NonZeroUsize);

impl ClassUid {
    pub(crate) fn idx(self) -> usize {
        self.0.get() - 1
    }
}

/// Unique id to identify a method in the program
#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct MethodUid(NonZeroUsize);

impl MethodUid {
    pub(crate) fn idx(self) -> usize {
        self.0.get() - 1
    }
}

/// Unique id to identify a field in the program
#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct FieldUid(NonZeroUsize);

impl FieldUid {
    pub(crate) fn idx(self) -> usize {
        self.0.get() - 1
    }
}

/// Unique id to identify a local variable (including parameters and `this`)
/// in the program
#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct VarUid(NonZeroUsize);

impl VarUid {
    pub(crate) fn idx(self) -> usize {
        self.0.get() - 1
    }
}

/// Unique id to identify a statement in the program. Allocation sites and
/// call sites are identified by the uid of their statement.
#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct StmtUid(NonZeroUsize);

impl StmtUid {
    pub(crate) fn idx(self) -> usize {
        self.0.get() - 1
    }
}

impl fmt::Display for StmtUid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct ProgramCounters {
    nb_classes: usize,
    nb_methods: usize,
    nb_fields: usize,
    nb_vars: usize,
    nb_stmts: usize,
}

impl ProgramCounters {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn new_class_uid(&mut self) -> ClassUid {
        self.nb_classes += 1;
        ClassUid(NonZeroUsize::new(self.nb_classes).expect("just incremented, cannot be 0"))
    }

    pub(crate) fn new_method_uid(&mut self) -> MethodUid {
        self.nb_methods += 1;
        MethodUid(NonZeroUsize::new(self.nb_methods).expect("just incremented, cannot be 0"))
    }

    pub(crate) fn new_field_uid(&mut self) -> FieldUid {
        self.nb_fields += 1;
        FieldUid(NonZeroUsize::new(self.nb_fields).expect("just incremented, cannot be 0"))
    }

    pub(crate) fn new_var_uid(&mut self) -> VarUid {
        self.nb_vars += 1;
        VarUid(NonZeroUsize::new(self.nb_vars).expect("just incremented, cannot be 0"))
    }

    pub(crate) fn new_stmt_uid(&mut self) -> StmtUid {
        self.nb_stmts += 1;
        StmtUid(NonZeroUsize::new(self.nb_stmts).expect("just incremented, cannot be 0"))
    }

    pub(crate) fn nb_classes(&self) -> usize {
        self.nb_classes
    }

    pub(crate) fn nb_methods(&self) -> usize {
        self.nb_methods
    }

    pub(crate) fn nb_fields(&self) -> usize {
        self.nb_fields
    }

    pub(crate) fn nb_vars(&self) -> usize {
        self.nb_vars
    }

    pub(crate) fn nb_stmts(&self) -> usize {
        self.nb_stmts
    }
}
