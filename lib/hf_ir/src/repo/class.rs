use crate::repo::*;
use crate::types::Subsignature;
use bitflags::bitflags;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

bitflags! {
    /// Class access flags, with JVM values.
    pub struct ClassFlags: u32 {
        const ACC_PUBLIC = 0x1;
        const ACC_PRIVATE = 0x2;
        const ACC_PROTECTED = 0x4;
        const ACC_STATIC = 0x8;
        const ACC_FINAL = 0x10;
        const ACC_INTERFACE = 0x200;
        const ACC_ABSTRACT = 0x400;
        const ACC_SYNTHETIC = 0x1000;
        const ACC_ANNOTATION = 0x2000;
        const ACC_ENUM = 0x4000;
    }
}

/// A class (or interface) of the analyzed program.
#[derive(Debug, Clone)]
pub struct Class {
    // Unique identifier in the program
    uid: ClassUid,
    // Fully qualified name, with '/' separators
    name: String,
    // Access flags
    flags: ClassFlags,
    // False for classes only known by reference (phantom classes)
    defined: bool,
    superclass: Option<ClassUid>,
    interfaces: Vec<ClassUid>,
    // List of contained methods (declaration level)
    methods: Vec<MethodUid>,
    // Declared methods lookup table
    declared: BTreeMap<Subsignature, MethodUid>,
    // List of contained fields (declaration level)
    fields: Vec<FieldUid>,
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
    }
}

impl Eq for Class {}

impl PartialOrd for Class {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Class {
    fn cmp(&self, other: &Self) -> Ordering {
        self.uid.cmp(&other.uid)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Class {
    pub(crate) fn new(uid: ClassUid, name: &str, flags: ClassFlags) -> Self {
        Self {
            uid,
            name: name.to_string(),
            flags,
            defined: true,
            superclass: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            declared: BTreeMap::new(),
            fields: Vec::new(),
        }
    }

    /// Builds a class only known by name, when it is referenced before
    /// (or without) being defined.
    pub(crate) fn new_no_def(uid: ClassUid, name: &str) -> Self {
        let mut class = Self::new(uid, name, ClassFlags::empty());
        class.defined = false;
        class
    }

    pub(crate) fn define(&mut self, flags: ClassFlags) {
        self.flags = flags;
        self.defined = true;
    }

    pub(crate) fn set_superclass(&mut self, superclass: ClassUid) {
        self.superclass = Some(superclass);
    }

    pub(crate) fn push_interface(&mut self, interface: ClassUid) {
        if !self.interfaces.contains(&interface) {
            self.interfaces.push(interface);
        }
    }

    pub(crate) fn push_method(&mut self, subsig: Subsignature, method: MethodUid) {
        self.methods.push(method);
        self.declared.insert(subsig, method);
    }

    pub(crate) fn push_field(&mut self, field: FieldUid) {
        self.fields.push(field);
    }

    #[inline]
    pub fn uid(&self) -> ClassUid {
        self.uid
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub const fn is_defined(&self) -> bool {
        self.defined
    }

    #[inline]
    pub fn superclass(&self) -> Option<ClassUid> {
        self.superclass
    }

    #[inline]
    pub fn interfaces(&self) -> &[ClassUid] {
        &self.interfaces
    }

    /// Returns a iterator over all methods declared in the class.
    pub fn iter_methods<'p>(&'p self, program: &'p Program) -> impl Iterator<Item = &'p Method> {
        self.methods.iter().map(|muid| &program[*muid])
    }

    /// Looks up the method declared (not inherited) in this class
    /// with the given subsignature.
    pub fn declared_method(&self, subsig: &Subsignature) -> Option<MethodUid> {
        self.declared.get(subsig).copied()
    }

    pub fn iter_fields<'p>(&'p self, program: &'p Program) -> impl Iterator<Item = &'p Field> {
        self.fields.iter().map(|fuid| &program[*fuid])
    }

    pub fn get_field<'p>(&'p self, name: &str, program: &'p Program) -> Option<&'p Field> {
        self.iter_fields(program).find(|field| field.name() == name)
    }

    #[inline]
    #[must_use]
    pub const fn flags(&self) -> ClassFlags {
        self.flags
    }

    #[inline]
    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.flags.contains(ClassFlags::ACC_PUBLIC)
    }

    #[inline]
    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.flags.contains(ClassFlags::ACC_FINAL)
    }

    #[inline]
    #[must_use]
    pub const fn is_interface(&self) -> bool {
        self.flags.contains(ClassFlags::ACC_INTERFACE)
    }

    #[inline]
    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.flags.contains(ClassFlags::ACC_ABSTRACT)
    }
}
