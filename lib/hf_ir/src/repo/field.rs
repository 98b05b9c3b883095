use crate::repo::{ClassUid, FieldUid};
use crate::types::Type;
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Field access flags, with JVM values.
    pub struct FieldFlags: u32 {
        const ACC_PUBLIC = 0x1;
        const ACC_PRIVATE = 0x2;
        const ACC_PROTECTED = 0x4;
        const ACC_STATIC = 0x8;
        const ACC_FINAL = 0x10;
        const ACC_VOLATILE = 0x40;
        const ACC_TRANSIENT = 0x80;
        const ACC_SYNTHETIC = 0x1000;
        const ACC_ENUM = 0x4000;
    }
}

/// A field declared by a class of the program.
#[derive(Debug, Clone)]
pub struct Field {
    // Unique identifier in the program
    uid: FieldUid,
    // Declaring class
    class: ClassUid,
    flags: FieldFlags,
    // Cache of names and type that identify the field
    descriptor: FieldDescr,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.descriptor.fmt(f)
    }
}

impl Field {
    pub(crate) fn new(
        uid: FieldUid,
        class: ClassUid,
        descriptor: FieldDescr,
        flags: FieldFlags,
    ) -> Self {
        Self {
            uid,
            class,
            flags,
            descriptor,
        }
    }

    #[inline]
    pub fn uid(&self) -> FieldUid {
        self.uid
    }

    #[inline]
    pub fn class(&self) -> ClassUid {
        self.class
    }

    #[inline]
    pub fn descriptor(&self) -> &FieldDescr {
        &self.descriptor
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.descriptor().name()
    }

    #[inline]
    pub fn type_(&self) -> &Type {
        self.descriptor().type_()
    }

    #[inline]
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.flags.contains(FieldFlags::ACC_STATIC)
    }

    #[inline]
    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.flags.contains(FieldFlags::ACC_FINAL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FieldDescr {
    class: String,
    name: String,
    type_: Type,
}

impl fmt::Display for FieldDescr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}->{}", self.type_, self.class, self.name)
    }
}

impl FieldDescr {
    pub(crate) fn new(class: &str, name: &str, type_: Type) -> Self {
        Self {
            class: class.to_string(),
            name: name.to_string(),
            type_,
        }
    }

    #[inline]
    pub fn class_name(&self) -> &str {
        &self.class
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn type_(&self) -> &Type {
        &self.type_
    }
}
