//! The closed set of statements pointer analyses care about.

use crate::repo::{ClassUid, FieldUid, VarUid};
use crate::types::{Subsignature, Type};
use std::fmt;

/// Kind of an invocation, as expressed by the invocation instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CallKind {
    /// `invokestatic`
    Static,
    /// `invokespecial`: constructors, private methods and `super` calls
    Special,
    /// `invokevirtual`
    Virtual,
    /// `invokeinterface`
    Interface,
    /// `invokedynamic`
    Dynamic,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Special => write!(f, "special"),
            Self::Virtual => write!(f, "virtual"),
            Self::Interface => write!(f, "interface"),
            Self::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Symbolic reference to a method: the class named at the call site and the
/// method subsignature. The actual callee is found by dispatch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodRef {
    class: ClassUid,
    subsignature: Subsignature,
}

impl MethodRef {
    pub fn new(class: ClassUid, subsignature: Subsignature) -> Self {
        Self {
            class,
            subsignature,
        }
    }

    #[inline]
    pub fn class(&self) -> ClassUid {
        self.class
    }

    #[inline]
    pub fn subsignature(&self) -> &Subsignature {
        &self.subsignature
    }
}

/// A method invocation `result = receiver.m(args)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoke {
    kind: CallKind,
    method_ref: MethodRef,
    receiver: Option<VarUid>,
    args: Vec<VarUid>,
    result: Option<VarUid>,
}

impl Invoke {
    pub fn new(
        kind: CallKind,
        method_ref: MethodRef,
        receiver: Option<VarUid>,
        args: Vec<VarUid>,
        result: Option<VarUid>,
    ) -> Self {
        Self {
            kind,
            method_ref,
            receiver,
            args,
            result,
        }
    }

    #[inline]
    pub fn kind(&self) -> CallKind {
        self.kind
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.kind == CallKind::Static
    }

    #[inline]
    pub fn method_ref(&self) -> &MethodRef {
        &self.method_ref
    }

    #[inline]
    pub fn receiver(&self) -> Option<VarUid> {
        self.receiver
    }

    #[inline]
    pub fn args(&self) -> &[VarUid] {
        &self.args
    }

    #[inline]
    pub fn result(&self) -> Option<VarUid> {
        self.result
    }
}

/// A statement of a method body.
///
/// Field accesses are static when they have no base variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `target = new T`
    New { target: VarUid, type_: Type },
    /// `target = source`
    Copy { target: VarUid, source: VarUid },
    /// `target = base.field` or `target = T.field`
    LoadField {
        target: VarUid,
        base: Option<VarUid>,
        field: FieldUid,
    },
    /// `base.field = source` or `T.field = source`
    StoreField {
        base: Option<VarUid>,
        field: FieldUid,
        source: VarUid,
    },
    /// `target = array[index]`
    LoadArray {
        target: VarUid,
        array: VarUid,
        index: VarUid,
    },
    /// `array[index] = source`
    StoreArray {
        array: VarUid,
        index: VarUid,
        source: VarUid,
    },
    Invoke(Invoke),
    Return(Option<VarUid>),
}

impl Stmt {
    pub fn new_instance(target: VarUid, type_: Type) -> Self {
        Self::New { target, type_ }
    }

    pub fn copy(target: VarUid, source: VarUid) -> Self {
        Self::Copy { target, source }
    }

    pub fn load_field(target: VarUid, base: Option<VarUid>, field: FieldUid) -> Self {
        Self::LoadField {
            target,
            base,
            field,
        }
    }

    pub fn store_field(base: Option<VarUid>, field: FieldUid, source: VarUid) -> Self {
        Self::StoreField {
            base,
            field,
            source,
        }
    }

    pub fn load_array(target: VarUid, array: VarUid, index: VarUid) -> Self {
        Self::LoadArray {
            target,
            array,
            index,
        }
    }

    pub fn store_array(array: VarUid, index: VarUid, source: VarUid) -> Self {
        Self::StoreArray {
            array,
            index,
            source,
        }
    }

    pub fn invoke(
        kind: CallKind,
        method_ref: MethodRef,
        receiver: Option<VarUid>,
        args: Vec<VarUid>,
        result: Option<VarUid>,
    ) -> Self {
        Self::Invoke(Invoke::new(kind, method_ref, receiver, args, result))
    }

    pub fn as_invoke(&self) -> Option<&Invoke> {
        if let Self::Invoke(invoke) = self {
            Some(invoke)
        } else {
            None
        }
    }

    /// Returns every variable read or written by the statement.
    pub fn variables(&self) -> Vec<VarUid> {
        match self {
            Self::New { target, .. } => vec![*target],
            Self::Copy { target, source } => vec![*target, *source],
            Self::LoadField { target, base, .. } => {
                let mut vars = vec![*target];
                vars.extend(base);
                vars
            }
            Self::StoreField { base, source, .. } => {
                let mut vars = vec![*source];
                vars.extend(base);
                vars
            }
            Self::LoadArray {
                target,
                array,
                index,
            } => vec![*target, *array, *index],
            Self::StoreArray {
                array,
                index,
                source,
            } => vec![*array, *index, *source],
            Self::Invoke(invoke) => {
                let mut vars: Vec<VarUid> = invoke.receiver.iter().copied().collect();
                vars.extend(&invoke.args);
                vars.extend(invoke.result);
                vars
            }
            Self::Return(var) => var.iter().copied().collect(),
        }
    }
}
