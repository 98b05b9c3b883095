//! Type descriptors and method subsignatures.

use crate::errors::{IrError, IrResult};
use std::convert::TryFrom;
use std::fmt;

/// Concrete type descriptor, written in the JVM descriptor format
/// (`I`, `Ljava/lang/String;`, `[[LFoo;`, etc.).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Type {
    /// `void` type, only valid for return types.
    Void,
    /// `boolean` type.
    Boolean,
    /// `byte` type.
    Byte,
    /// `short` type.
    Short,
    /// `char` type.
    Char,
    /// `int` type.
    Int,
    /// `long` type.
    Long,
    /// `float` type.
    Float,
    /// `double` type.
    Double,
    /// Array of the given type descriptor, usable recursively for arrays of arrays,
    /// though it is invalid to have more than 255 dimensions.
    Array(usize, Box<Self>),
    /// Type of a fully-qualified class
    Class(String),
}

impl Type {
    /// Shortcut for building a class type.
    pub fn class(name: &str) -> Self {
        Self::Class(name.to_string())
    }

    /// Returns a java-like representation of the type.
    /// Its result differs from the `Display` implementation, which produces
    /// strings in the descriptor format.
    #[must_use]
    pub fn to_java_string(&self) -> String {
        match self {
            Self::Void => "void".to_string(),
            Self::Boolean => "boolean".to_string(),
            Self::Byte => "byte".to_string(),
            Self::Short => "short".to_string(),
            Self::Char => "char".to_string(),
            Self::Int => "int".to_string(),
            Self::Long => "long".to_string(),
            Self::Float => "float".to_string(),
            Self::Double => "double".to_string(),
            Self::Array(n, sub) => {
                let mut s = sub.to_java_string();
                for _ in 0..*n {
                    s.push_str("[]");
                }
                s
            }
            Self::Class(name) => name.replace('/', "."),
        }
    }

    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Class(_) | Self::Array(_, _))
    }

    pub fn as_class_name(&self) -> IrResult<&str> {
        if let Self::Class(name) = self {
            Ok(name)
        } else {
            Err(IrError::InvalidType(format!("{self} is not a class type")))
        }
    }

    /// Parses the first type descriptor of `s` and returns it with the
    /// remaining unparsed input.
    fn parse_prefix(s: &str) -> IrResult<(Self, &str)> {
        let conversion_error = || IrError::InvalidType(format!("{s:?}"));

        let mut dims = 0;
        while s[dims..].starts_with('[') {
            dims += 1;
        }
        if dims >= 255 {
            return Err(conversion_error());
        }

        let rest = &s[dims..];
        let (t, rest) = match rest.chars().next() {
            Some('V') if dims == 0 => (Self::Void, &rest[1..]),
            Some('Z') => (Self::Boolean, &rest[1..]),
            Some('B') => (Self::Byte, &rest[1..]),
            Some('S') => (Self::Short, &rest[1..]),
            Some('C') => (Self::Char, &rest[1..]),
            Some('I') => (Self::Int, &rest[1..]),
            Some('J') => (Self::Long, &rest[1..]),
            Some('F') => (Self::Float, &rest[1..]),
            Some('D') => (Self::Double, &rest[1..]),
            Some('L') => {
                let end = rest.find(';').ok_or_else(conversion_error)?;
                if end < 2 {
                    return Err(conversion_error());
                }
                (Self::Class(rest[1..end].to_string()), &rest[end + 1..])
            }
            _ => return Err(conversion_error()),
        };

        if dims == 0 {
            Ok((t, rest))
        } else {
            Ok((Self::Array(dims, Box::new(t)), rest))
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Void => write!(f, "V"),
            Self::Boolean => write!(f, "Z"),
            Self::Byte => write!(f, "B"),
            Self::Short => write!(f, "S"),
            Self::Char => write!(f, "C"),
            Self::Int => write!(f, "I"),
            Self::Long => write!(f, "J"),
            Self::Float => write!(f, "F"),
            Self::Double => write!(f, "D"),
            Self::Array(n, inner) => {
                for _ in 0..*n {
                    write!(f, "[")?;
                }
                write!(f, "{inner}")
            }
            Self::Class(classname) => write!(f, "L{classname};"),
        }
    }
}

impl TryFrom<&str> for Type {
    type Error = IrError;

    fn try_from(s: &str) -> IrResult<Self> {
        let (t, rest) = Self::parse_prefix(s)?;
        if rest.is_empty() {
            Ok(t)
        } else {
            Err(IrError::InvalidType(format!("{s:?}")))
        }
    }
}

/// The part of a method prototype that identifies it inside its declaring
/// class: name, parameters types and return type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subsignature {
    name: String,
    parameters_types: Vec<Type>,
    return_type: Type,
}

impl Subsignature {
    pub fn new(name: &str, parameters_types: Vec<Type>, return_type: Type) -> Self {
        Self {
            name: name.to_string(),
            parameters_types,
            return_type,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn parameters_types(&self) -> &[Type] {
        &self.parameters_types
    }

    #[inline]
    pub fn return_type(&self) -> &Type {
        &self.return_type
    }

    #[inline]
    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }
}

impl fmt::Display for Subsignature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for t in &self.parameters_types {
            write!(f, "{t}")?;
        }
        write!(f, "){}", self.return_type)
    }
}

/// Parses subsignatures of the form `name(params)ret`, e.g. `foo(ILA;)V`.
impl TryFrom<&str> for Subsignature {
    type Error = IrError;

    fn try_from(s: &str) -> IrResult<Self> {
        let invalid = || IrError::InvalidSubsignature(s.to_string());

        let (name, proto) = s.split_once('(').ok_or_else(invalid)?;
        let (mut params, ret) = proto.split_once(')').ok_or_else(invalid)?;
        if name.is_empty() {
            return Err(invalid());
        }

        let mut parameters_types = Vec::new();
        while !params.is_empty() {
            let (t, rest) = Type::parse_prefix(params).map_err(|_| invalid())?;
            if t == Type::Void {
                return Err(invalid());
            }
            parameters_types.push(t);
            params = rest;
        }
        let return_type = Type::try_from(ret).map_err(|_| invalid())?;

        Ok(Self::new(name, parameters_types, return_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_descriptors() {
        assert_eq!(Type::try_from("I").unwrap(), Type::Int);
        assert_eq!(Type::try_from("LA;").unwrap(), Type::class("A"));
        assert_eq!(
            Type::try_from("[[Ljava/lang/Object;").unwrap(),
            Type::Array(2, Box::new(Type::class("java/lang/Object")))
        );
        assert!(Type::try_from("").is_err());
        assert!(Type::try_from("L;").is_err());
        assert!(Type::try_from("[V").is_err());
        assert!(Type::try_from("II").is_err());
    }

    #[test]
    fn type_display() {
        let t = Type::Array(1, Box::new(Type::class("pkg/Foo")));
        assert_eq!(format!("{t}"), "[Lpkg/Foo;");
        assert_eq!(t.to_java_string(), "pkg.Foo[]");
        assert!(t.is_reference());
        assert!(!Type::Long.is_reference());
    }

    #[test]
    fn subsignature_parsing() {
        let sig = Subsignature::try_from("foo(ILA;[J)LB;").unwrap();
        assert_eq!(sig.name(), "foo");
        assert_eq!(
            sig.parameters_types(),
            &[
                Type::Int,
                Type::class("A"),
                Type::Array(1, Box::new(Type::Long))
            ]
        );
        assert_eq!(sig.return_type(), &Type::class("B"));
        assert_eq!(format!("{sig}"), "foo(ILA;[J)LB;");

        assert!(Subsignature::try_from("<init>()V").unwrap().is_constructor());
        assert!(Subsignature::try_from("foo").is_err());
        assert!(Subsignature::try_from("(I)V").is_err());
        assert!(Subsignature::try_from("foo(V)V").is_err());
        assert!(Subsignature::try_from("foo(I)").is_err());
    }
}
