//! JSON program descriptions.
//!
//! Types are written as JVM descriptors (`I`, `LFoo;`, `[LFoo;`), methods as
//! `name(params)ret` subsignatures, and members are referenced as
//! `Class.member`:
//!
//! ```json
//! {
//!   "entry": { "class": "Main", "method": "main()V" },
//!   "classes": [{
//!     "name": "Main",
//!     "methods": [{
//!       "signature": "main()V",
//!       "static": true,
//!       "locals": [{ "name": "a", "type": "LA;" }],
//!       "body": [
//!         { "op": "new", "target": "a", "type": "LA;" },
//!         { "op": "invoke", "kind": "special", "method": "A.<init>()V", "receiver": "a" }
//!       ]
//!     }]
//!   }]
//! }
//! ```

use crate::builder::ProgramBuilder;
use crate::errors::{IrError, IrResult};
use crate::repo::{ClassFlags, FieldFlags, FieldUid, MethodFlags, MethodUid, Program, VarUid};
use crate::stmt::{CallKind, Stmt};
use crate::types::{Subsignature, Type};
use serde::Deserialize;
use std::convert::TryFrom;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProgramDescr {
    entry: Option<EntryDescr>,
    classes: Vec<ClassDescr>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntryDescr {
    class: String,
    method: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClassDescr {
    name: String,
    superclass: Option<String>,
    #[serde(default)]
    interfaces: Vec<String>,
    #[serde(default)]
    interface: bool,
    #[serde(default, rename = "abstract")]
    abstract_: bool,
    #[serde(default)]
    fields: Vec<FieldDescr>,
    #[serde(default)]
    methods: Vec<MethodDescr>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldDescr {
    name: String,
    #[serde(rename = "type")]
    type_: String,
    #[serde(default, rename = "static")]
    static_: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MethodDescr {
    signature: String,
    #[serde(default, rename = "static")]
    static_: bool,
    #[serde(default, rename = "abstract")]
    abstract_: bool,
    #[serde(default)]
    native: bool,
    #[serde(default)]
    params: Vec<String>,
    #[serde(default)]
    locals: Vec<LocalDescr>,
    #[serde(default)]
    body: Vec<StmtDescr>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LocalDescr {
    name: String,
    #[serde(rename = "type")]
    type_: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum KindDescr {
    Static,
    Special,
    Virtual,
    Interface,
    Dynamic,
}

impl From<KindDescr> for CallKind {
    fn from(kind: KindDescr) -> Self {
        match kind {
            KindDescr::Static => Self::Static,
            KindDescr::Special => Self::Special,
            KindDescr::Virtual => Self::Virtual,
            KindDescr::Interface => Self::Interface,
            KindDescr::Dynamic => Self::Dynamic,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum StmtDescr {
    New {
        target: String,
        #[serde(rename = "type")]
        type_: String,
    },
    Copy {
        target: String,
        source: String,
    },
    Load {
        target: String,
        base: Option<String>,
        field: String,
    },
    Store {
        base: Option<String>,
        field: String,
        source: String,
    },
    ArrayLoad {
        target: String,
        array: String,
        index: String,
    },
    ArrayStore {
        array: String,
        index: String,
        source: String,
    },
    Invoke {
        kind: KindDescr,
        method: String,
        receiver: Option<String>,
        #[serde(default)]
        args: Vec<String>,
        result: Option<String>,
    },
    Return {
        value: Option<String>,
    },
}

/// Loads a program from a JSON description file.
pub fn load_program<P: AsRef<Path>>(path: P) -> IrResult<Program> {
    log::debug!("loading program from {}", path.as_ref().display());
    let reader = BufReader::new(File::open(path)?);
    let descr: ProgramDescr = serde_json::from_reader(reader)?;
    build_program(&descr)
}

/// Loads a program from a JSON description string.
pub fn load_program_str(json: &str) -> IrResult<Program> {
    let descr: ProgramDescr = serde_json::from_str(json)?;
    build_program(&descr)
}

/// Splits `Class.member` references on the last dot preceding any
/// parenthesis (class names use `/` as package separator).
fn split_member(reference: &str) -> IrResult<(&str, &str)> {
    let head_len = reference.find('(').unwrap_or(reference.len());
    let (class, _) = reference[..head_len]
        .rsplit_once('.')
        .ok_or_else(|| IrError::Internal(format!("invalid member reference {reference:?}")))?;
    Ok((class, &reference[class.len() + 1..]))
}

fn build_program(descr: &ProgramDescr) -> IrResult<Program> {
    let mut builder = ProgramBuilder::new();

    // first pass: classes, so that inheritance links know interfaces
    let mut classes = Vec::with_capacity(descr.classes.len());
    for class in &descr.classes {
        let mut flags = ClassFlags::ACC_PUBLIC;
        if class.interface {
            flags |= ClassFlags::ACC_INTERFACE | ClassFlags::ACC_ABSTRACT;
        }
        if class.abstract_ {
            flags |= ClassFlags::ACC_ABSTRACT;
        }
        classes.push(builder.add_class(&class.name, flags)?);
    }

    // second pass: inheritance, fields and method declarations
    let mut methods: Vec<(MethodUid, &MethodDescr)> = Vec::new();
    for (class, cdescr) in classes.iter().zip(&descr.classes) {
        if let Some(superclass) = &cdescr.superclass {
            builder.set_superclass(*class, superclass)?;
        }
        for interface in &cdescr.interfaces {
            builder.add_interface(*class, interface)?;
        }
        for field in &cdescr.fields {
            let flags = if field.static_ {
                FieldFlags::ACC_STATIC
            } else {
                FieldFlags::empty()
            };
            builder.add_field(*class, &field.name, Type::try_from(field.type_.as_str())?, flags)?;
        }
        for mdescr in &cdescr.methods {
            let subsig = Subsignature::try_from(mdescr.signature.as_str())?;
            let mut flags = MethodFlags::ACC_PUBLIC;
            if mdescr.static_ {
                flags |= MethodFlags::ACC_STATIC;
            }
            if mdescr.abstract_ || (cdescr.interface && mdescr.body.is_empty() && !mdescr.static_)
            {
                flags |= MethodFlags::ACC_ABSTRACT;
            }
            if mdescr.native {
                flags |= MethodFlags::ACC_NATIVE;
            }
            let names: Vec<&str> = mdescr.params.iter().map(String::as_str).collect();
            let method = builder.add_method(*class, subsig, flags, &names)?;
            for local in &mdescr.locals {
                builder.new_var(method, &local.name, Type::try_from(local.type_.as_str())?)?;
            }
            methods.push((method, mdescr));
        }
    }

    // third pass: bodies, which may reference any member of any class
    for (method, mdescr) in methods {
        for sdescr in &mdescr.body {
            let stmt = build_stmt(&mut builder, method, sdescr)?;
            builder.push(method, stmt)?;
        }
    }

    if let Some(entry) = &descr.entry {
        let subsig = Subsignature::try_from(entry.method.as_str())?;
        let method = builder
            .program()
            .get_method(&entry.class, &subsig)
            .ok_or_else(|| IrError::MethodNotFound(format!("{}->{}", entry.class, subsig)))?
            .uid();
        builder.set_entry(method);
    }

    builder.finish()
}

fn build_stmt(
    builder: &mut ProgramBuilder,
    method: MethodUid,
    descr: &StmtDescr,
) -> IrResult<Stmt> {
    let var = |name: &str| -> IrResult<VarUid> { builder.var(method, name) };
    let opt_var = |name: &Option<String>| -> IrResult<Option<VarUid>> {
        name.as_deref().map(|name| builder.var(method, name)).transpose()
    };
    let field = |reference: &str| -> IrResult<FieldUid> {
        let (class, name) = split_member(reference)?;
        builder.field(class, name)
    };

    let stmt = match descr {
        StmtDescr::New { target, type_ } => {
            Stmt::new_instance(var(target)?, Type::try_from(type_.as_str())?)
        }
        StmtDescr::Copy { target, source } => Stmt::copy(var(target)?, var(source)?),
        StmtDescr::Load {
            target,
            base,
            field: fref,
        } => Stmt::load_field(var(target)?, opt_var(base)?, field(fref)?),
        StmtDescr::Store {
            base,
            field: fref,
            source,
        } => Stmt::store_field(opt_var(base)?, field(fref)?, var(source)?),
        StmtDescr::ArrayLoad {
            target,
            array,
            index,
        } => Stmt::load_array(var(target)?, var(array)?, var(index)?),
        StmtDescr::ArrayStore {
            array,
            index,
            source,
        } => Stmt::store_array(var(array)?, var(index)?, var(source)?),
        StmtDescr::Return { value } => Stmt::Return(opt_var(value)?),
        StmtDescr::Invoke {
            kind,
            method: mref,
            receiver,
            args,
            result,
        } => {
            let receiver = opt_var(receiver)?;
            let args = args
                .iter()
                .map(|arg| var(arg))
                .collect::<IrResult<Vec<_>>>()?;
            let result = opt_var(result)?;
            let (class, sig) = split_member(mref)?;
            let subsig = Subsignature::try_from(sig)?;
            let method_ref = builder.method_ref(class, &subsig)?;
            return Ok(Stmt::invoke(
                (*kind).into(),
                method_ref,
                receiver,
                args,
                result,
            ));
        }
    };
    Ok(stmt)
}
