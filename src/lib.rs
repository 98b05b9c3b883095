//! # `HeapFlow`
//!
//! `heapflow` is the main crate of the `HeapFlow` pointer analysis project.
//! The project is subdivided into multiple crates, `heapflow` acts as entry
//! point by reexporting important structs and functions from those
//! sub-crates. Most of the reexport are done within the `heapflow::prelude`
//! namespace.
//!
//! ## Library basics
//!
//! Programs are described in JSON and loaded into a [`Program`](prelude::Program),
//! which stores classes, methods, variables and statements, and the class
//! hierarchy:
//!
//! ```rust,no_run
//! use heapflow::prelude::*;
//!
//! let program = load_program("program.json")?;
//! println!("classes count: {}", program.nb_classes());
//! println!("methods count: {}", program.nb_methods());
//! # Ok::<(), HfError>(())
//! ```
//!
//! The points-to analysis runs from the entry method of the program, with a
//! configurable context sensitivity:
//!
//! ```rust,no_run
//! use heapflow::prelude::*;
//!
//! let program = load_program("program.json")?;
//! let options = PtaOptions::new("2-obj".parse()?);
//! let result = pta::analyze(&program, options)?;
//! println!("{}", result.stats());
//! # Ok::<(), HfError>(())
//! ```
//!
//! ## Sub-crates
//!
//!  - [`hf_ir`] contains the program representation (classes, methods,
//!    variables, statements), the class hierarchy, a program builder and
//!    the JSON loader,
//!  - [`hf_analysis`] contains the analysis algorithms: method dispatch,
//!    class hierarchy analysis and the context-sensitive points-to analysis.

mod errors;

pub mod cli;
pub mod hf_cha;
pub mod hf_hierarchy;
pub mod hf_pta;

pub use hf_analysis as analysis;
pub use hf_ir as ir;

/// Reexport module of commonly used structures and functions from `HeapFlow` project
/// sub-crates:
///
/// ```rust
/// use heapflow::prelude::*;
/// ```
pub mod prelude {
    pub use crate::errors::{HfError, HfResult};

    pub use hf_analysis::callgraph::CallGraph;
    pub use hf_analysis::pta::{
        self, context::ContextSensitivity, PointerAnalysisResult, PtaOptions,
    };
    pub use hf_analysis::{cha, errors::AnalysisError};

    pub use hf_ir::errors::IrError;
    pub use hf_ir::repo::{Class, Field, Method, Program, Var};
    pub use hf_ir::{load_program, ProgramBuilder};

    use clap::ArgMatches;

    pub fn init_logger(args: &ArgMatches) {
        let env = env_logger::Env::new()
            .filter_or("HF_LOG", "info")
            .write_style("HF_LOG_STYLE");

        let mut builder = env_logger::Builder::from_env(env);
        if args.get_flag("verbose") {
            builder.filter_level(log::LevelFilter::Trace);
        } else if args.get_flag("debug") {
            builder.filter_level(log::LevelFilter::Debug);
        }
        if args.get_flag("ecslog") {
            builder.format(ecs_logger::format);
        }
        builder.init();
    }
}
