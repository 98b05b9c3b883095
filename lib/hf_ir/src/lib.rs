//! This crate provides the program representation analyzed by the
//! `HeapFlow` project: classes, methods, variables and statements of a
//! JVM-like program, its class hierarchy, and the ways to build one
//! (programmatically or from a JSON description).

pub mod builder;
pub mod errors;
pub mod hierarchy;
pub mod loader;
pub mod repo;
pub mod stmt;
pub mod types;

pub use builder::ProgramBuilder;
pub use loader::{load_program, load_program_str};
pub use repo::Program;
