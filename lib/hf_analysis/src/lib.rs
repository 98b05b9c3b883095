//! This crate provides the call graph and pointer analyses of the
//! `HeapFlow` project.

pub mod callgraph;
pub mod cha;
pub mod dispatch;
pub mod errors;
pub mod pta;
