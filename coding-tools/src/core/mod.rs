//! Deterministic, pure logic shared by the tool layer.
//!
//! Core modules must be free of I/O side effects. Everything that gates raw
//! agent input (paths, repository references, git ref names) lives here so it
//! can be tested without a filesystem or network.

pub mod confine;
pub mod refname;
pub mod repo_ref;
pub mod status;
pub mod types;
