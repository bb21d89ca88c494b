//! Agent-callable git and GitHub tools with workspace confinement.
//!
//! The crate keeps a strict split:
//!
//! - **[`core`]**: Pure validation of untrusted agent input. Path
//!   confinement, repository reference parsing, ref-argument checks, and
//!   `git status` parsing. No I/O.
//! - **[`io`]**: Side effects (configuration, subprocesses, git, the GitHub
//!   REST API). Only values produced by [`core`] cross into it.
//!
//! [`tools`] composes the two into the nine agent tools, and [`server`]
//! exposes them over MCP on stdio.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod server;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod tools;
