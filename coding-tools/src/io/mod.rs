//! I/O adapters for the tools: configuration, processes, git, GitHub.

pub mod config;
pub mod git;
pub mod github;
pub mod process;
pub mod workspace;
