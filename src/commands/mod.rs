//! Command implementations
//!
//! Organized in two layers:
//!
//! - `plumbing`: low-level object manipulation (hash-object, cat-file)
//! - `porcelain`: user-facing workflows (add, commit, merge, ...)
//!
//! Each command is an `impl Repository` block so the CLI surface stays a
//! thin dispatcher.

pub mod plumbing;
pub mod porcelain;
