//! Engine data structures and algorithms
//!
//! - `branch`: branch names and revision parsing
//! - `checkout`: workspace migration between snapshots
//! - `diff`: line, tree, and binary diffing
//! - `index`: staging-area data structures and the lock discipline
//! - `log`: commit history traversal
//! - `merge`: merge-base discovery and three-way merging
//! - `objects`: stored object types (blob, tree, commit, tag)
//! - `status`: working tree status classification

pub mod branch;
pub mod checkout;
pub mod diff;
pub mod index;
pub mod log;
pub mod merge;
pub mod objects;
pub mod status;
