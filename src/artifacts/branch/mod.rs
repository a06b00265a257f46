//! Branch and revision management
//!
//! - Branch name validation
//! - Revision specification parsing (refs, object ids, parent notation)
//!
//! ## Revision syntax
//!
//! - Branch and tag names: `main`, `feature/login`, `v1`
//! - `HEAD`
//! - Object ids: full (64 chars) or abbreviated (4–64 chars)
//! - First parent notation: `HEAD^`, `main^`
//! - Ancestor notation: `HEAD~3`, `main~5` (follows first parents)

pub mod branch_name;
pub mod revision;

/// Regex pattern for invalid characters in branch names
pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";

/// Regex pattern for first parent notation (e.g., "HEAD^")
pub const PARENT_REGEX: &str = r"^(.+)\^$";

/// Regex pattern for ancestor notation (e.g., "HEAD~3")
pub const ANCESTOR_REGEX: &str = r"^(.+)\~(\d+)$";
