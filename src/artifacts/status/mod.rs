//! Working tree status
//!
//! Composes index change detection with reference reading to classify every
//! path as staged, unstaged, untracked, or conflicted, and renders the
//! result in the long human layout or the short porcelain one.

pub mod file_change;
pub mod report;
