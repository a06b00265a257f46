//! Unified diff formatting
//!
//! Interleaves change runs with up to `context` unchanged lines on either
//! side. Change regions separated by more than `2 × context` unchanged lines
//! split into separate hunks, each introduced by a `@@` header carrying the
//! old/new line ranges. Colorization is purely presentational and off by
//! default.

use crate::artifacts::diff::line_diff::DiffChunk;
use colored::Colorize;

/// Default number of context lines around each change region.
pub const DEFAULT_CONTEXT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
enum LineOp {
    Context(String),
    Delete(String),
    Add(String),
}

impl LineOp {
    fn is_change(&self) -> bool {
        !matches!(self, LineOp::Context(_))
    }

    fn in_old(&self) -> bool {
        matches!(self, LineOp::Context(_) | LineOp::Delete(_))
    }

    fn in_new(&self) -> bool {
        matches!(self, LineOp::Context(_) | LineOp::Add(_))
    }
}

/// Unified formatter configuration.
#[derive(Debug, Clone)]
pub struct UnifiedFormat {
    pub context: usize,
    pub color: bool,
}

impl Default for UnifiedFormat {
    fn default() -> Self {
        UnifiedFormat {
            context: DEFAULT_CONTEXT,
            color: false,
        }
    }
}

impl UnifiedFormat {
    /// Render an edit script. Returns an empty string when nothing changed.
    pub fn format(&self, old_label: &str, new_label: &str, chunks: &[DiffChunk]) -> String {
        let ops = flatten(chunks);
        let hunks = self.hunk_ranges(&ops);

        if hunks.is_empty() {
            return String::new();
        }

        let mut out = String::new();
        out.push_str(&self.paint_header(&format!("--- {}", old_label)));
        out.push('\n');
        out.push_str(&self.paint_header(&format!("+++ {}", new_label)));
        out.push('\n');

        for (start, end) in hunks {
            let old_before = ops[..start].iter().filter(|op| op.in_old()).count();
            let new_before = ops[..start].iter().filter(|op| op.in_new()).count();
            let old_count = ops[start..end].iter().filter(|op| op.in_old()).count();
            let new_count = ops[start..end].iter().filter(|op| op.in_new()).count();

            let old_start = if old_count == 0 { old_before } else { old_before + 1 };
            let new_start = if new_count == 0 { new_before } else { new_before + 1 };

            out.push_str(&self.paint_header(&format!(
                "@@ -{},{} +{},{} @@",
                old_start, old_count, new_start, new_count
            )));
            out.push('\n');

            for op in &ops[start..end] {
                let line = match op {
                    LineOp::Context(line) => format!(" {}", line),
                    LineOp::Delete(line) => self.paint_delete(&format!("-{}", line)),
                    LineOp::Add(line) => self.paint_add(&format!("+{}", line)),
                };
                out.push_str(&line);
                out.push('\n');
            }
        }

        out
    }

    /// Op-index ranges of the hunks, context included.
    fn hunk_ranges(&self, ops: &[LineOp]) -> Vec<(usize, usize)> {
        let changes: Vec<usize> = ops
            .iter()
            .enumerate()
            .filter(|(_, op)| op.is_change())
            .map(|(index, _)| index)
            .collect();

        if changes.is_empty() {
            return Vec::new();
        }

        // Group change indices whose unchanged gap collapses.
        let mut groups: Vec<(usize, usize)> = Vec::new();
        for &index in &changes {
            match groups.last_mut() {
                Some((_, last)) if index - *last <= 2 * self.context + 1 => *last = index,
                _ => groups.push((index, index)),
            }
        }

        groups
            .into_iter()
            .map(|(first, last)| {
                let start = first.saturating_sub(self.context);
                let end = (last + self.context + 1).min(ops.len());
                (start, end)
            })
            .collect()
    }

    fn paint_header(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn paint_delete(&self, text: &str) -> String {
        if self.color {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }

    fn paint_add(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }
}

fn flatten(chunks: &[DiffChunk]) -> Vec<LineOp> {
    let mut ops = Vec::new();
    for chunk in chunks {
        match chunk {
            DiffChunk::Same(lines) => {
                ops.extend(lines.iter().cloned().map(LineOp::Context));
            }
            DiffChunk::Delete(lines) => {
                ops.extend(lines.iter().cloned().map(LineOp::Delete));
            }
            DiffChunk::Add(lines) => {
                ops.extend(lines.iter().cloned().map(LineOp::Add));
            }
        }
    }
    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::diff::line_diff::{diff_lines, split_lines};
    use pretty_assertions::assert_eq;

    fn format(old: &str, new: &str, context: usize) -> String {
        let chunks = diff_lines(&split_lines(old), &split_lines(new));
        UnifiedFormat {
            context,
            color: false,
        }
        .format("a/file", "b/file", &chunks)
    }

    #[test]
    fn unchanged_input_renders_nothing() {
        assert_eq!(format("a\nb\n", "a\nb\n", 3), "");
    }

    #[test]
    fn single_rewrite_carries_prefixes_and_header() {
        let output = format("hi\n", "hi there\n", 3);
        assert_eq!(
            output,
            "--- a/file\n+++ b/file\n@@ -1,2 +1,2 @@\n-hi\n+hi there\n \n"
        );
    }

    #[test]
    fn distant_changes_split_into_two_hunks() {
        let old: String = (0..20).map(|n| format!("line {n}\n")).collect();
        let new = old.replace("line 2\n", "LINE 2\n").replace("line 17\n", "LINE 17\n");

        let output = format(&old, &new, 1);
        let headers = output
            .lines()
            .filter(|line| line.starts_with("@@"))
            .count();
        assert_eq!(headers, 2);
    }

    #[test]
    fn nearby_changes_collapse_into_one_hunk() {
        let old: String = (0..10).map(|n| format!("line {n}\n")).collect();
        let new = old.replace("line 3\n", "LINE 3\n").replace("line 5\n", "LINE 5\n");

        let output = format(&old, &new, 3);
        let headers = output
            .lines()
            .filter(|line| line.starts_with("@@"))
            .count();
        assert_eq!(headers, 1);
    }

    #[test]
    fn context_width_bounds_surrounding_lines() {
        let old: String = (0..9).map(|n| format!("line {n}\n")).collect();
        let new = old.replace("line 4\n", "LINE 4\n");

        let output = format(&old, &new, 2);
        let context_lines = output
            .lines()
            .filter(|line| line.starts_with(' '))
            .count();
        assert_eq!(context_lines, 4);
    }
}
