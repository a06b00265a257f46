//! Line-level edit script
//!
//! A deterministic approximation of a minimal diff: two cursors walk the old
//! and new line sequences, and on a mismatch a bounded two-dimensional
//! window is scanned for the nearest resynchronization point. This is not an
//! optimal LCS diff; its guarantees are only that identical inputs yield no
//! change chunks and that every input line appears in exactly one chunk.

/// Lookahead bound of the resynchronization window, per side.
const SEARCH_WINDOW: usize = 10;

/// One run of lines in the edit script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffChunk {
    /// Lines present in both inputs
    Same(Vec<String>),
    /// Lines only in the old input
    Delete(Vec<String>),
    /// Lines only in the new input
    Add(Vec<String>),
}

/// Split text into lines on `\r?\n`.
///
/// A trailing newline produces a trailing empty line; both inputs of a diff
/// get the same treatment, so the final-newline state takes part in the
/// comparison symmetrically.
pub fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// Accumulates runs in order, merging adjacent runs of the same kind so a
/// row of one-line rewrites renders as one delete run and one add run.
#[derive(Default)]
struct ScriptBuilder {
    chunks: Vec<DiffChunk>,
    same: Vec<String>,
    deletes: Vec<String>,
    adds: Vec<String>,
}

impl ScriptBuilder {
    fn same(&mut self, line: &str) {
        self.flush_changes();
        self.same.push(line.to_string());
    }

    fn delete(&mut self, lines: &[String]) {
        self.flush_same();
        self.deletes.extend_from_slice(lines);
    }

    fn add(&mut self, lines: &[String]) {
        self.flush_same();
        self.adds.extend_from_slice(lines);
    }

    fn flush_same(&mut self) {
        if !self.same.is_empty() {
            self.chunks.push(DiffChunk::Same(std::mem::take(&mut self.same)));
        }
    }

    fn flush_changes(&mut self) {
        if !self.deletes.is_empty() {
            self.chunks
                .push(DiffChunk::Delete(std::mem::take(&mut self.deletes)));
        }
        if !self.adds.is_empty() {
            self.chunks
                .push(DiffChunk::Add(std::mem::take(&mut self.adds)));
        }
    }

    fn finish(mut self) -> Vec<DiffChunk> {
        self.flush_same();
        self.flush_changes();
        self.chunks
    }
}

/// Compute the edit script between two line sequences.
pub fn diff_lines(old: &[String], new: &[String]) -> Vec<DiffChunk> {
    let mut script = ScriptBuilder::default();
    let (mut i, mut j) = (0usize, 0usize);

    while i < old.len() && j < new.len() {
        if old[i] == new[j] {
            script.same(&old[i]);
            i += 1;
            j += 1;
            continue;
        }

        match find_resync(old, new, i, j) {
            Some((a, b)) => {
                script.delete(&old[i..i + a]);
                script.add(&new[j..j + b]);
                i += a;
                j += b;
            }
            None => {
                // No nearby match: treat as a one-line rewrite.
                script.delete(&old[i..i + 1]);
                script.add(&new[j..j + 1]);
                i += 1;
                j += 1;
            }
        }
    }

    if i < old.len() {
        script.delete(&old[i..]);
    }
    if j < new.len() {
        script.add(&new[j..]);
    }

    script.finish()
}

/// Whether the script contains any change at all.
pub fn is_unchanged(chunks: &[DiffChunk]) -> bool {
    chunks
        .iter()
        .all(|chunk| matches!(chunk, DiffChunk::Same(_)))
}

/// Scan the bounded window for the nearest `(a, b)` with
/// `old[i + a] == new[j + b]`, ordered by `a + b`.
fn find_resync(old: &[String], new: &[String], i: usize, j: usize) -> Option<(usize, usize)> {
    for distance in 1..=(2 * SEARCH_WINDOW) {
        for a in 0..=distance.min(SEARCH_WINDOW) {
            let b = distance - a;
            if b > SEARCH_WINDOW {
                continue;
            }
            if i + a < old.len() && j + b < new.len() && old[i + a] == new[j + b] {
                return Some((a, b));
            }
        }
    }
    None
}
