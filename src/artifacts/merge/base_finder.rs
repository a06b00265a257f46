//! Common-ancestor discovery
//!
//! The merge base of two commits is found with a bidirectional breadth-first
//! traversal: both frontiers expand in lockstep through *all* parents (not
//! just first parents), and the first commit reached from both sides is the
//! base. Unrelated histories have no base; the caller treats that as an
//! orphan merge against the empty tree.
//!
//! The finder is generic over a commit loader so the graph algorithms test
//! against in-memory stores without touching a database.

use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use std::collections::{HashMap, VecDeque};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Visit: u8 {
        const FROM_SOURCE = 0b01;
        const FROM_TARGET = 0b10;
        const FROM_BOTH = Self::FROM_SOURCE.bits() | Self::FROM_TARGET.bits();
    }
}

/// Merge-base finder parameterized over commit loading.
pub struct MergeBaseFinder<LoaderFn>
where
    LoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    load_commit: LoaderFn,
}

impl<LoaderFn> MergeBaseFinder<LoaderFn>
where
    LoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    pub fn new(load_commit: LoaderFn) -> Self {
        Self { load_commit }
    }

    /// Find the merge base of two commits, or `None` for unrelated roots.
    pub fn find(
        &self,
        source: &ObjectId,
        target: &ObjectId,
    ) -> anyhow::Result<Option<ObjectId>> {
        if source == target {
            return Ok(Some(source.clone()));
        }

        let mut states: HashMap<ObjectId, Visit> = HashMap::new();
        let mut queue: VecDeque<(ObjectId, Visit)> = VecDeque::new();

        states.insert(source.clone(), Visit::FROM_SOURCE);
        states.insert(target.clone(), Visit::FROM_TARGET);
        queue.push_back((source.clone(), Visit::FROM_SOURCE));
        queue.push_back((target.clone(), Visit::FROM_TARGET));

        while let Some((oid, side)) = queue.pop_front() {
            let commit = (self.load_commit)(&oid)?;

            for parent in &commit.parents {
                let state = states.entry(parent.clone()).or_insert(Visit::empty());
                if state.contains(side) {
                    continue;
                }
                *state |= side;

                if state.contains(Visit::FROM_BOTH) {
                    return Ok(Some(parent.clone()));
                }

                queue.push_back((parent.clone(), side));
            }
        }

        Ok(None)
    }

    /// Whether `ancestor` is reachable from `descendant`.
    ///
    /// Used by the branch-deletion safety gate: a branch whose tip is an
    /// ancestor of HEAD is fully merged.
    pub fn is_ancestor(
        &self,
        ancestor: &ObjectId,
        descendant: &ObjectId,
    ) -> anyhow::Result<bool> {
        Ok(self.find(ancestor, descendant)?.as_ref() == Some(ancestor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, TimeZone};
    use rstest::*;
    use std::collections::HashMap;

    /// In-memory commit graph for exercising the finder.
    #[derive(Debug, Clone, Default)]
    struct InMemoryGraph {
        commits: HashMap<ObjectId, Vec<ObjectId>>,
    }

    impl InMemoryGraph {
        fn add_commit(&mut self, oid: ObjectId, parents: Vec<ObjectId>) {
            self.commits.insert(oid, parents);
        }

        fn load(&self, oid: &ObjectId) -> anyhow::Result<SlimCommit> {
            let parents = self
                .commits
                .get(oid)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("commit {} not in test graph", oid))?;

            Ok(SlimCommit {
                oid: oid.clone(),
                parents,
                timestamp: fixed_timestamp(),
            })
        }
    }

    fn fixed_timestamp() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .unwrap()
    }

    fn oid(name: &str) -> ObjectId {
        use sha2::{Digest, Sha256};
        ObjectId::try_parse(format!("{:x}", Sha256::digest(name))).unwrap()
    }

    #[fixture]
    fn linear_history() -> InMemoryGraph {
        // A <- B <- C <- D
        let mut graph = InMemoryGraph::default();
        graph.add_commit(oid("a"), vec![]);
        graph.add_commit(oid("b"), vec![oid("a")]);
        graph.add_commit(oid("c"), vec![oid("b")]);
        graph.add_commit(oid("d"), vec![oid("c")]);
        graph
    }

    #[fixture]
    fn simple_divergence() -> InMemoryGraph {
        //     A
        //    / \
        //   B   C
        let mut graph = InMemoryGraph::default();
        graph.add_commit(oid("a"), vec![]);
        graph.add_commit(oid("b"), vec![oid("a")]);
        graph.add_commit(oid("c"), vec![oid("a")]);
        graph
    }

    #[fixture]
    fn merged_history() -> InMemoryGraph {
        //     A
        //    / \
        //   B   C
        //    \ /
        //     D (merge)
        //     |
        //     E
        let mut graph = InMemoryGraph::default();
        graph.add_commit(oid("a"), vec![]);
        graph.add_commit(oid("b"), vec![oid("a")]);
        graph.add_commit(oid("c"), vec![oid("a")]);
        graph.add_commit(oid("d"), vec![oid("b"), oid("c")]);
        graph.add_commit(oid("e"), vec![oid("d")]);
        graph
    }

    #[rstest]
    fn same_commit_is_its_own_base(linear_history: InMemoryGraph) {
        let finder = MergeBaseFinder::new(|id| linear_history.load(id));
        assert_eq!(finder.find(&oid("c"), &oid("c")).unwrap(), Some(oid("c")));
    }

    #[rstest]
    fn ancestor_is_the_base_in_linear_history(linear_history: InMemoryGraph) {
        let finder = MergeBaseFinder::new(|id| linear_history.load(id));

        assert_eq!(finder.find(&oid("b"), &oid("d")).unwrap(), Some(oid("b")));
        assert_eq!(finder.find(&oid("d"), &oid("b")).unwrap(), Some(oid("b")));
    }

    #[rstest]
    fn fork_point_is_the_base_for_divergent_branches(simple_divergence: InMemoryGraph) {
        let finder = MergeBaseFinder::new(|id| simple_divergence.load(id));
        assert_eq!(finder.find(&oid("b"), &oid("c")).unwrap(), Some(oid("a")));
    }

    #[rstest]
    fn merge_commits_walk_all_parents(merged_history: InMemoryGraph) {
        let finder = MergeBaseFinder::new(|id| merged_history.load(id));

        // C is reachable from E only through D's second parent.
        assert_eq!(finder.find(&oid("e"), &oid("c")).unwrap(), Some(oid("c")));
    }

    #[rstest]
    fn unrelated_roots_have_no_base() {
        let mut graph = InMemoryGraph::default();
        graph.add_commit(oid("a"), vec![]);
        graph.add_commit(oid("b"), vec![oid("a")]);
        graph.add_commit(oid("x"), vec![]);
        graph.add_commit(oid("y"), vec![oid("x")]);

        let finder = MergeBaseFinder::new(|id| graph.load(id));
        assert_eq!(finder.find(&oid("b"), &oid("y")).unwrap(), None);
    }

    #[rstest]
    fn is_ancestor_matches_reachability(merged_history: InMemoryGraph) {
        let finder = MergeBaseFinder::new(|id| merged_history.load(id));

        assert!(finder.is_ancestor(&oid("a"), &oid("e")).unwrap());
        assert!(finder.is_ancestor(&oid("c"), &oid("e")).unwrap());
        assert!(!finder.is_ancestor(&oid("e"), &oid("c")).unwrap());
    }
}
