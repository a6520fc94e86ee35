//! Best common ancestor search for merges.
//!
//! A three-way merge needs a base commit to diff both sides against. The
//! search runs in two phases:
//!
//! 1. A bidirectional traversal of the commit graph, processing commits in
//!    reverse chronological order, marks each commit with the side(s) it was
//!    reached from. A commit reached from both sides is a common ancestor,
//!    and its own ancestors are marked stale so they drop out of the result.
//! 2. The surviving common ancestors are filtered against each other: any
//!    ancestor reachable from another common ancestor is redundant. One of
//!    the remaining best common ancestors is returned.
//!
//! This handles linear histories, diamonds and criss-cross merges where more
//! than one best common ancestor exists. Build with the `debug_merge` feature
//! to trace the traversal on stderr.

use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;

macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug_merge")]
        {
            eprintln!($($arg)*);
        }
    };
}

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    struct VisitState: u8 {
        const NONE = 0b00;
        const VISITED_FROM_SOURCE = 0b01;
        const VISITED_FROM_TARGET = 0b10;
        const VISITED_FROM_BOTH = Self::VISITED_FROM_SOURCE.bits() | Self::VISITED_FROM_TARGET.bits();
        // Commit is an ancestor of an already-confirmed common ancestor
        const STALE = 0b100;
        // Commit has been confirmed as a common ancestor
        const RESULT = 0b1000;
    }
}

impl fmt::Debug for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.contains(VisitState::VISITED_FROM_SOURCE) {
            flags.push("SOURCE");
        }
        if self.contains(VisitState::VISITED_FROM_TARGET) {
            flags.push("TARGET");
        }
        if self.contains(VisitState::STALE) {
            flags.push("STALE");
        }
        if self.contains(VisitState::RESULT) {
            flags.push("RESULT");
        }
        if flags.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", flags.join("|"))
        }
    }
}

impl fmt::Display for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Phase 1: bidirectional traversal collecting every common ancestor.
///
/// The loader function abstracts over where commits come from, so the
/// algorithm can be exercised against an in-memory graph in tests.
struct CommonAncestorsFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> SlimCommit,
{
    commit_loader: CommitLoaderFn,
}

impl<CommitLoaderFn> CommonAncestorsFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> SlimCommit,
{
    fn new(commit_loader: CommitLoaderFn) -> Self {
        Self { commit_loader }
    }

    /// Walks the history of the source and target commits simultaneously,
    /// newest commit first, merging visit flags down the parent edges.
    ///
    /// Returns the visit states of commits that ended up flagged as common
    /// ancestors and were not staled by a younger common ancestor.
    fn find_common_ancestors(
        &self,
        source_commit_id: &ObjectId,
        target_commit_ids: HashSet<&ObjectId>,
    ) -> HashMap<ObjectId, VisitState> {
        if target_commit_ids.contains(source_commit_id) {
            // Source is itself a target, so it is the common ancestor
            return HashMap::from([(source_commit_id.clone(), VisitState::RESULT)]);
        }

        let mut ancestors_states = HashMap::<ObjectId, VisitState>::new();
        let mut priority_queue = BinaryHeap::new();

        let source_commit = (self.commit_loader)(source_commit_id);

        ancestors_states.insert(source_commit.oid.clone(), VisitState::VISITED_FROM_SOURCE);
        priority_queue.push((source_commit.timestamp, source_commit.oid));

        for &target_commit_id in target_commit_ids.iter() {
            ancestors_states.insert(target_commit_id.clone(), VisitState::VISITED_FROM_TARGET);

            let target_commit = (self.commit_loader)(target_commit_id);
            priority_queue.push((target_commit.timestamp, target_commit.oid));
        }

        while let Some((_, commit_id)) = priority_queue.pop() {
            let current_state = ancestors_states
                .get(&commit_id)
                .copied()
                .unwrap_or(VisitState::NONE);

            debug_log!("processing commit {}: state={}", &commit_id, current_state);

            if current_state.contains(VisitState::STALE) {
                continue;
            }

            let is_common_ancestor = if current_state.contains(VisitState::VISITED_FROM_BOTH) {
                ancestors_states
                    .entry(commit_id.clone())
                    .and_modify(|state| *state |= VisitState::RESULT);
                true
            } else {
                false
            };

            let current_commit = (self.commit_loader)(&commit_id);

            for parent_id in &current_commit.parents {
                let parent_commit = (self.commit_loader)(parent_id);
                let parent_state = ancestors_states
                    .get(parent_id)
                    .copied()
                    .unwrap_or(VisitState::NONE);

                // Parents inherit the visit flags of their child; children of
                // a common ancestor additionally stale their whole ancestry
                let mut new_state = parent_state | current_state;
                if is_common_ancestor {
                    new_state |= VisitState::STALE;
                }

                if !parent_state.contains(current_state) {
                    ancestors_states.insert(parent_id.clone(), new_state);
                    priority_queue.push((parent_commit.timestamp, parent_id.clone()));
                }
            }
        }

        debug_log!(
            "final ancestors states: {}",
            ancestors_states
                .iter()
                .map(|(oid, state)| format!("{}: {}", oid, state))
                .collect::<Vec<_>>()
                .join(", ")
        );

        ancestors_states
            .into_iter()
            .filter(|(_, state)| {
                !state.contains(VisitState::STALE) && state.contains(VisitState::RESULT)
            })
            .collect()
    }
}

/// Two-phase best common ancestor finder.
///
/// A best common ancestor of commits X and Y is a common ancestor of X and Y
/// that is not itself an ancestor of any other common ancestor.
pub struct BCAFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> SlimCommit,
{
    inner: CommonAncestorsFinder<CommitLoaderFn>,
}

impl<CommitLoaderFn> BCAFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> SlimCommit,
{
    pub fn new(commit_loader: CommitLoaderFn) -> Self {
        Self {
            inner: CommonAncestorsFinder::new(commit_loader),
        }
    }

    /// Returns one best common ancestor of the two commits, or `None` when
    /// their histories are disjoint.
    ///
    /// When several best common ancestors exist (criss-cross merges) one of
    /// them is picked arbitrarily rather than merged recursively.
    pub fn find_best_common_ancestor(
        &self,
        source_commit_id: &ObjectId,
        target_commit_id: &ObjectId,
    ) -> Option<ObjectId> {
        let target_commit_ids = HashSet::from([target_commit_id]);
        let common_ancestors = self
            .inner
            .find_common_ancestors(source_commit_id, target_commit_ids)
            .into_keys()
            .collect::<HashSet<_>>();

        if common_ancestors.is_empty() {
            return None;
        }

        debug_log!(
            "found common ancestors: {}",
            common_ancestors
                .iter()
                .map(|oid| oid.as_ref())
                .collect::<Vec<_>>()
                .join(", ")
        );

        // Pairwise reachability check: an ancestor reachable from another
        // common ancestor is redundant, on either side of the probe
        let mut redundant_ancestors = HashSet::<ObjectId>::new();
        for commit in &common_ancestors {
            if redundant_ancestors.contains(commit) {
                continue;
            }

            let others = common_ancestors
                .iter()
                .filter(|other| *other != commit && !redundant_ancestors.contains(*other))
                .collect::<HashSet<_>>();
            if others.is_empty() {
                break;
            }
            let common_states = self.inner.find_common_ancestors(commit, others.clone());

            if common_states
                .get(commit)
                .unwrap_or(&VisitState::NONE)
                .contains(VisitState::VISITED_FROM_TARGET)
            {
                redundant_ancestors.insert(commit.clone());
            }

            for other in others {
                if common_states
                    .get(other)
                    .unwrap_or(&VisitState::NONE)
                    .contains(VisitState::VISITED_FROM_SOURCE)
                {
                    redundant_ancestors.insert(other.clone());
                }
            }
        }

        debug_log!(
            "redundant ancestors: {}",
            redundant_ancestors
                .iter()
                .map(|oid| oid.as_ref())
                .collect::<Vec<_>>()
                .join(", ")
        );

        common_ancestors
            .into_iter()
            .find(|commit| !redundant_ancestors.contains(commit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use rstest::*;
    use std::collections::HashMap;

    type CommitGraph = HashMap<ObjectId, (Vec<ObjectId>, DateTime<Utc>)>;

    #[derive(Debug, Clone, Default)]
    struct InMemoryCommitStore {
        commits: CommitGraph,
    }

    impl InMemoryCommitStore {
        fn add_commit(&mut self, commit_id: ObjectId, parents: Vec<ObjectId>) {
            // Insertion order doubles as chronological order, one hour apart
            let timestamp = Utc
                .timestamp_opt(1_640_995_200 + self.commits.len() as i64 * 3600, 0)
                .unwrap();
            self.commits.insert(commit_id, (parents, timestamp));
        }

        fn get_slim_commit(&self, commit_id: &ObjectId) -> SlimCommit {
            let (parents, timestamp) = self
                .commits
                .get(commit_id)
                .expect("commit not found in test store");

            SlimCommit {
                oid: commit_id.clone(),
                parents: parents.clone(),
                timestamp: *timestamp,
            }
        }
    }

    fn oid(label: u8) -> ObjectId {
        ObjectId::try_parse(format!("{:040x}", label as u128)).unwrap()
    }

    fn bca(store: &InMemoryCommitStore, source: &ObjectId, target: &ObjectId) -> Option<ObjectId> {
        let finder = BCAFinder::new(|commit_id: &ObjectId| store.get_slim_commit(commit_id));
        finder.find_best_common_ancestor(source, target)
    }

    #[rstest]
    fn identical_commits_are_their_own_ancestor() {
        let mut store = InMemoryCommitStore::default();
        store.add_commit(oid(1), vec![]);

        assert_eq!(bca(&store, &oid(1), &oid(1)), Some(oid(1)));
    }

    #[rstest]
    fn linear_history_returns_older_commit() {
        // a <- b <- c <- d
        let mut store = InMemoryCommitStore::default();
        store.add_commit(oid(1), vec![]);
        store.add_commit(oid(2), vec![oid(1)]);
        store.add_commit(oid(3), vec![oid(2)]);
        store.add_commit(oid(4), vec![oid(3)]);

        assert_eq!(bca(&store, &oid(2), &oid(4)), Some(oid(2)));
        assert_eq!(bca(&store, &oid(4), &oid(2)), Some(oid(2)));
    }

    #[rstest]
    fn simple_fork_returns_fork_point() {
        //     a
        //    / \
        //   b   c
        let mut store = InMemoryCommitStore::default();
        store.add_commit(oid(1), vec![]);
        store.add_commit(oid(2), vec![oid(1)]);
        store.add_commit(oid(3), vec![oid(1)]);

        assert_eq!(bca(&store, &oid(2), &oid(3)), Some(oid(1)));
    }

    #[rstest]
    fn fork_with_unequal_branch_lengths() {
        //   a <- b <- c <- d
        //    \
        //     e
        let mut store = InMemoryCommitStore::default();
        store.add_commit(oid(1), vec![]);
        store.add_commit(oid(2), vec![oid(1)]);
        store.add_commit(oid(3), vec![oid(2)]);
        store.add_commit(oid(4), vec![oid(3)]);
        store.add_commit(oid(5), vec![oid(1)]);

        assert_eq!(bca(&store, &oid(4), &oid(5)), Some(oid(1)));
    }

    #[rstest]
    fn merge_commit_ancestry_is_followed_through_both_parents() {
        //   a <- b <-- d <- e
        //    \       /
        //     c ----+
        //      \
        //       f
        let mut store = InMemoryCommitStore::default();
        store.add_commit(oid(1), vec![]);
        store.add_commit(oid(2), vec![oid(1)]);
        store.add_commit(oid(3), vec![oid(1)]);
        store.add_commit(oid(4), vec![oid(2), oid(3)]);
        store.add_commit(oid(5), vec![oid(4)]);
        store.add_commit(oid(6), vec![oid(3)]);

        // c is a common ancestor through the merge commit d, and is
        // preferred over the staled fork point a
        assert_eq!(bca(&store, &oid(5), &oid(6)), Some(oid(3)));
    }

    #[rstest]
    fn criss_cross_merge_picks_one_of_the_best_ancestors() {
        //     a
        //    / \
        //   b   c
        //   |\ /|
        //   | X |
        //   |/ \|
        //   d   e
        let mut store = InMemoryCommitStore::default();
        store.add_commit(oid(1), vec![]);
        store.add_commit(oid(2), vec![oid(1)]);
        store.add_commit(oid(3), vec![oid(1)]);
        store.add_commit(oid(4), vec![oid(2), oid(3)]);
        store.add_commit(oid(5), vec![oid(3), oid(2)]);

        let result = bca(&store, &oid(4), &oid(5));
        assert!(result == Some(oid(2)) || result == Some(oid(3)));
    }

    #[rstest]
    fn disjoint_histories_have_no_common_ancestor() {
        let mut store = InMemoryCommitStore::default();
        store.add_commit(oid(1), vec![]);
        store.add_commit(oid(2), vec![]);

        assert_eq!(bca(&store, &oid(1), &oid(2)), None);
    }
}
