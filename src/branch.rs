//! Branches: commit history, staging, and the materialized working state.
//!
//! A [`Branch`] owns its commit list, its staging list, and an
//! [`ObjectState`]. Lifecycle operations (create/checkout/remove/list) act
//! on the store's whole branch set and live on [`BranchManager`], handed
//! out through [`ObjectStore::branch`](crate::ObjectStore::branch).

use crate::error::StoreError;
use crate::transaction::{Payload, Transaction};
use crate::types::{BlobObject, CommitHash, CommitObject};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Name of the branch every store starts on.
pub const DEFAULT_BRANCH: &str = "master";

/// The materialized working set: at most one entry per object name, with
/// insertion order preserved for display.
///
/// A map from name to [`BlobObject`] plus a secondary order index, so
/// lookup and removal stay O(1) on the map while `iter`/`payloads` walk
/// entries in the order they first landed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectState {
    entries: HashMap<String, BlobObject>,
    order: Vec<String>,
}

impl ObjectState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&BlobObject> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &BlobObject> + '_ {
        self.order.iter().filter_map(|name| self.entries.get(name))
    }

    /// All payloads, in insertion order.
    pub fn payloads(&self) -> Vec<Value> {
        self.iter().map(|object| object.payload().clone()).collect()
    }

    /// Insert an object. A same-name entry is replaced in place and keeps
    /// its original order slot; new names append.
    pub(crate) fn insert(&mut self, object: BlobObject) {
        if !self.entries.contains_key(object.name()) {
            self.order.push(object.name().to_string());
        }
        self.entries.insert(object.name().to_string(), object);
    }

    /// Remove the entry with this name, if present.
    pub(crate) fn remove(&mut self, name: &str) -> Option<BlobObject> {
        let removed = self.entries.remove(name)?;
        self.order.retain(|entry| entry != name);
        Some(removed)
    }

    /// Remove the entry equal to `object` (same name and payload).
    ///
    /// Leaves the state untouched when the name maps to a different
    /// payload. This is the by-value delete used when folding and
    /// reverting tombstones.
    pub(crate) fn remove_matching(&mut self, object: &BlobObject) -> Option<BlobObject> {
        if self.entries.get(object.name())? == object {
            self.remove(object.name())
        } else {
            None
        }
    }
}

/// A named line of history with its own staging list and working state.
#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    name: String,
    commits: Vec<CommitObject>,
    staged: Vec<BlobObject>,
    object_state: ObjectState,
}

impl Branch {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commits: Vec::new(),
            staged: Vec::new(),
            object_state: ObjectState::new(),
        }
    }

    /// Fork this branch under a new name.
    ///
    /// Shares the commit history by value copy; the staging list and the
    /// working state start empty.
    fn fork(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commits: self.commits.clone(),
            staged: Vec::new(),
            object_state: ObjectState::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Commit history, oldest first.
    pub fn commits(&self) -> &[CommitObject] {
        &self.commits
    }

    /// Entries staged since the last commit, in staging order.
    pub fn staged(&self) -> &[BlobObject] {
        &self.staged
    }

    pub fn object_state(&self) -> &ObjectState {
        &self.object_state
    }

    /// The most recent commit, if any.
    pub fn head_commit(&self) -> Option<&CommitObject> {
        self.commits.last()
    }

    pub(crate) fn state_mut(&mut self) -> &mut ObjectState {
        &mut self.object_state
    }

    pub(crate) fn stage(&mut self, object: BlobObject) {
        self.staged.push(object);
    }

    pub(crate) fn record_commit(&mut self, commit: CommitObject) {
        self.commits.push(commit);
    }

    /// Fold the staging list into the working state, in staging order:
    /// a tombstoned entry deletes its committed match (by value), a live
    /// entry lands in the state. Clears the staging list and returns the
    /// number of entries processed.
    pub(crate) fn commit_staged(&mut self) -> usize {
        let count = self.staged.len();
        for object in self.staged.drain(..) {
            if object.is_tombstone() {
                self.object_state.remove_matching(&object);
            } else {
                self.object_state.insert(object);
            }
        }
        count
    }

    /// Rewind history to the commit with `hash`.
    ///
    /// Walks every later commit newest-first and applies the inverse of
    /// its deltas in reverse staging order: a tombstone is re-created as a
    /// live object, an addition is deleted by value. History is then
    /// truncated at the target commit (inclusive). Returns `false` when
    /// the hash is unknown, leaving the branch untouched.
    pub(crate) fn revert_to_commit(&mut self, hash: &CommitHash) -> bool {
        let target = match self.commits.iter().position(|c| c.hash() == *hash) {
            Some(index) => index,
            None => return false,
        };

        for commit in self.commits[target + 1..].iter().rev() {
            for delta in commit.deltas().iter().rev() {
                if delta.is_tombstone() {
                    self.object_state
                        .insert(BlobObject::new(delta.name(), delta.payload().clone()));
                } else {
                    self.object_state.remove_matching(delta);
                }
            }
        }

        debug!(
            hash = %hash,
            dropped = self.commits.len() - target - 1,
            "reverted history"
        );
        self.commits.truncate(target + 1);
        true
    }
}

/// Owns the branch set and tracks the active ("work") branch.
///
/// Exactly one branch is active at any time; every store starts on
/// [`DEFAULT_BRANCH`].
#[derive(Clone, Debug)]
pub struct BranchManager {
    branches: HashMap<String, Branch>,
    work: String,
}

impl BranchManager {
    pub(crate) fn new() -> Self {
        let mut branches = HashMap::new();
        branches.insert(DEFAULT_BRANCH.to_string(), Branch::new(DEFAULT_BRANCH));
        Self {
            branches,
            work: DEFAULT_BRANCH.to_string(),
        }
    }

    /// The active branch.
    pub fn current(&self) -> &Branch {
        self.branches
            .get(&self.work)
            .expect("work branch is always registered")
    }

    pub(crate) fn current_mut(&mut self) -> &mut Branch {
        self.branches
            .get_mut(&self.work)
            .expect("work branch is always registered")
    }

    /// Look up a branch by name.
    pub fn get(&self, name: &str) -> Option<&Branch> {
        self.branches.get(name)
    }

    /// Create a branch forking the active branch's history.
    ///
    /// Fails with [`StoreError::BranchExists`] without touching the branch
    /// set when the name is taken. On success the payload is a snapshot of
    /// the branch as created.
    pub fn create(&mut self, name: &str) -> Transaction {
        if self.branches.contains_key(name) {
            return Transaction::error(StoreError::BranchExists(name.to_string()));
        }

        let branch = self.current().fork(name);
        self.branches.insert(name.to_string(), branch.clone());
        debug!(branch = %name, "created branch");
        Transaction::success(
            format!("Created branch {name}."),
            Some(Payload::Branch(branch)),
        )
    }

    /// Switch the work branch.
    pub fn checkout(&mut self, name: &str) -> Transaction {
        if !self.branches.contains_key(name) {
            return Transaction::error(StoreError::BranchNotFound(name.to_string()));
        }

        self.work = name.to_string();
        debug!(branch = %name, "switched branch");
        Transaction::success(
            format!("Switched to branch {name}."),
            Some(Payload::Branch(self.current().clone())),
        )
    }

    /// Delete a branch. The active branch cannot be removed.
    pub fn remove(&mut self, name: &str) -> Transaction {
        if !self.branches.contains_key(name) {
            return Transaction::error(StoreError::BranchNotFound(name.to_string()));
        }
        if self.work == name {
            return Transaction::error(StoreError::CannotRemoveCurrentBranch);
        }

        self.branches.remove(name);
        debug!(branch = %name, "removed branch");
        Transaction::success(format!("Removed branch {name}."), None)
    }

    /// All branch names, alphabetically sorted, one per line; the active
    /// branch is prefixed `"* "`, the rest with two spaces. The listing is
    /// the transaction message.
    pub fn list(&self) -> Transaction {
        let mut names: Vec<&str> = self.branches.keys().map(String::as_str).collect();
        names.sort_unstable();

        let listing = names
            .into_iter()
            .map(|name| {
                if name == self.work {
                    format!("* {name}")
                } else {
                    format!("  {name}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        Transaction::success(listing, None)
    }
}
