//! Main store struct tying all components together.

use crate::branch::{Branch, BranchManager};
use crate::error::StoreError;
use crate::transaction::{Payload, Transaction};
use crate::types::{BlobObject, CommitHash, CommitObject, CommitView};
use serde_json::Value;
use tracing::debug;

/// The main object store.
///
/// Provides a unified interface for:
/// - Staging objects and removals on the work branch
/// - Committing the staging list into branch history
/// - Checking out earlier commits
/// - Creating and switching branches
///
/// Every operation reports through a [`Transaction`]; failures never leave
/// partial changes behind.
#[derive(Clone, Debug)]
pub struct ObjectStore {
    branches: BranchManager,
}

impl ObjectStore {
    /// Create a store with a single empty work branch.
    pub fn new() -> Self {
        Self {
            branches: BranchManager::new(),
        }
    }

    /// Create a store and run a setup closure against it.
    ///
    /// Convenience for seeding a store inline; the closure receives the
    /// fresh store and may run any operation on it.
    pub fn init(setup: impl FnOnce(&mut Self)) -> Self {
        let mut store = Self::new();
        setup(&mut store);
        store
    }

    /// Branch lifecycle operations (create, checkout, remove, list).
    pub fn branch(&mut self) -> &mut BranchManager {
        &mut self.branches
    }

    /// The active branch, read-only.
    pub fn work_branch(&self) -> &Branch {
        self.branches.current()
    }

    // --- Object Operations ---

    /// Stage `payload` under `name` on the work branch.
    ///
    /// A committed entry with the same name is dropped from the working
    /// state right away; the staged object takes its place on the next
    /// commit. Staging the same name twice before committing records both
    /// deltas, while the working state keeps one entry per name.
    pub fn add(&mut self, name: &str, payload: Value) -> Transaction {
        let branch = self.branches.current_mut();
        branch.state_mut().remove(name);
        branch.stage(BlobObject::new(name, payload.clone()));

        debug!(object = %name, "staged object");
        Transaction::success(
            format!("Added {name} to stage."),
            Some(Payload::Object(payload)),
        )
    }

    /// Stage the removal of a committed object.
    ///
    /// Fails when `name` is not in the working state. The object stays
    /// visible until the removal is committed.
    pub fn remove(&mut self, name: &str) -> Transaction {
        let branch = self.branches.current_mut();
        let existing = match branch.object_state().get(name) {
            Some(object) => object.clone(),
            None => return Transaction::error(StoreError::ObjectNotCommitted(name.to_string())),
        };

        let payload = existing.payload().clone();
        branch.stage(existing.tombstoned());

        debug!(object = %name, "staged removal");
        Transaction::success(
            format!("Added {name} for removal."),
            Some(Payload::Object(payload)),
        )
    }

    /// Fetch a committed object's payload by name.
    pub fn get(&self, name: &str) -> Transaction {
        match self.branches.current().object_state().get(name) {
            Some(object) => Transaction::success(
                format!("Found object {name}."),
                Some(Payload::Object(object.payload().clone())),
            ),
            None => Transaction::error(StoreError::ObjectNotCommitted(name.to_string())),
        }
    }

    // --- History Operations ---

    /// Commit everything staged on the work branch.
    ///
    /// Folds the staging list into the working state, then records a
    /// commit carrying the staged deltas. The message reports how many
    /// entries changed; the payload is a [`CommitView`] of the new commit
    /// over the full working state. Fails when nothing is staged.
    pub fn commit(&mut self, message: &str) -> Transaction {
        let branch = self.branches.current_mut();
        if branch.staged().is_empty() {
            return Transaction::error(StoreError::NothingToCommit);
        }

        let deltas = branch.staged().to_vec();
        let changed = branch.commit_staged();
        let commit = CommitObject::new(message, deltas);
        let view = CommitView::new(&commit, branch.object_state().payloads());
        branch.record_commit(commit);

        debug!(hash = %view.hash(), changed, "recorded commit");
        Transaction::success(
            format!("{message}\n\t{changed} objects changed"),
            Some(Payload::View(view)),
        )
    }

    /// Move the work branch's HEAD back to the commit with `hash`.
    ///
    /// Later commits are undone newest-first and dropped from history.
    /// Fails when no commit on the branch has this hash.
    pub fn checkout(&mut self, hash: &CommitHash) -> Transaction {
        let branch = self.branches.current_mut();
        if !branch.revert_to_commit(hash) {
            return Transaction::error(StoreError::CommitNotFound(*hash));
        }

        let commit = branch
            .head_commit()
            .cloned()
            .expect("history keeps the checked-out commit");
        Transaction::success(
            format!("HEAD is now at {}.", commit.hash()),
            Some(Payload::Commit(commit)),
        )
    }

    /// Render the work branch's history, newest first.
    ///
    /// Each commit is rendered through its `Display` form, separated by a
    /// blank line; the rendering is the transaction message. Fails when
    /// the branch has no commits.
    pub fn log(&self) -> Transaction {
        let branch = self.branches.current();
        if branch.commits().is_empty() {
            return Transaction::error(StoreError::NoCommitsYet(branch.name().to_string()));
        }

        let rendered = branch
            .commits()
            .iter()
            .rev()
            .map(|commit| commit.to_string())
            .collect::<Vec<_>>()
            .join("\n\n");
        Transaction::success(rendered, None)
    }

    /// The most recent commit on the work branch.
    ///
    /// The transaction message is the commit's own message; the payload is
    /// a [`CommitView`] over the full working state. Fails when the branch
    /// has no commits.
    pub fn head(&self) -> Transaction {
        let branch = self.branches.current();
        match branch.head_commit() {
            Some(commit) => {
                let view = CommitView::new(commit, branch.object_state().payloads());
                Transaction::success(commit.message().to_string(), Some(Payload::View(view)))
            }
            None => Transaction::error(StoreError::NoCommitsYet(branch.name().to_string())),
        }
    }
}

impl Default for ObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::branch::DEFAULT_BRANCH;
    use serde_json::json;

    #[test]
    fn test_new_store_is_clean() {
        let store = ObjectStore::new();

        assert_eq!(store.work_branch().name(), DEFAULT_BRANCH);
        assert!(store.work_branch().commits().is_empty());
        assert!(store.work_branch().staged().is_empty());
        assert!(store.log().is_error());
    }

    #[test]
    fn test_add_stages_object() {
        let mut store = ObjectStore::new();

        let tx = store.add("answer", json!(42));
        assert!(tx.is_success());
        assert_eq!(tx.message(), "Added answer to stage.");
        assert_eq!(tx.result().unwrap().as_object(), Some(&json!(42)));

        assert_eq!(store.work_branch().staged().len(), 1);
        // Not committed yet.
        assert!(store.get("answer").is_error());
    }

    #[test]
    fn test_add_drops_committed_entry_until_next_commit() {
        let mut store = ObjectStore::new();
        store.add("answer", json!(42));
        store.commit("first");
        assert!(store.get("answer").is_success());

        // Restaging under the same name hides the committed entry.
        store.add("answer", json!(43));
        assert!(store.get("answer").is_error());

        store.commit("second");
        let tx = store.get("answer");
        assert!(tx.is_success());
        assert_eq!(tx.result().unwrap().as_object(), Some(&json!(43)));
    }

    #[test]
    fn test_remove_requires_committed_object() {
        let mut store = ObjectStore::new();
        store.add("answer", json!(42));

        let tx = store.remove("answer");
        assert!(tx.is_error());
        assert_eq!(tx.message(), "Object answer is not committed.");
        // The failed removal staged nothing.
        assert_eq!(store.work_branch().staged().len(), 1);
    }

    #[test]
    fn test_remove_keeps_object_until_commit() {
        let mut store = ObjectStore::new();
        store.add("answer", json!(42));
        store.commit("first");

        let tx = store.remove("answer");
        assert!(tx.is_success());
        assert_eq!(tx.message(), "Added answer for removal.");
        assert_eq!(tx.result().unwrap().as_object(), Some(&json!(42)));
        assert!(store.get("answer").is_success());

        store.commit("second");
        assert!(store.get("answer").is_error());
    }

    #[test]
    fn test_commit_reports_changed_count() {
        let mut store = ObjectStore::new();
        store.add("one", json!(1));
        store.add("two", json!(2));

        let tx = store.commit("pair");
        assert!(tx.is_success());
        assert_eq!(tx.message(), "pair\n\t2 objects changed");
        assert!(store.work_branch().staged().is_empty());
        assert_eq!(store.work_branch().commits().len(), 1);
    }

    #[test]
    fn test_commit_with_empty_stage_fails() {
        let mut store = ObjectStore::new();

        let tx = store.commit("nothing");
        assert!(tx.is_error());
        assert_eq!(tx.message(), "Nothing to commit, working directory clean.");
        assert!(store.work_branch().commits().is_empty());
    }

    #[test]
    fn test_commit_view_carries_working_payloads() {
        let mut store = ObjectStore::new();
        store.add("one", json!(1));
        store.commit("first");
        store.add("two", json!(2));

        let tx = store.commit("second");
        let view = tx.result().unwrap().as_view().unwrap();
        assert_eq!(view.message(), "second");
        assert_eq!(view.objects(), [json!(1), json!(2)]);
        // The recorded commit keeps only its own deltas.
        assert_eq!(store.work_branch().head_commit().unwrap().deltas().len(), 1);
    }

    #[test]
    fn test_checkout_moves_head() {
        let mut store = ObjectStore::new();
        store.add("one", json!(1));
        store.commit("first");
        let first = store.work_branch().head_commit().unwrap().hash();
        store.add("two", json!(2));
        store.commit("second");

        let tx = store.checkout(&first);
        assert!(tx.is_success());
        assert_eq!(tx.message(), format!("HEAD is now at {first}."));
        assert_eq!(tx.result().unwrap().as_commit().unwrap().hash(), first);

        assert_eq!(store.work_branch().commits().len(), 1);
        assert!(store.get("one").is_success());
        assert!(store.get("two").is_error());
    }

    #[test]
    fn test_checkout_unknown_commit_fails() {
        let mut store = ObjectStore::new();
        store.add("one", json!(1));
        store.commit("first");

        let bogus = CommitHash::digest("nowhere", "never");
        let tx = store.checkout(&bogus);
        assert!(tx.is_error());
        assert_eq!(tx.message(), format!("Commit {bogus} does not exist."));
        assert_eq!(store.work_branch().commits().len(), 1);
    }

    #[test]
    fn test_log_renders_newest_first() {
        let mut store = ObjectStore::new();
        store.add("one", json!(1));
        store.commit("first");
        store.add("two", json!(2));
        store.commit("second");

        let commits = store.work_branch().commits();
        let expected = format!("{}\n\n{}", commits[1], commits[0]);
        let tx = store.log();
        assert!(tx.is_success());
        assert_eq!(tx.message(), expected);
        assert!(tx.result().is_none());
    }

    #[test]
    fn test_log_on_empty_branch_fails() {
        let store = ObjectStore::new();

        let tx = store.log();
        assert!(tx.is_error());
        assert_eq!(
            tx.message(),
            "Branch master does not have any commits yet."
        );
    }

    #[test]
    fn test_head_returns_last_commit() {
        let mut store = ObjectStore::new();
        store.add("one", json!(1));
        store.commit("first");
        store.add("two", json!(2));
        store.commit("second");

        let tx = store.head();
        assert!(tx.is_success());
        assert_eq!(tx.message(), "second");
        let view = tx.result().unwrap().as_view().unwrap();
        assert_eq!(view.objects(), [json!(1), json!(2)]);
    }

    #[test]
    fn test_head_on_empty_branch_fails() {
        let store = ObjectStore::new();
        assert!(store.head().is_error());
    }

    #[test]
    fn test_init_runs_setup() {
        let store = ObjectStore::init(|store| {
            store.add("seed", json!("value"));
            store.commit("initial");
        });

        assert!(store.get("seed").is_success());
        assert_eq!(store.work_branch().commits().len(), 1);
    }
}
