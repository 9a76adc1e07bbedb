//! Error types for the object store.

use crate::types::CommitHash;
use thiserror::Error;

/// Main error type for store operations.
///
/// The `#[error]` strings double as the user-visible failure messages
/// carried by [`Transaction`](crate::Transaction); drivers can print them
/// verbatim.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum StoreError {
    #[error("Branch {0} already exists.")]
    BranchExists(String),

    #[error("Branch {0} does not exist.")]
    BranchNotFound(String),

    #[error("Cannot remove current branch.")]
    CannotRemoveCurrentBranch,

    #[error("Nothing to commit, working directory clean.")]
    NothingToCommit,

    #[error("Object {0} is not committed.")]
    ObjectNotCommitted(String),

    #[error("Commit {0} does not exist.")]
    CommitNotFound(CommitHash),

    #[error("Branch {0} does not have any commits yet.")]
    NoCommitsYet(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
