//! Uniform operation outcome.
//!
//! Every store operation reports through a [`Transaction`]: a message, a
//! success/error status, and an optional payload. Failures carry their
//! [`StoreError`] kind as data; nothing on the public surface panics.

use crate::branch::Branch;
use crate::error::{Result, StoreError};
use crate::types::{CommitObject, CommitView};
use serde_json::Value;
use std::fmt;

/// Payload carried by a successful [`Transaction`].
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// A raw object payload (`add`, `remove`, `get`).
    Object(Value),
    /// A stored commit (`checkout`).
    Commit(CommitObject),
    /// A presentation snapshot of the head commit (`commit`, `head`).
    View(CommitView),
    /// A snapshot of a branch (`branch().create`, `branch().checkout`).
    Branch(Branch),
}

impl Payload {
    pub fn as_object(&self) -> Option<&Value> {
        match self {
            Payload::Object(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_commit(&self) -> Option<&CommitObject> {
        match self {
            Payload::Commit(commit) => Some(commit),
            _ => None,
        }
    }

    pub fn as_view(&self) -> Option<&CommitView> {
        match self {
            Payload::View(view) => Some(view),
            _ => None,
        }
    }

    pub fn as_branch(&self) -> Option<&Branch> {
        match self {
            Payload::Branch(branch) => Some(branch),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Status {
    Success,
    Error(StoreError),
}

/// Result value returned by every store operation.
///
/// Immutable once built. The message is ready for user display; the payload
/// feeds follow-up calls (a commit's hash into
/// [`checkout`](crate::ObjectStore::checkout), for instance).
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    message: String,
    status: Status,
    result: Option<Payload>,
}

impl Transaction {
    pub(crate) fn success(message: impl Into<String>, result: Option<Payload>) -> Self {
        Self {
            message: message.into(),
            status: Status::Success,
            result,
        }
    }

    /// Build a failed transaction; the message is rendered from the error.
    pub(crate) fn error(error: StoreError) -> Self {
        Self {
            message: error.to_string(),
            status: Status::Error(error),
            result: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, Status::Success)
    }

    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    /// User-visible outcome text.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn result(&self) -> Option<&Payload> {
        self.result.as_ref()
    }

    /// The error behind a failed transaction, if any.
    pub fn error_kind(&self) -> Option<&StoreError> {
        match &self.status {
            Status::Error(error) => Some(error),
            Status::Success => None,
        }
    }

    /// Convert into a plain [`Result`] for drivers that prefer `?`.
    pub fn into_result(self) -> Result<Option<Payload>> {
        match self.status {
            Status::Success => Ok(self.result),
            Status::Error(error) => Err(error),
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_transaction() {
        let tx = Transaction::success("Added answer to stage.", Some(Payload::Object(json!(42))));

        assert!(tx.is_success());
        assert!(!tx.is_error());
        assert_eq!(tx.message(), "Added answer to stage.");
        assert_eq!(tx.error_kind(), None);
        assert_eq!(tx.result().and_then(Payload::as_object), Some(&json!(42)));
    }

    #[test]
    fn test_error_transaction_renders_kind() {
        let tx = Transaction::error(StoreError::ObjectNotCommitted("answer".into()));

        assert!(tx.is_error());
        assert_eq!(tx.message(), "Object answer is not committed.");
        assert_eq!(
            tx.error_kind(),
            Some(&StoreError::ObjectNotCommitted("answer".into()))
        );
        assert_eq!(tx.result(), None);
    }

    #[test]
    fn test_into_result() {
        let ok = Transaction::success("done", Some(Payload::Object(json!("x"))));
        assert_eq!(ok.into_result().unwrap(), Some(Payload::Object(json!("x"))));

        let err = Transaction::error(StoreError::NothingToCommit);
        assert_eq!(err.into_result(), Err(StoreError::NothingToCommit));
    }

    #[test]
    fn test_display_is_message() {
        let tx = Transaction::success("Found object answer.", None);
        assert_eq!(tx.to_string(), "Found object answer.");
    }
}
