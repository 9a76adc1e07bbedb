//! # Depot
//!
//! An in-memory, branchable object store with git-like staging, commits,
//! and history rewind.
//!
//! ## Core Concepts
//!
//! - **Objects**: Named JSON payloads staged and committed on a branch
//! - **Commits**: Hash-identified history entries carrying the staged deltas
//! - **Branches**: Independent lines of history forked from the work branch
//! - **Transactions**: Uniform success/error reporting for every operation
//!
//! ## Example
//!
//! ```
//! use depot::ObjectStore;
//! use serde_json::json;
//!
//! let mut store = ObjectStore::new();
//! store.add("answer", json!(42));
//!
//! let tx = store.commit("the answer");
//! assert!(tx.is_success());
//!
//! let found = store.get("answer");
//! assert_eq!(found.message(), "Found object answer.");
//! ```

pub mod branch;
pub mod error;
pub mod store;
pub mod transaction;
pub mod types;

// Re-exports
pub use branch::{Branch, BranchManager, ObjectState, DEFAULT_BRANCH};
pub use error::{Result, StoreError};
pub use store::ObjectStore;
pub use transaction::{Payload, Transaction};
pub use types::*;
