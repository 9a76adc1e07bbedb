//! Core types for the object store.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// Commit identifier (SHA-256 over the formatted commit date and message).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitHash([u8; 32]);

impl CommitHash {
    /// Compute the hash for a commit header.
    pub(crate) fn digest(formatted_date: &str, message: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(formatted_date.as_bytes());
        hasher.update(message.as_bytes());
        CommitHash(hasher.finalize().into())
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(CommitHash(arr))
    }
}

impl fmt::Debug for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitHash({}...)", &self.to_hex()[..8])
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// A named unit of content, staged for addition or (when tombstoned)
/// removal.
///
/// Immutable once constructed: removal stages a fresh tombstoned copy
/// rather than flipping a flag on a shared instance, so the staging list,
/// the working state, and past commit deltas never alias each other.
#[derive(Clone, Debug, Serialize)]
pub struct BlobObject {
    name: String,
    payload: Value,
    tombstone: bool,
}

impl BlobObject {
    /// Create a live object carrying `payload`.
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
            tombstone: false,
        }
    }

    /// Copy of this object with the tombstone flag set.
    ///
    /// The copy keeps the original payload so a committed removal can be
    /// undone by re-creating the object.
    pub(crate) fn tombstoned(&self) -> Self {
        Self {
            name: self.name.clone(),
            payload: self.payload.clone(),
            tombstone: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Whether this entry is staged for removal.
    pub fn is_tombstone(&self) -> bool {
        self.tombstone
    }
}

/// Equality covers name and payload only; the tombstone flag is staging
/// bookkeeping, not identity.
impl PartialEq for BlobObject {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.payload == other.payload
    }
}

/// Human-readable commit date, `Tue Aug 25 14:33 2026 +0300` style.
fn format_date(date: &DateTime<Local>) -> String {
    date.format("%a %b %d %H:%M %Y %z").to_string()
}

/// Immutable commit metadata: message, creation date, hash, and the staged
/// deltas the commit introduced.
///
/// Created only by [`ObjectStore::commit`](crate::ObjectStore::commit) and
/// never mutated afterwards; the delta list is a defensive copy of the
/// staging list taken at commit time.
#[derive(Clone, Debug, Serialize)]
pub struct CommitObject {
    message: String,
    date: DateTime<Local>,
    hash: CommitHash,
    deltas: Vec<BlobObject>,
}

impl CommitObject {
    /// Stamp a new commit with the current wall-clock time.
    pub(crate) fn new(message: impl Into<String>, deltas: Vec<BlobObject>) -> Self {
        let message = message.into();
        let date = Local::now();
        let hash = CommitHash::digest(&format_date(&date), &message);
        Self {
            message,
            date,
            hash,
            deltas,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn date(&self) -> DateTime<Local> {
        self.date
    }

    pub fn hash(&self) -> CommitHash {
        self.hash
    }

    /// The objects this commit added or removed, in staging order.
    pub fn deltas(&self) -> &[BlobObject] {
        &self.deltas
    }
}

/// Commit identity is the hash; two commits with equal hashes are the same
/// commit. Collisions are out of scope here.
impl PartialEq for CommitObject {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for CommitObject {}

impl fmt::Display for CommitObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Commit {}\nDate: {}\n\n\t{}",
            self.hash,
            format_date(&self.date),
            self.message
        )
    }
}

/// Presentation snapshot handed back by `commit` and `head`.
///
/// Carries the head commit's header plus the payloads currently in the
/// working state, in insertion order. The payload list is a display
/// artifact, not a delta list, and a distinct type so it cannot be
/// mistaken for the stored [`CommitObject`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommitView {
    message: String,
    date: DateTime<Local>,
    hash: CommitHash,
    objects: Vec<Value>,
}

impl CommitView {
    pub(crate) fn new(commit: &CommitObject, objects: Vec<Value>) -> Self {
        Self {
            message: commit.message.clone(),
            date: commit.date,
            hash: commit.hash,
            objects,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn date(&self) -> DateTime<Local> {
        self.date
    }

    pub fn hash(&self) -> CommitHash {
        self.hash
    }

    /// All payloads in the working state when the view was taken.
    pub fn objects(&self) -> &[Value] {
        &self.objects
    }
}

impl fmt::Display for CommitView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Commit {}\nDate: {}\n\n\t{}",
            self.hash,
            format_date(&self.date),
            self.message
        )
    }
}
