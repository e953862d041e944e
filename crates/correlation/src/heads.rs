//! Typed heads, revisions, and the head builder.
//!
//! A [`Head`] is identified by its kind and name only. Two tag heads with the
//! same name but different timestamps are the same head; the timestamp is
//! payload used for ordering by the watcher.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::{CommitHash, RefName, Reference, Timestamp};

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "now" for the tag-date fallback.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

// ---------------------------------------------------------------------------
// Head
// ---------------------------------------------------------------------------

/// A named pointer tracked by a watcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Head {
    Branch {
        name: RefName,
    },
    Tag {
        name: RefName,
        /// Milliseconds since the Unix epoch.
        timestamp_millis: i64,
    },
}

impl Head {
    pub fn branch(name: RefName) -> Self {
        Head::Branch { name }
    }

    pub fn tag(name: RefName, timestamp_millis: i64) -> Self {
        Head::Tag {
            name,
            timestamp_millis,
        }
    }

    pub fn name(&self) -> &RefName {
        match self {
            Head::Branch { name } | Head::Tag { name, .. } => name,
        }
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, Head::Tag { .. })
    }

    fn kind_index(&self) -> u8 {
        match self {
            Head::Branch { .. } => 0,
            Head::Tag { .. } => 1,
        }
    }
}

impl PartialEq for Head {
    fn eq(&self, other: &Self) -> bool {
        self.kind_index() == other.kind_index() && self.name() == other.name()
    }
}

impl Eq for Head {}

impl Hash for Head {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind_index().hash(state);
        self.name().hash(state);
    }
}

impl std::fmt::Display for Head {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Head::Branch { name } => write!(f, "branch {name}"),
            Head::Tag { name, .. } => write!(f, "tag {name}"),
        }
    }
}

/// Builds the head for the new side of a change.
///
/// Tags take their timestamp from the reference, then from the target, then
/// from `clock`. Cloud only dates annotated tags, so lightweight tags usually
/// land on the target date. Everything that is not a tag becomes a branch.
pub fn build_head(reference: &Reference, clock: &dyn Clock) -> Head {
    if reference.ref_type.is_tag() {
        let date = reference
            .date
            .or(reference.target.date)
            .unwrap_or_else(|| clock.now());
        Head::tag(reference.name.clone(), date.as_millis())
    } else {
        Head::branch(reference.name.clone())
    }
}

// ---------------------------------------------------------------------------
// Revision
// ---------------------------------------------------------------------------

/// The commit a head resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub head: Head,
    pub hash: CommitHash,
}

impl Revision {
    pub fn new(head: Head, hash: CommitHash) -> Self {
        Self { head, hash }
    }
}

// ---------------------------------------------------------------------------
// Head → revision mapping
// ---------------------------------------------------------------------------

/// Heads affected by an event and the revision each now resolves to.
///
/// `None` means the head no longer exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadRevisions(HashMap<Head, Option<Revision>>);

impl HeadRevisions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `head`, replacing both the key and the value of any equal head.
    ///
    /// `HashMap::insert` keeps the original key, which would retain a stale
    /// tag timestamp.
    pub fn insert(&mut self, head: Head, revision: Option<Revision>) {
        self.0.remove(&head);
        self.0.insert(head, revision);
    }

    pub fn get(&self, head: &Head) -> Option<&Option<Revision>> {
        self.0.get(head)
    }

    /// Returns the stored key equal to `head`, with its current timestamp.
    pub fn get_head(&self, head: &Head) -> Option<&Head> {
        self.0.get_key_value(head).map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Head, &Option<Revision>)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> HashMap<Head, Option<Revision>> {
        self.0
    }
}
