//! Port traits implemented by infrastructure crates.
//!
//! The correlation domain decides *who* should hear about a push; the
//! collaborators behind these traits own *what happens next* (indexing,
//! persistence, scheduling).

use async_trait::async_trait;

use crate::{
    Branch, HeadRevisions, Navigator, OwnerName, PushHeadEvent, RepositoryName, Source, Watcher,
};

/// The pool of watchers an event is offered to.
#[async_trait]
pub trait WatcherRegistry: Send + Sync {
    /// Snapshot of the currently registered watchers.
    async fn watchers(&self) -> Vec<Watcher>;
}

/// Receives events for watchers that matched.
///
/// Implementations own their error handling; delivery never fails from the
/// relay's point of view.
#[async_trait]
pub trait EventConsumer: Send + Sync {
    /// A navigator matched; it should locate the source named by
    /// [`PushHeadEvent::source_name`].
    async fn on_navigator_event(&self, navigator: &Navigator, event: &PushHeadEvent);

    /// A source is the origin of `event`; `heads` are its deltas.
    async fn on_source_heads(&self, source: &Source, event: &PushHeadEvent, heads: HeadRevisions);
}

/// Triggers an unconditional re-scan of one repository.
#[async_trait]
pub trait Reindexer: Send + Sync {
    async fn reindex(&self, owner: &OwnerName, repository: &RepositoryName);
}

/// Enumerates the branches implied by an event for a given source.
pub trait HasBranches {
    fn branches(&self, source: &Source) -> Vec<Branch>;
}
