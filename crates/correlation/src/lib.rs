//! Webhook-to-event correlation domain for HookRelay.
//!
//! This crate turns a parsed push into a classified event, decides which
//! registered watchers the event is meant for, and projects its ref changes
//! onto head → revision deltas. Infrastructure crates implement the traits in
//! [`ports`]; they never add matching rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies
//! and no async runtime. Every function on the matching path is pure.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`OwnerName`, `RefName`, `DeliveryId`, etc.) |
//! | [`types`] | Shared value types (`HostingVariant`, `RefType`, `Timestamp`, etc.) |
//! | [`model`] | The push reference model |
//! | [`classifier`] | Ref-change batch → `ClassifiedEventType` |
//! | [`heads`] | `Head`, `Revision`, the head builder and its `Clock` |
//! | [`watcher`] | Navigators and sources |
//! | [`correlator`] | `PushHeadEvent` and the watcher matching rules |
//! | [`projector`] | Ref changes → head/revision deltas |
//! | [`ports`] | Collaborator traits |
//! | [`errors`] | Domain error type |

pub mod classifier;
pub mod correlator;
pub mod errors;
pub mod heads;
pub mod identifiers;
pub mod model;
pub mod ports;
pub mod projector;
pub mod types;
pub mod watcher;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use classifier::classify;
pub use correlator::{is_applicable, PushHeadEvent};
pub use errors::HookRelayError;
pub use heads::{build_head, Clock, Head, HeadRevisions, Revision, SystemClock};
pub use identifiers::{
    CommitHash, DeliveryId, OriginToken, OwnerName, ProjectKey, RefName, RepositoryName,
};
pub use model::{
    Branch, Links, Project, PushEvent, RefChange, Reference, RepositoryIdentity, Target,
    SELF_LINK,
};
pub use ports::{EventConsumer, HasBranches, Reindexer, WatcherRegistry};
pub use projector::project;
pub use types::{ClassifiedEventType, HostingVariant, RefType, Timestamp, CLOUD_SERVER_URL};
pub use watcher::{is_cloud_server_url, Navigator, Source, Watcher};
