//! HookRelay webhook intake infrastructure.
//!
//! Takes a raw push webhook body, adapts it to the [`correlation`] reference
//! model, and either requests a full reindex (no ref changes) or schedules a
//! classified [`correlation::PushHeadEvent`] for deferred delivery to the
//! watcher pool.
//!
//! ## Wire variants
//!
//! | Variant | Event keys | Adapter |
//! |---------|------------|---------|
//! | Cloud | `repo:push` | [`cloud`] |
//! | Server | `repo:refs_changed`, `mirror:repo_synchronized` | [`server`] |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** JSON shapes, the tokio runtime, and delivery fan-out
//! live here. The [`correlation`] crate sees only its own reference model and
//! ports. HTTP transport and signature validation are the caller's concern.

pub mod cloud;
pub mod errors;
pub mod hook;
pub mod payload;
pub mod processor;
pub mod registry;
pub mod scheduler;
pub mod server;

pub use errors::PayloadError;
pub use hook::HookEventKind;
pub use payload::{JsonPayloadAdapter, PayloadAdapter};
pub use processor::{ProcessOutcome, PushHookProcessor, DEFAULT_EVENT_DELAY};
pub use registry::StaticWatcherRegistry;
pub use scheduler::{EventScheduler, TokioScheduler};
