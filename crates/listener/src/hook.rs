//! Push-shaped webhook event keys.

use correlation::HostingVariant;
use serde::{Deserialize, Serialize};

/// The `X-Event-Key` of a push-shaped webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookEventKind {
    /// Cloud `repo:push`.
    RepoPush,
    /// Server `repo:refs_changed`.
    ServerRefsChanged,
    /// Server mirror `mirror:repo_synchronized`.
    ServerMirrorSynchronized,
}

impl HookEventKind {
    /// Parses an `X-Event-Key` header value. Returns `None` for keys that are
    /// not push-shaped.
    pub fn from_event_key(key: &str) -> Option<Self> {
        match key.trim() {
            "repo:push" => Some(HookEventKind::RepoPush),
            "repo:refs_changed" => Some(HookEventKind::ServerRefsChanged),
            "mirror:repo_synchronized" => Some(HookEventKind::ServerMirrorSynchronized),
            _ => None,
        }
    }

    pub fn as_event_key(self) -> &'static str {
        match self {
            HookEventKind::RepoPush => "repo:push",
            HookEventKind::ServerRefsChanged => "repo:refs_changed",
            HookEventKind::ServerMirrorSynchronized => "mirror:repo_synchronized",
        }
    }

    /// The wire variant that emits this key.
    pub fn variant(self) -> HostingVariant {
        match self {
            HookEventKind::RepoPush => HostingVariant::Cloud,
            HookEventKind::ServerRefsChanged | HookEventKind::ServerMirrorSynchronized => {
                HostingVariant::Server
            }
        }
    }
}

impl std::fmt::Display for HookEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_event_key())
    }
}
