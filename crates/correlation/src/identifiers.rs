//! Newtype domain identifiers.
//!
//! Every name that travels through a push event is a distinct newtype so that
//! an [`OwnerName`] can never be passed where a [`RepositoryName`] is expected,
//! even though both are strings on the wire.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (hosting-service names)
// ---------------------------------------------------------------------------

string_id! {
    /// The owning user, team, workspace or project of a repository.
    ///
    /// On the Server variant this is the project key (personal projects are
    /// prefixed with `~`).
    OwnerName
}

string_id! {
    /// A repository slug (e.g. `"widgets"`).
    RepositoryName
}

string_id! {
    /// A project key (e.g. `"ABC"`). Compared case-sensitively.
    ProjectKey
}

string_id! {
    /// The short name of a branch or tag (e.g. `"main"`, `"v1.2.0"`).
    RefName
}

string_id! {
    /// A Git commit hash as reported by the hosting service.
    CommitHash
}

string_id! {
    /// Opaque provenance token attached to a dispatched event.
    ///
    /// Forwarded unchanged so watchers can recognise events they caused.
    OriginToken
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies one processed webhook delivery.
///
/// Generated fresh for every call into the processor; propagated through spans
/// and onto the dispatched event so reindex requests and deliveries can be
/// correlated in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryId(Uuid);

impl DeliveryId {
    /// Generates a new random delivery identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a [`DeliveryId`] from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
