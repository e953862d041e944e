//! Shared value types for the correlation domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! behaviour: variant parsing, case-insensitive tag parsing, and millisecond
//! conversion used for tag-head ordering.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Canonical base URL of the cloud hosting service.
///
/// A watcher whose server URL is empty or equal to this value is a cloud watcher.
pub const CLOUD_SERVER_URL: &str = "https://bitbucket.org";

// ---------------------------------------------------------------------------
// Hosting variant
// ---------------------------------------------------------------------------

/// Which wire variant a webhook came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostingVariant {
    /// The hosted cloud service.
    Cloud,
    /// A self-hosted server or data-center instance.
    Server,
}

impl HostingVariant {
    /// Returns `true` for [`HostingVariant::Server`].
    pub fn is_server(self) -> bool {
        matches!(self, HostingVariant::Server)
    }
}

impl std::fmt::Display for HostingVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostingVariant::Cloud => write!(f, "cloud"),
            HostingVariant::Server => write!(f, "server"),
        }
    }
}

impl std::str::FromStr for HostingVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cloud" => Ok(HostingVariant::Cloud),
            "server" => Ok(HostingVariant::Server),
            _ => Err(format!("Invalid hosting variant: {s}. Use 'cloud' or 'server'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Reference type tag
// ---------------------------------------------------------------------------

/// The type tag of a reference as sent by the hosting service.
///
/// Cloud sends `"branch"`/`"tag"`, Server sends `"BRANCH"`/`"TAG"`. Anything
/// else is preserved verbatim and treated like a branch by the head builder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefType {
    Branch,
    Tag,
    Other(String),
}

impl RefType {
    /// Parses a wire type tag, ignoring ASCII case.
    pub fn parse(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case("branch") {
            RefType::Branch
        } else if tag.eq_ignore_ascii_case("tag") {
            RefType::Tag
        } else {
            RefType::Other(tag.to_string())
        }
    }

    /// Returns `true` for [`RefType::Tag`].
    pub fn is_tag(&self) -> bool {
        matches!(self, RefType::Tag)
    }
}

// ---------------------------------------------------------------------------
// Classified event type
// ---------------------------------------------------------------------------

/// Coarse type of a batch of ref changes.
///
/// Produced by [`crate::classifier::classify`]; never stored apart from the
/// event it was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassifiedEventType {
    Created,
    Removed,
    Updated,
}

impl std::fmt::Display for ClassifiedEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifiedEventType::Created => write!(f, "CREATED"),
            ClassifiedEventType::Removed => write!(f, "REMOVED"),
            ClassifiedEventType::Updated => write!(f, "UPDATED"),
        }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Creates a [`Timestamp`] from milliseconds since the Unix epoch.
    ///
    /// Returns `None` if the value is outside chrono's representable range.
    pub fn from_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    /// Parses an RFC 3339 string (any offset) into a UTC timestamp.
    pub fn parse_rfc3339(value: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }

    /// Returns milliseconds since the Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
