//! Registered recipients of correlated events.
//!
//! A [`Navigator`] watches every repository of an owner (optionally narrowed
//! to one project); a [`Source`] watches one repository. Both carry the server
//! URL of the instance they index, where `None` means the cloud service.

use serde::{Deserialize, Serialize};

use crate::{HookRelayError, OwnerName, ProjectKey, RepositoryName, CLOUD_SERVER_URL};

/// Trims `value` and drops it when blank.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Normalises a configured server URL: blank becomes `None`, trailing slashes
/// are removed.
fn normalise_server_url(server_url: Option<&str>) -> Option<String> {
    non_blank(server_url)
        .map(|url| url.trim_end_matches('/'))
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

fn required<T>(field: &str, value: Option<T>) -> Result<T, HookRelayError> {
    value.ok_or_else(|| HookRelayError::InvalidWatcher {
        field: field.to_string(),
    })
}

/// Returns `true` if `server_url` designates the cloud service.
pub fn is_cloud_server_url(server_url: Option<&str>) -> bool {
    match server_url {
        None => true,
        Some(url) => url.is_empty() || url == CLOUD_SERVER_URL,
    }
}

// ---------------------------------------------------------------------------
// Navigator
// ---------------------------------------------------------------------------

/// An owner-level watcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigator {
    owner: OwnerName,
    project_key: Option<ProjectKey>,
    server_url: Option<String>,
}

impl Navigator {
    /// Creates a navigator. Blank `project_key` and `server_url` are treated as
    /// absent; a blank `owner` is rejected.
    pub fn new(
        owner: &str,
        project_key: Option<&str>,
        server_url: Option<&str>,
    ) -> Result<Self, HookRelayError> {
        Ok(Self {
            owner: required("owner", non_blank(Some(owner)).and_then(OwnerName::new))?,
            project_key: non_blank(project_key).and_then(ProjectKey::new),
            server_url: normalise_server_url(server_url),
        })
    }

    pub fn owner(&self) -> &OwnerName {
        &self.owner
    }

    pub fn project_key(&self) -> Option<&ProjectKey> {
        self.project_key.as_ref()
    }

    pub fn server_url(&self) -> Option<&str> {
        self.server_url.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// A single-repository watcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    owner: OwnerName,
    repository: RepositoryName,
    server_url: Option<String>,
}

impl Source {
    /// Creates a source. Blank `owner` or `repository` is rejected.
    pub fn new(
        owner: &str,
        repository: &str,
        server_url: Option<&str>,
    ) -> Result<Self, HookRelayError> {
        Ok(Self {
            owner: required("owner", non_blank(Some(owner)).and_then(OwnerName::new))?,
            repository: required(
                "repository",
                non_blank(Some(repository)).and_then(RepositoryName::new),
            )?,
            server_url: normalise_server_url(server_url),
        })
    }

    pub fn owner(&self) -> &OwnerName {
        &self.owner
    }

    pub fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    pub fn server_url(&self) -> Option<&str> {
        self.server_url.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Watcher
// ---------------------------------------------------------------------------

/// Any registered watcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Watcher {
    Navigator(Navigator),
    Source(Source),
}

impl Watcher {
    pub fn owner(&self) -> &OwnerName {
        match self {
            Watcher::Navigator(n) => n.owner(),
            Watcher::Source(s) => s.owner(),
        }
    }

    pub fn server_url(&self) -> Option<&str> {
        match self {
            Watcher::Navigator(n) => n.server_url(),
            Watcher::Source(s) => s.server_url(),
        }
    }
}

impl std::fmt::Display for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let server = self.server_url().unwrap_or(CLOUD_SERVER_URL);
        match self {
            Watcher::Navigator(n) => write!(f, "navigator {}@{server}", n.owner()),
            Watcher::Source(s) => write!(f, "source {}/{}@{server}", s.owner(), s.repository()),
        }
    }
}
