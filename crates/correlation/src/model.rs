//! Reference model for a push event.
//!
//! Both payload adapters produce these shapes; nothing downstream of them
//! knows which wire variant a [`PushEvent`] was parsed from.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{CommitHash, OwnerName, ProjectKey, RefName, RefType, RepositoryName, Timestamp};

/// Link relation that carries the repository's own URL.
pub const SELF_LINK: &str = "self";

// ---------------------------------------------------------------------------
// Repository identity
// ---------------------------------------------------------------------------

/// The project a repository belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub key: ProjectKey,
    pub name: Option<String>,
}

/// Named link relations of a repository: relation name → list of hrefs.
pub type Links = BTreeMap<String, Vec<String>>;

/// The repository a push happened in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryIdentity {
    pub owner: OwnerName,
    pub name: RepositoryName,
    /// `None` when the payload carries no project (personal repositories on
    /// Cloud, or a payload that omits it).
    pub project: Option<Project>,
    /// `None` when the payload carries no link map at all.
    pub links: Option<Links>,
}

impl RepositoryIdentity {
    /// Creates an identity with no project and no links.
    pub fn new(owner: OwnerName, name: RepositoryName) -> Self {
        Self {
            owner,
            name,
            project: None,
            links: None,
        }
    }

    /// Returns the hrefs of the `"self"` relation, or `None` if the relation
    /// (or the whole link map) is absent.
    pub fn self_links(&self) -> Option<&[String]> {
        self.links
            .as_ref()
            .and_then(|links| links.get(SELF_LINK))
            .map(Vec::as_slice)
    }
}

// ---------------------------------------------------------------------------
// References and changes
// ---------------------------------------------------------------------------

/// The commit a reference points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub hash: CommitHash,
    pub date: Option<Timestamp>,
}

/// One side (before or after) of a ref change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub name: RefName,
    pub ref_type: RefType,
    /// Only valued for annotated tags on Cloud.
    pub date: Option<Timestamp>,
    pub target: Target,
}

/// A single branch or tag movement inside a push.
///
/// The three shapes are mutually exclusive, so a change can never be both
/// created and closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RefChange {
    /// A new ref appeared.
    Created { new: Reference },
    /// A ref was deleted.
    Closed { old: Reference },
    /// An existing ref moved. `old` may be missing from some payloads.
    Updated {
        old: Option<Reference>,
        new: Reference,
    },
}

impl RefChange {
    pub fn is_created(&self) -> bool {
        matches!(self, RefChange::Created { .. })
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, RefChange::Closed { .. })
    }

    /// The reference before the change; absent on creation.
    pub fn old(&self) -> Option<&Reference> {
        match self {
            RefChange::Created { .. } => None,
            RefChange::Closed { old } => Some(old),
            RefChange::Updated { old, .. } => old.as_ref(),
        }
    }

    /// The reference after the change; absent on closure.
    pub fn new_ref(&self) -> Option<&Reference> {
        match self {
            RefChange::Created { new } | RefChange::Updated { new, .. } => Some(new),
            RefChange::Closed { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Push event
// ---------------------------------------------------------------------------

/// A branch touched by a push, as enumerated for branch-only watchers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Branch {
    pub name: RefName,
    pub hash: CommitHash,
}

/// A parsed push webhook: the repository and its ordered ref changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    pub repository: RepositoryIdentity,
    pub changes: Vec<RefChange>,
}

impl PushEvent {
    pub fn new(repository: RepositoryIdentity, changes: Vec<RefChange>) -> Self {
        Self {
            repository,
            changes,
        }
    }

    /// Branches whose new state is known from this push, in change order.
    pub fn touched_branches(&self) -> Vec<Branch> {
        self.changes
            .iter()
            .filter_map(RefChange::new_ref)
            .filter(|reference| matches!(reference.ref_type, RefType::Branch))
            .map(|reference| Branch {
                name: reference.name.clone(),
                hash: reference.target.hash.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(name: &str, ref_type: RefType, hash: &str) -> Reference {
        Reference {
            name: RefName::new(name).unwrap(),
            ref_type,
            date: None,
            target: Target {
                hash: CommitHash::new(hash).unwrap(),
                date: None,
            },
        }
    }

    fn repository() -> RepositoryIdentity {
        RepositoryIdentity::new(
            OwnerName::new("acme").unwrap(),
            RepositoryName::new("widgets").unwrap(),
        )
    }

    #[test]
    fn change_shapes_expose_flag_view() {
        let created = RefChange::Created {
            new: reference("dev", RefType::Branch, "h1"),
        };
        assert!(created.is_created());
        assert!(!created.is_closed());
        assert!(created.old().is_none());
        assert!(created.new_ref().is_some());

        let closed = RefChange::Closed {
            old: reference("old", RefType::Branch, "h0"),
        };
        assert!(closed.is_closed());
        assert!(!closed.is_created());
        assert!(closed.new_ref().is_none());
    }

    #[test]
    fn touched_branches_skip_tags_and_closures() {
        let push = PushEvent::new(
            repository(),
            vec![
                RefChange::Created {
                    new: reference("dev", RefType::Branch, "h1"),
                },
                RefChange::Created {
                    new: reference("v1", RefType::Tag, "h2"),
                },
                RefChange::Closed {
                    old: reference("old", RefType::Branch, "h3"),
                },
                RefChange::Updated {
                    old: None,
                    new: reference("main", RefType::Branch, "h4"),
                },
            ],
        );

        let names: Vec<_> = push
            .touched_branches()
            .into_iter()
            .map(|b| b.name.to_string())
            .collect();
        assert_eq!(names, vec!["dev", "main"]);
    }

    #[test]
    fn self_links_absent_without_relation() {
        let mut repo = repository();
        assert!(repo.self_links().is_none());

        let mut links = Links::new();
        links.insert("html".to_string(), vec!["https://example.com".to_string()]);
        repo.links = Some(links.clone());
        assert!(repo.self_links().is_none());

        links.insert(SELF_LINK.to_string(), vec!["https://bb.example.com/x".to_string()]);
        repo.links = Some(links);
        assert_eq!(repo.self_links().map(<[String]>::len), Some(1));
    }
}
