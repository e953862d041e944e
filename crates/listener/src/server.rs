//! Adapter for Server `repo:refs_changed` and `mirror:repo_synchronized`
//! payloads.
//!
//! The project key doubles as the owner name. Server refs carry no dates.

use std::collections::BTreeMap;

use correlation::{
    CommitHash, Links, OwnerName, Project, ProjectKey, PushEvent, RefChange, RefName, RefType,
    Reference, RepositoryIdentity, RepositoryName, Target,
};
use serde::Deserialize;

use crate::PayloadError;

#[derive(Debug, Deserialize)]
struct ServerPushPayload {
    repository: ServerRepository,
    #[serde(default)]
    changes: Vec<ServerChange>,
}

#[derive(Debug, Deserialize)]
struct ServerRepository {
    slug: String,
    project: ServerProject,
    links: Option<BTreeMap<String, Vec<Href>>>,
}

#[derive(Debug, Deserialize)]
struct ServerProject {
    key: String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Href {
    href: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerChange {
    #[serde(rename = "ref")]
    reference: ServerRef,
    from_hash: Option<String>,
    to_hash: Option<String>,
    #[serde(rename = "type")]
    change_type: ServerChangeType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerRef {
    display_id: String,
    #[serde(rename = "type")]
    ref_type: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum ServerChangeType {
    Add,
    Delete,
    Update,
}

/// Converts a Server push document into a [`PushEvent`].
pub fn parse(document: serde_json::Value) -> Result<PushEvent, PayloadError> {
    let payload: ServerPushPayload = serde_json::from_value(document)?;
    let repository = repository_identity(payload.repository)?;
    let changes = payload
        .changes
        .into_iter()
        .enumerate()
        .map(|(index, change)| ref_change(index, change))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PushEvent::new(repository, changes))
}

fn repository_identity(repo: ServerRepository) -> Result<RepositoryIdentity, PayloadError> {
    let owner = OwnerName::new(repo.project.key.clone()).ok_or(PayloadError::MissingField {
        field: "repository.project.key",
    })?;
    let name = RepositoryName::new(repo.slug).ok_or(PayloadError::MissingField {
        field: "repository.slug",
    })?;
    let project = ProjectKey::new(repo.project.key).map(|key| Project {
        key,
        name: repo.project.name,
    });
    let links = repo.links.map(|links| {
        links
            .into_iter()
            .map(|(rel, hrefs)| (rel, hrefs.into_iter().filter_map(|h| h.href).collect()))
            .collect::<Links>()
    });
    Ok(RepositoryIdentity {
        owner,
        name,
        project,
        links,
    })
}

fn ref_change(index: usize, change: ServerChange) -> Result<RefChange, PayloadError> {
    let side = |hash: Option<String>, which: &str| -> Result<Reference, PayloadError> {
        let malformed = |reason: String| PayloadError::MalformedChange { index, reason };
        Ok(Reference {
            name: RefName::new(change.reference.display_id.clone())
                .ok_or_else(|| malformed("ref has an empty displayId".to_string()))?,
            ref_type: RefType::parse(&change.reference.ref_type),
            date: None,
            target: Target {
                hash: hash
                    .and_then(CommitHash::new)
                    .ok_or_else(|| malformed(format!("{which} is missing")))?,
                date: None,
            },
        })
    };

    Ok(match change.change_type {
        ServerChangeType::Add => RefChange::Created {
            new: side(change.to_hash.clone(), "toHash")?,
        },
        ServerChangeType::Delete => RefChange::Closed {
            old: side(change.from_hash.clone(), "fromHash")?,
        },
        ServerChangeType::Update => RefChange::Updated {
            old: Some(side(change.from_hash.clone(), "fromHash")?),
            new: side(change.to_hash.clone(), "toHash")?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ZERO: &str = "0000000000000000000000000000000000000000";

    fn document(changes: serde_json::Value) -> serde_json::Value {
        json!({
            "eventKey": "repo:refs_changed",
            "date": "2024-04-01T10:00:00+1000",
            "actor": { "name": "jane" },
            "repository": {
                "slug": "widgets",
                "name": "Widgets",
                "project": { "key": "ACME", "name": "Acme" },
                "links": {
                    "self": [ { "href": "https://bb.example.com/projects/ACME/repos/widgets/browse" } ],
                    "clone": [
                        { "href": "ssh://git@bb.example.com:7999/acme/widgets.git", "name": "ssh" },
                        { "href": "https://bb.example.com/scm/acme/widgets.git", "name": "http" }
                    ]
                }
            },
            "changes": changes
        })
    }

    fn change(name: &str, ref_type: &str, from: &str, to: &str, kind: &str) -> serde_json::Value {
        json!({
            "ref": { "id": format!("refs/heads/{name}"), "displayId": name, "type": ref_type },
            "refId": format!("refs/heads/{name}"),
            "fromHash": from,
            "toHash": to,
            "type": kind
        })
    }

    #[test]
    fn project_key_is_owner_and_project() {
        let push = parse(document(json!([]))).unwrap();
        assert_eq!(push.repository.owner.as_str(), "ACME");
        assert_eq!(push.repository.name.as_str(), "widgets");
        assert_eq!(
            push.repository.project.as_ref().map(|p| p.key.as_str()),
            Some("ACME")
        );
        assert_eq!(push.repository.self_links().map(<[String]>::len), Some(1));
        assert_eq!(
            push.repository.links.as_ref().and_then(|l| l.get("clone")).map(Vec::len),
            Some(2)
        );
    }

    #[test]
    fn add_delete_update_map_to_change_shapes() {
        let push = parse(document(json!([
            change("dev", "BRANCH", ZERO, "h1", "ADD"),
            change("old", "BRANCH", "h0", ZERO, "DELETE"),
            change("main", "BRANCH", "h2", "h3", "UPDATE"),
        ])))
        .unwrap();

        assert!(push.changes[0].is_created());
        assert_eq!(
            push.changes[0].new_ref().map(|r| r.target.hash.as_str()),
            Some("h1")
        );

        assert!(push.changes[1].is_closed());
        assert_eq!(push.changes[1].old().map(|r| r.name.as_str()), Some("old"));
        assert_eq!(
            push.changes[1].old().map(|r| r.target.hash.as_str()),
            Some("h0")
        );

        let RefChange::Updated { old: Some(old), new } = &push.changes[2] else {
            panic!("expected an update, got {:?}", push.changes[2]);
        };
        assert_eq!(old.target.hash.as_str(), "h2");
        assert_eq!(new.target.hash.as_str(), "h3");
    }

    #[test]
    fn upper_case_tag_type_is_a_tag_without_dates() {
        let push = parse(document(json!([change("v1", "TAG", ZERO, "t1", "ADD")]))).unwrap();
        let tag = push.changes[0].new_ref().unwrap();
        assert_eq!(tag.ref_type, RefType::Tag);
        assert!(tag.date.is_none());
        assert!(tag.target.date.is_none());
    }

    #[test]
    fn add_without_to_hash_is_rejected() {
        let err = parse(document(json!([{
            "ref": { "id": "refs/heads/dev", "displayId": "dev", "type": "BRANCH" },
            "fromHash": ZERO,
            "type": "ADD"
        }])))
        .unwrap_err();
        assert!(matches!(err, PayloadError::MalformedChange { index: 0, .. }));
    }

    #[test]
    fn unknown_change_type_is_a_json_error() {
        let err = parse(document(json!([change("dev", "BRANCH", "a", "b", "MERGE")]))).unwrap_err();
        assert!(matches!(err, PayloadError::Json(_)));
    }

    #[test]
    fn missing_project_is_a_json_error() {
        let err = parse(json!({ "repository": { "slug": "widgets" }, "changes": [] })).unwrap_err();
        assert!(matches!(err, PayloadError::Json(_)));
    }
}
