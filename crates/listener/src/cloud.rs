//! Adapter for Cloud `repo:push` payloads.
//!
//! Only the fields the correlator needs are modelled; everything else in the
//! payload is ignored.

use std::collections::BTreeMap;

use correlation::{
    CommitHash, Links, OwnerName, Project, ProjectKey, PushEvent, RefChange, RefName, RefType,
    Reference, RepositoryIdentity, RepositoryName, Target, Timestamp,
};
use serde::Deserialize;
use tracing::debug;

use crate::PayloadError;

#[derive(Debug, Deserialize)]
struct CloudPushPayload {
    repository: CloudRepository,
    #[serde(default)]
    push: Option<CloudPush>,
}

#[derive(Debug, Deserialize)]
struct CloudRepository {
    full_name: Option<String>,
    name: Option<String>,
    owner: Option<CloudOwner>,
    project: Option<CloudProject>,
    links: Option<BTreeMap<String, CloudLink>>,
}

#[derive(Debug, Deserialize)]
struct CloudOwner {
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CloudProject {
    key: String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Href {
    href: Option<String>,
}

/// Most relations are a single object; `clone` is an array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CloudLink {
    One(Href),
    Many(Vec<Href>),
}

#[derive(Debug, Default, Deserialize)]
struct CloudPush {
    #[serde(default)]
    changes: Vec<CloudChange>,
}

#[derive(Debug, Deserialize)]
struct CloudChange {
    new: Option<CloudRef>,
    old: Option<CloudRef>,
    #[serde(default)]
    created: bool,
    #[serde(default)]
    closed: bool,
}

#[derive(Debug, Deserialize)]
struct CloudRef {
    #[serde(rename = "type")]
    ref_type: String,
    name: String,
    date: Option<String>,
    target: CloudTarget,
}

#[derive(Debug, Deserialize)]
struct CloudTarget {
    hash: String,
    date: Option<String>,
}

/// Converts a Cloud push document into a [`PushEvent`].
pub fn parse(document: serde_json::Value) -> Result<PushEvent, PayloadError> {
    let payload: CloudPushPayload = serde_json::from_value(document)?;
    let repository = repository_identity(payload.repository)?;
    let changes = payload
        .push
        .unwrap_or_default()
        .changes
        .into_iter()
        .enumerate()
        .map(|(index, change)| ref_change(index, change))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PushEvent::new(repository, changes))
}

fn repository_identity(repo: CloudRepository) -> Result<RepositoryIdentity, PayloadError> {
    // `full_name` is `owner/slug`; fall back to the discrete fields.
    let (owner, name) = match repo.full_name.as_deref().and_then(|f| f.split_once('/')) {
        Some((owner, slug)) => (Some(owner.to_string()), Some(slug.to_string())),
        None => (repo.owner.and_then(|o| o.username), repo.name),
    };
    let owner = owner
        .and_then(OwnerName::new)
        .ok_or(PayloadError::MissingField {
            field: "repository.full_name",
        })?;
    let name = name
        .and_then(RepositoryName::new)
        .ok_or(PayloadError::MissingField {
            field: "repository.full_name",
        })?;

    let project = repo.project.and_then(|p| {
        ProjectKey::new(p.key).map(|key| Project { key, name: p.name })
    });

    let links = repo.links.map(|links| {
        links
            .into_iter()
            .map(|(rel, link)| {
                let hrefs = match link {
                    CloudLink::One(href) => href.href.into_iter().collect(),
                    CloudLink::Many(hrefs) => hrefs.into_iter().filter_map(|h| h.href).collect(),
                };
                (rel, hrefs)
            })
            .collect::<Links>()
    });

    Ok(RepositoryIdentity {
        owner,
        name,
        project,
        links,
    })
}

fn ref_change(index: usize, change: CloudChange) -> Result<RefChange, PayloadError> {
    let malformed = |reason: &str| PayloadError::MalformedChange {
        index,
        reason: reason.to_string(),
    };
    let old = change.old.map(|r| reference(index, r)).transpose()?;
    let new = change.new.map(|r| reference(index, r)).transpose()?;

    match (change.created, change.closed) {
        (true, true) => Err(malformed("change is both created and closed")),
        (true, false) => new
            .map(|new| RefChange::Created { new })
            .ok_or_else(|| malformed("created change has no new reference")),
        (false, true) => old
            .map(|old| RefChange::Closed { old })
            .ok_or_else(|| malformed("closed change has no old reference")),
        (false, false) => new
            .map(|new| RefChange::Updated { old, new })
            .ok_or_else(|| malformed("updated change has no new reference")),
    }
}

fn reference(index: usize, raw: CloudRef) -> Result<Reference, PayloadError> {
    let name = RefName::new(raw.name).ok_or_else(|| PayloadError::MalformedChange {
        index,
        reason: "reference has an empty name".to_string(),
    })?;
    let hash = CommitHash::new(raw.target.hash).ok_or_else(|| PayloadError::MalformedChange {
        index,
        reason: "reference target has an empty hash".to_string(),
    })?;
    Ok(Reference {
        name,
        ref_type: RefType::parse(&raw.ref_type),
        date: parse_date(raw.date.as_deref()),
        target: Target {
            hash,
            date: parse_date(raw.target.date.as_deref()),
        },
    })
}

fn parse_date(value: Option<&str>) -> Option<Timestamp> {
    let value = value?;
    let parsed = Timestamp::parse_rfc3339(value);
    if parsed.is_none() {
        debug!(date = value, "Ignoring unparsable reference date");
    }
    parsed
}
