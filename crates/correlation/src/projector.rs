//! Projects the changes of a push onto head → revision deltas.

use crate::{build_head, Clock, Head, HeadRevisions, PushEvent, RefChange, Revision};

/// Maps every change of `push` to the head it affects.
///
/// Closures always yield a branch head with no revision, whatever the type
/// tag of the deleted reference. Later changes to the same head overwrite
/// earlier ones.
pub fn project(push: &PushEvent, clock: &dyn Clock) -> HeadRevisions {
    let mut result = HeadRevisions::new();
    for change in &push.changes {
        match change {
            RefChange::Closed { old } => {
                result.insert(Head::branch(old.name.clone()), None);
            }
            RefChange::Created { new } | RefChange::Updated { new, .. } => {
                let head = build_head(new, clock);
                let revision = Revision::new(head.clone(), new.target.hash.clone());
                result.insert(head, Some(revision));
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        CommitHash, OwnerName, RefName, RefType, Reference, RepositoryIdentity, RepositoryName,
        SystemClock, Target, Timestamp,
    };

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

    fn push(changes: Vec<RefChange>) -> PushEvent {
        PushEvent::new(
            RepositoryIdentity::new(
                OwnerName::new("acme").unwrap(),
                RepositoryName::new("widgets").unwrap(),
            ),
            changes,
        )
    }

    fn branch(name: &str) -> Head {
        Head::branch(RefName::new(name).unwrap())
    }

    #[test]
    fn closure_yields_branch_without_revision() {
        let heads = project(
            &push(vec![RefChange::Closed {
                old: reference("release-1", RefType::Branch, "h0"),
            }]),
            &SystemClock,
        );
        assert_eq!(heads.len(), 1);
        assert_eq!(heads.get(&branch("release-1")), Some(&None));
    }

    #[test]
    fn closed_tag_is_still_projected_as_branch() {
        let heads = project(
            &push(vec![RefChange::Closed {
                old: reference("v1", RefType::Tag, "h0"),
            }]),
            &SystemClock,
        );
        assert_eq!(heads.get(&branch("v1")), Some(&None));
    }

    #[test]
    fn creation_yields_revision_of_target() {
        let heads = project(
            &push(vec![RefChange::Created {
                new: reference("feature-x", RefType::Branch, "abc123"),
            }]),
            &SystemClock,
        );
        let head = branch("feature-x");
        assert_eq!(
            heads.get(&head),
            Some(&Some(Revision::new(
                head.clone(),
                CommitHash::new("abc123").unwrap()
            )))
        );
    }

    #[test]
    fn created_tag_carries_target_date() {
        let date = Timestamp::parse_rfc3339("2024-05-05T05:05:05Z").unwrap();
        let mut tag = reference("v2", RefType::Tag, "t1");
        tag.target.date = Some(date);

        let heads = project(&push(vec![RefChange::Created { new: tag }]), &SystemClock);
        let stored = heads.get_head(&Head::tag(RefName::new("v2").unwrap(), 0)).unwrap();
        assert!(matches!(stored, Head::Tag { timestamp_millis, .. } if *timestamp_millis == date.as_millis()));
    }

    #[test]
    fn mixed_push_projects_every_change() {
        let heads = project(
            &push(vec![
                RefChange::Created {
                    new: reference("dev", RefType::Branch, "h1"),
                },
                RefChange::Closed {
                    old: reference("old", RefType::Branch, "h0"),
                },
            ]),
            &SystemClock,
        );
        assert_eq!(heads.len(), 2);
        assert_eq!(
            heads.get(&branch("dev")),
            Some(&Some(Revision::new(branch("dev"), CommitHash::new("h1").unwrap())))
        );
        assert_eq!(heads.get(&branch("old")), Some(&None));
    }

    #[test]
    fn later_change_overwrites_earlier_for_same_head() {
        let heads = project(
            &push(vec![
                RefChange::Created {
                    new: reference("dev", RefType::Branch, "h1"),
                },
                RefChange::Closed {
                    old: reference("dev", RefType::Branch, "h1"),
                },
            ]),
            &SystemClock,
        );
        assert_eq!(heads.len(), 1);
        assert_eq!(heads.get(&branch("dev")), Some(&None));
    }
}
