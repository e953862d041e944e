//! Decides which watchers an incoming push is meant for.
//!
//! ## Matching rules
//!
//! A [`Navigator`] matches when all of the following hold:
//!
//! 1. **Project key.** A navigator without a key matches any project. With a
//!    key, the repository's project key must be equal (case-sensitive). A
//!    repository without a project matches any key.
//! 2. **Server URL.** A cloud navigator (no URL, or [`CLOUD_SERVER_URL`])
//!    rejects Server-variant events. A navigator with a concrete URL rejects
//!    Cloud-variant events, then requires one of the repository's `"self"`
//!    links to share its host (case-insensitive). A repository without a
//!    `"self"` relation matches any server.
//! 3. **Owner.** Equal ignoring case.
//!
//! A [`Source`] is the origin of an event when rule 2 holds and both owner and
//! repository name are equal ignoring case. The project key is not consulted.
//!
//! [`CLOUD_SERVER_URL`]: crate::CLOUD_SERVER_URL

use tracing::debug;
use url::Url;

use crate::ports::HasBranches;
use crate::watcher::is_cloud_server_url;
use crate::{
    project, Branch, ClassifiedEventType, Clock, DeliveryId, HeadRevisions, HostingVariant,
    Navigator, OriginToken, PushEvent, RepositoryName, Source, Watcher,
};

/// A classified push, ready to be offered to watchers.
#[derive(Debug, Clone)]
pub struct PushHeadEvent {
    kind: ClassifiedEventType,
    push: PushEvent,
    variant: HostingVariant,
    origin: Option<OriginToken>,
    delivery_id: DeliveryId,
}

impl PushHeadEvent {
    pub fn new(
        kind: ClassifiedEventType,
        push: PushEvent,
        variant: HostingVariant,
        origin: Option<OriginToken>,
        delivery_id: DeliveryId,
    ) -> Self {
        Self {
            kind,
            push,
            variant,
            origin,
            delivery_id,
        }
    }

    pub fn kind(&self) -> ClassifiedEventType {
        self.kind
    }

    pub fn payload(&self) -> &PushEvent {
        &self.push
    }

    pub fn variant(&self) -> HostingVariant {
        self.variant
    }

    pub fn origin(&self) -> Option<&OriginToken> {
        self.origin.as_ref()
    }

    pub fn delivery_id(&self) -> DeliveryId {
        self.delivery_id
    }

    /// Name of the repository a navigator should look up for this event.
    pub fn source_name(&self) -> &RepositoryName {
        &self.push.repository.name
    }

    /// Returns `true` if `watcher` should receive this event.
    pub fn is_applicable(&self, watcher: &Watcher) -> bool {
        match watcher {
            Watcher::Navigator(navigator) => self.is_match(navigator),
            Watcher::Source(source) => self.is_origin_of(source),
        }
    }

    /// Navigator matching: project key, then server URL, then owner.
    pub fn is_match(&self, navigator: &Navigator) -> bool {
        self.is_project_key_match(navigator)
            && self.is_server_url_match(navigator.server_url())
            && navigator
                .owner()
                .as_str()
                .eq_ignore_ascii_case(self.push.repository.owner.as_str())
    }

    /// Source matching: server URL, owner, and repository name.
    pub fn is_origin_of(&self, source: &Source) -> bool {
        let repository = &self.push.repository;
        self.is_server_url_match(source.server_url())
            && source
                .owner()
                .as_str()
                .eq_ignore_ascii_case(repository.owner.as_str())
            && source
                .repository()
                .as_str()
                .eq_ignore_ascii_case(repository.name.as_str())
    }

    /// Head → revision deltas for `source`; empty unless it is the origin.
    pub fn heads(&self, source: &Source, clock: &dyn Clock) -> HeadRevisions {
        if !self.is_origin_of(source) {
            return HeadRevisions::new();
        }
        project(&self.push, clock)
    }

    fn is_project_key_match(&self, navigator: &Navigator) -> bool {
        let Some(wanted) = navigator.project_key() else {
            return true;
        };
        match &self.push.repository.project {
            Some(project) => project.key == *wanted,
            None => true,
        }
    }

    fn is_server_url_match(&self, server_url: Option<&str>) -> bool {
        let server_url = match server_url {
            Some(url) if !is_cloud_server_url(Some(url)) => url,
            _ => return !self.variant.is_server(),
        };
        if !self.variant.is_server() {
            return false;
        }
        match self.push.repository.self_links() {
            Some(links) => links.iter().any(|href| hosts_match(server_url, href)),
            None => true,
        }
    }
}

impl HasBranches for PushHeadEvent {
    fn branches(&self, _source: &Source) -> Vec<Branch> {
        self.push.touched_branches()
    }
}

/// Free-function form of [`PushHeadEvent::is_applicable`].
pub fn is_applicable(event: &PushHeadEvent, watcher: &Watcher) -> bool {
    event.is_applicable(watcher)
}

fn parse_host(value: &str) -> Option<String> {
    match Url::parse(value) {
        Ok(url) => url.host_str().map(str::to_string),
        Err(error) => {
            debug!(url = value, %error, "Skipping unparsable URL during server match");
            None
        }
    }
}

fn hosts_match(server_url: &str, href: &str) -> bool {
    match (parse_host(server_url), parse_host(href)) {
        (Some(expected), Some(actual)) => expected.eq_ignore_ascii_case(&actual),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        CommitHash, Links, OwnerName, Project, ProjectKey, RefChange, RefName, RefType,
        Reference, RepositoryIdentity, SystemClock, Target, SELF_LINK,
    };

    fn repository(owner: &str) -> RepositoryIdentity {
        RepositoryIdentity::new(
            OwnerName::new(owner).unwrap(),
            RepositoryName::new("widgets").unwrap(),
        )
    }

    fn with_project(mut repo: RepositoryIdentity, key: &str) -> RepositoryIdentity {
        repo.project = Some(Project {
            key: ProjectKey::new(key).unwrap(),
            name: None,
        });
        repo
    }

    fn with_self_links(mut repo: RepositoryIdentity, hrefs: &[&str]) -> RepositoryIdentity {
        let mut links = Links::new();
        links.insert(
            SELF_LINK.to_string(),
            hrefs.iter().map(|h| h.to_string()).collect(),
        );
        repo.links = Some(links);
        repo
    }

    fn created(name: &str, hash: &str) -> RefChange {
        RefChange::Created {
            new: Reference {
                name: RefName::new(name).unwrap(),
                ref_type: RefType::Branch,
                date: None,
                target: Target {
                    hash: CommitHash::new(hash).unwrap(),
                    date: None,
                },
            },
        }
    }

    fn event(repo: RepositoryIdentity, variant: HostingVariant) -> PushHeadEvent {
        PushHeadEvent::new(
            ClassifiedEventType::Created,
            PushEvent::new(repo, vec![created("dev", "h1")]),
            variant,
            None,
            DeliveryId::new_random(),
        )
    }

    fn nav(owner: &str, key: Option<&str>, url: Option<&str>) -> Navigator {
        Navigator::new(owner, key, url).unwrap()
    }

    // -- project key --------------------------------------------------------

    #[test]
    fn blank_project_filter_matches_any_project() {
        let evt = event(with_project(repository("acme"), "XYZ"), HostingVariant::Cloud);
        assert!(evt.is_match(&nav("acme", None, None)));
        assert!(evt.is_match(&nav("acme", Some(""), None)));
    }

    #[test]
    fn project_filter_is_case_sensitive() {
        let evt = event(with_project(repository("acme"), "ABC"), HostingVariant::Cloud);
        assert!(evt.is_match(&nav("acme", Some("ABC"), None)));
        assert!(!evt.is_match(&nav("acme", Some("abc"), None)));
        assert!(!evt.is_match(&nav("acme", Some("DEF"), None)));
    }

    #[test]
    fn repository_without_project_matches_any_filter() {
        let evt = event(repository("acme"), HostingVariant::Cloud);
        assert!(evt.is_match(&nav("acme", Some("ABC"), None)));
    }

    // -- cloud / server exclusivity ----------------------------------------

    #[test]
    fn cloud_navigator_rejects_server_events() {
        let evt = event(repository("acme"), HostingVariant::Server);
        assert!(!evt.is_match(&nav("acme", None, None)));
        assert!(!evt.is_match(&nav("acme", None, Some(crate::CLOUD_SERVER_URL))));
    }

    #[test]
    fn cloud_navigator_accepts_cloud_events() {
        let evt = event(repository("acme"), HostingVariant::Cloud);
        assert!(evt.is_match(&nav("acme", None, Some(crate::CLOUD_SERVER_URL))));
    }

    #[test]
    fn server_navigator_rejects_cloud_events() {
        let evt = event(
            with_self_links(repository("acme"), &["https://bb.example.com/x"]),
            HostingVariant::Cloud,
        );
        assert!(!evt.is_match(&nav("acme", None, Some("https://bb.example.com"))));
    }

    // -- host matching ------------------------------------------------------

    #[test]
    fn server_navigator_matches_self_link_host_ignoring_case() {
        let evt = event(
            with_self_links(
                repository("acme"),
                &["https://BB.Example.COM/projects/ACME/repos/widgets/browse"],
            ),
            HostingVariant::Server,
        );
        assert!(evt.is_match(&nav("acme", None, Some("https://bb.example.com"))));
    }

    #[test]
    fn server_navigator_rejects_other_host() {
        let evt = event(
            with_self_links(repository("acme"), &["https://other.example.com/x"]),
            HostingVariant::Server,
        );
        assert!(!evt.is_match(&nav("acme", None, Some("https://bb.example.com"))));
    }

    #[test]
    fn unparsable_link_is_skipped_not_fatal() {
        let evt = event(
            with_self_links(
                repository("acme"),
                &["not a url", "https://bb.example.com/x"],
            ),
            HostingVariant::Server,
        );
        assert!(evt.is_match(&nav("acme", None, Some("https://bb.example.com"))));
    }

    #[test]
    fn unparsable_server_url_never_matches_links() {
        let evt = event(
            with_self_links(repository("acme"), &["https://bb.example.com/x"]),
            HostingVariant::Server,
        );
        assert!(!evt.is_match(&nav("acme", None, Some("bb.example.com"))));
    }

    #[test]
    fn missing_self_relation_matches_any_server() {
        let evt = event(repository("acme"), HostingVariant::Server);
        assert!(evt.is_match(&nav("acme", None, Some("https://bb.example.com"))));
    }

    #[test]
    fn empty_self_relation_matches_nothing() {
        let evt = event(with_self_links(repository("acme"), &[]), HostingVariant::Server);
        assert!(!evt.is_match(&nav("acme", None, Some("https://bb.example.com"))));
    }

    // -- owner --------------------------------------------------------------

    #[test]
    fn owner_comparison_ignores_case() {
        let evt = event(repository("acme"), HostingVariant::Cloud);
        assert!(evt.is_match(&nav("Acme", None, None)));
        assert!(!evt.is_match(&nav("globex", None, None)));
    }

    // -- sources ------------------------------------------------------------

    #[test]
    fn source_requires_owner_and_repository() {
        let evt = event(with_project(repository("acme"), "ABC"), HostingVariant::Cloud);
        assert!(evt.is_origin_of(&Source::new("ACME", "Widgets", None).unwrap()));
        assert!(!evt.is_origin_of(&Source::new("acme", "gadgets", None).unwrap()));
        assert!(!evt.is_origin_of(&Source::new("globex", "widgets", None).unwrap()));
    }

    #[test]
    fn non_origin_source_gets_no_heads() {
        let evt = event(repository("acme"), HostingVariant::Cloud);
        let other = Source::new("acme", "gadgets", None).unwrap();
        assert!(evt.heads(&other, &SystemClock).is_empty());

        let origin = Source::new("acme", "widgets", None).unwrap();
        assert_eq!(evt.heads(&origin, &SystemClock).len(), 1);
    }

    #[test]
    fn watcher_dispatch_uses_kind_specific_rule() {
        let evt = event(repository("acme"), HostingVariant::Cloud);
        assert!(is_applicable(
            &evt,
            &Watcher::Navigator(nav("acme", None, None))
        ));
        assert!(!is_applicable(
            &evt,
            &Watcher::Source(Source::new("acme", "gadgets", None).unwrap())
        ));
        assert_eq!(evt.source_name().as_str(), "widgets");
    }

    #[test]
    fn branches_are_the_touched_branch_list() {
        let evt = event(repository("acme"), HostingVariant::Cloud);
        let source = Source::new("acme", "widgets", None).unwrap();
        assert_eq!(evt.branches(&source), evt.payload().touched_branches());
    }
}
