//! Membership resolver - turns an organisation and a filter into identities

use std::sync::Arc;

use tracing::{debug, info};

use super::MemberFilter;
use crate::domain::retry::{drain_pages, retry_remote, Lookup, RetryPolicy};
use crate::domain::{DomainError, Identity, MembershipDirectory, Team};

/// Resolves the identities whose keys should be synced
pub struct MemberResolver<D: MembershipDirectory + ?Sized> {
    directory: Arc<D>,
    policy: RetryPolicy,
}

impl<D: MembershipDirectory + ?Sized> std::fmt::Debug for MemberResolver<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberResolver")
            .field("policy", &self.policy)
            .finish()
    }
}

impl<D: MembershipDirectory + ?Sized> MemberResolver<D> {
    pub fn new(directory: Arc<D>, policy: RetryPolicy) -> Self {
        Self { directory, policy }
    }

    /// Resolve identities in discovery order.
    ///
    /// Duplicates are kept: an identity matching several teams or repositories
    /// appears once per match.
    pub async fn resolve_members(
        &self,
        org: &str,
        filter: &MemberFilter,
    ) -> Result<Vec<Identity>, DomainError> {
        let identities = match filter {
            MemberFilter::All => self.list_org_members(org).await?,
            MemberFilter::Teams(teams) => self.resolve_team_members(org, teams).await?,
            MemberFilter::Repos(repos) => self.resolve_collaborators(org, repos).await?,
        };

        info!(
            org,
            filter = %filter.describe(),
            count = identities.len(),
            "Resolved members"
        );

        Ok(identities)
    }

    /// Every member of the organisation, all pages merged in page order
    pub async fn list_org_members(&self, org: &str) -> Result<Vec<Identity>, DomainError> {
        let lookup = drain_pages(&self.policy, "list org members", |page| {
            self.directory.list_org_members(org, page)
        })
        .await?;

        lookup
            .found()
            .ok_or_else(|| DomainError::resolution(format!("Organisation {} not found", org)))
    }

    /// Every team of the organisation, all pages merged
    pub async fn list_teams(&self, org: &str) -> Result<Vec<Team>, DomainError> {
        drain_pages(&self.policy, "list teams", |page| {
            self.directory.list_teams(org, page)
        })
        .await?
        .found()
        .ok_or_else(|| DomainError::resolution(format!("Organisation {} not found", org)))
    }

    /// Whether `identity` is an active member of `team`. A missing membership is `false`.
    pub async fn is_active_member(
        &self,
        org: &str,
        team: &Team,
        identity: &Identity,
    ) -> Result<bool, DomainError> {
        let lookup = retry_remote(&self.policy, "get team membership", || {
            self.directory.team_membership(org, team, identity.login())
        })
        .await?;

        let active = match lookup {
            Lookup::Found(membership) => membership.is_active(),
            Lookup::NotFound => false,
        };

        debug!(team = team.name(), login = identity.login(), active, "Checked membership");
        Ok(active)
    }

    async fn resolve_team_members(
        &self,
        org: &str,
        teams: &[String],
    ) -> Result<Vec<Identity>, DomainError> {
        let members = self.list_org_members(org).await?;
        let selected = find_teams(&self.list_teams(org).await?, org, teams)?;
        let mut filtered = Vec::new();

        for team in &selected {
            for member in &members {
                if self.is_active_member(org, team, member).await? {
                    filtered.push(member.clone());
                }
            }
        }

        Ok(filtered)
    }

    async fn resolve_collaborators(
        &self,
        org: &str,
        repos: &[String],
    ) -> Result<Vec<Identity>, DomainError> {
        let mut collaborators = Vec::new();

        for repo in repos {
            let found = drain_pages(&self.policy, "list repo collaborators", |page| {
                self.directory.list_repo_collaborators(org, repo, page)
            })
            .await?
            .found()
            .ok_or_else(|| {
                DomainError::resolution(format!("Repository {}/{} not found", org, repo))
            })?;

            debug!(repo = repo.as_str(), count = found.len(), "Listed collaborators");
            collaborators.extend(found);
        }

        Ok(collaborators)
    }
}

/// Look each name up by exact, case-sensitive match, keeping the given order
pub fn find_teams(
    teams: &[Team],
    org: &str,
    names: &[String],
) -> Result<Vec<Team>, DomainError> {
    names
        .iter()
        .map(|name| {
            teams
                .iter()
                .find(|team| team.name() == name.as_str())
                .cloned()
                .ok_or_else(|| DomainError::team_not_found(name.as_str(), org))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::directory::fake::{
        InMemoryDirectory, LIST_ORG_MEMBERS, LIST_REPO_COLLABORATORS, LIST_TEAMS,
        TEAM_MEMBERSHIP,
    };
    use crate::domain::RemoteError;

    fn resolver(
        directory: InMemoryDirectory,
    ) -> (Arc<InMemoryDirectory>, MemberResolver<InMemoryDirectory>) {
        let directory = Arc::new(directory);
        let resolver = MemberResolver::new(directory.clone(), RetryPolicy::immediate());
        (directory, resolver)
    }

    fn logins(identities: &[Identity]) -> Vec<&str> {
        identities.iter().map(Identity::login).collect()
    }

    fn teams(names: &[&str]) -> MemberFilter {
        MemberFilter::Teams(names.iter().map(|n| n.to_string()).collect())
    }

    #[tokio::test]
    async fn test_all_members_drains_pages_in_order() {
        let (directory, resolver) = resolver(
            InMemoryDirectory::new()
                .with_page_size(2)
                .with_member("alice", 1)
                .with_member("bob", 2)
                .with_member("carol", 3),
        );

        let members = resolver
            .resolve_members("acme", &MemberFilter::All)
            .await
            .unwrap();

        assert_eq!(logins(&members), vec!["alice", "bob", "carol"]);
        assert_eq!(
            directory.calls(),
            vec!["list_org_members:acme:1", "list_org_members:acme:2"]
        );
    }

    #[tokio::test]
    async fn test_page_failure_is_retried_at_page_granularity() {
        let (directory, resolver) = resolver(
            InMemoryDirectory::new()
                .with_member("alice", 1)
                .with_failure(LIST_ORG_MEMBERS, RemoteError::transient("HTTP 502"))
                .with_failure(LIST_ORG_MEMBERS, RemoteError::transient("HTTP 503")),
        );

        let members = resolver
            .resolve_members("acme", &MemberFilter::All)
            .await
            .unwrap();

        assert_eq!(logins(&members), vec!["alice"]);
        assert_eq!(directory.call_count(LIST_ORG_MEMBERS), 3);
    }

    #[tokio::test]
    async fn test_team_filter_keeps_only_active_members() {
        let (_, resolver) = resolver(
            InMemoryDirectory::new()
                .with_member("alice", 1)
                .with_member("bob", 2)
                .with_member("carol", 3)
                .with_team(10, "ops")
                .with_membership("ops", "alice", "active")
                .with_membership("ops", "bob", "pending"),
        );

        let members = resolver
            .resolve_members("acme", &teams(&["ops"]))
            .await
            .unwrap();

        assert_eq!(logins(&members), vec!["alice"]);
    }

    #[tokio::test]
    async fn test_team_filter_orders_by_team_then_member() {
        let (_, resolver) = resolver(
            InMemoryDirectory::new()
                .with_member("alice", 1)
                .with_member("bob", 2)
                .with_team(10, "ops")
                .with_team(11, "dev")
                .with_membership("ops", "bob", "active")
                .with_membership("dev", "alice", "active")
                .with_membership("dev", "bob", "active"),
        );

        let members = resolver
            .resolve_members("acme", &teams(&["ops", "dev"]))
            .await
            .unwrap();

        assert_eq!(logins(&members), vec!["bob", "alice", "bob"]);
    }

    #[tokio::test]
    async fn test_team_lookup_is_case_sensitive() {
        let (directory, resolver) = resolver(
            InMemoryDirectory::new()
                .with_member("alice", 1)
                .with_team(10, "Ops"),
        );

        let result = resolver.resolve_members("acme", &teams(&["ops"])).await;

        match result {
            Err(DomainError::TeamNotFound { team, org }) => {
                assert_eq!(team, "ops");
                assert_eq!(org, "acme");
            }
            other => panic!("expected TeamNotFound, got {:?}", other),
        }
        assert_eq!(directory.call_count(TEAM_MEMBERSHIP), 0);
    }

    #[tokio::test]
    async fn test_membership_not_found_is_not_retried() {
        let (directory, resolver) = resolver(
            InMemoryDirectory::new()
                .with_member("alice", 1)
                .with_team(10, "ops"),
        );

        let members = resolver
            .resolve_members("acme", &teams(&["ops"]))
            .await
            .unwrap();

        assert!(members.is_empty());
        assert_eq!(directory.call_count(TEAM_MEMBERSHIP), 1);
    }

    #[tokio::test]
    async fn test_team_listing_is_drained() {
        let (directory, resolver) = resolver(
            InMemoryDirectory::new()
                .with_page_size(1)
                .with_team(10, "ops")
                .with_team(11, "dev"),
        );

        let teams = resolver.list_teams("acme").await.unwrap();
        let found = find_teams(&teams, "acme", &["dev".to_string()]).unwrap();

        assert_eq!(found[0].id(), 11);
        assert_eq!(directory.call_count(LIST_TEAMS), 2);
    }

    #[tokio::test]
    async fn test_team_listing_is_fetched_once_for_many_teams() {
        let (directory, resolver) = resolver(
            InMemoryDirectory::new()
                .with_page_size(1)
                .with_member("alice", 1)
                .with_team(10, "ops")
                .with_team(11, "dev")
                .with_team(12, "qa")
                .with_membership("qa", "alice", "active")
                .with_membership("ops", "alice", "active"),
        );

        let members = resolver
            .resolve_members("acme", &teams(&["qa", "dev", "ops"]))
            .await
            .unwrap();

        assert_eq!(logins(&members), vec!["alice", "alice"]);
        assert_eq!(directory.call_count(LIST_TEAMS), 3);
    }

    #[tokio::test]
    async fn test_unknown_team_is_reported_before_membership_checks() {
        let (directory, resolver) = resolver(
            InMemoryDirectory::new()
                .with_member("alice", 1)
                .with_team(10, "ops")
                .with_membership("ops", "alice", "active"),
        );

        let result = resolver
            .resolve_members("acme", &teams(&["ops", "missing"]))
            .await;

        assert!(matches!(result, Err(DomainError::TeamNotFound { .. })));
        assert_eq!(directory.call_count(TEAM_MEMBERSHIP), 0);
        assert_eq!(directory.call_count(LIST_TEAMS), 1);
    }

    #[tokio::test]
    async fn test_repo_filter_appends_collaborators_per_repo() {
        let (directory, resolver) = resolver(
            InMemoryDirectory::new()
                .with_page_size(1)
                .with_member("zed", 9)
                .with_collaborator("infra", "alice", 1)
                .with_collaborator("infra", "bob", 2)
                .with_collaborator("website", "carol", 3),
        );

        let filter = MemberFilter::Repos(vec!["infra".to_string(), "website".to_string()]);
        let members = resolver.resolve_members("acme", &filter).await.unwrap();

        assert_eq!(logins(&members), vec!["alice", "bob", "carol"]);
        assert_eq!(directory.call_count(LIST_REPO_COLLABORATORS), 3);
        assert_eq!(directory.call_count(LIST_ORG_MEMBERS), 0);
    }

    #[tokio::test]
    async fn test_unknown_repo_is_a_resolution_error() {
        let (_, resolver) = resolver(InMemoryDirectory::new());

        let filter = MemberFilter::Repos(vec!["missing".to_string()]);
        let result = resolver.resolve_members("acme", &filter).await;

        assert!(matches!(result, Err(DomainError::Resolution { .. })));
    }
}
