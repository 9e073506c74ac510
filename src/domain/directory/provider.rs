use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{Identity, Membership, Page, PublicKey, Team};
use crate::domain::RemoteError;

/// Remote membership graph (an organisation's members, teams, collaborators and keys).
///
/// Each method performs exactly one remote call. Listings are paginated starting
/// at page 1; callers follow `Page::next_page` until it is `None`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MembershipDirectory: Send + Sync {
    /// One page of the organisation's members
    async fn list_org_members(&self, org: &str, page: u32) -> Result<Page<Identity>, RemoteError>;

    /// One page of the organisation's teams
    async fn list_teams(&self, org: &str, page: u32) -> Result<Page<Team>, RemoteError>;

    /// Membership of `login` in `team`. `NotFound` means "not a member".
    async fn team_membership(
        &self,
        org: &str,
        team: &Team,
        login: &str,
    ) -> Result<Membership, RemoteError>;

    /// One page of a repository's collaborators
    async fn list_repo_collaborators(
        &self,
        org: &str,
        repo: &str,
        page: u32,
    ) -> Result<Page<Identity>, RemoteError>;

    /// One page of the public keys registered to `login`
    async fn list_user_keys(&self, login: &str, page: u32) -> Result<Page<PublicKey>, RemoteError>;
}
