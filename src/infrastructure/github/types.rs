//! GitHub REST API payloads (only the fields we read)

use serde::Deserialize;

use crate::domain::{Identity, Membership, MembershipState, PublicKey, Team};

#[derive(Debug, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    pub id: u64,
}

impl From<GitHubUser> for Identity {
    fn from(user: GitHubUser) -> Self {
        Identity::new(user.login, user.id)
    }
}

#[derive(Debug, Deserialize)]
pub struct GitHubTeam {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

impl From<GitHubTeam> for Team {
    fn from(team: GitHubTeam) -> Self {
        Team::new(team.id, team.name, team.slug)
    }
}

#[derive(Debug, Deserialize)]
pub struct GitHubMembership {
    #[serde(default)]
    pub state: String,
}

impl From<GitHubMembership> for Membership {
    fn from(membership: GitHubMembership) -> Self {
        Membership::new(MembershipState::parse(&membership.state))
    }
}

#[derive(Debug, Deserialize)]
pub struct GitHubKey {
    pub id: u64,
    pub key: String,
}

impl From<GitHubKey> for PublicKey {
    fn from(key: GitHubKey) -> Self {
        PublicKey::new(key.id, key.key)
    }
}
