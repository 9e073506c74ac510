use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;

use super::http_client::HttpClientTrait;
use super::types::{GitHubKey, GitHubMembership, GitHubTeam, GitHubUser};
use crate::domain::{
    Identity, Membership, MembershipDirectory, Page, PublicKey, RemoteError, Team,
};

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";
const DEFAULT_PER_PAGE: u32 = 100;

/// Membership directory backed by the GitHub REST API
#[derive(Debug)]
pub struct GitHubDirectory<C: HttpClientTrait> {
    client: C,
    authorization: String,
    base_url: String,
    per_page: u32,
}

impl<C: HttpClientTrait> GitHubDirectory<C> {
    pub fn new(client: C, token: impl AsRef<str>) -> Self {
        Self::with_base_url(client, token, DEFAULT_GITHUB_API_URL)
    }

    pub fn with_base_url(
        client: C,
        token: impl AsRef<str>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            authorization: format!("Bearer {}", token.as_ref()),
            base_url,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, 100);
        self
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.authorization.as_str()),
            ("Accept", "application/vnd.github+json"),
            ("X-GitHub-Api-Version", GITHUB_API_VERSION),
        ]
    }

    /// Build `<base>/<segments...>`, percent-encoding each segment
    fn endpoint(&self, segments: &[&str], page: Option<u32>) -> Result<String, RemoteError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| RemoteError::other(format!("Invalid API URL {}: {}", self.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| RemoteError::other(format!("API URL {} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);

        if let Some(page) = page {
            url.query_pairs_mut()
                .append_pair("per_page", &self.per_page.to_string())
                .append_pair("page", &page.to_string());
        }

        Ok(url.into())
    }

    async fn get_page<T, R>(&self, segments: &[&str], page: u32) -> Result<Page<R>, RemoteError>
    where
        T: DeserializeOwned,
        R: From<T>,
    {
        let url = self.endpoint(segments, Some(page))?;
        let response = self.client.get_json(&url, self.headers()).await?;

        let items: Vec<T> = parse_body(response.body)?;

        Ok(Page {
            items: items.into_iter().map(R::from).collect(),
            next_page: response.next_page,
        })
    }
}

fn parse_body<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, RemoteError> {
    serde_json::from_value(body)
        .map_err(|e| RemoteError::other(format!("Failed to parse response: {}", e)))
}

#[async_trait]
impl<C: HttpClientTrait> MembershipDirectory for GitHubDirectory<C> {
    async fn list_org_members(&self, org: &str, page: u32) -> Result<Page<Identity>, RemoteError> {
        self.get_page::<GitHubUser, _>(&["orgs", org, "members"], page)
            .await
    }

    async fn list_teams(&self, org: &str, page: u32) -> Result<Page<Team>, RemoteError> {
        self.get_page::<GitHubTeam, _>(&["orgs", org, "teams"], page)
            .await
    }

    async fn team_membership(
        &self,
        org: &str,
        team: &Team,
        login: &str,
    ) -> Result<Membership, RemoteError> {
        let url = self.endpoint(
            &["orgs", org, "teams", team.slug(), "memberships", login],
            None,
        )?;
        let response = self.client.get_json(&url, self.headers()).await?;

        let membership: GitHubMembership = parse_body(response.body)?;
        Ok(membership.into())
    }

    async fn list_repo_collaborators(
        &self,
        org: &str,
        repo: &str,
        page: u32,
    ) -> Result<Page<Identity>, RemoteError> {
        self.get_page::<GitHubUser, _>(&["repos", org, repo, "collaborators"], page)
            .await
    }

    async fn list_user_keys(&self, login: &str, page: u32) -> Result<Page<PublicKey>, RemoteError> {
        self.get_page::<GitHubKey, _>(&["users", login, "keys"], page)
            .await
    }
}
