//! Member filter - which part of the organisation to sync

use crate::domain::DomainError;

/// Scope of a sync. Teams and repositories are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MemberFilter {
    /// Every member of the organisation
    #[default]
    All,
    /// Active members of the listed teams, in listing order
    Teams(Vec<String>),
    /// Collaborators of the listed repositories, in listing order
    Repos(Vec<String>),
}

impl MemberFilter {
    /// Build a filter from comma-separated team and repository lists.
    ///
    /// Fails when both lists are non-empty.
    pub fn from_lists(teams: Option<&str>, repos: Option<&str>) -> Result<Self, DomainError> {
        let teams = teams.map(split_list).unwrap_or_default();
        let repos = repos.map(split_list).unwrap_or_default();

        match (teams.is_empty(), repos.is_empty()) {
            (true, true) => Ok(Self::All),
            (false, true) => Ok(Self::Teams(teams)),
            (true, false) => Ok(Self::Repos(repos)),
            (false, false) => Err(DomainError::configuration(
                "Can not specify both --team and --repo flags",
            )),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::All => "all organisation members".to_string(),
            Self::Teams(teams) => format!("teams [{}]", teams.join(", ")),
            Self::Repos(repos) => format!("repositories [{}]", repos.join(", ")),
        }
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
