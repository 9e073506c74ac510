//! Snapshot types returned by the membership directory

use serde::{Deserialize, Serialize};

/// A remote user handle (login + numeric id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    login: String,
    id: u64,
}

impl Identity {
    pub fn new(login: impl Into<String>, id: u64) -> Self {
        Self {
            login: login.into(),
            id,
        }
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.login)
    }
}

/// A named group within an organisation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    id: u64,
    name: String,
    slug: String,
}

impl Team {
    pub fn new(id: u64, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// URL-safe identifier used by the remote API
    pub fn slug(&self) -> &str {
        &self.slug
    }
}

/// State of an identity's membership in a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipState {
    Active,
    Pending,
    /// Any state the remote reports that we don't model
    Unknown(String),
}

impl MembershipState {
    /// Parse a remote state string. Matching is exact: only `"active"` is active.
    pub fn parse(state: &str) -> Self {
        match state {
            "active" => Self::Active,
            "pending" => Self::Pending,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for MembershipState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Pending => write!(f, "pending"),
            Self::Unknown(state) => write!(f, "{}", state),
        }
    }
}

/// Relation between an identity and a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub state: MembershipState,
}

impl Membership {
    pub fn new(state: MembershipState) -> Self {
        Self { state }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

/// A public key as registered on the remote, before a comment is synthesized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    pub id: u64,
    pub key: String,
}

impl PublicKey {
    pub fn new(id: u64, key: impl Into<String>) -> Self {
        Self {
            id,
            key: key.into(),
        }
    }
}

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor of the following page, `None` on the last page
    pub next_page: Option<u32>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page: None,
        }
    }

    pub fn with_next(items: Vec<T>, next_page: u32) -> Self {
        Self {
            items,
            next_page: Some(next_page),
        }
    }
}
