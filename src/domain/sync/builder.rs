//! Key set builder - aggregates keys across resolved identities

use std::collections::HashSet;

use tracing::debug;

use crate::domain::keys::{Key, KeyFetcher};
use crate::domain::{DomainError, Identity, MembershipDirectory};

/// What to do with an identity resolved more than once in a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Fetch each login once; the first occurrence keeps its position
    #[default]
    DedupeByLogin,
    /// Fetch and emit once per occurrence
    Keep,
}

/// Keys of one sync cycle, in output order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
    pub identities: Vec<Identity>,
    pub keys: Vec<Key>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KeySetBuilder {
    policy: DuplicatePolicy,
}

impl KeySetBuilder {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self { policy }
    }

    /// Apply the duplicate policy, preserving discovery order
    pub fn select_identities(&self, identities: Vec<Identity>) -> Vec<Identity> {
        match self.policy {
            DuplicatePolicy::Keep => identities,
            DuplicatePolicy::DedupeByLogin => {
                let mut seen = HashSet::new();
                identities
                    .into_iter()
                    .filter(|identity| seen.insert(identity.login().to_string()))
                    .collect()
            }
        }
    }

    /// Fetch keys identity by identity and concatenate them in order.
    ///
    /// Identical keys reached through different identities are kept.
    pub async fn build<D: MembershipDirectory + ?Sized>(
        &self,
        fetcher: &KeyFetcher<D>,
        identities: Vec<Identity>,
    ) -> Result<KeySet, DomainError> {
        let resolved = identities.len();
        let identities = self.select_identities(identities);

        if identities.len() != resolved {
            debug!(
                resolved,
                unique = identities.len(),
                "Dropped duplicate identities"
            );
        }

        let mut keys = Vec::new();
        for identity in &identities {
            keys.extend(fetcher.fetch_keys(identity).await?);
        }

        Ok(KeySet { identities, keys })
    }
}
