//! Key fetcher - expands an identity into its public keys

use std::sync::Arc;

use tracing::{debug, warn};

use super::Key;
use crate::domain::retry::{drain_pages, Lookup, RetryPolicy};
use crate::domain::{DomainError, Identity, MembershipDirectory};

pub struct KeyFetcher<D: MembershipDirectory + ?Sized> {
    directory: Arc<D>,
    policy: RetryPolicy,
}

impl<D: MembershipDirectory + ?Sized> std::fmt::Debug for KeyFetcher<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyFetcher")
            .field("policy", &self.policy)
            .finish()
    }
}

impl<D: MembershipDirectory + ?Sized> KeyFetcher<D> {
    pub fn new(directory: Arc<D>, policy: RetryPolicy) -> Self {
        Self { directory, policy }
    }

    /// All keys registered to `identity`, in remote order. No keys is not an error.
    pub async fn fetch_keys(&self, identity: &Identity) -> Result<Vec<Key>, DomainError> {
        let lookup = drain_pages(&self.policy, "list user keys", |page| {
            self.directory.list_user_keys(identity.login(), page)
        })
        .await?;

        let public_keys = match lookup {
            Lookup::Found(keys) => keys,
            Lookup::NotFound => {
                warn!(login = identity.login(), "User no longer exists, skipping keys");
                Vec::new()
            }
        };

        debug!(login = identity.login(), count = public_keys.len(), "Fetched keys");

        Ok(public_keys
            .iter()
            .map(|key| Key::for_identity(identity, key))
            .collect())
    }
}
