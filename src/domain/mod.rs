//! Domain layer - Core sync logic and entities

pub mod directory;
pub mod error;
pub mod keys;
pub mod resolver;
pub mod retry;
pub mod sync;

pub use directory::{Identity, Membership, MembershipDirectory, MembershipState, Page, PublicKey, Team};
pub use error::{DomainError, RemoteError};
pub use keys::{render_authorized_keys, Key, KeyFetcher};
pub use resolver::{MemberFilter, MemberResolver};
pub use retry::{Lookup, RetryPolicy};
pub use sync::{DuplicatePolicy, KeySink, SyncReport, SyncService, SyncSettings};

#[cfg(test)]
pub use directory::MockMembershipDirectory;
