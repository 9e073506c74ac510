//! Membership directory domain module
//!
//! The directory is the remote source of truth: an organisation's members,
//! its teams, repository collaborators and every user's public keys.

mod provider;
mod entity;

pub use provider::MembershipDirectory;
pub use entity::{Identity, Membership, MembershipState, Page, PublicKey, Team};

#[cfg(test)]
pub use provider::MockMembershipDirectory;
#[cfg(test)]
pub use provider::fake;
