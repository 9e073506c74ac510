//! github-keys
//!
//! Synchronizes SSH public keys of a GitHub organisation into an
//! `authorized_keys` file:
//! - Members resolved from the whole organisation, selected teams, or
//!   repository collaborators
//! - Every remote call retried with exponential backoff; "not found" is an answer
//! - Deterministic rendering, whole-file writes with enforced ownership
//! - One-shot or daemon mode

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{
    render_authorized_keys, DomainError, Key, MemberFilter, RemoteError, RetryPolicy,
    SyncReport, SyncService, SyncSettings,
};
