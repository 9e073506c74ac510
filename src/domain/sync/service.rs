//! Sync service - one resolve, fetch, aggregate, render and write cycle

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use super::{DuplicatePolicy, KeySetBuilder, KeySink};
use crate::domain::keys::{render_authorized_keys, KeyFetcher};
use crate::domain::resolver::{MemberFilter, MemberResolver};
use crate::domain::retry::RetryPolicy;
use crate::domain::{DomainError, MembershipDirectory};

/// Immutable description of what a cycle syncs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub org: String,
    pub filter: MemberFilter,
    pub duplicates: DuplicatePolicy,
}

impl SyncSettings {
    /// Validate raw team/repo lists. Both lists set is a configuration error.
    pub fn new(
        org: impl Into<String>,
        teams: Option<&str>,
        repos: Option<&str>,
        duplicates: DuplicatePolicy,
    ) -> Result<Self, DomainError> {
        let org = org.into();

        if org.trim().is_empty() {
            return Err(DomainError::configuration("Organisation must not be empty"));
        }

        Ok(Self {
            org,
            filter: MemberFilter::from_lists(teams, repos)?,
            duplicates,
        })
    }
}

/// Outcome of a successful cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub identities: usize,
    pub keys: usize,
    pub bytes: usize,
}

pub struct SyncService<D: MembershipDirectory + ?Sized, S: KeySink + ?Sized> {
    settings: SyncSettings,
    resolver: MemberResolver<D>,
    fetcher: KeyFetcher<D>,
    sink: Arc<S>,
}

impl<D: MembershipDirectory + ?Sized, S: KeySink + ?Sized> std::fmt::Debug for SyncService<D, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncService")
            .field("settings", &self.settings)
            .field("sink", &self.sink.target())
            .finish()
    }
}

impl<D: MembershipDirectory + ?Sized, S: KeySink + ?Sized> SyncService<D, S> {
    pub fn new(
        directory: Arc<D>,
        sink: Arc<S>,
        policy: RetryPolicy,
        settings: SyncSettings,
    ) -> Self {
        Self {
            resolver: MemberResolver::new(directory.clone(), policy.clone()),
            fetcher: KeyFetcher::new(directory, policy),
            sink,
            settings,
        }
    }

    /// Run one full cycle. Any error aborts before the sink is written.
    pub async fn run_cycle(&self) -> Result<SyncReport, DomainError> {
        let started = Instant::now();
        let settings = &self.settings;

        info!(
            org = settings.org.as_str(),
            filter = %settings.filter.describe(),
            "Starting sync cycle"
        );

        let identities = self
            .resolver
            .resolve_members(&settings.org, &settings.filter)
            .await?;

        let key_set = KeySetBuilder::new(settings.duplicates)
            .build(&self.fetcher, identities)
            .await?;

        let rendered = render_authorized_keys(&key_set.keys);
        self.sink.write(&rendered).await?;

        let report = SyncReport {
            identities: key_set.identities.len(),
            keys: key_set.keys.len(),
            bytes: rendered.len(),
        };

        info!(
            target_file = %self.sink.target(),
            identities = report.identities,
            keys = report.keys,
            bytes = report.bytes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Sync cycle complete"
        );

        Ok(report)
    }
}
