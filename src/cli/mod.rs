//! CLI module for github-keys
//!
//! One invocation syncs once, or keeps syncing on a fixed period with `--daemon`.

pub mod sync;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::domain::{DomainError, DuplicatePolicy, SyncSettings};

/// github-keys - Sync GitHub organisation SSH keys into an authorized_keys file
#[derive(Parser, Debug, Clone)]
#[command(name = "github-keys")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// GitHub API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Organisation members to sync
    #[arg(long)]
    pub org: String,

    /// Comma-separated list of teams within the organisation to sync
    #[arg(long)]
    pub team: Option<String>,

    /// Comma-separated list of repositories within the organisation to get collaborators
    #[arg(long)]
    pub repo: Option<String>,

    /// Authorized keys file to write to
    #[arg(long)]
    pub file: PathBuf,

    /// Enforce this owner (user name, or numeric uid:gid)
    #[arg(long)]
    pub owner: String,

    /// Run in daemon mode
    #[arg(long)]
    pub daemon: bool,

    /// How often to sync keys in daemon mode (e.g. 90s, 5m, 1h30m)
    #[arg(long, default_value = "5m", value_parser = parse_duration)]
    pub sync_period: Duration,

    /// Emit keys once per match when a user is reached through several teams or repositories
    #[arg(long)]
    pub keep_duplicates: bool,

    /// In daemon mode, log a failed cycle and wait for the next one instead of exiting
    #[arg(long, requires = "daemon")]
    pub continue_on_error: bool,
}

impl Cli {
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        if self.keep_duplicates {
            DuplicatePolicy::Keep
        } else {
            DuplicatePolicy::DedupeByLogin
        }
    }

    pub fn settings(&self) -> Result<SyncSettings, DomainError> {
        SyncSettings::new(
            self.org.clone(),
            self.team.as_deref(),
            self.repo.as_deref(),
            self.duplicate_policy(),
        )
    }
}

/// Parse a duration made of `<number><unit>` components, units `ms`, `s`, `m`, `h`
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    let mut total = Duration::ZERO;
    let mut rest = value;

    if rest.is_empty() {
        return Err("empty duration".to_string());
    }

    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return Err(format!("invalid duration {:?}: expected a number", value));
        }

        let amount: u64 = rest[..digits]
            .parse()
            .map_err(|e| format!("invalid duration {:?}: {}", value, e))?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let component = match &rest[..unit_len] {
            "ms" => Duration::from_millis(amount),
            "s" => Duration::from_secs(amount),
            "m" => Duration::from_secs(amount.saturating_mul(60)),
            "h" => Duration::from_secs(amount.saturating_mul(3600)),
            "" => return Err(format!("invalid duration {:?}: missing unit", value)),
            unit => return Err(format!("invalid duration {:?}: unknown unit {:?}", value, unit)),
        };
        rest = &rest[unit_len..];

        total += component;
    }

    if total.is_zero() {
        return Err("duration must be greater than zero".to_string());
    }

    Ok(total)
}
