use thiserror::Error;

/// Failure reported by a single remote lookup.
///
/// The kind decides how the retry wrapper treats it: `NotFound` is a definite
/// negative answer, everything else is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Transient remote error: {message}")]
    Transient { message: String },

    #[error("Remote error: {message}")]
    Other { message: String },
}

impl RemoteError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Core domain errors. Any of these aborts the current sync cycle.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Team {team} not part of organisation {org}")]
    TeamNotFound { team: String, org: String },

    #[error("Resolution error: {message}")]
    Resolution { message: String },

    #[error("{operation} gave up after {attempts} attempts: {last_error}")]
    RetryExhausted {
        operation: String,
        attempts: u32,
        last_error: RemoteError,
    },

    #[error("Sink error: {message}")]
    Sink { message: String },
}

impl DomainError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn team_not_found(team: impl Into<String>, org: impl Into<String>) -> Self {
        Self::TeamNotFound {
            team: team.into(),
            org: org.into(),
        }
    }

    pub fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution {
            message: message.into(),
        }
    }

    pub fn sink(message: impl Into<String>) -> Self {
        Self::Sink {
            message: message.into(),
        }
    }
}
