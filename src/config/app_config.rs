use std::time::Duration;

use serde::Deserialize;

use crate::domain::RetryPolicy;
use crate::infrastructure::github::DEFAULT_GITHUB_API_URL;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub github: GitHubConfig,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_url: String,
    pub timeout_secs: u64,
    pub per_page: u32,
    pub user_agent: String,
}

/// Backoff settings for remote calls; unset bounds mean retry forever
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub initial_interval_ms: u64,
    pub multiplier: f64,
    pub max_interval_ms: u64,
    pub randomization_factor: f64,
    pub max_attempts: Option<u32>,
    pub max_elapsed_secs: Option<u64>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
            timeout_secs: 30,
            per_page: 100,
            user_agent: concat!("github-keys/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();

        Self {
            initial_interval_ms: policy.initial_interval.as_millis() as u64,
            multiplier: policy.multiplier,
            max_interval_ms: policy.max_interval.as_millis() as u64,
            randomization_factor: policy.randomization_factor,
            max_attempts: None,
            max_elapsed_secs: None,
        }
    }
}

impl GitHubConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        let mut policy = RetryPolicy::default()
            .with_initial_interval(Duration::from_millis(self.initial_interval_ms))
            .with_multiplier(self.multiplier)
            .with_max_interval(Duration::from_millis(self.max_interval_ms))
            .with_randomization_factor(self.randomization_factor);

        if let Some(attempts) = self.max_attempts {
            policy = policy.with_max_attempts(attempts);
        }

        if let Some(secs) = self.max_elapsed_secs {
            policy = policy.with_max_elapsed(Duration::from_secs(secs));
        }

        policy
    }
}

impl AppConfig {
    /// Load `config/default`, `config/local`, then `APP__*` variables.
    /// A value that does not parse is an error, never a silent fallback.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(Self::environment())
    }

    pub fn load_from(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(environment)
            .build()?;

        config.try_deserialize()
    }

    pub fn environment() -> config::Environment {
        config::Environment::with_prefix("APP")
            .separator("__")
            .try_parsing(true)
    }
}
