mod app_config;

pub use app_config::{AppConfig, GitHubConfig, LogFormat, LoggingConfig, RetryConfig};
