//! Sync command - runs one cycle, or cycles on a fixed period in daemon mode

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use super::Cli;
use crate::config::AppConfig;
use crate::domain::{DomainError, KeySink, MembershipDirectory, SyncService};
use crate::infrastructure::github::{GitHubDirectory, HttpClient};
use crate::infrastructure::logging;
use crate::infrastructure::sink::{FileOwner, FileSink};

/// Run the sync command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config);

    let result = execute(&cli, &config).await;

    if let Err(ref e) = result {
        error!(error = %e, "Sync aborted");
    }

    Ok(result?)
}

fn init_logging(config: &AppConfig) {
    logging::init_logging(&logging::LoggingConfig {
        level: config.logging.level.clone(),
        format: config.logging.format.clone(),
    });
}

async fn execute(cli: &Cli, config: &AppConfig) -> Result<(), DomainError> {
    // Validated before any client exists, so a bad combination never reaches the API
    let settings = cli.settings()?;
    let owner = FileOwner::parse(&cli.owner)?;

    let client = HttpClient::new(config.github.timeout(), &config.github.user_agent)?;
    let directory = Arc::new(
        GitHubDirectory::with_base_url(client, &cli.token, config.github.api_url.as_str())
            .with_per_page(config.github.per_page),
    );
    let sink = Arc::new(FileSink::new(&cli.file, owner));

    let service = SyncService::new(directory, sink, config.retry.to_policy(), settings);

    if cli.daemon {
        run_daemon(&service, cli.sync_period, cli.continue_on_error, shutdown_signal()).await
    } else {
        service.run_cycle().await.map(|_| ())
    }
}

/// Run cycles back to back on a fixed period until `shutdown` completes.
///
/// Shutdown is only observed between cycles: a running cycle always finishes
/// its write. A slow cycle delays the next tick; cycles never overlap. Without
/// `continue_on_error` the first failed cycle ends the daemon.
pub async fn run_daemon<D, S, F>(
    service: &SyncService<D, S>,
    period: Duration,
    continue_on_error: bool,
    shutdown: F,
) -> Result<(), DomainError>
where
    D: MembershipDirectory + ?Sized,
    S: KeySink + ?Sized,
    F: Future<Output = ()>,
{
    info!(period_secs = period.as_secs_f64(), continue_on_error, "Running in daemon mode");

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Daemon stopped");
                return Ok(());
            }
            _ = ticker.tick() => {}
        }

        let result = service.run_cycle().await;

        match result {
            Ok(_) => {}
            Err(e) if continue_on_error => {
                error!(error = %e, "Sync cycle failed, waiting for next tick");
            }
            Err(e) => return Err(e),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping");
        }
        _ = terminate => {
            info!("Received SIGTERM, stopping");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::pending;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use clap::Parser;
    use wiremock::matchers::any;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::domain::directory::fake::{InMemoryDirectory, LIST_ORG_MEMBERS};
    use crate::domain::sync::mock::MemorySink;
    use crate::domain::{DuplicatePolicy, RetryPolicy, SyncSettings};

    fn service<S: KeySink>(
        directory: Arc<InMemoryDirectory>,
        sink: Arc<S>,
        teams: Option<&str>,
    ) -> SyncService<InMemoryDirectory, S> {
        let settings = SyncSettings::new("acme", teams, None, DuplicatePolicy::default()).unwrap();
        SyncService::new(directory, sink, RetryPolicy::immediate(), settings)
    }

    /// Sink whose write takes a while, recording when it starts and finishes
    #[derive(Default)]
    struct SlowSink {
        events: Mutex<Vec<&'static str>>,
    }

    impl SlowSink {
        fn events(&self) -> Vec<&'static str> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl KeySink for SlowSink {
        async fn write(&self, _contents: &[u8]) -> Result<(), DomainError> {
            self.events.lock().unwrap().push("truncated");
            tokio::time::sleep(Duration::from_millis(400)).await;
            self.events.lock().unwrap().push("written");
            Ok(())
        }

        fn target(&self) -> String {
            "slow".to_string()
        }
    }

    #[tokio::test]
    async fn test_daemon_exits_on_first_failed_cycle() {
        let directory = Arc::new(InMemoryDirectory::new().with_member("alice", 1));
        let sink = Arc::new(MemorySink::new());
        let service = service(directory.clone(), sink.clone(), Some("missing"));

        let result =
            run_daemon(&service, Duration::from_millis(5), false, pending::<()>()).await;

        assert!(matches!(result, Err(DomainError::TeamNotFound { .. })));
        assert_eq!(directory.call_count(LIST_ORG_MEMBERS), 1);
        assert!(sink.writes().is_empty());
    }

    #[tokio::test]
    async fn test_daemon_keeps_going_when_asked() {
        let directory = Arc::new(InMemoryDirectory::new().with_member("alice", 1));
        let sink = Arc::new(MemorySink::new());
        let service = service(directory.clone(), sink.clone(), Some("missing"));

        let outcome = tokio::time::timeout(
            Duration::from_millis(200),
            run_daemon(&service, Duration::from_millis(5), true, pending::<()>()),
        )
        .await;

        assert!(outcome.is_err(), "daemon should still be running");
        assert!(directory.call_count(LIST_ORG_MEMBERS) >= 2);
    }

    #[tokio::test]
    async fn test_daemon_rewrites_file_every_cycle() {
        let directory = Arc::new(
            InMemoryDirectory::new()
                .with_member("alice", 1)
                .with_key("alice", 5, "ssh-rsa AAAA"),
        );
        let sink = Arc::new(MemorySink::new());
        let service = service(directory, sink.clone(), None);

        let _ = tokio::time::timeout(
            Duration::from_millis(200),
            run_daemon(&service, Duration::from_millis(5), false, pending::<()>()),
        )
        .await;

        let writes = sink.writes();
        assert!(writes.len() >= 2);
        assert!(writes.iter().all(|w| w == b"# alice - 5\nssh-rsa AAAA\n"));
    }

    #[tokio::test]
    async fn test_shutdown_during_write_lets_the_cycle_finish() {
        let directory = Arc::new(InMemoryDirectory::new().with_member("alice", 1));
        let sink = Arc::new(SlowSink::default());
        let service = service(directory, sink.clone(), None);

        let result = run_daemon(
            &service,
            Duration::from_secs(60),
            false,
            tokio::time::sleep(Duration::from_millis(100)),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(sink.events(), vec!["truncated", "written"]);
    }

    #[tokio::test]
    async fn test_shutdown_before_first_tick_runs_no_cycle() {
        let directory = Arc::new(InMemoryDirectory::new().with_member("alice", 1));
        let sink = Arc::new(MemorySink::new());
        let service = service(directory.clone(), sink.clone(), None);

        let result = run_daemon(&service, Duration::from_millis(5), false, async {}).await;

        assert!(result.is_ok());
        assert_eq!(directory.call_count(LIST_ORG_MEMBERS), 0);
        assert!(sink.writes().is_empty());
    }

    #[tokio::test]
    async fn test_conflicting_filters_are_rejected_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("authorized_keys");
        let cli = Cli::try_parse_from([
            "github-keys",
            "--token",
            "t",
            "--org",
            "acme",
            "--team",
            "ops",
            "--repo",
            "infra",
            "--file",
            file.to_str().unwrap(),
            "--owner",
            "0:0",
        ])
        .unwrap();

        let mut config = AppConfig::default();
        config.github.api_url = server.uri();

        let result = execute(&cli, &config).await;

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
        assert!(!file.exists());
        server.verify().await;
    }
}
