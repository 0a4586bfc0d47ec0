//! Harness startup, per-scenario reset and shutdown.
//!
//! ```text
//! Harness::start ──▶ Listening ──close()──▶ Closed
//!                     │    ▲
//!       begin_scenario│    │end_scenario
//!                     ▼    │
//!              (tracker reset, log sink re-pointed)
//! ```
//!
//! `close` consumes the harness, so a closed harness cannot be used again.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};

use crate::config::HarnessConfig;
use crate::http::{AppState, HarnessServer};
use crate::lifecycle::Shutdown;
use crate::net::{self, ListenerError, TlsError};
use crate::observability::{logging, LogSink};
use crate::workload::{DataManager, UploadTracker};

/// Fatal harness errors. None of these are retried.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Bind(#[from] ListenerError),

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error("server failed: {0}")]
    Serve(#[source] io::Error),

    #[error("server task failed: {0}")]
    ServerTask(#[from] JoinError),

    #[error("server did not stop within {0:?}")]
    ShutdownTimeout(Duration),

    #[error("log sink error: {0}")]
    LogSink(#[source] io::Error),
}

/// A running harness.
pub struct Harness {
    local_addr: SocketAddr,
    tls: bool,
    tracker: UploadTracker,
    dataset: DataManager,
    log_sink: &'static LogSink,
    log_file: Option<PathBuf>,
    shutdown: Shutdown,
    shutdown_timeout: Duration,
    server: Option<JoinHandle<io::Result<()>>>,
}

impl Harness {
    /// Bind, build the handler table and spawn the server.
    ///
    /// Installs the global subscriber if none is installed yet, so the
    /// per-scenario log file receives diagnostics without further wiring.
    pub async fn start(config: HarnessConfig) -> Result<Self, HarnessError> {
        logging::init(&config.observability.log_level);

        let tls = match &config.listener.tls {
            Some(tls) => Some(net::load_tls_config(tls).await?),
            None => None,
        };
        let (listener, local_addr) = net::bind(&config.listener.bind_address).await?;

        let tracker = UploadTracker::new();
        let dataset = DataManager::new();
        if let Some(size) = config.dataset.preload {
            dataset.load(size);
        }

        let shutdown_timeout = Duration::from_secs(config.lifecycle.shutdown_timeout_secs);
        let is_tls = tls.is_some();
        let server = HarnessServer::new(
            AppState {
                tracker: tracker.clone(),
                dataset: dataset.clone(),
                limits: config.limits.clone(),
            },
            tls,
            drain_deadline(shutdown_timeout),
        );

        let shutdown = Shutdown::new();
        let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

        tracing::info!(
            address = %local_addr,
            tls = is_tls,
            dataset = ?config.dataset.preload,
            "Harness listening"
        );

        Ok(Self {
            local_addr,
            tls: is_tls,
            tracker,
            dataset,
            log_sink: logging::global_sink(),
            log_file: config.observability.log_file.map(PathBuf::from),
            shutdown,
            shutdown_timeout,
            server: Some(handle),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The OS-assigned port, for client configuration.
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    pub fn is_tls(&self) -> bool {
        self.tls
    }

    /// Absolute URL for `path` (which should start with `/`).
    pub fn url(&self, path: &str) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        format!("{scheme}://{}{path}", self.local_addr)
    }

    pub fn tracker(&self) -> &UploadTracker {
        &self.tracker
    }

    pub fn dataset(&self) -> &DataManager {
        &self.dataset
    }

    pub fn log_sink(&self) -> &LogSink {
        self.log_sink
    }

    /// Reset per-scenario state.
    ///
    /// Zeroes the upload tracker and, if a log file is configured, recreates
    /// it and points the diagnostic sink at it.
    pub fn begin_scenario(&self) -> Result<(), HarnessError> {
        self.tracker.reset();
        if let Some(path) = &self.log_file {
            self.log_sink.redirect(path).map_err(HarnessError::LogSink)?;
        }
        tracing::debug!("Scenario started");
        Ok(())
    }

    /// Flush and close the scenario log file.
    pub fn end_scenario(&self) -> Result<(), HarnessError> {
        tracing::debug!(
            uploads = self.tracker.read(),
            failures = self.tracker.failures(),
            "Scenario finished"
        );
        self.close_log_file().map_err(HarnessError::LogSink)
    }

    // The sink is process-wide; a harness without a log file leaves it alone.
    fn close_log_file(&self) -> io::Result<()> {
        match self.log_file {
            Some(_) => self.log_sink.close(),
            None => Ok(()),
        }
    }

    /// Stop serving and wait for the server task.
    ///
    /// Any error from the server, a panic in its task, or a drain that
    /// outlasts `lifecycle.shutdown_timeout_secs` is returned.
    pub async fn close(mut self) -> Result<(), HarnessError> {
        let Some(mut server) = self.server.take() else {
            return Ok(());
        };

        tracing::info!(address = %self.local_addr, "Harness closing");
        self.shutdown.trigger();

        let result = match tokio::time::timeout(self.shutdown_timeout, &mut server).await {
            Err(_) => {
                server.abort();
                Err(HarnessError::ShutdownTimeout(self.shutdown_timeout))
            }
            Ok(Err(e)) => Err(HarnessError::ServerTask(e)),
            Ok(Ok(Err(e))) => Err(HarnessError::Serve(e)),
            Ok(Ok(Ok(()))) => Ok(()),
        };

        if let Err(e) = &result {
            tracing::error!(error = %e, "Harness close failed");
        }
        close_outcome(result, self.close_log_file())
    }
}

const DRAIN_MARGIN: Duration = Duration::from_secs(1);

/// Deadline for draining connections, kept strictly inside the join timeout
/// so a forced drain finishes before `close` gives up on the task.
fn drain_deadline(join_timeout: Duration) -> Duration {
    join_timeout
        .saturating_sub(DRAIN_MARGIN)
        .max(join_timeout / 2)
}

/// The server result takes precedence; a sink error is reported only when
/// the server stopped cleanly.
fn close_outcome(
    server: Result<(), HarnessError>,
    sink: io::Result<()>,
) -> Result<(), HarnessError> {
    match (server, sink) {
        (Err(e), Err(sink_err)) => {
            tracing::error!(error = %sink_err, "Failed to close log sink");
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), sink) => sink.map_err(HarnessError::LogSink),
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        if self.server.is_some() {
            self.shutdown.trigger();
        }
    }
}

impl std::fmt::Debug for Harness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness")
            .field("local_addr", &self.local_addr)
            .field("tls", &self.tls)
            .field("uploads", &self.tracker.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_and_close() {
        let harness = Harness::start(HarnessConfig::default()).await.unwrap();
        assert_ne!(harness.port(), 0);
        assert!(!harness.is_tls());
        assert_eq!(
            harness.url("/hello"),
            format!("http://127.0.0.1:{}/hello", harness.port())
        );
        harness.close().await.unwrap();
    }

    #[tokio::test]
    async fn preloads_dataset() {
        let mut config = HarnessConfig::default();
        config.dataset.preload = Some(crate::workload::DatasetSize::Short);
        let harness = Harness::start(config).await.unwrap();
        assert_eq!(harness.dataset().get_data().unwrap().len(), 500 * 1024);
        harness.close().await.unwrap();
    }

    #[tokio::test]
    async fn begin_scenario_resets_tracker() {
        let harness = Harness::start(HarnessConfig::default()).await.unwrap();
        harness.tracker().increment();
        harness.tracker().record_failure();
        harness.begin_scenario().unwrap();
        assert_eq!(harness.tracker().read(), 0);
        assert_eq!(harness.tracker().failures(), 0);
        harness.end_scenario().unwrap();
        harness.close().await.unwrap();
    }

    #[tokio::test]
    async fn scenario_log_file_is_recreated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let mut config = HarnessConfig::default();
        config.observability.log_file = Some(path.to_string_lossy().into_owned());

        let harness = Harness::start(config).await.unwrap();
        std::fs::write(&path, "stale").unwrap();

        harness.begin_scenario().unwrap();
        assert!(harness.log_sink().is_active());
        harness.tracker().increment();
        harness.end_scenario().unwrap();
        assert!(!harness.log_sink().is_active());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("stale"));
        assert!(contents.contains("Scenario started"));
        assert!(contents.contains("Scenario finished"));
        assert!(contents.contains("uploads=1"));

        harness.close().await.unwrap();
    }

    #[test]
    fn drain_finishes_inside_join_timeout() {
        for secs in [1, 2, 10, 60] {
            let join = Duration::from_secs(secs);
            let drain = drain_deadline(join);
            assert!(drain < join, "{drain:?} vs {join:?}");
            assert!(drain >= join / 2);
        }
        assert_eq!(drain_deadline(Duration::from_secs(10)), Duration::from_secs(9));
    }

    #[test]
    fn server_error_wins_over_sink_error() {
        let sink_err = || io::Error::new(io::ErrorKind::Other, "disk full");

        let outcome = close_outcome(
            Err(HarnessError::ShutdownTimeout(Duration::from_secs(1))),
            Err(sink_err()),
        );
        assert!(matches!(outcome, Err(HarnessError::ShutdownTimeout(_))));

        let outcome = close_outcome(Ok(()), Err(sink_err()));
        assert!(matches!(outcome, Err(HarnessError::LogSink(_))));

        assert!(close_outcome(Ok(()), Ok(())).is_ok());
    }

    #[tokio::test]
    async fn bind_failure_is_reported() {
        let mut config = HarnessConfig::default();
        config.listener.bind_address = "256.0.0.1:0".into();
        assert!(matches!(
            Harness::start(config).await,
            Err(HarnessError::Bind(_))
        ));
    }
}
