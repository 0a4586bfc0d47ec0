//! Structured logging.
//!
//! # Responsibilities
//! - Install the global `tracing` subscriber (stderr + diagnostic sink)
//! - Provide a log sink that can be re-pointed at a new file per scenario
//!
//! There is one sink per process, matching the one global subscriber. Two
//! harnesses with a log file configured in the same process share it.
//!
//! # Design Decisions
//! - The sink always captures debug level, independent of the stderr filter
//! - A sink with no file attached discards output
//! - Closing the sink flushes buffered output before the file is released

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use arc_swap::ArcSwapOption;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

type SinkFile = Mutex<BufWriter<File>>;

/// Re-pointable diagnostic log destination.
///
/// Cloning yields another handle to the same destination.
#[derive(Clone, Default)]
pub struct LogSink {
    target: Arc<ArcSwapOption<SinkFile>>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (truncating) `path` and send all further output there.
    ///
    /// A previously attached file is flushed and released.
    pub fn redirect(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        let previous = self
            .target
            .swap(Some(Arc::new(Mutex::new(BufWriter::new(file)))));
        if let Some(previous) = previous {
            flush(&previous)?;
        }
        tracing::debug!(path = %path.display(), "Log sink redirected");
        Ok(())
    }

    /// Flush and detach the current file, if any.
    pub fn close(&self) -> io::Result<()> {
        match self.target.swap(None) {
            Some(previous) => flush(&previous),
            None => Ok(()),
        }
    }

    /// Whether a file is currently attached.
    pub fn is_active(&self) -> bool {
        self.target.load().is_some()
    }
}

impl std::fmt::Debug for LogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSink")
            .field("active", &self.is_active())
            .finish()
    }
}

fn flush(file: &SinkFile) -> io::Result<()> {
    file.lock().unwrap_or_else(PoisonError::into_inner).flush()
}

/// Writer handed out per event by [`LogSink`].
pub struct LogSinkWriter {
    target: Option<Arc<SinkFile>>,
}

impl Write for LogSinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.target {
            Some(file) => file.lock().unwrap_or_else(PoisonError::into_inner).write(buf),
            None => Ok(buf.len()),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match &self.target {
            Some(file) => file
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .write_all(buf),
            None => Ok(()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &self.target {
            Some(file) => flush(file),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = LogSinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogSinkWriter {
            target: self.target.load_full(),
        }
    }
}

/// The process-wide sink the global subscriber writes to.
pub fn global_sink() -> &'static LogSink {
    static SINK: OnceLock<LogSink> = OnceLock::new();
    SINK.get_or_init(LogSink::new)
}

/// Install the global subscriber.
///
/// Stderr output honours `RUST_LOG`, falling back to `default_level` for this
/// crate and tower-http. [`global_sink`] receives debug output regardless.
/// Does nothing if a global subscriber is already installed.
pub fn init(default_level: &str) {
    let stderr_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("transfer_harness={default_level},tower_http={default_level}").into()
    });
    let sink_filter = EnvFilter::new("transfer_harness=debug,tower_http=debug");

    let installed = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_filter(stderr_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(global_sink().clone())
                .with_filter(sink_filter),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(level = default_level, "Logging initialised");
    }
}
