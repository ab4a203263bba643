//! Logging init: file under the XDG state dir, falling back to stderr.

use std::fs;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sawari=debug"))
}

fn log_file() -> Option<(std::fs::File, PathBuf)> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("sawari").ok()?;
    let path = xdg_dirs.place_state_file("sawari.log").ok()?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;
    Some((file, path))
}

/// Writer handed to tracing: a shared log file, or stderr when the state
/// dir is unavailable or the file handle cannot be cloned.
struct LogWriter(Option<std::fs::File>);

enum LogSink {
    File(std::fs::File),
    Stderr,
}

impl io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogSink::File(f) => f.write(buf),
            LogSink::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogSink::File(f) => f.flush(),
            LogSink::Stderr => io::stderr().lock().flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .as_ref()
            .and_then(|f| f.try_clone().ok())
            .map(LogSink::File)
            .unwrap_or(LogSink::Stderr)
    }
}

/// Initialize structured logging to `~/.local/state/sawari/sawari.log`,
/// or to stderr when the log file cannot be opened. Never fails; the CLI
/// must come up even on a read-only home.
pub fn init() {
    let opened = log_file();
    let path = opened.as_ref().map(|(_, p)| p.clone());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(LogWriter(opened.map(|(f, _)| f)))
        .with_ansi(false)
        .init();

    match path {
        Some(p) => tracing::info!("sawari logging initialized at {}", p.display()),
        None => tracing::warn!("state dir unavailable, logging to stderr"),
    }
}
