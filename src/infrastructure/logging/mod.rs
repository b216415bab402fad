// Logging module - diagnostics and receive capture
pub mod capture;

pub use capture::CaptureLog;

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging system.
///
/// The terminal belongs to the UI, so diagnostics go to `trace_file`, or
/// to the cache directory when none is given. Stderr is the last resort.
pub fn init_logging(trace_file: Option<&Path>, level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sermon={},warn", level)));

    let target = trace_file.map(Path::to_path_buf).or_else(default_trace_path);
    let file = target.as_deref().and_then(|path| open_trace_file(path).ok());

    let layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    match file {
        Some(file) => tracing_subscriber::registry()
            .with(env_filter)
            .with(layer.with_ansi(false).with_writer(Mutex::new(file)))
            .try_init()?,
        None => tracing_subscriber::registry()
            .with(env_filter)
            .with(layer.with_writer(io::stderr))
            .try_init()?,
    }

    tracing::info!(trace_file = ?target, "Sermon logging system initialized");
    Ok(())
}

/// `<cache dir>/sermon/sermon.log`
pub fn default_trace_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("sermon").join("sermon.log"))
}

fn open_trace_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
