use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::error::{SermonError, SermonResult};

/// Append-only capture of received bytes.
///
/// The file is opened for every append and closed right after, so no
/// descriptor is held between reads.
#[derive(Debug, Clone, Default)]
pub struct CaptureLog {
    path: Option<PathBuf>,
    enabled: bool,
}

impl CaptureLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the capture at `path` and turn it on.
    pub fn start(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        info!(path = %path.display(), "Capture started");
        self.path = Some(path);
        self.enabled = true;
    }

    /// Turn a previously started capture back on.
    pub fn resume(&mut self) -> SermonResult<&Path> {
        match self.path.as_deref() {
            Some(path) => {
                self.enabled = true;
                Ok(path)
            }
            None => Err(SermonError::Capture(
                "no capture file; use %logstart FILE first".to_string(),
            )),
        }
    }

    pub fn pause(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && self.path.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append `data` if capture is on. Returns whether anything was written.
    pub fn append(&self, data: &[u8]) -> SermonResult<bool> {
        let Some(path) = self.path.as_deref().filter(|_| self.enabled) else {
            return Ok(false);
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| SermonError::Capture(format!("{}: {}", path.display(), e)))?;
        file.write_all(data)
            .and_then(|_| file.flush())
            .map_err(|e| SermonError::Capture(format!("{}: {}", path.display(), e)))?;

        debug!(len = data.len(), "Captured received bytes");
        Ok(true)
    }
}
