// Engine log sink
// Routes the engine's diagnostic output to the configured destination instead of stdout

use crate::domain::{LogDestination, Result, SolverError};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

enum Sink {
    Tracing,
    File { path: PathBuf, file: File },
    Silent,
}

/// Destination for engine diagnostics, opened once per solver
pub struct EngineLog {
    sink: Sink,
}

impl EngineLog {
    pub fn open(destination: &LogDestination) -> Result<Self> {
        let sink = match destination {
            LogDestination::Tracing => Sink::Tracing,
            LogDestination::Silent => Sink::Silent,
            LogDestination::File(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| {
                        SolverError::EngineFailure(format!(
                            "cannot open log file {}: {}",
                            path.display(),
                            e
                        ))
                    })?;
                Sink::File {
                    path: path.clone(),
                    file,
                }
            }
        };
        Ok(Self { sink })
    }

    pub fn write(&self, args: fmt::Arguments<'_>) {
        match &self.sink {
            Sink::Tracing => info!(target: "easymip::engine", "{}", args),
            Sink::File { path, file } => {
                let mut out = file;
                if let Err(e) = writeln!(out, "{}", args) {
                    warn!(
                        component = "log_sink",
                        path = %path.display(),
                        error = %e,
                        "Dropping engine log line"
                    );
                }
            }
            Sink::Silent => {}
        }
    }

    /// Path of the log file, when logging to one.
    pub fn file_path(&self) -> Option<&PathBuf> {
        match &self.sink {
            Sink::File { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn flush(&self) {
        if let Sink::File { file, .. } = &self.sink {
            let mut out = file;
            let _ = out.flush();
        }
    }
}

impl fmt::Debug for EngineLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sink {
            Sink::Tracing => write!(f, "EngineLog(tracing)"),
            Sink::File { path, .. } => write!(f, "EngineLog({})", path.display()),
            Sink::Silent => write!(f, "EngineLog(silent)"),
        }
    }
}
