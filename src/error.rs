use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which worker flavour an error or log line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerKind {
    Capture,
    Playback,
}

impl WorkerKind {
    fn verb(self) -> &'static str {
        match self {
            Self::Capture => "record",
            Self::Playback => "play",
        }
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capture => write!(f, "recorder"),
            Self::Playback => write!(f, "player"),
        }
    }
}

/// Coarse classification used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// start-while-running, stop-while-stopped, erase-while-running.
    LifecycleViolation,
    /// The audio primitive refused to engage/disengage or ended up in the wrong state.
    EngagementFailure,
    /// Missing source, unusable name, output already present, unreadable directory.
    ResourceUnavailable,
    /// Writing or finalizing the output file failed.
    IoFailure,
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("{0} is already running")]
    AlreadyRunning(WorkerKind),

    #[error("{0} is already stopped")]
    AlreadyStopped(WorkerKind),

    #[error("cannot {}: {reason}", .kind.verb())]
    CannotStart { kind: WorkerKind, reason: String },

    #[error("cannot stop {0}: device is still engaged")]
    CannotStop(WorkerKind),

    #[error("source file not found: {0:?}")]
    MissingSource(PathBuf),

    #[error("output file already exists: {0:?}")]
    AlreadyExists(PathBuf),

    #[error("unsupported file format: {0:?}")]
    UnsupportedFormat(String),

    #[error("invalid file name: {0:?}")]
    InvalidName(String),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to finalize {path:?}: {reason}")]
    Finalize { path: PathBuf, reason: String },
}

impl WorkerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyRunning(_) | Self::AlreadyStopped(_) => ErrorKind::LifecycleViolation,
            Self::CannotStart { .. } | Self::CannotStop(_) => ErrorKind::EngagementFailure,
            Self::MissingSource(_)
            | Self::AlreadyExists(_)
            | Self::UnsupportedFormat(_)
            | Self::InvalidName(_)
            | Self::Io { .. } => ErrorKind::ResourceUnavailable,
            Self::Finalize { .. } => ErrorKind::IoFailure,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn cannot_start(kind: WorkerKind, reason: impl fmt::Display) -> Self {
        Self::CannotStart {
            kind,
            reason: reason.to_string(),
        }
    }
}

pub type WorkerResult<T> = Result<T, WorkerError>;
