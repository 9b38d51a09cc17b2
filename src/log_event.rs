use std::fmt::Display;

/// Severity understood by the log sink. `Success` is an info-level line marked
/// as a completed user-visible outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Success,
    Critical,
}

/// Every lifecycle message the workers produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEvent {
    RecordingStarted,
    RecordingStopped,
    FileExported,
    PlaybackStarted,
    PlaybackStopped,
    TimerArmed,
    AutoStop,
    BufferWriteFailed,
    BuffersDropped,
    DirectoryCreated,
    DirectoryErased,
    FileErased,
}

impl LogEvent {
    pub const fn template(self) -> &'static str {
        match self {
            Self::RecordingStarted => "Recording started",
            Self::RecordingStopped => "Recording stopped",
            Self::FileExported => "Exported file",
            Self::PlaybackStarted => "Playing started",
            Self::PlaybackStopped => "Stop playing",
            Self::TimerArmed => "Timer armed for",
            Self::AutoStop => "Time is up, stopping",
            Self::BufferWriteFailed => "Failed to write buffer, dropped",
            Self::BuffersDropped => "Buffers dropped during capture:",
            Self::DirectoryCreated => "Created output directory",
            Self::DirectoryErased => "Erased output directory",
            Self::FileErased => "Erased file",
        }
    }

    pub const fn level(self) -> Level {
        match self {
            Self::RecordingStarted
            | Self::RecordingStopped
            | Self::PlaybackStarted
            | Self::PlaybackStopped
            | Self::AutoStop
            | Self::DirectoryErased
            | Self::FileErased => Level::Info,
            Self::FileExported => Level::Success,
            Self::TimerArmed | Self::DirectoryCreated => Level::Debug,
            Self::BufferWriteFailed | Self::BuffersDropped => Level::Critical,
        }
    }
}

/// Send `event` to the log sink with an optional payload appended to its template.
pub fn emit(event: LogEvent, detail: impl Display) {
    let message = event.template();
    match event.level() {
        Level::Debug => tracing::debug!(?event, "{} {}", message, detail),
        Level::Info => tracing::info!(?event, "{} {}", message, detail),
        Level::Success => tracing::info!(?event, success = true, "{} {}", message, detail),
        Level::Critical => tracing::error!(?event, "{} {}", message, detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_failures_are_critical() {
        assert_eq!(LogEvent::BufferWriteFailed.level(), Level::Critical);
        assert_eq!(LogEvent::BuffersDropped.level(), Level::Critical);
        assert_eq!(LogEvent::FileExported.level(), Level::Success);
    }

    #[test]
    fn test_templates_are_sentences() {
        assert_eq!(LogEvent::RecordingStarted.template(), "Recording started");
        assert_eq!(LogEvent::PlaybackStopped.template(), "Stop playing");
    }
}
