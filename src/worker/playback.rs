use super::Strategy;
use crate::audio::OutputDevice;
use crate::error::{WorkerError, WorkerKind, WorkerResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Plays an existing file through an output device. Nothing is written.
pub struct Playback<O: OutputDevice> {
    device: O,
    source: PathBuf,
}

impl<O: OutputDevice> Playback<O> {
    pub fn new(device: O, source: impl Into<PathBuf>) -> Self {
        Self {
            device,
            source: source.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn device(&self) -> &O {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut O {
        &mut self.device
    }
}

#[async_trait(?Send)]
impl<O: OutputDevice> Strategy for Playback<O> {
    type Output = ();

    fn kind(&self) -> WorkerKind {
        WorkerKind::Playback
    }

    fn target(&self) -> Option<&Path> {
        Some(&self.source)
    }

    async fn engage(&mut self) -> WorkerResult<()> {
        if !self.source.is_file() {
            return Err(WorkerError::MissingSource(self.source.clone()));
        }

        self.device
            .prepare(&self.source)
            .map_err(|e| WorkerError::cannot_start(WorkerKind::Playback, format!("{:#}", e)))?;

        self.device
            .engage()
            .map_err(|e| WorkerError::cannot_start(WorkerKind::Playback, format!("{:#}", e)))
    }

    fn disengage(&mut self) {
        self.device.disengage();
    }

    fn is_engaged(&self) -> bool {
        self.device.is_engaged()
    }

    async fn finish(&mut self) -> WorkerResult<()> {
        Ok(())
    }
}
