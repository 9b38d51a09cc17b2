use super::format::{AudioFormat, FileFormat};
use super::pcm_sink::PcmFrameWriter;
use super::wav_sink::WavFrameWriter;
use crate::error::{WorkerError, WorkerResult};
use crate::log_event::{self, LogEvent};
use anyhow::Result;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// One delivery from the input device. Borrowed for the duration of a single
/// write; the sink copies the samples it keeps.
#[derive(Debug, Clone, Copy)]
pub struct Buffer<'a> {
    /// Interleaved samples, `frames * channels` long.
    pub samples: &'a [f32],
    /// Offset of the first frame from the start of the session.
    pub timestamp: Duration,
}

/// Encodes sample frames into an open destination.
///
/// Implementations run on the sink's writer thread, never on the audio thread.
pub trait FrameWriter: Send {
    fn write_frames(&mut self, samples: &[f32]) -> Result<()>;

    /// Flush and close the destination
    fn finalize(self: Box<Self>) -> Result<()>;
}

/// What to do when the destination already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenPolicy {
    /// Fail with `AlreadyExists`.
    CreateNew,
    /// Remove the stale file and start over.
    Overwrite,
}

enum SinkCommand {
    Write(Vec<f32>),
    Close { reply: oneshot::Sender<Result<()>> },
}

/// Persists delivered buffers to one destination file.
///
/// Writes are queued on a bounded channel and drained in order by a dedicated
/// thread, so the delivering thread never touches the file system and never
/// waits. A buffer that does not fit in the queue, or that the writer fails on,
/// is dropped on its own; the rest of the stream is unaffected.
pub struct StreamingSink {
    path: PathBuf,
    tx: Option<mpsc::Sender<SinkCommand>>,
    overflowed: Arc<AtomicU64>,
}

impl StreamingSink {
    pub fn open(
        destination: &Path,
        file_format: FileFormat,
        stream: AudioFormat,
        policy: OpenPolicy,
        queue_depth: usize,
    ) -> WorkerResult<Self> {
        let file = create_destination(destination, policy)?;
        let out = BufWriter::new(file);

        let writer: Box<dyn FrameWriter> = if file_format.has_container() {
            Box::new(
                WavFrameWriter::new(out, stream)
                    .map_err(|e| WorkerError::io(destination, io::Error::other(e)))?,
            )
        } else {
            Box::new(PcmFrameWriter::new(out, stream.bits_per_sample))
        };

        Ok(Self::with_writer(destination, writer, queue_depth))
    }

    /// Start a sink around an already-open writer.
    pub fn with_writer(
        destination: &Path,
        mut writer: Box<dyn FrameWriter>,
        queue_depth: usize,
    ) -> Self {
        let (tx, mut rx) = mpsc::channel(queue_depth.max(1));
        let path = destination.to_path_buf();
        let label = path.display().to_string();

        std::thread::spawn(move || {
            let mut index: u64 = 0;
            while let Some(cmd) = rx.blocking_recv() {
                match cmd {
                    SinkCommand::Write(samples) => {
                        if let Err(e) = writer.write_frames(&samples) {
                            log_event::emit(
                                LogEvent::BufferWriteFailed,
                                format_args!("#{} in {}: {}", index, label, e),
                            );
                        }
                        index += 1;
                    }
                    SinkCommand::Close { reply } => {
                        let _ = reply.send(writer.finalize());
                        return;
                    }
                }
            }
        });

        Self {
            path,
            tx: Some(tx),
            overflowed: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Handle for the delivery thread.
    pub fn tap(&self) -> SinkTap {
        SinkTap {
            tx: self.tx.clone(),
            overflowed: self.overflowed.clone(),
        }
    }

    pub fn write(&self, buffer: &Buffer<'_>) {
        self.tap().write(buffer);
    }

    /// Buffers dropped because the writer thread fell behind.
    pub fn overflowed(&self) -> u64 {
        self.overflowed.load(Ordering::Relaxed)
    }

    /// Flush everything queued so far and finalize the file. Calling it again is a no-op.
    pub async fn close(&mut self) -> WorkerResult<()> {
        let Some(tx) = self.tx.take() else {
            return Ok(());
        };

        let finalize_failed = |reason: String| WorkerError::Finalize {
            path: self.path.clone(),
            reason,
        };

        let (reply, rx) = oneshot::channel();
        tx.send(SinkCommand::Close { reply })
            .await
            .map_err(|e| finalize_failed(format!("writer thread is gone: {}", e)))?;

        rx.await
            .map_err(|e| finalize_failed(format!("no reply from writer thread: {}", e)))?
            .map_err(|e| finalize_failed(e.to_string()))?;

        let overflowed = self.overflowed();
        if overflowed > 0 {
            log_event::emit(
                LogEvent::BuffersDropped,
                format_args!("{} ({})", overflowed, self.path.display()),
            );
        }

        Ok(())
    }
}

/// Cloneable, `Send` write handle given to the audio callback.
#[derive(Clone)]
pub struct SinkTap {
    tx: Option<mpsc::Sender<SinkCommand>>,
    overflowed: Arc<AtomicU64>,
}

impl SinkTap {
    /// Queue a copy of `buffer`. Never blocks and never logs.
    pub fn write(&self, buffer: &Buffer<'_>) {
        let queued = self
            .tx
            .as_ref()
            .is_some_and(|tx| tx.try_send(SinkCommand::Write(buffer.samples.to_vec())).is_ok());

        if !queued {
            self.overflowed.fetch_add(1, Ordering::Relaxed);
        }
    }
}

fn create_destination(destination: &Path, policy: OpenPolicy) -> WorkerResult<File> {
    match policy {
        OpenPolicy::CreateNew => OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(destination)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => {
                    WorkerError::AlreadyExists(destination.to_path_buf())
                }
                _ => WorkerError::io(destination, e),
            }),
        OpenPolicy::Overwrite => {
            if destination.exists() {
                fs::remove_file(destination).map_err(|e| WorkerError::io(destination, e))?;
            }
            File::create(destination).map_err(|e| WorkerError::io(destination, e))
        }
    }
}
