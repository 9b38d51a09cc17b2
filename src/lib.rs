//! Timed audio capture and playback workers.
//!
//! A [`Worker`] runs one strategy at a time (recording through a
//! [`Capture`], or playing a file through a [`Playback`]) and can stop
//! itself after a fixed number of timer units. Captured buffers are streamed
//! to disk by a [`StreamingSink`]; unnamed recordings get the first free
//! `Record_<n>` name in the output directory.

pub mod audio;
pub mod config;
pub mod error;
pub mod log_event;
pub mod storage;
pub mod worker;

pub use audio::{AudioSettings, FileFormat, Preset, StreamingSink};
pub use config::Config;
pub use error::{ErrorKind, WorkerError, WorkerKind, WorkerResult};
pub use storage::OutputFile;
pub use worker::{Capture, CaptureOptions, CountdownTimer, Playback, Strategy, Worker, WorkerState};
