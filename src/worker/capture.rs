use super::{Strategy, Worker};
use crate::audio::sink::{OpenPolicy, StreamingSink};
use crate::audio::{AudioSettings, Buffer, FileFormat, InputDevice};
use crate::error::{WorkerError, WorkerKind, WorkerResult};
use crate::log_event::{self, LogEvent};
use crate::storage::{DEFAULT_PREFIX, OutputFile};
use async_trait::async_trait;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_QUEUE_DEPTH: usize = 256;

/// Where and how a capture worker writes its files.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Base directory holding every produced file.
    pub directory: PathBuf,
    pub prefix: String,
    /// Format for auto-named files and names given without an extension.
    pub format: FileFormat,
    pub settings: AudioSettings,
    /// Buffers that may wait for the writer thread before new ones are dropped.
    pub queue_depth: usize,
}

impl CaptureOptions {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            prefix: DEFAULT_PREFIX.to_string(),
            format: FileFormat::default(),
            settings: AudioSettings::default(),
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

/// Records from an input device into a streaming sink.
pub struct Capture<D: InputDevice> {
    device: D,
    options: CaptureOptions,
    file_name: Option<String>,
    current: Option<OutputFile>,
    sink: Option<StreamingSink>,
    last: Option<OutputFile>,
}

impl<D: InputDevice> Capture<D> {
    pub fn new(device: D, options: CaptureOptions) -> Self {
        Self {
            device,
            options,
            file_name: None,
            current: None,
            sink: None,
            last: None,
        }
    }

    /// Use `file_name` (e.g. `take.wav`) instead of an auto-generated name.
    /// An existing file with that name is replaced.
    pub fn set_file_name(&mut self, file_name: Option<String>) {
        self.file_name = file_name;
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    /// Most recent file produced by a completed session.
    pub fn last_output(&self) -> Option<&OutputFile> {
        self.last.as_ref()
    }

    fn prepare_directory(&self) -> WorkerResult<()> {
        let directory = &self.options.directory;
        if directory.is_dir() {
            return Ok(());
        }

        fs::create_dir_all(directory).map_err(|e| WorkerError::io(directory, e))?;
        log_event::emit(LogEvent::DirectoryCreated, directory.display());
        Ok(())
    }

    fn resolve_output(&self) -> WorkerResult<(OutputFile, OpenPolicy)> {
        let CaptureOptions {
            directory,
            prefix,
            format,
            ..
        } = &self.options;

        match &self.file_name {
            Some(file_name) => Ok((
                OutputFile::from_file_name(directory, file_name, *format)?,
                OpenPolicy::Overwrite,
            )),
            None => Ok((
                OutputFile::next_in(directory, prefix, *format),
                OpenPolicy::CreateNew,
            )),
        }
    }
}

#[async_trait(?Send)]
impl<D: InputDevice> Strategy for Capture<D> {
    type Output = OutputFile;

    fn kind(&self) -> WorkerKind {
        WorkerKind::Capture
    }

    fn target(&self) -> Option<&Path> {
        self.current.as_ref().map(|file| file.path.as_path())
    }

    async fn engage(&mut self) -> WorkerResult<()> {
        self.prepare_directory()?;
        let (file, policy) = self.resolve_output()?;

        let settings = self.options.settings;
        let stream = settings.stream_format();
        let sink = StreamingSink::open(
            &file.path,
            file.format,
            stream,
            policy,
            self.options.queue_depth,
        )?;
        let tap = sink.tap();

        self.current = Some(file);
        self.sink = Some(sink);

        self.device
            .install_tap(
                settings.buffer_size,
                stream,
                Box::new(move |buffer: &Buffer<'_>| tap.write(buffer)),
            )
            .map_err(|e| WorkerError::cannot_start(WorkerKind::Capture, format!("{:#}", e)))?;

        self.device
            .engage()
            .map_err(|e| WorkerError::cannot_start(WorkerKind::Capture, format!("{:#}", e)))
    }

    fn disengage(&mut self) {
        self.device.disengage();
    }

    fn is_engaged(&self) -> bool {
        self.device.is_engaged()
    }

    async fn rollback(&mut self) {
        self.device.disengage();

        if let Some(mut sink) = self.sink.take() {
            if let Err(e) = sink.close().await {
                tracing::warn!("Failed to close sink during rollback: {}", e);
            }
        }

        if let Some(file) = self.current.take() {
            if let Err(e) = fs::remove_file(&file.path) {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove {}: {}", file.path.display(), e);
                }
            }
        }
    }

    async fn finish(&mut self) -> WorkerResult<OutputFile> {
        let file = self
            .current
            .take()
            .ok_or_else(|| WorkerError::Finalize {
                path: self.options.directory.clone(),
                reason: "no output file attached".into(),
            })?;

        if let Some(mut sink) = self.sink.take() {
            if let Err(e) = sink.close().await {
                // Never leave a half-written file looking like a result.
                let _ = fs::remove_file(&file.path);
                return Err(e);
            }
        }

        log_event::emit(LogEvent::FileExported, file.path.display());
        self.last = Some(file.clone());
        Ok(file)
    }
}

impl<D: InputDevice> Worker<Capture<D>> {
    /// Remove the whole output directory. Missing directory is fine.
    pub fn erase(&mut self) -> WorkerResult<()> {
        if self.is_running() {
            return Err(WorkerError::AlreadyRunning(WorkerKind::Capture));
        }

        let directory = self.strategy().options.directory.clone();
        match fs::remove_dir_all(&directory) {
            Ok(()) => log_event::emit(LogEvent::DirectoryErased, directory.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(WorkerError::io(directory, e)),
        }

        self.strategy_mut().last = None;
        Ok(())
    }

    /// Remove the file produced by the last completed session, if any.
    pub fn erase_last(&mut self) -> WorkerResult<Option<OutputFile>> {
        if self.is_running() {
            return Err(WorkerError::AlreadyRunning(WorkerKind::Capture));
        }

        let Some(file) = self.strategy_mut().last.take() else {
            return Ok(None);
        };

        match fs::remove_file(&file.path) {
            Ok(()) => {
                log_event::emit(LogEvent::FileErased, file.path.display());
                Ok(Some(file))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                let path = file.path.clone();
                self.strategy_mut().last = Some(file);
                Err(WorkerError::io(path, e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::capture::tests::FakeInput;
    use crate::audio::sink::tests::ScriptedWriter;
    use crate::audio::Preset;
    use crate::error::ErrorKind;
    use crate::worker::WorkerState;
    use std::time::Duration;

    fn script(n: usize) -> Vec<Vec<f32>> {
        (0..n)
            .map(|i| vec![i as f32 / 100.0, -(i as f32) / 100.0])
            .collect()
    }

    fn recorder(dir: &Path, input: FakeInput, duration: u64) -> Worker<Capture<FakeInput>> {
        let mut options = CaptureOptions::new(dir.join("recordings"));
        options.settings = AudioSettings::from_preset(Preset::High);
        Worker::new(Capture::new(input, options), duration, Duration::from_millis(10))
    }

    fn read_f32(path: &Path) -> Vec<f32> {
        let mut reader = hound::WavReader::open(path).unwrap();
        reader.samples::<f32>().map(|s| s.unwrap()).collect()
    }

    #[tokio::test]
    async fn test_explicit_name_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = recorder(dir.path(), FakeInput::new(script(3)), 0);
        worker
            .strategy_mut()
            .set_file_name(Some("take.wav".to_string()));

        worker.start().await.unwrap();
        worker.strategy_mut().device_mut().wait_delivered();
        let file = worker.stop().await.unwrap();

        assert_eq!(file.name, "take");
        assert_eq!(file.format, FileFormat::Wav);
        assert_eq!(file.path, dir.path().join("recordings").join("take.wav"));
        assert!(file.path.exists());
        assert_eq!(worker.strategy().last_output(), Some(&file));
    }

    #[tokio::test]
    async fn test_file_contains_buffers_in_delivery_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = recorder(dir.path(), FakeInput::new(script(40)), 0);

        worker.start().await.unwrap();
        worker.strategy_mut().device_mut().wait_delivered();
        let file = worker.stop().await.unwrap();

        let expected: Vec<f32> = script(40).concat();
        assert_eq!(read_f32(&file.path), expected);
    }

    #[tokio::test]
    async fn test_auto_names_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = recorder(dir.path(), FakeInput::new(script(1)), 0);

        let mut names = Vec::new();
        for _ in 0..3 {
            worker.start().await.unwrap();
            worker.strategy_mut().device_mut().wait_delivered();
            names.push(worker.stop().await.unwrap().name);
        }
        assert_eq!(names, vec!["Record_1", "Record_2", "Record_3"]);
    }

    #[tokio::test]
    async fn test_write_failure_does_not_stop_capture() {
        let dir = tempfile::tempdir().unwrap();
        let (writer, written) = ScriptedWriter::new(vec![2]);
        let mut sink =
            StreamingSink::with_writer(&dir.path().join("a.wav"), Box::new(writer), 16);

        let mut input = FakeInput::new(script(5));
        let tap = sink.tap();
        input
            .install_tap(
                512,
                AudioSettings::default().stream_format(),
                Box::new(move |b: &Buffer<'_>| tap.write(b)),
            )
            .unwrap();
        input.engage().unwrap();
        input.wait_delivered();
        assert!(input.is_engaged());
        input.disengage();
        sink.close().await.unwrap();

        let mut expected = script(5);
        expected.remove(2);
        assert_eq!(*written.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_refused_engage_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut input = FakeInput::new(script(1));
        input.refuse_engage = true;
        let mut worker = recorder(dir.path(), input, 0);

        let err = worker.start().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EngagementFailure);
        assert_eq!(err.to_string(), "cannot record: device busy");
        assert_eq!(worker.state(), WorkerState::Idle);

        let leftovers = fs::read_dir(dir.path().join("recordings")).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_start_while_running_keeps_sink() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = recorder(dir.path(), FakeInput::new(script(4)), 0);

        worker.start().await.unwrap();
        let target = worker.strategy().target().map(Path::to_path_buf);
        assert!(matches!(
            worker.start().await,
            Err(WorkerError::AlreadyRunning(WorkerKind::Capture))
        ));
        assert_eq!(worker.strategy().target().map(Path::to_path_buf), target);

        worker.strategy_mut().device_mut().wait_delivered();
        let file = worker.stop().await.unwrap();
        assert_eq!(read_f32(&file.path), script(4).concat());
    }

    #[tokio::test]
    async fn test_stuck_device_keeps_recording() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = recorder(dir.path(), FakeInput::new(script(2)), 0);

        worker.start().await.unwrap();
        worker.strategy_mut().device_mut().wait_delivered();
        worker.strategy_mut().device_mut().stuck_engaged = true;

        let err = worker.stop().await.unwrap_err();
        assert!(matches!(err, WorkerError::CannotStop(WorkerKind::Capture)));
        assert!(worker.is_running());
        assert!(worker.strategy().last_output().is_none());

        worker.strategy_mut().device_mut().stuck_engaged = false;
        let file = worker.stop().await.unwrap();
        assert_eq!(read_f32(&file.path), script(2).concat());
    }

    #[tokio::test]
    async fn test_bounded_capture_stops_itself() {
        let dir = tempfile::tempdir().unwrap();
        let mut input = FakeInput::new(script(1000));
        input.pace = Duration::from_millis(1);
        let mut worker = recorder(dir.path(), input, 5);

        worker.start().await.unwrap();
        let file = worker.run().await.unwrap().expect("timer should stop the recorder");

        assert_eq!(worker.state(), WorkerState::Stopped);
        assert!(file.path.exists());
    }

    #[tokio::test]
    async fn test_erase_last_and_erase() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = recorder(dir.path(), FakeInput::new(script(1)), 0);

        // Nothing recorded yet: both are no-ops.
        assert_eq!(worker.erase_last().unwrap(), None);
        worker.erase().unwrap();

        worker.start().await.unwrap();
        worker.strategy_mut().device_mut().wait_delivered();
        let first = worker.stop().await.unwrap();
        worker.start().await.unwrap();
        worker.strategy_mut().device_mut().wait_delivered();
        let second = worker.stop().await.unwrap();

        assert_eq!(worker.erase_last().unwrap(), Some(second.clone()));
        assert!(!second.path.exists());
        assert!(first.path.exists());
        assert_eq!(worker.erase_last().unwrap(), None);

        worker.erase().unwrap();
        assert!(!dir.path().join("recordings").exists());
        worker.erase().unwrap();
        assert_eq!(worker.state(), WorkerState::Stopped);
    }

    #[tokio::test]
    async fn test_erase_refused_while_running() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = recorder(dir.path(), FakeInput::new(script(1)), 0);

        worker.start().await.unwrap();
        assert_eq!(
            worker.erase().unwrap_err().kind(),
            ErrorKind::LifecycleViolation
        );
        assert!(worker.erase_last().is_err());
        worker.stop().await.unwrap();
    }
}
