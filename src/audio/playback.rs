use anyhow::{Context, Result};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Hardware (or simulated) playback primitive.
pub trait OutputDevice {
    /// Load and decode `source`, ready to start.
    fn prepare(&mut self, source: &Path) -> Result<()>;

    fn engage(&mut self) -> Result<()>;

    fn disengage(&mut self);

    fn is_engaged(&self) -> bool;
}

/// Default system output device through rodio.
#[derive(Default)]
pub struct RodioOutput {
    stream: Option<OutputStream>,
    sink: Option<Sink>,
}

impl RodioOutput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputDevice for RodioOutput {
    fn prepare(&mut self, source: &Path) -> Result<()> {
        let file = File::open(source)
            .with_context(|| format!("Failed to open {}", source.display()))?;
        let decoder = Decoder::new(BufReader::new(file))
            .with_context(|| format!("Failed to decode {}", source.display()))?;

        let mut stream =
            OutputStreamBuilder::open_default_stream().context("Failed to open output stream")?;
        stream.log_on_drop(false);

        let sink = Sink::connect_new(stream.mixer());
        sink.pause();
        sink.append(decoder);

        self.sink = Some(sink);
        self.stream = Some(stream);
        Ok(())
    }

    fn engage(&mut self) -> Result<()> {
        let sink = self.sink.as_ref().context("Nothing prepared to play")?;
        sink.play();
        Ok(())
    }

    fn disengage(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.stream = None;
    }

    fn is_engaged(&self) -> bool {
        self.sink
            .as_ref()
            .is_some_and(|sink| !sink.is_paused() && !sink.empty())
    }
}
