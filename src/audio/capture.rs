use super::format::AudioFormat;
use super::sink::Buffer;
use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, StreamConfig};
use std::time::Duration;

/// Callback receiving every buffer the input device delivers, on the device's thread.
pub type Tap = Box<dyn FnMut(&Buffer<'_>) + Send + 'static>;

/// Hardware (or simulated) capture primitive.
pub trait InputDevice {
    /// Register `tap` for the next engagement. Replaces any previous tap.
    fn install_tap(&mut self, buffer_size: u32, format: AudioFormat, tap: Tap) -> Result<()>;

    fn engage(&mut self) -> Result<()>;

    /// Stop delivering buffers. The installed tap is released.
    fn disengage(&mut self);

    fn is_engaged(&self) -> bool;
}

/// Default system input device through cpal.
///
/// Holds a `cpal::Stream`, which is !Send, so the owning worker must stay on
/// a LocalSet.
#[derive(Default)]
pub struct CpalInput {
    stream: Option<cpal::Stream>,
    engaged: bool,
}

impl CpalInput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputDevice for CpalInput {
    fn install_tap(&mut self, buffer_size: u32, format: AudioFormat, mut tap: Tap) -> Result<()> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .context("No input audio device available")?;

        let config = StreamConfig {
            channels: format.channels,
            sample_rate: SampleRate(format.sample_rate),
            buffer_size: BufferSize::Fixed(buffer_size),
        };

        let channels = format.channels.max(1) as u64;
        let rate = format.sample_rate as f64;
        let mut frames: u64 = 0;

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                    let timestamp = Duration::from_secs_f64(frames as f64 / rate);
                    tap(&Buffer {
                        samples: data,
                        timestamp,
                    });
                    frames += data.len() as u64 / channels;
                },
                move |err| {
                    tracing::error!("Audio stream error: {}", err);
                },
                None,
            )
            .context("Failed to build input stream")?;

        self.stream = Some(stream);
        Ok(())
    }

    fn engage(&mut self) -> Result<()> {
        let stream = self.stream.as_ref().context("No tap installed")?;
        stream.play().context("Failed to start audio stream")?;
        self.engaged = true;
        Ok(())
    }

    fn disengage(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                tracing::warn!("Failed to pause audio stream: {}", e);
            }
        }
        self.engaged = false;
    }

    fn is_engaged(&self) -> bool {
        self.engaged
    }
}
