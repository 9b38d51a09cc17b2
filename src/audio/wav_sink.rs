use super::format::AudioFormat;
use super::sink::FrameWriter;
use anyhow::Result;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;

/// WAV container writer.
///
/// 8 and 16 bit depths are stored as signed integer PCM, 32 bit as IEEE float.
pub struct WavFrameWriter {
    writer: WavWriter<BufWriter<File>>,
    bits_per_sample: u16,
}

impl WavFrameWriter {
    pub fn new(out: BufWriter<File>, format: AudioFormat) -> Result<Self> {
        let sample_format = if format.bits_per_sample == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        };

        let spec = WavSpec {
            channels: format.channels,
            sample_rate: format.sample_rate,
            bits_per_sample: format.bits_per_sample,
            sample_format,
        };

        let writer = WavWriter::new(out, spec)
            .map_err(|e| anyhow::anyhow!("Failed to create WAV writer: {}", e))?;

        Ok(Self {
            writer,
            bits_per_sample: format.bits_per_sample,
        })
    }
}

impl FrameWriter for WavFrameWriter {
    fn write_frames(&mut self, samples: &[f32]) -> Result<()> {
        for &sample in samples {
            let sample = sample.clamp(-1.0, 1.0);
            let written = match self.bits_per_sample {
                8 => self.writer.write_sample((sample * i8::MAX as f32) as i8),
                16 => self.writer.write_sample((sample * i16::MAX as f32) as i16),
                _ => self.writer.write_sample(sample),
            };
            written.map_err(|e| anyhow::anyhow!("Failed to write sample: {}", e))?;
        }
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<()> {
        self.writer
            .finalize()
            .map_err(|e| anyhow::anyhow!("Failed to finalize WAV: {}", e))
    }
}
