use super::sink::FrameWriter;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};

/// Headerless little-endian PCM, used for the compressed-format tags since no
/// encoder is bundled. Bit depth follows the capture settings.
pub struct PcmFrameWriter {
    out: BufWriter<File>,
    bits_per_sample: u16,
    scratch: Vec<u8>,
}

impl PcmFrameWriter {
    pub fn new(out: BufWriter<File>, bits_per_sample: u16) -> Self {
        Self {
            out,
            bits_per_sample,
            scratch: Vec::new(),
        }
    }
}

impl FrameWriter for PcmFrameWriter {
    fn write_frames(&mut self, samples: &[f32]) -> Result<()> {
        self.scratch.clear();
        for &sample in samples {
            let sample = sample.clamp(-1.0, 1.0);
            match self.bits_per_sample {
                8 => self
                    .scratch
                    .extend_from_slice(&((sample * i8::MAX as f32) as i8).to_le_bytes()),
                16 => self
                    .scratch
                    .extend_from_slice(&((sample * i16::MAX as f32) as i16).to_le_bytes()),
                _ => self.scratch.extend_from_slice(&sample.to_le_bytes()),
            }
        }
        self.out
            .write_all(&self.scratch)
            .context("Failed to write PCM frames")
    }

    fn finalize(mut self: Box<Self>) -> Result<()> {
        self.out.flush().context("Failed to flush PCM stream")?;
        self.out
            .get_ref()
            .sync_all()
            .context("Failed to sync PCM stream")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_are_concatenated_little_endian() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.flac");

        let mut writer: Box<dyn FrameWriter> = Box::new(PcmFrameWriter::new(
            BufWriter::new(File::create(&path).unwrap()),
            32,
        ));
        writer.write_frames(&[0.5]).unwrap();
        writer.write_frames(&[-0.25, 1.0]).unwrap();
        writer.finalize().unwrap();

        let expected: Vec<u8> = [0.5f32, -0.25, 1.0]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        assert_eq!(std::fs::read(&path).unwrap(), expected);
    }

    #[test]
    fn test_8_bit_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp3");

        let mut writer: Box<dyn FrameWriter> = Box::new(PcmFrameWriter::new(
            BufWriter::new(File::create(&path).unwrap()),
            8,
        ));
        writer.write_frames(&[1.0, -1.0, 0.0]).unwrap();
        writer.finalize().unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), vec![127u8, 0x81, 0]);
    }
}
