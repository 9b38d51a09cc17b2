use super::format::AudioFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Low,
    #[default]
    Medium,
    High,
}

impl Preset {
    pub const fn sample_rate(self) -> u32 {
        match self {
            Self::Low => 16000,
            Self::Medium => 44100,
            Self::High => 48000,
        }
    }

    pub const fn bit_depth(self) -> u16 {
        match self {
            Self::Low => 8,
            Self::Medium => 16,
            Self::High => 32,
        }
    }

    pub const fn quality(self) -> u8 {
        match self {
            Self::Low => 32,
            Self::Medium => 64,
            Self::High => 96,
        }
    }

    /// Frames per delivered buffer.
    pub const fn buffer_size(self) -> u32 {
        match self {
            Self::Low => 256,
            Self::Medium => 512,
            Self::High => 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelLayout {
    #[default]
    Mono,
    Stereo,
}

impl ChannelLayout {
    pub const fn channels(self) -> u16 {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }
}

/// Capture settings, fixed for the lifetime of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSettings {
    pub sample_rate: u32,
    pub bit_depth: u16,
    pub channel_layout: ChannelLayout,
    pub quality: u8,
    pub buffer_size: u32,
}

impl AudioSettings {
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            sample_rate: preset.sample_rate(),
            bit_depth: preset.bit_depth(),
            channel_layout: ChannelLayout::default(),
            quality: preset.quality(),
            buffer_size: preset.buffer_size(),
        }
    }

    pub fn stream_format(&self) -> AudioFormat {
        AudioFormat {
            sample_rate: self.sample_rate,
            channels: self.channel_layout.channels(),
            bits_per_sample: self.bit_depth,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sample_rate == 0 {
            return Err(anyhow::anyhow!("sample_rate must be positive"));
        }

        if ![8, 16, 32].contains(&self.bit_depth) {
            return Err(anyhow::anyhow!(
                "bit_depth must be one of: 8, 16, 32 (got {})",
                self.bit_depth
            ));
        }

        if self.buffer_size == 0 {
            return Err(anyhow::anyhow!("buffer_size must be positive"));
        }

        Ok(())
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}
