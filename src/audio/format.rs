use crate::error::WorkerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// PCM layout of the stream flowing from the input device into the sink.
///
/// Devices always deliver `f32` samples; `bits_per_sample` only controls what
/// ends up on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 1,
            bits_per_sample: 16,
        }
    }
}

/// Container/codec tag of an output file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Mp3,
    #[default]
    Wav,
    Flac,
    Aac,
}

impl FileFormat {
    pub const ALL: [FileFormat; 4] = [Self::Mp3, Self::Wav, Self::Flac, Self::Aac];

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Flac => "flac",
            Self::Aac => "aac",
        }
    }

    /// Four-character codec identifier, as used by CoreAudio-style format IDs.
    pub const fn codec_id(self) -> u32 {
        let tag = match self {
            Self::Mp3 => b".mp3",
            Self::Wav => b"lpcm",
            Self::Flac => b"flac",
            Self::Aac => b"aac ",
        };
        u32::from_be_bytes(*tag)
    }

    /// True for formats the sink writes with a real container header.
    pub const fn has_container(self) -> bool {
        matches!(self, Self::Wav)
    }

    /// Whether `file_name` ends in any known extension (case-insensitive).
    pub fn is_known_file(file_name: &str) -> bool {
        file_name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.parse::<FileFormat>().is_ok())
    }
}

impl FromStr for FileFormat {
    type Err = WorkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(s))
            .ok_or_else(|| WorkerError::UnsupportedFormat(s.to_string()))
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
