pub mod namer;

use crate::audio::FileFormat;
use crate::error::{WorkerError, WorkerResult};
use std::path::{Path, PathBuf};

pub use namer::{DEFAULT_PREFIX, next_name};

/// A file produced by a capture session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    /// File name without extension.
    pub name: String,
    pub format: FileFormat,
}

impl OutputFile {
    /// Resolve a caller-supplied file name such as `take.wav` inside `directory`.
    ///
    /// A name without an extension gets `default_format`.
    pub fn from_file_name(
        directory: &Path,
        file_name: &str,
        default_format: FileFormat,
    ) -> WorkerResult<Self> {
        let as_path = Path::new(file_name);
        let is_plain_name = as_path.components().count() == 1 && as_path.file_name().is_some();
        if !is_plain_name {
            return Err(WorkerError::InvalidName(file_name.to_string()));
        }

        let (name, format) = match file_name.rsplit_once('.') {
            Some((name, ext)) => (name, ext.parse::<FileFormat>()?),
            None => (file_name, default_format),
        };

        if name.is_empty() {
            return Err(WorkerError::InvalidName(file_name.to_string()));
        }

        Ok(Self {
            path: directory.join(format!("{}.{}", name, format.extension())),
            name: name.to_string(),
            format,
        })
    }

    /// Pick the next free `{prefix}{n}` name in `directory`.
    pub fn next_in(directory: &Path, prefix: &str, format: FileFormat) -> Self {
        let file_name = next_name(directory, prefix, format.extension());
        let name = file_name
            .strip_suffix(&format!(".{}", format.extension()))
            .unwrap_or(&file_name)
            .to_string();

        Self {
            path: directory.join(&file_name),
            name,
            format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_name_keeps_stem_and_format() {
        let file = OutputFile::from_file_name(Path::new("/rec"), "take.wav", FileFormat::Mp3).unwrap();
        assert_eq!(file.name, "take");
        assert_eq!(file.format, FileFormat::Wav);
        assert_eq!(file.path, PathBuf::from("/rec/take.wav"));
    }

    #[test]
    fn test_missing_extension_uses_default() {
        let file = OutputFile::from_file_name(Path::new("/rec"), "take", FileFormat::Flac).unwrap();
        assert_eq!(file.format, FileFormat::Flac);
        assert_eq!(file.path, PathBuf::from("/rec/take.flac"));
    }

    #[test]
    fn test_rejects_unknown_extension_and_paths() {
        let dir = Path::new("/rec");
        assert!(matches!(
            OutputFile::from_file_name(dir, "take.ogg", FileFormat::Wav),
            Err(WorkerError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            OutputFile::from_file_name(dir, "../take.wav", FileFormat::Wav),
            Err(WorkerError::InvalidName(_))
        ));
        assert!(matches!(
            OutputFile::from_file_name(dir, ".wav", FileFormat::Wav),
            Err(WorkerError::InvalidName(_))
        ));
    }

    #[test]
    fn test_next_in_strips_extension() {
        let dir = tempfile::tempdir().unwrap();
        let file = OutputFile::next_in(dir.path(), DEFAULT_PREFIX, FileFormat::Aac);
        assert_eq!(file.name, "Record_1");
        assert_eq!(file.path, dir.path().join("Record_1.aac"));
    }
}
