use crate::audio::FileFormat;
use std::fs;
use std::path::Path;

pub const DEFAULT_PREFIX: &str = "Record_";

/// Smallest unused `"{prefix}{n}.{extension}"` in `directory`, `n >= 1`.
///
/// The listing only bounds the search: with `count` matching entries at most
/// `count + 1` candidates are probed, and each probe asks the file system
/// directly. Nothing here reserves the name, so a concurrent writer in another
/// process can still take it first.
pub fn next_name(directory: &Path, prefix: &str, extension: &str) -> String {
    let existing = count_matching(directory, prefix);

    (1..=existing + 1)
        .map(|index| format!("{}{}.{}", prefix, index, extension))
        .find(|candidate| !directory.join(candidate).exists())
        // Only reachable if entries appear between listing and probing.
        .unwrap_or_else(|| format!("{}{}.{}", prefix, existing + 2, extension))
}

fn count_matching(directory: &Path, prefix: &str) -> usize {
    let Ok(entries) = fs::read_dir(directory) else {
        return 0;
    };

    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with(prefix) && FileFormat::is_known_file(&name)
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(next_name(dir.path(), "Record_", "wav"), "Record_1.wav");
    }

    #[test]
    fn test_next_after_contiguous_run() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Record_1.wav");
        touch(dir.path(), "Record_2.wav");
        assert_eq!(next_name(dir.path(), "Record_", "wav"), "Record_3.wav");
    }

    #[test]
    fn test_lowest_gap_wins() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Record_1.wav");
        touch(dir.path(), "Record_3.wav");
        assert_eq!(next_name(dir.path(), "Record_", "wav"), "Record_2.wav");
    }

    #[test]
    fn test_missing_directory_counts_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("not-there");
        assert_eq!(next_name(&missing, "Record_", "flac"), "Record_1.flac");
    }

    #[test]
    fn test_other_extension_does_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Record_1.mp3");
        // Counted towards the bound, but the wav name is still free.
        assert_eq!(next_name(dir.path(), "Record_", "wav"), "Record_1.wav");
    }

    #[test]
    fn test_unrelated_entries_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Record_1.wav");
        touch(dir.path(), "Record_notes.txt");
        touch(dir.path(), "take.wav");
        assert_eq!(count_matching(dir.path(), "Record_"), 1);
        assert_eq!(next_name(dir.path(), "Record_", "wav"), "Record_2.wav");
    }
}
