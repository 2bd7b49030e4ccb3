use std::fs::{self, FileTimes, OpenOptions};
use std::path::{Path, PathBuf};
use log::{debug, warn};
use crate::{FailureRecord, Result, TrackRecord};

/// Anything with a planned destination the backup can materialize.
pub trait BackupItem {
    fn source_path(&self) -> &Path;
    fn target_directory(&self) -> &Path;
    fn destination_path(&self) -> &Path;
}

impl BackupItem for TrackRecord {
    fn source_path(&self) -> &Path {
        &self.source_path
    }
    fn target_directory(&self) -> &Path {
        &self.target_directory
    }
    fn destination_path(&self) -> &Path {
        &self.destination_path
    }
}

impl BackupItem for FailureRecord {
    fn source_path(&self) -> &Path {
        &self.source_path
    }
    fn target_directory(&self) -> &Path {
        &self.target_directory
    }
    fn destination_path(&self) -> &Path {
        &self.destination_path
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BackupStats {
    pub copied: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl std::ops::AddAssign for BackupStats {
    fn add_assign(&mut self, other: Self) {
        self.copied += other.copied;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

pub struct FileManager {
    out_dir: PathBuf,
}

impl FileManager {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self { out_dir: out_dir.into() }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn ensure_directory(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::create_dir_all(path.as_ref())?;
        Ok(())
    }

    /// Copy `source` to `destination` unless something is already there.
    /// Returns `false` when the copy was skipped.
    pub fn copy_file(&self, source: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<bool> {
        let (source, destination) = (source.as_ref(), destination.as_ref());
        if destination.exists() {
            return Ok(false);
        }

        fs::copy(source, destination)?;

        let meta = fs::metadata(source)?;
        let mut times = FileTimes::new();
        if let Ok(modified) = meta.modified() {
            times = times.set_modified(modified);
        }
        if let Ok(accessed) = meta.accessed() {
            times = times.set_accessed(accessed);
        }
        let stamped = OpenOptions::new()
            .write(true)
            .open(destination)
            .and_then(|f| f.set_times(times));
        if let Err(e) = stamped {
            warn!("Could not preserve timestamps on {}: {}", destination.display(), e);
        }

        Ok(true)
    }

    /// Create target directories and copy every item. Per-file errors are logged and counted.
    pub fn backup<T: BackupItem>(&self, items: &[T]) -> BackupStats {
        let mut stats = BackupStats::default();
        for item in items {
            let outcome = self
                .ensure_directory(item.target_directory())
                .and_then(|_| self.copy_file(item.source_path(), item.destination_path()));
            match outcome {
                Ok(true) => stats.copied += 1,
                Ok(false) => {
                    debug!("Already present: {}", item.destination_path().display());
                    stats.skipped += 1;
                }
                Err(e) => {
                    warn!(
                        "Error copying {} to {}: {}",
                        item.source_path().display(),
                        item.destination_path().display(),
                        e
                    );
                    stats.failed += 1;
                }
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FailureReason;
    use pretty_assertions::assert_eq;
    use std::time::{Duration, SystemTime};

    fn failure(source: &Path, out: &Path) -> FailureRecord {
        let mut record = FailureRecord::new(source, FailureReason::ExtractionError, "_Failures");
        record.target_directory = out.join("_Failures");
        record.destination_path = record.target_directory.join(source.file_name().unwrap());
        record
    }

    #[test]
    fn backup_copies_once_then_skips() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in/song.mp3");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, b"audio").unwrap();
        let out = dir.path().join("out");

        let manager = FileManager::new(&out);
        let items = vec![failure(&source, &out)];

        let first = manager.backup(&items);
        assert_eq!(first, BackupStats { copied: 1, skipped: 0, failed: 0 });
        assert_eq!(fs::read(out.join("_Failures/song.mp3")).unwrap(), b"audio");

        let second = manager.backup(&items);
        assert_eq!(second, BackupStats { copied: 0, skipped: 1, failed: 0 });
    }

    #[test]
    fn existing_destination_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.mp3");
        let destination = dir.path().join("b.mp3");
        fs::write(&source, b"new").unwrap();
        fs::write(&destination, b"old").unwrap();

        let copied = FileManager::new(dir.path()).copy_file(&source, &destination).unwrap();

        assert!(!copied);
        assert_eq!(fs::read(&destination).unwrap(), b"old");
    }

    #[test]
    fn copy_preserves_modified_time() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.mp3");
        fs::write(&source, b"x").unwrap();
        let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
        fs::File::options()
            .write(true)
            .open(&source)
            .unwrap()
            .set_modified(stamp)
            .unwrap();

        let destination = dir.path().join("b.mp3");
        FileManager::new(dir.path()).copy_file(&source, &destination).unwrap();

        assert_eq!(fs::metadata(&destination).unwrap().modified().unwrap(), stamp);
    }

    #[test]
    fn missing_source_is_counted_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let items = vec![failure(&dir.path().join("gone.mp3"), &out)];

        let stats = FileManager::new(&out).backup(&items);

        assert_eq!(stats.failed, 1);
    }
}
