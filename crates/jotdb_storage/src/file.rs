//! File-based storage backend for persistent storage.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use fs2::FileExt;
use parking_lot::RwLock;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A file-based storage backend over a single append-only log file.
///
/// Data survives process restarts. Opening creates the file if it does
/// not exist, so an empty file and a missing file both replay to an
/// empty store.
///
/// # Durability
///
/// - `flush()` calls `File::flush()` to push data to the OS
/// - `sync()` calls `File::sync_all()` to ensure data is on disk
///
/// # Locking
///
/// [`FileBackend::open_exclusive`] takes an advisory exclusive lock on
/// the log file, enforcing the single-writer ownership rule: only one
/// store instance may append to a given log.
///
/// # Example
///
/// ```no_run
/// use jotdb_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("store.jot")).unwrap();
/// backend.append(b"{\"key\":\"_a\",\"doc\":{}}\n").unwrap();
/// backend.sync().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    file: RwLock<File>,
    size: RwLock<u64>,
    locked: bool,
}

impl FileBackend {
    /// Opens or creates a log file at the given path.
    ///
    /// If the file exists it is opened for reading and appending;
    /// otherwise a new empty file is created.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        Self::open_inner(path, false)
    }

    /// Opens or creates a log file and takes an exclusive advisory lock.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Locked`] if another process already holds
    /// the lock, or an I/O error if the file cannot be opened.
    pub fn open_exclusive(path: &Path) -> StorageResult<Self> {
        Self::open_inner(path, true)
    }

    fn open_inner(path: &Path, exclusive: bool) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        if exclusive {
            file.try_lock_exclusive().map_err(|err| {
                if err.kind() == fs2::lock_contended_error().kind() {
                    StorageError::Locked
                } else {
                    StorageError::Io(err)
                }
            })?;
        }

        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file: RwLock::new(file),
            size: RwLock::new(size),
            locked: exclusive,
        })
    }

    /// Returns the path to the underlying log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileBackend {
    fn drop(&mut self) {
        if self.locked {
            // Advisory lock is released on close anyway; unlock explicitly
            // so the file handle in the same process can be reopened.
            let _ = fs2::FileExt::unlock(&*self.file.read());
        }
    }
}

impl StorageBackend for FileBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let size = *self.size.read();
        let end = offset.saturating_add(len as u64);

        if offset > size || end > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        if len == 0 {
            return Ok(Vec::new());
        }

        let mut file = self.file.write();
        file.seek(SeekFrom::Start(offset))?;

        let mut buffer = vec![0u8; len];
        file.read_exact(&mut buffer)?;

        Ok(buffer)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        if data.is_empty() {
            return Ok(*self.size.read());
        }

        let mut file = self.file.write();
        let mut size = self.size.write();

        let offset = *size;
        file.seek(SeekFrom::End(0))?;
        file.write_all(data)?;
        *size += data.len() as u64;

        Ok(offset)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.file.write().flush()?;
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(*self.size.read())
    }

    fn sync(&mut self) -> StorageResult<()> {
        let mut file = self.file.write();
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.jot");

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(path.exists());
    }

    #[test]
    fn append_and_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.jot");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.append(b"first\n").unwrap();
        backend.append(b"second\n").unwrap();

        assert_eq!(backend.read_all().unwrap(), b"first\nsecond\n");
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.jot");

        {
            let mut backend = FileBackend::open(&path).unwrap();
            backend.append(b"persisted\n").unwrap();
            backend.sync().unwrap();
        }

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.read_all().unwrap(), b"persisted\n");
    }

    #[test]
    fn read_past_end_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.jot");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.append(b"short").unwrap();

        let result = backend.read_at(2, 100);
        assert!(matches!(result, Err(StorageError::ReadPastEnd { .. })));
    }

    #[test]
    fn exclusive_lock_blocks_second_opener() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.jot");

        let _first = FileBackend::open_exclusive(&path).unwrap();
        let second = FileBackend::open_exclusive(&path);
        assert!(matches!(second, Err(StorageError::Locked)));
    }

    #[test]
    fn lock_released_on_drop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.jot");

        drop(FileBackend::open_exclusive(&path).unwrap());
        assert!(FileBackend::open_exclusive(&path).is_ok());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("store.jot");

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.path(), path.as_path());
        assert!(path.exists());
    }
}
