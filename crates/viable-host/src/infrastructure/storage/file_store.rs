//! File-backed persistent region.
//!
//! The whole region is mirrored in RAM; reads come from the mirror and every
//! write goes through to the file at the same offset before returning.  A
//! fresh file is created zero-filled, which the device's init treats as a
//! stale region and resets.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use viable_core::storage::check_bounds;
use viable_core::{Storage, StoreError};

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("I/O error on store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<FileStoreError> for StoreError {
    fn from(e: FileStoreError) -> Self {
        StoreError::Medium(e.to_string())
    }
}

/// A [`Storage`] medium backed by a file of fixed size.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    file: File,
    mirror: Vec<u8>,
}

impl FileStorage {
    /// Opens (or creates) the store file and sizes it to `size` bytes.
    ///
    /// A shorter file is extended with zeros; a longer one is truncated,
    /// since a different size means a different layout anyway.
    ///
    /// # Errors
    ///
    /// [`FileStoreError::Io`] if the file cannot be opened, read or resized.
    pub fn open(path: &Path, size: usize) -> Result<Self, FileStoreError> {
        let io = |source| FileStoreError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(io)?;

        let mut mirror = Vec::with_capacity(size);
        file.read_to_end(&mut mirror).map_err(io)?;
        let existing = mirror.len();
        if existing != size {
            info!(path = %path.display(), existing, size, "resizing store file");
            mirror.resize(size, 0);
            file.set_len(size as u64).map_err(io)?;
            file.seek(SeekFrom::Start(0)).map_err(io)?;
            file.write_all(&mirror).map_err(io)?;
            file.flush().map_err(io)?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            mirror,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_through(&mut self, offset: usize, data: &[u8]) -> Result<(), FileStoreError> {
        let io = |source| FileStoreError::Io {
            path: self.path.clone(),
            source,
        };
        self.file.seek(SeekFrom::Start(offset as u64)).map_err(io)?;
        self.file.write_all(data).map_err(io)?;
        self.file.flush().map_err(io)
    }
}

impl Storage for FileStorage {
    fn len(&self) -> usize {
        self.mirror.len()
    }

    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), StoreError> {
        check_bounds(offset, buf.len(), self.mirror.len())?;
        buf.copy_from_slice(&self.mirror[offset..offset + buf.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StoreError> {
        check_bounds(offset, data.len(), self.mirror.len())?;
        self.write_through(offset, data)?;
        self.mirror[offset..offset + data.len()].copy_from_slice(data);
        debug!(offset, len = data.len(), "store write");
        Ok(())
    }
}
