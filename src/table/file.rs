//! Positioned file access
//!
//! Thin wrapper over `std::fs::File` for the fixed-slot reads and writes the
//! engines perform: every access names an absolute offset, and every
//! mutating operation ends with a durable sync.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::codec::varint::{self, MAX_VARINT_LEN};
use crate::config::{Config, SyncStrategy};
use crate::error::{Result, TableError};

/// Width of the version header at the start of every data and index file
pub const HEADER_WIDTH: u64 = MAX_VARINT_LEN as u64;

/// An open data or index file
#[derive(Debug)]
pub(crate) struct TableFile {
    file: File,
    path: PathBuf,
    sync_strategy: SyncStrategy,
}

impl TableFile {
    /// Create a new file, failing if one already exists
    pub fn create(path: &Path, config: &Config) -> Result<Self> {
        let file = create_new(path, config.file_mode)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
            sync_strategy: config.sync_strategy,
        })
    }

    /// Open an existing file for reading and writing
    pub fn open(path: &Path, config: &Config) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
            sync_strategy: config.sync_strategy,
        })
    }

    /// Current file length in bytes
    pub fn len(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    pub fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    pub fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(buf)?;
        Ok(())
    }

    /// Flush written bytes to stable storage
    pub fn sync(&self) -> Result<()> {
        match self.sync_strategy {
            SyncStrategy::Full => self.file.sync_all()?,
            SyncStrategy::DataOnly => self.file.sync_data()?,
        }
        Ok(())
    }

    // =========================================================================
    // Varint Slots
    // =========================================================================

    /// Read one zero-padded varint slot
    pub fn read_slot(&mut self, offset: u64) -> Result<i64> {
        let mut slot = [0u8; MAX_VARINT_LEN];
        self.read_at(offset, &mut slot)?;
        varint::read_varint(&slot)
            .map(|(value, _)| value)
            .ok_or_else(|| {
                TableError::MalformedValue(format!(
                    "invalid varint at offset {} of {}",
                    offset,
                    self.path.display()
                ))
            })
    }

    /// Write one zero-padded varint slot
    pub fn write_slot(&mut self, offset: u64, value: i64) -> Result<()> {
        self.write_at(offset, &varint::varint_slot(value))
    }

    /// Read the format version stored in the header
    pub fn version(&mut self) -> Result<i64> {
        match self.read_slot(0) {
            Err(TableError::Io(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                Err(TableError::MalformedValue(format!(
                    "{} is shorter than its header",
                    self.path.display()
                )))
            }
            other => other,
        }
    }

    /// Check the header holds `expected`
    pub fn expect_version(&mut self, file: &'static str, expected: i64) -> Result<()> {
        let found = self.version()?;
        if found != expected {
            return Err(TableError::VersionMismatch { file, found });
        }
        Ok(())
    }
}

/// Create a file that must not exist yet, with the configured permissions
pub(crate) fn create_new(path: &Path, mode: u32) -> Result<File> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    options.open(path).map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => TableError::AlreadyExists(path.to_path_buf()),
        _ => TableError::Io(e),
    })
}

/// Fail with `AlreadyExists` if any of `paths` is present
pub(crate) fn ensure_absent(paths: &[&Path]) -> Result<()> {
    for path in paths {
        if path.exists() {
            return Err(TableError::AlreadyExists(path.to_path_buf()));
        }
    }
    Ok(())
}
