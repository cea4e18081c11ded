// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Package archive access.
//!
//! Hook packages are distributed as zip archives. The rest of the crate only
//! sees them through the [`Archive`] trait, which hands out one [`Entry`] at a
//! time in the order the container reports them.

use chrono::NaiveDate;
use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
    time::SystemTime,
};
use zip::{result::ZipError, DateTime, ZipArchive};

/// One file inside of a package archive.
pub struct Entry<'a> {
    /// Full relative path inside of the archive.
    pub path: &'a str,

    /// Last-modified timestamp, if the container recorded a valid one.
    pub modified: Option<SystemTime>,

    /// Content stream of the entry.
    pub reader: &'a mut dyn Read,
}

impl<'a> Entry<'a> {
    /// Short name of entry, i.e., last component of its path.
    ///
    /// Empty for directory markers.
    pub fn name(&self) -> &'a str {
        match self.path.rfind(['/', '\\']) {
            Some(index) => &self.path[index + 1..],
            None => self.path,
        }
    }
}

/// Sequential access to entries of a package archive.
pub trait Archive {
    /// Visit every entry in container order.
    ///
    /// Stops at the first error returned by either the container or the
    /// visitor.
    fn for_each_entry<E, F>(&mut self, visit: F) -> Result<(), E>
    where
        E: From<ArchiveError>,
        F: FnMut(Entry<'_>) -> Result<(), E>;
}

/// Zip archive of hook package on disk.
pub struct ZipPackage {
    path: PathBuf,
    inner: ZipArchive<BufReader<File>>,
}

impl ZipPackage {
    /// Open zip archive at target path.
    ///
    /// # Errors
    ///
    /// - Return [`ArchiveError::Open`] if file cannot be opened.
    /// - Return [`ArchiveError::Zip`] if file is not a readable zip archive.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = File::open(&path).map_err(|err| ArchiveError::Open {
            source: err,
            path: path.clone(),
        })?;
        let inner = ZipArchive::new(BufReader::new(file)).map_err(|err| ArchiveError::Zip {
            source: err,
            path: path.clone(),
        })?;

        Ok(Self { path, inner })
    }

    /// Path to archive on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Archive for ZipPackage {
    fn for_each_entry<E, F>(&mut self, mut visit: F) -> Result<(), E>
    where
        E: From<ArchiveError>,
        F: FnMut(Entry<'_>) -> Result<(), E>,
    {
        for index in 0..self.inner.len() {
            let mut file = self.inner.by_index(index).map_err(|err| ArchiveError::Zip {
                source: err,
                path: self.path.clone(),
            })?;
            let path = file.name().to_owned();
            let modified = zip_time(file.last_modified());
            visit(Entry {
                path: &path,
                modified,
                reader: &mut file,
            })?;
        }

        Ok(())
    }
}

/// Convert zip timestamp into system time.
///
/// Zip timestamps carry no time zone, so they are read as UTC.
fn zip_time(time: DateTime) -> Option<SystemTime> {
    NaiveDate::from_ymd_opt(time.year().into(), time.month().into(), time.day().into())
        .and_then(|date| {
            date.and_hms_opt(
                time.hour().into(),
                time.minute().into(),
                time.second().into(),
            )
        })
        .map(|stamp| SystemTime::from(stamp.and_utc()))
}

/// In-memory package archive.
///
/// Useful to feed hand-made packages through the pipeline.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryArchive {
    entries: Vec<MemoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MemoryEntry {
    path: String,
    modified: Option<SystemTime>,
    data: Vec<u8>,
}

impl MemoryArchive {
    /// Construct new empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append entry without timestamp.
    pub fn with_entry(self, path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.with_dated_entry(path, None, data)
    }

    /// Append entry with optional timestamp.
    pub fn with_dated_entry(
        mut self,
        path: impl Into<String>,
        modified: Option<SystemTime>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        self.entries.push(MemoryEntry {
            path: path.into(),
            modified,
            data: data.into(),
        });
        self
    }
}

impl Archive for MemoryArchive {
    fn for_each_entry<E, F>(&mut self, mut visit: F) -> Result<(), E>
    where
        E: From<ArchiveError>,
        F: FnMut(Entry<'_>) -> Result<(), E>,
    {
        for entry in &self.entries {
            let mut reader = entry.data.as_slice();
            visit(Entry {
                path: &entry.path,
                modified: entry.modified,
                reader: &mut reader,
            })?;
        }

        Ok(())
    }
}

/// Archive error types.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Archive file cannot be opened.
    #[error("failed to open package archive {path:?}")]
    Open {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Archive cannot be read as zip container.
    #[error("failed to read zip archive {path:?}")]
    Zip {
        #[source]
        source: ZipError,
        path: PathBuf,
    },
}

/// Friendly result alias :3
type Result<T, E = ArchiveError> = std::result::Result<T, E>;
