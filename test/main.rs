// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT


use anyhow::Result;
use std::{fs::File, io::Write, path::Path};
use zip::{write::FileOptions, DateTime, ZipWriter};

/// Hook package archive written to disk.
pub(crate) struct PackageFixture {
    writer: ZipWriter<File>,
    options: FileOptions,
}

impl PackageFixture {
    pub(crate) fn new(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path.as_ref())?;

        // INVARIANT: Every entry shares one timestamp, so stamping is observable.
        let modified = DateTime::from_date_and_time(2021, 3, 4, 5, 6, 8)
            .map_err(|_| anyhow::anyhow!("invalid fixture timestamp"))?;
        let options = FileOptions::default().last_modified_time(modified);

        Ok(Self {
            writer: ZipWriter::new(file),
            options,
        })
    }

    pub(crate) fn file(mut self, name: &str, contents: impl AsRef<[u8]>) -> Result<Self> {
        self.writer.start_file(name, self.options)?;
        self.writer.write_all(contents.as_ref())?;
        Ok(self)
    }

    pub(crate) fn dir(mut self, name: &str) -> Result<Self> {
        self.writer.add_directory(name, self.options)?;
        Ok(self)
    }

    pub(crate) fn finish(mut self) -> Result<()> {
        self.writer.finish()?;
        Ok(())
    }
}

/// Seconds since unix epoch of fixture timestamp.
pub(crate) const FIXTURE_TIME: i64 = 1_614_834_368;
