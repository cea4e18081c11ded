// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Package aggregation.
//!
//! Drives every entry of every hook package into three append-only output
//! documents, called __sinks__:
//!
//! 1. Setup document, holding the setup relevant readme sections.
//! 2. Readme document, holding the usage relevant readme sections.
//! 3. Settings document, holding every settings fragment.
//!
//! Binaries are copied into the artifact directory on the side. Packages are
//! processed one after another, entries in the order their archive reports
//! them. Both readme style documents start with a banner and an index of all
//! packages, e.g.:
//!
//! ```text
//! XWA Hooks Setup
//! This file contains the setup sections of the readme files for the hooks.
//!
//! [1/2] xwa_hook_main
//! [2/2] xwa_hook_sample
//!
//! ========================================
//! [1/2] xwa_hook_main
//! ...
//! ```

use crate::{
    archive::{Archive, ArchiveError, Entry},
    entry::{classify, format_tag, formatted_file_name, route, EntryKind, SectionRoute, SEPARATOR},
    package::PackageSource,
    readme::Sections,
};

use filetime::FileTime;
use indicatif::ProgressBar;
use std::{
    fs::File,
    io::{copy, BufWriter, Write},
    path::{Component, Path, PathBuf},
    time::SystemTime,
};
use tracing::{debug, info, instrument, warn};

/// File name of generated setup document.
pub const SETUP_FILE: &str = "Hooks_Setup.txt";

/// File name of generated readme document.
pub const README_FILE: &str = "Hooks_Readme.txt";

/// File name of generated settings document.
pub const SETTINGS_FILE: &str = "Hooks.ini";

/// Directory under the artifact directory that receives package examples.
pub const EXAMPLES_DIR: &str = "Examples";

const SETUP_BANNER: &str =
    "XWA Hooks Setup\nThis file contains the setup sections of the readme files for the hooks.\n\n";
const README_BANNER: &str =
    "XWA Hooks Readme\nThis file contains the readme files for the hooks.\n\n";

/// The three output documents of aggregation.
#[derive(Debug, Default)]
pub struct Sinks<W: Write> {
    /// Setup document.
    pub setup: W,

    /// Readme document.
    pub readme: W,

    /// Settings document.
    pub settings: W,
}

impl Sinks<BufWriter<File>> {
    /// Create file sinks inside of directory, truncating existing files.
    ///
    /// # Errors
    ///
    /// - Return [`AggregateError::CreateFile`] if any file cannot be created.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let open = |name: &str| -> Result<BufWriter<File>> {
            let path = dir.join(name);
            File::create(&path)
                .map(BufWriter::new)
                .map_err(|err| AggregateError::CreateFile { source: err, path })
        };

        Ok(Self {
            setup: open(SETUP_FILE)?,
            readme: open(README_FILE)?,
            settings: open(SETTINGS_FILE)?,
        })
    }
}

/// Which sink an output error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Setup,
    Readme,
    Settings,
}

impl std::fmt::Display for SinkKind {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Setup => "setup",
            Self::Readme => "readme",
            Self::Settings => "settings",
        };
        fmt.write_str(name)
    }
}

/// Position of package being processed.
#[derive(Debug, Clone, Copy)]
struct Position<'a> {
    name: &'a str,
    rank: usize,
    total: usize,
}

/// Fan package entries out into sinks.
#[derive(Debug)]
pub struct Aggregator<W: Write> {
    sinks: Sinks<W>,
    artifact_dir: PathBuf,
    examples: bool,
    progress: ProgressBar,
}

impl<W: Write> Aggregator<W> {
    /// Construct new aggregator.
    ///
    /// Binary artifacts are copied into `artifact_dir`, which must exist.
    pub fn new(sinks: Sinks<W>, artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            sinks,
            artifact_dir: artifact_dir.into(),
            examples: false,
            progress: ProgressBar::hidden(),
        }
    }

    /// Copy auxiliary package content into per-package examples directories.
    pub fn with_examples(mut self, examples: bool) -> Self {
        self.examples = examples;
        self
    }

    /// Report progress through progress bar.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Aggregate packages in given order.
    ///
    /// Caller is responsible for ordering packages. Sinks are flushed and
    /// handed back once every package was processed.
    ///
    /// # Errors
    ///
    /// - Return [`AggregateError::Archive`] if a package cannot be read.
    /// - Return [`AggregateError::Sink`] if a sink cannot be written.
    /// - Return [`AggregateError::ReadEntry`] if an entry cannot be read.
    /// - Return [`AggregateError::Copy`] if an artifact cannot be copied.
    #[instrument(skip(self, packages), level = "debug")]
    pub fn run<S: PackageSource>(mut self, packages: &[S]) -> Result<Sinks<W>> {
        let total = packages.len();
        self.write_index(packages)?;
        self.progress.set_length(total as u64);

        for (index, package) in packages.iter().enumerate() {
            let position = Position {
                name: package.name(),
                rank: index + 1,
                total,
            };
            info!("{}{}", format_tag(position.rank, total), position.name);
            self.progress.set_message(position.name.to_owned());

            let mut archive = package.open()?;
            archive.for_each_entry(|entry| self.dispatch(position, entry))?;
            self.progress.inc(1);
        }

        self.progress.finish_and_clear();
        flush(&mut self.sinks.setup, SinkKind::Setup)?;
        flush(&mut self.sinks.readme, SinkKind::Readme)?;
        flush(&mut self.sinks.settings, SinkKind::Settings)?;

        Ok(self.sinks)
    }

    fn write_index<S: PackageSource>(&mut self, packages: &[S]) -> Result<()> {
        emit(&mut self.sinks.setup, SinkKind::Setup, SETUP_BANNER)?;
        emit(&mut self.sinks.readme, SinkKind::Readme, README_BANNER)?;

        for (index, package) in packages.iter().enumerate() {
            let line = format!(
                "{}{}\n",
                format_tag(index + 1, packages.len()),
                package.name()
            );
            emit(&mut self.sinks.setup, SinkKind::Setup, &line)?;
            emit(&mut self.sinks.readme, SinkKind::Readme, &line)?;
        }

        emit(&mut self.sinks.setup, SinkKind::Setup, "\n")?;
        emit(&mut self.sinks.readme, SinkKind::Readme, "\n")
    }

    fn dispatch(&mut self, position: Position<'_>, entry: Entry<'_>) -> Result<()> {
        let name = entry.name();

        // INVARIANT: Directory markers carry no content.
        if name.is_empty() {
            return Ok(());
        }

        let kind = classify(name);
        debug!("{:?} => {kind:?}", entry.path);

        match kind {
            EntryKind::Readme => self.write_readme(position, entry),
            EntryKind::SettingsFragment => self.write_settings_fragment(entry),
            EntryKind::BinaryArtifact => {
                let target = self.artifact_dir.join(formatted_file_name(name));
                copy_entry(entry, &target)
            }
            EntryKind::Ignore if self.examples => self.copy_example(position, entry),
            EntryKind::Ignore => Ok(()),
        }
    }

    fn write_readme(&mut self, position: Position<'_>, entry: Entry<'_>) -> Result<()> {
        let sections = Sections::parse_bytes(&read_entry(entry)?);
        let prefix = format!(
            "{SEPARATOR}\n{}",
            format_tag(position.rank, position.total)
        );
        emit(&mut self.sinks.setup, SinkKind::Setup, &prefix)?;
        emit(&mut self.sinks.readme, SinkKind::Readme, &prefix)?;

        for (header, body) in sections.iter() {
            let section_route = route(header);
            let text = match section_route {
                SectionRoute::Preamble => body.to_owned(),
                _ => format!("{header}\n{body}"),
            };

            if section_route.to_setup() {
                emit(&mut self.sinks.setup, SinkKind::Setup, &text)?;
            }

            if section_route.to_readme() {
                emit(&mut self.sinks.readme, SinkKind::Readme, &text)?;
            }
        }

        emit(&mut self.sinks.setup, SinkKind::Setup, "\n")?;
        emit(&mut self.sinks.readme, SinkKind::Readme, "\n")
    }

    fn write_settings_fragment(&mut self, entry: Entry<'_>) -> Result<()> {
        let name = entry.name();
        let section = name.strip_suffix(".cfg").unwrap_or(name);
        let content = read_entry(entry)?;

        // INVARIANT: Fragment starts right after its own leading line breaks.
        let start = content
            .iter()
            .position(|byte| !matches!(byte, b'\r' | b'\n'))
            .unwrap_or(content.len());

        let sink = &mut self.sinks.settings;
        emit(sink, SinkKind::Settings, &format!("[{section}]\n"))?;
        emit_bytes(sink, SinkKind::Settings, &content[start..])?;
        emit(sink, SinkKind::Settings, "\n")
    }

    fn copy_example(&mut self, position: Position<'_>, entry: Entry<'_>) -> Result<()> {
        let dir = self
            .artifact_dir
            .join(EXAMPLES_DIR)
            .join(formatted_file_name(position.name));

        let relative = if starts_with_ignore_case(entry.path, "Examples/") {
            Some(PathBuf::from(formatted_file_name(entry.name())))
        } else {
            contained_path(&formatted_file_name(entry.path))
        };

        let Some(relative) = relative else {
            warn!("skip example {:?} that escapes its package", entry.path);
            return Ok(());
        };

        let target = dir.join(relative);
        if let Some(parent) = target.parent() {
            mkdirp::mkdirp(parent).map_err(|err| AggregateError::CreateDir {
                source: err,
                path: parent.to_path_buf(),
            })?;
        }

        copy_entry(entry, &target)
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Turn archive path into relative path that cannot leave its base.
fn contained_path(path: &str) -> Option<PathBuf> {
    let relative = path
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<PathBuf>();

    let contained = relative.components().count() > 0
        && relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));

    contained.then_some(relative)
}

fn read_entry(entry: Entry<'_>) -> Result<Vec<u8>> {
    let mut content = Vec::new();
    entry
        .reader
        .read_to_end(&mut content)
        .map_err(|err| AggregateError::ReadEntry {
            source: err,
            path: entry.path.to_owned(),
        })?;

    Ok(content)
}

/// Copy entry content to target file, carrying over its timestamp.
fn copy_entry(entry: Entry<'_>, target: &Path) -> Result<()> {
    debug!("copy {:?} to {:?}", entry.path, target.display());
    let copy_error = |err: std::io::Error| AggregateError::Copy {
        source: err,
        path: target.to_path_buf(),
    };

    let mut file = File::create(target).map_err(copy_error)?;
    copy(entry.reader, &mut file).map_err(copy_error)?;
    drop(file);

    if let Some(modified) = entry.modified {
        stamp(target, modified).map_err(copy_error)?;
    }

    Ok(())
}

fn stamp(path: &Path, modified: SystemTime) -> std::io::Result<()> {
    filetime::set_file_mtime(path, FileTime::from_system_time(modified))
}

fn emit(sink: &mut impl Write, kind: SinkKind, text: &str) -> Result<()> {
    emit_bytes(sink, kind, text.as_bytes())
}

fn emit_bytes(sink: &mut impl Write, kind: SinkKind, bytes: &[u8]) -> Result<()> {
    sink.write_all(bytes)
        .map_err(|err| AggregateError::Sink { source: err, kind })
}

fn flush(sink: &mut impl Write, kind: SinkKind) -> Result<()> {
    sink.flush()
        .map_err(|err| AggregateError::Sink { source: err, kind })
}

/// Aggregation error types.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// Package archive cannot be read.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Output document cannot be created.
    #[error("failed to create output file {path:?}")]
    CreateFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Output document cannot be written.
    #[error("failed to write {kind} document")]
    Sink {
        #[source]
        source: std::io::Error,
        kind: SinkKind,
    },

    /// Package entry cannot be read.
    #[error("failed to read package entry {path:?}")]
    ReadEntry {
        #[source]
        source: std::io::Error,
        path: String,
    },

    /// Package entry cannot be copied to its target.
    #[error("failed to copy package entry to {path:?}")]
    Copy {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Target directory cannot be created.
    #[error("failed to create directory {path:?}")]
    CreateDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
type Result<T, E = AggregateError> = std::result::Result<T, E>;
