// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Hook package listing and ordering.
//!
//! A __package__ is one hook add-on distributed as a zip archive named
//! `<prefix><name>.zip`, e.g., `xwa_hook_main.zip`. Packages are always
//! processed in a deterministic order: the main package first, then every
//! other package by name.

use crate::archive::{Archive, ArchiveError, MemoryArchive, ZipPackage};

use glob::Pattern;
use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// Source of one hook package.
///
/// Archives are only opened when the package is about to be processed.
pub trait PackageSource {
    /// Archive type handed out by [`PackageSource::open`].
    type Archive: Archive;

    /// Stable identifying name of package.
    fn name(&self) -> &str;

    /// Open package archive for reading.
    fn open(&self) -> Result<Self::Archive, ArchiveError>;
}

/// Hook package stored as zip archive on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskPackage {
    name: String,
    path: PathBuf,
}

impl DiskPackage {
    /// Construct new disk package from archive path.
    ///
    /// The package name is the archive file name without its extension.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path }
    }

    /// Path to package archive.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PackageSource for DiskPackage {
    type Archive = ZipPackage;

    fn name(&self) -> &str {
        &self.name
    }

    fn open(&self) -> Result<Self::Archive, ArchiveError> {
        ZipPackage::open(&self.path)
    }
}

/// Hook package held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryPackage {
    name: String,
    archive: MemoryArchive,
}

impl MemoryPackage {
    /// Construct new in-memory package.
    pub fn new(name: impl Into<String>, archive: MemoryArchive) -> Self {
        Self {
            name: name.into(),
            archive,
        }
    }
}

impl PackageSource for MemoryPackage {
    type Archive = MemoryArchive;

    fn name(&self) -> &str {
        &self.name
    }

    fn open(&self) -> Result<Self::Archive, ArchiveError> {
        Ok(self.archive.clone())
    }
}

/// Check if package name starts with main package marker, ignoring case.
pub fn is_main(name: &str, main_marker: &str) -> bool {
    name.get(..main_marker.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(main_marker))
}

/// Compare two package names for processing order.
///
/// Main packages sort before everything else. Ties are broken by ordinal
/// comparison of the names.
pub fn package_order(lhs: &str, rhs: &str, main_marker: &str) -> Ordering {
    is_main(rhs, main_marker)
        .cmp(&is_main(lhs, main_marker))
        .then_with(|| lhs.cmp(rhs))
}

/// Sort packages into processing order.
pub fn order_packages<S: PackageSource>(packages: &mut [S], main_marker: &str) {
    packages.sort_by(|lhs, rhs| package_order(lhs.name(), rhs.name(), main_marker));
}

/// List hook package archives in directory.
///
/// Matches `<prefix>*.zip` at the top-level of the directory only. Result is
/// not ordered, use [`order_packages`] for that. A missing directory yields no
/// packages.
///
/// # Errors
///
/// - Return [`PackageError::Pattern`] if prefix forms an invalid pattern.
/// - Return [`PackageError::Glob`] if directory entries cannot be read.
pub fn discover(dir: impl AsRef<Path>, prefix: &str) -> Result<Vec<DiskPackage>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        warn!("package directory {:?} does not exist", dir.display());
        return Ok(Vec::new());
    }

    let pattern = format!(
        "{}/{}*.zip",
        Pattern::escape(dir.to_string_lossy().as_ref()),
        Pattern::escape(prefix)
    );
    debug!("discover packages with pattern {pattern:?}");

    let mut packages = Vec::new();
    for path in glob::glob(&pattern)? {
        let path = path?;
        if path.is_file() {
            packages.push(DiskPackage::new(path));
        }
    }

    Ok(packages)
}

/// Package discovery error types.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    /// Package pattern cannot be compiled.
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),

    /// Package directory cannot be read.
    #[error(transparent)]
    Glob(#[from] glob::GlobError),
}

/// Friendly result alias :3
type Result<T, E = PackageError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use simple_test_case::test_case;
    use std::fs::{create_dir, write};

    fn names(packages: &[impl PackageSource]) -> Vec<&str> {
        packages.iter().map(|package| package.name()).collect()
    }

    #[test_case("xwa_hook_main", true; "exact")]
    #[test_case("XWA_HOOK_MAIN_extra", true; "ignores case")]
    #[test_case("xwa_hook_mai", false; "too short")]
    #[test_case("xwa_hook_zz", false; "other package")]
    #[test]
    fn detect_main_package(name: &str, expect: bool) {
        pretty_assertions::assert_eq!(is_main(name, "xwa_hook_main"), expect);
    }

    #[test]
    fn main_package_sorts_first() {
        let mut packages = vec![
            MemoryPackage::new("xwa_hook_zz", MemoryArchive::new()),
            MemoryPackage::new("xwa_hook_main_x", MemoryArchive::new()),
        ];
        order_packages(&mut packages, "xwa_hook_main");
        assert_eq!(names(&packages), vec!["xwa_hook_main_x", "xwa_hook_zz"]);

        packages.reverse();
        order_packages(&mut packages, "xwa_hook_main");
        assert_eq!(names(&packages), vec!["xwa_hook_main_x", "xwa_hook_zz"]);
    }

    #[test]
    fn remaining_packages_sort_ordinally() {
        let mut packages = vec![
            MemoryPackage::new("xwa_hook_b", MemoryArchive::new()),
            MemoryPackage::new("xwa_hook_B", MemoryArchive::new()),
            MemoryPackage::new("xwa_hook_main", MemoryArchive::new()),
            MemoryPackage::new("xwa_hook_a", MemoryArchive::new()),
        ];
        order_packages(&mut packages, "xwa_hook_main");
        assert_eq!(
            names(&packages),
            vec!["xwa_hook_main", "xwa_hook_B", "xwa_hook_a", "xwa_hook_b"]
        );
    }

    #[sealed_test]
    fn discover_matching_archives() -> anyhow::Result<()> {
        create_dir("Hooks")?;
        write("Hooks/xwa_hook_main.zip", "")?;
        write("Hooks/xwa_hook_sound.zip", "")?;
        write("Hooks/other.zip", "")?;
        write("Hooks/xwa_hook_notes.txt", "")?;
        create_dir("Hooks/xwa_hook_dir.zip")?;

        let mut packages = discover("Hooks", "xwa_hook_")?;
        order_packages(&mut packages, "xwa_hook_main");

        assert_eq!(names(&packages), vec!["xwa_hook_main", "xwa_hook_sound"]);
        assert_eq!(
            packages[1].path(),
            Path::new("Hooks").join("xwa_hook_sound.zip")
        );

        Ok(())
    }

    #[sealed_test]
    fn discover_missing_directory() -> anyhow::Result<()> {
        assert_eq!(discover("Hooks", "xwa_hook_")?, Vec::new());
        Ok(())
    }
}
