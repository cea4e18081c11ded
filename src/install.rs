// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Installation update.
//!
//! Once the setup directory is generated, an existing game installation is
//! brought up to date: the installed settings are merged into the generated
//! ones, then the generated settings and binaries replace the installed ones.
//! Without an installation, or without installed settings, there is nothing to
//! update.

use crate::{
    aggregate::SETTINGS_FILE,
    settings::{merge, MergeOutcome, SettingsDocument, SettingsError},
};

use std::{
    fs::{copy, read_dir},
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

/// Executable that marks a directory as game installation.
pub const GAME_EXECUTABLE: &str = "XWingAlliance.exe";

/// Extensions of setup files that are copied into the installation.
const INSTALL_EXTENSIONS: [&str; 4] = ["ini", "dll", "exe", "config"];

/// Game installation directory with installed settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    dir: PathBuf,
}

impl Installation {
    /// Detect installation in directory.
    ///
    /// Returns [`None`] unless both the game executable and the settings
    /// document exist in the directory.
    pub fn detect(dir: impl Into<PathBuf>) -> Option<Self> {
        let dir = dir.into();
        let detected = dir.join(GAME_EXECUTABLE).is_file() && dir.join(SETTINGS_FILE).is_file();
        detected.then_some(Self { dir })
    }

    /// Installation directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Merge installed settings into settings of setup directory.
    ///
    /// Generated settings document is rewritten in place.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError::Settings`] if either settings document cannot
    ///   be read, or generated document cannot be written.
    #[instrument(skip(self, setup_dir), level = "debug")]
    pub fn merge_settings(
        &self,
        setup_dir: impl AsRef<Path>,
    ) -> Result<Vec<(String, MergeOutcome)>> {
        info!("Update {SETTINGS_FILE}");
        let generated_path = setup_dir.as_ref().join(SETTINGS_FILE);
        let current = SettingsDocument::load(self.dir.join(SETTINGS_FILE))?;
        let mut generated = SettingsDocument::load(&generated_path)?;

        let outcomes = merge(&current, &mut generated);
        generated.save(&generated_path)?;

        Ok(outcomes)
    }

    /// Copy settings and binaries of setup directory into installation.
    ///
    /// Only top-level files with an installable extension are copied,
    /// replacing installed files of the same name.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError::ReadDir`] if setup directory cannot be read.
    /// - Return [`InstallError::Copy`] if a file cannot be copied.
    #[instrument(skip(self, setup_dir), level = "debug")]
    pub fn copy_setup(&self, setup_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        info!("Update Hooks");
        let setup_dir = setup_dir.as_ref();
        let entries = read_dir(setup_dir).map_err(|err| InstallError::ReadDir {
            source: err,
            path: setup_dir.to_path_buf(),
        })?;

        let mut sources = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|err| InstallError::ReadDir {
                    source: err,
                    path: setup_dir.to_path_buf(),
                })?
                .path();
            if path.is_file() && is_installable(&path) {
                sources.push(path);
            }
        }
        sources.sort();

        let mut installed = Vec::new();
        for source in sources {
            let Some(file_name) = source.file_name() else {
                continue;
            };
            let target = self.dir.join(file_name);
            info!("{}", file_name.to_string_lossy());
            copy(&source, &target).map_err(|err| InstallError::Copy {
                source: err,
                path: target.clone(),
            })?;
            installed.push(target);
        }

        Ok(installed)
    }

    /// Merge settings, then copy setup directory into installation.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError`] if either step fails.
    pub fn update(&self, setup_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let setup_dir = setup_dir.as_ref();
        self.merge_settings(setup_dir)?;
        self.copy_setup(setup_dir)
    }
}

fn is_installable(path: &Path) -> bool {
    path.extension().is_some_and(|extension| {
        INSTALL_EXTENSIONS
            .iter()
            .any(|known| extension.eq_ignore_ascii_case(known))
    })
}

/// Installation error types.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// Settings document cannot be loaded or saved.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Setup directory cannot be read.
    #[error("failed to read setup directory {path:?}")]
    ReadDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Setup file cannot be copied into installation.
    #[error("failed to copy setup file to {path:?}")]
    Copy {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
type Result<T, E = InstallError> = std::result::Result<T, E>;
