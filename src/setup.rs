// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Setup directory generation.
//!
//! Turns the package directory into a fresh setup directory:
//!
//! 1. Delete the previous setup directory, so stale artifacts never survive.
//! 2. Discover package archives, and put them in processing order.
//! 3. Aggregate every package into the setup, readme, and settings documents,
//!    copying binaries alongside them.

use crate::{
    aggregate::{AggregateError, Aggregator, Sinks},
    config::{PackageSettings, SetupConfig},
    package::{discover, order_packages, PackageError, PackageSource},
};

use indicatif::{ProgressBar, ProgressStyle};
use std::{
    fs::remove_dir_all,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

/// Summary of a finished setup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupReport {
    /// Directory holding generated documents and artifacts.
    pub setup_dir: PathBuf,

    /// Names of processed packages in processing order.
    pub packages: Vec<String>,
}

/// Generate setup directory from package directory.
///
/// # Errors
///
/// - Return [`SetupError::ResetDir`] if setup directory cannot be recreated.
/// - Return [`SetupError::Package`] if packages cannot be discovered.
/// - Return [`SetupError::Aggregate`] if packages cannot be aggregated.
#[instrument(skip(config, workdir, progress), level = "debug")]
pub fn run(
    config: &SetupConfig,
    workdir: impl AsRef<Path>,
    progress: ProgressBar,
) -> Result<SetupReport> {
    let paths = config.resolve(workdir);
    info!("Setup Hooks");

    let mut packages = discover(&paths.hooks, &config.packages.prefix)?;
    order_packages(&mut packages, &config.packages.main);
    reset_dir(&paths.setup)?;
    generate(&packages, &paths.setup, &config.packages, progress)?;

    Ok(SetupReport {
        setup_dir: paths.setup,
        packages: packages
            .iter()
            .map(|package| package.name().to_owned())
            .collect(),
    })
}

/// Aggregate ordered packages into existing setup directory.
///
/// # Errors
///
/// - Return [`SetupError::Aggregate`] if packages cannot be aggregated.
pub fn generate<S: PackageSource>(
    packages: &[S],
    setup_dir: &Path,
    settings: &PackageSettings,
    progress: ProgressBar,
) -> Result<()> {
    let sinks = Sinks::create(setup_dir)?;
    Aggregator::new(sinks, setup_dir)
        .with_examples(settings.examples)
        .with_progress(progress)
        .run(packages)?;

    Ok(())
}

/// Progress bar for package aggregation.
///
/// # Errors
///
/// - Return [`SetupError::IndicatifStyleTemplate`] if style cannot be set.
pub fn progress_bar() -> Result<ProgressBar> {
    let style = ProgressStyle::with_template(
        "{elapsed_precise:.green}  {msg:<40}  [{wide_bar:.yellow/blue}] {pos}/{len}",
    )?
    .progress_chars("-Cco.");
    let bar = ProgressBar::new(0);
    bar.set_style(style);

    Ok(bar)
}

/// Delete directory if present, then create it empty.
fn reset_dir(path: &Path) -> Result<()> {
    if path.exists() {
        remove_dir_all(path).map_err(|err| SetupError::ResetDir {
            source: err,
            path: path.to_path_buf(),
        })?;
    }

    mkdirp::mkdirp(path).map_err(|err| SetupError::ResetDir {
        source: err,
        path: path.to_path_buf(),
    })?;

    Ok(())
}

/// Setup error types.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// Packages cannot be discovered.
    #[error(transparent)]
    Package(#[from] PackageError),

    /// Packages cannot be aggregated.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// Setup directory cannot be recreated.
    #[error("failed to reset setup directory {path:?}")]
    ResetDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Style template cannot be set for progress bars.
    #[error(transparent)]
    IndicatifStyleTemplate(#[from] indicatif::style::TemplateError),
}

/// Friendly result alias :3
type Result<T, E = SetupError> = std::result::Result<T, E>;
