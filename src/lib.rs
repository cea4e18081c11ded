// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Hook package aggregation for X-Wing Alliance.
//!
//! Hooks are independently packaged add-ons, each distributed as a zip archive
//! holding binaries, a sectioned `readme.txt`, and an optional settings
//! fragment. Xwahooks consolidates a directory of such packages into:
//!
//! - `Hooks_Setup.txt`, the setup instructions of every hook.
//! - `Hooks_Readme.txt`, the usage instructions of every hook.
//! - `Hooks.ini`, the combined settings of every hook.
//!
//! Afterwards, an existing game installation can be updated with the result
//! while keeping the settings the user already changed.
//!
//! # Pipeline
//!
//! 1. [`package`] lists package archives and orders them.
//! 2. [`aggregate`] classifies every package entry through [`entry`], splits
//!    readmes through [`readme`], and fans everything out into the output
//!    documents.
//! 3. [`install`] merges the installed settings through [`settings`], and
//!    copies the setup directory into the installation.

pub mod aggregate;
pub mod archive;
pub mod config;
pub mod entry;
pub mod install;
pub mod listing;
pub mod package;
pub mod path;
pub mod readme;
pub mod settings;
pub mod setup;

pub use aggregate::{Aggregator, Sinks};
pub use config::SetupConfig;
pub use install::Installation;
pub use readme::Sections;
pub use settings::{merge, SettingsDocument};
