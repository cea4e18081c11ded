// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the configuration file xwahooks uses to locate its
//! package, setup, and installation directories. Every field is optional, so
//! an empty file, or no file at all, yields the layout of a hooks setup
//! directory placed inside of an X-Wing Alliance installation:
//!
//! ```toml
//! [paths]
//! hooks = "Hooks"
//! setup = "Setup"
//! install = ".."
//!
//! [packages]
//! prefix = "xwa_hook_"
//! main = "xwa_hook_main"
//! examples = false
//! ```
//!
//! File I/O is left to the caller to figure out.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Setup configuration layout.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SetupConfig {
    /// Directory layout.
    pub paths: PathSettings,

    /// Package naming and handling.
    pub packages: PackageSettings,
}

impl SetupConfig {
    /// Resolve configured paths against working directory.
    ///
    /// Absolute paths are kept as is.
    pub fn resolve(&self, workdir: impl AsRef<Path>) -> ResolvedPaths {
        let workdir = workdir.as_ref();
        ResolvedPaths {
            hooks: workdir.join(&self.paths.hooks),
            setup: workdir.join(&self.paths.setup),
            install: workdir.join(&self.paths.install),
        }
    }
}

impl FromStr for SetupConfig {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: SetupConfig = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on every path field.
        for path in [
            &mut config.paths.hooks,
            &mut config.paths.setup,
            &mut config.paths.install,
        ] {
            *path = PathBuf::from(
                shellexpand::full(path.to_string_lossy().as_ref())
                    .map_err(ConfigError::ShellExpansion)?
                    .into_owned(),
            );
        }

        Ok(config)
    }
}

impl Display for SetupConfig {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Directory layout settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathSettings {
    /// Directory holding package archives.
    pub hooks: PathBuf,

    /// Directory receiving generated documents and artifacts.
    pub setup: PathBuf,

    /// Game installation directory to update.
    pub install: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            hooks: PathBuf::from("Hooks"),
            setup: PathBuf::from("Setup"),
            install: PathBuf::from(".."),
        }
    }
}

/// Package naming and handling settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PackageSettings {
    /// File name prefix shared by all package archives.
    pub prefix: String,

    /// Name prefix of package that is always processed first.
    pub main: String,

    /// Copy auxiliary package content into examples directories.
    pub examples: bool,
}

impl Default for PackageSettings {
    fn default() -> Self {
        Self {
            prefix: "xwa_hook_".into(),
            main: "xwa_hook_main".into(),
            examples: false,
        }
    }
}

/// Configured paths joined to a working directory.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ResolvedPaths {
    /// Directory holding package archives.
    pub hooks: PathBuf,

    /// Directory receiving generated documents and artifacts.
    pub setup: PathBuf,

    /// Game installation directory to update.
    pub install: PathBuf,
}

/// Configuration error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[sealed_test(env = [("XWA", "/games/xwa")])]
    fn deserialize_setup_config() -> anyhow::Result<()> {
        let result: SetupConfig = r#"
            [paths]
            hooks = "downloads"
            install = "$XWA"

            [packages]
            examples = true
        "#
        .parse()?;

        let expect = SetupConfig {
            paths: PathSettings {
                hooks: PathBuf::from("downloads"),
                setup: PathBuf::from("Setup"),
                install: PathBuf::from("/games/xwa"),
            },
            packages: PackageSettings {
                prefix: "xwa_hook_".into(),
                main: "xwa_hook_main".into(),
                examples: true,
            },
        };

        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn deserialize_empty_config() -> anyhow::Result<()> {
        let result: SetupConfig = "".parse()?;
        assert_eq!(result, SetupConfig::default());

        Ok(())
    }

    #[test]
    fn serialize_setup_config() {
        let result = SetupConfig::default().to_string();

        let expect = indoc! {r#"
            [paths]
            hooks = "Hooks"
            setup = "Setup"
            install = ".."

            [packages]
            prefix = "xwa_hook_"
            main = "xwa_hook_main"
            examples = false
        "#};

        assert_eq!(result, expect);
    }

    #[test]
    fn resolve_paths_against_workdir() {
        let mut config = SetupConfig::default();
        config.paths.install = PathBuf::from("/games/xwa");

        let result = config.resolve("/tmp/setup");

        assert_eq!(
            result,
            ResolvedPaths {
                hooks: PathBuf::from("/tmp/setup/Hooks"),
                setup: PathBuf::from("/tmp/setup/Setup"),
                install: PathBuf::from("/games/xwa"),
            }
        );
    }
}
