// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Hook settings document and merging.
//!
//! The combined settings document is a plain key/value file split into
//! bracketed sections, one per hook settings fragment:
//!
//! ```text
//! [hook_sample]
//! ; comment lines are kept as is
//! Speed = 1
//! OverrideSettings = 0
//! ```
//!
//! Documents are kept line by line, so comments and blank lines survive a
//! round trip. Key and section lookups ignore case.
//!
//! # Merging
//!
//! Whenever hooks are set up again, the freshly generated document must keep
//! the values the user set in the previously installed document. Every value
//! of the installed document is copied into the generated one, unless the
//! generated section sets `OverrideSettings = 1`. In that case the hook wants
//! its shipped defaults to win, and the section is left alone.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::{read_to_string, write},
    path::Path,
    str::FromStr,
};
use tracing::{debug, info};

/// Key of section flag that protects generated defaults from merging.
pub const OVERRIDE_KEY: &str = "OverrideSettings";

/// Line preserving key/value settings document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SettingsDocument {
    preamble: Vec<String>,
    sections: Vec<SettingsSection>,
}

impl SettingsDocument {
    /// Construct new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load document from file.
    ///
    /// # Errors
    ///
    /// - Return [`SettingsError::Read`] if file cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = read_to_string(path).map_err(|err| SettingsError::Read {
            source: err,
            path: path.to_path_buf(),
        })?;

        Ok(content.parse()?)
    }

    /// Save document to file, replacing its current content.
    ///
    /// # Errors
    ///
    /// - Return [`SettingsError::Write`] if file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        write(path, self.to_string()).map_err(|err| SettingsError::Write {
            source: err,
            path: path.to_path_buf(),
        })
    }

    /// Iterate over sections in document order.
    pub fn sections(&self) -> impl Iterator<Item = &SettingsSection> {
        self.sections.iter()
    }

    /// Find section by name, ignoring case.
    pub fn section(&self, name: &str) -> Option<&SettingsSection> {
        self.sections
            .iter()
            .find(|section| section.name.eq_ignore_ascii_case(name))
    }

    /// Find section by name, appending an empty one if missing.
    pub fn section_or_insert(&mut self, name: &str) -> &mut SettingsSection {
        let index = match self
            .sections
            .iter()
            .position(|section| section.name.eq_ignore_ascii_case(name))
        {
            Some(index) => index,
            None => {
                self.sections.push(SettingsSection::new(name));
                self.sections.len() - 1
            }
        };

        &mut self.sections[index]
    }
}

impl FromStr for SettingsDocument {
    type Err = SettingsError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let data = data.strip_prefix('\u{feff}').unwrap_or(data);
        let mut document = SettingsDocument::new();

        for line in data.lines() {
            if let Some(name) = section_header(line) {
                document.sections.push(SettingsSection::new(name));
                continue;
            }

            match document.sections.last_mut() {
                Some(section) => section.lines.push(line.to_owned()),
                None => document.preamble.push(line.to_owned()),
            }
        }

        Ok(document)
    }
}

impl Display for SettingsDocument {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        for line in &self.preamble {
            writeln!(fmt, "{line}")?;
        }

        for section in &self.sections {
            write!(fmt, "{section}")?;
        }

        Ok(())
    }
}

/// Named group of key/value lines.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SettingsSection {
    name: String,
    lines: Vec<String>,
}

impl SettingsSection {
    /// Construct new empty section.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: Vec::new(),
        }
    }

    /// Name of section without brackets.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get value of first line setting key, ignoring case of key.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.lines
            .iter()
            .filter_map(|line| key_value(line))
            .find(|(line_key, _)| line_key.eq_ignore_ascii_case(key))
            .map(|(_, value)| value)
    }

    /// List every distinct key in order of first appearance.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for (key, _) in self.lines.iter().filter_map(|line| key_value(line)) {
            if !keys.iter().any(|seen| seen.eq_ignore_ascii_case(key)) {
                keys.push(key);
            }
        }

        keys
    }

    /// Set value of key.
    ///
    /// Rewrites the first line setting the key. Otherwise, a new line is
    /// inserted right after the last non-blank line of the section, so
    /// trailing blank lines stay at the end.
    pub fn set_value(&mut self, key: &str, value: &str) {
        let existing = self.lines.iter().position(|line| {
            key_value(line).is_some_and(|(line_key, _)| line_key.eq_ignore_ascii_case(key))
        });

        match existing {
            Some(index) => {
                let line_key = key_value(&self.lines[index])
                    .map(|(line_key, _)| line_key.to_owned())
                    .unwrap_or_else(|| key.to_owned());
                self.lines[index] = format!("{line_key} = {value}");
            }
            None => {
                let index = self
                    .lines
                    .iter()
                    .rposition(|line| !line.trim().is_empty())
                    .map_or(0, |index| index + 1);
                self.lines.insert(index, format!("{key} = {value}"));
            }
        }
    }

    /// Check if section asks to keep its own defaults when merging.
    pub fn overrides_settings(&self) -> bool {
        self.value(OVERRIDE_KEY)
            .is_some_and(|value| value.eq_ignore_ascii_case("1"))
    }
}

impl Display for SettingsSection {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        writeln!(fmt, "[{}]", self.name)?;
        for line in &self.lines {
            writeln!(fmt, "{line}")?;
        }

        Ok(())
    }
}

/// Extract section name from `[name]` line.
fn section_header(line: &str) -> Option<&str> {
    line.trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .map(str::trim)
}

/// Split `key = value` line, skipping comments.
fn key_value(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.starts_with(';') || line.starts_with('#') {
        return None;
    }

    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    Some((key, value.trim()))
}

/// What happened to one installed section during a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Installed values were copied into generated section.
    Preserved { keys: usize },

    /// Generated section sets override flag, nothing was copied.
    Overridden,
}

/// Merge installed settings into generated settings.
///
/// For every section of `current`, its values overwrite the values of the
/// generated section of the same name, which is created if missing. Sections
/// flagged with `OverrideSettings = 1` in `generated` are skipped. Keys and
/// sections that only exist in `generated` are left untouched. Keys are not
/// filtered against what the generated section knows about.
///
/// Returns the outcome of every section of `current` in order.
pub fn merge(
    current: &SettingsDocument,
    generated: &mut SettingsDocument,
) -> Vec<(String, MergeOutcome)> {
    let mut outcomes = Vec::new();

    for section in current.sections() {
        info!("[{}]", section.name());
        let target = generated.section_or_insert(section.name());

        if target.overrides_settings() {
            debug!("keep generated defaults of section {:?}", section.name());
            outcomes.push((section.name().to_owned(), MergeOutcome::Overridden));
            continue;
        }

        let keys = section.keys();
        for key in &keys {
            if let Some(value) = section.value(key) {
                target.set_value(key, value);
            }
        }

        outcomes.push((
            section.name().to_owned(),
            MergeOutcome::Preserved { keys: keys.len() },
        ));
    }

    outcomes
}

/// Settings document error types.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Settings file cannot be read.
    #[error("failed to read settings file {path:?}")]
    Read {
        #[source]
        source: std::io::Error,
        path: std::path::PathBuf,
    },

    /// Settings file cannot be written.
    #[error("failed to write settings file {path:?}")]
    Write {
        #[source]
        source: std::io::Error,
        path: std::path::PathBuf,
    },
}

/// Friendly result alias :3
type Result<T, E = SettingsError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    fn document(text: &str) -> SettingsDocument {
        match text.parse() {
            Ok(document) => document,
            Err(err) => panic!("{err}"),
        }
    }

    #[test]
    fn round_trip_keeps_comments() {
        let text = indoc! {"
            ; generated by setup
            [hook_sample]
            ; speed of things
            Speed = 1

            [hook_other]
            Mode=auto
        "};
        assert_eq!(document(text).to_string(), text);
    }

    #[test]
    fn lookup_ignores_case() {
        let settings = document(indoc! {"
            [Hook_Sample]
            speed = 1
            ; Mode = manual
            Mode = auto
            speed = 2
        "});
        let section = settings.section("hook_sample");

        assert_eq!(section.and_then(|s| s.value("SPEED")), Some("1"));
        assert_eq!(section.and_then(|s| s.value("mode")), Some("auto"));
        assert_eq!(section.map(|s| s.keys()), Some(vec!["speed", "Mode"]));
    }

    #[test]
    fn set_value_rewrites_or_inserts() {
        let mut settings = document(indoc! {"
            [hook_sample]
            ; comment
            speed=1

            [hook_other]
        "});
        let section = settings.section_or_insert("hook_sample");
        section.set_value("Speed", "5");
        section.set_value("Mode", "auto");

        assert_eq!(
            settings.to_string(),
            indoc! {"
                [hook_sample]
                ; comment
                speed = 5
                Mode = auto

                [hook_other]
            "}
        );
    }

    #[test]
    fn merge_preserves_installed_values() {
        let current = document("[Foo]\nSpeed = 5\n");
        let mut generated = document("[Foo]\nSpeed = 1\nMode = auto\n");

        let outcomes = merge(&current, &mut generated);

        assert_eq!(generated.to_string(), "[Foo]\nSpeed = 5\nMode = auto\n");
        assert_eq!(
            outcomes,
            vec![("Foo".to_owned(), MergeOutcome::Preserved { keys: 1 })]
        );
    }

    #[test]
    fn merge_honors_override_flag() {
        let current = document("[Foo]\nSpeed = 5\nOverrideSettings = 0\n");
        let mut generated = document("[Foo]\nSpeed = 1\nMode = auto\nOverrideSettings = 1\n");
        let expect = generated.clone();

        let outcomes = merge(&current, &mut generated);

        assert_eq!(generated, expect);
        assert_eq!(outcomes, vec![("Foo".to_owned(), MergeOutcome::Overridden)]);
    }

    #[test]
    fn merge_copies_override_flag_when_not_set() {
        let current = document("[Foo]\nOverrideSettings = 1\n");
        let mut generated = document("[Foo]\nOverrideSettings = 0\n");

        merge(&current, &mut generated);

        assert_eq!(generated.to_string(), "[Foo]\nOverrideSettings = 1\n");
    }

    #[test]
    fn merge_keeps_unknown_keys_and_sections() {
        let current = document(indoc! {"
            [Foo]
            Legacy = yes
            [Gone]
            Key = value
        "});
        let mut generated = document(indoc! {"
            [Foo]
            Speed = 1

            [New]
            Fresh = 1
        "});

        merge(&current, &mut generated);

        assert_eq!(
            generated.to_string(),
            indoc! {"
                [Foo]
                Speed = 1
                Legacy = yes

                [New]
                Fresh = 1
                [Gone]
                Key = value
            "}
        );
    }

    #[sealed_test]
    fn load_and_save_settings_file() -> anyhow::Result<()> {
        write("Hooks.ini", "[Foo]\r\nSpeed = 1\r\n")?;
        let mut settings = SettingsDocument::load("Hooks.ini")?;
        settings.section_or_insert("foo").set_value("speed", "2");
        settings.save("Hooks.ini")?;

        assert_eq!(read_to_string("Hooks.ini")?, "[Foo]\nSpeed = 2\n");

        Ok(())
    }
}
