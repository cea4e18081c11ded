// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Package entry classification.
//!
//! Each file inside a hook package is sent to at most one output category based
//! on its name alone. Readme sections are further routed to the setup and
//! readme documents based on their header.

/// Name of the readme file inside a hook package.
pub const README_NAME: &str = "readme.txt";

/// Header of readme section that is part of both documents.
pub const SETUP_HEADER: &str = "*** Setup ***";

/// Header of readme section that only belongs in the readme document.
pub const USAGE_HEADER: &str = "*** Usage ***";

/// Separator line written before each package readme.
pub const SEPARATOR: &str = "========================================";

/// Destination category of a package entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Structured readme split into sections.
    Readme,

    /// Key/value settings fragment for the combined settings document.
    SettingsFragment,

    /// Binary copied verbatim into the setup directory.
    BinaryArtifact,

    /// Auxiliary content that is not part of any generated document.
    Ignore,
}

const BINARY_SUFFIXES: [&str; 3] = [".dll", ".exe", ".exe.config"];

/// Classify package entry by its short name.
///
/// Name comparisons are case-sensitive. First match wins: readme, then
/// settings fragment, then binary artifact.
pub fn classify(name: &str) -> EntryKind {
    if name == README_NAME {
        EntryKind::Readme
    } else if name.ends_with(".cfg") {
        EntryKind::SettingsFragment
    } else if BINARY_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
        EntryKind::BinaryArtifact
    } else {
        EntryKind::Ignore
    }
}

/// Where a readme section ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionRoute {
    /// Unlabeled leading text, written to both documents without a header.
    Preamble,

    /// Setup section, written to both documents.
    Setup,

    /// Usage section, written to the readme document only.
    Usage,

    /// Any other section, written to the setup document only.
    Other,
}

impl SectionRoute {
    /// Section belongs in setup document.
    pub fn to_setup(self) -> bool {
        !matches!(self, Self::Usage)
    }

    /// Section belongs in readme document.
    pub fn to_readme(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Route readme section by its header.
pub fn route(header: &str) -> SectionRoute {
    if header.is_empty() {
        SectionRoute::Preamble
    } else if header.eq_ignore_ascii_case(SETUP_HEADER) {
        SectionRoute::Setup
    } else if header.eq_ignore_ascii_case(USAGE_HEADER) {
        SectionRoute::Usage
    } else {
        SectionRoute::Other
    }
}

/// Position tag of package among all packages, e.g., `[2/3] `.
///
/// Rank is 1-based.
pub fn format_tag(rank: usize, total: usize) -> String {
    format!("[{rank}/{total}] ")
}

/// Capitalize every underscore delimited segment of name.
///
/// So `xwa_hook_main.dll` becomes `Xwa_Hook_Main.dll`. Empty segments are
/// left as is.
pub fn formatted_file_name(name: &str) -> String {
    name.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("_")
}
