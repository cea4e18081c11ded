// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Package listing parsing.
//!
//! The hook collection publishes its package set as a markdown document where
//! every package has a heading line, e.g., `## xwa_hook_main` for stable
//! packages, or `## WIP xwa_hook_sample` for work-in-progress packages.

/// Package channel of listing document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Released packages.
    #[default]
    Stable,

    /// Work-in-progress packages.
    Wip,
}

impl Channel {
    /// Line marker that precedes package names of channel.
    pub fn marker(self) -> &'static str {
        match self {
            Self::Stable => "## ",
            Self::Wip => "## WIP ",
        }
    }
}

/// Names of lines beginning with a literal marker, with the marker stripped.
pub fn marked_lines<'a>(text: &'a str, marker: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    text.lines().filter_map(move |line| line.strip_prefix(marker))
}

/// List package names of channel in document order.
///
/// Only names beginning with the package prefix are kept, which also keeps
/// work-in-progress headings out of the stable channel.
pub fn parse_listing(text: &str, channel: Channel, prefix: &str) -> Vec<String> {
    marked_lines(text, channel.marker())
        .filter(|name| name.starts_with(prefix))
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const LISTING: &str = indoc! {"
        # xwa_hooks

        ## xwa_hook_main
        Main hook.

        ## WIP xwa_hook_sample
        Still cooking.

        ## xwa_hook_sound
        ### xwa_hook_nested
        ## Credits
    "};

    #[test]
    fn parse_stable_listing() {
        assert_eq!(
            parse_listing(LISTING, Channel::Stable, "xwa_hook_"),
            vec!["xwa_hook_main", "xwa_hook_sound"]
        );
    }

    #[test]
    fn parse_wip_listing() {
        assert_eq!(
            parse_listing(LISTING, Channel::Wip, "xwa_hook_"),
            vec!["xwa_hook_sample"]
        );
    }

    #[test]
    fn marked_lines_strip_marker() {
        let names: Vec<_> = marked_lines("## a\n##b\n## \n", "## ").collect();
        assert_eq!(names, vec!["a", ""]);
    }

    #[test]
    fn parse_empty_listing() {
        assert_eq!(parse_listing("", Channel::Stable, "xwa_hook_"), Vec::<String>::new());
    }
}
