// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Readme section parsing.
//!
//! Every hook package ships a `readme.txt` that is split into __sections__ by
//! header lines of the form `*** <label> ***`. Text that appears before the
//! first header is the __preamble__, and is stored under the empty header.
//!
//! # Duplicate Headers
//!
//! Headers are compared case-insensitively, so `*** Setup ***` and
//! `*** SETUP ***` name the same section. When the same header appears more
//! than once in a document, the body of the later occurrence replaces the
//! earlier one. The section keeps the position and the header text of its
//! first appearance. Hook readmes rely on this, do not change it.

use indexmap::{map::Entry, IndexMap};

/// Header delimiter that must open and close a section header line.
const DELIMITER: &str = "***";

/// Ordered mapping of section headers to section bodies.
///
/// Iteration order is the order in which each header first appeared. Headers
/// are stored as first seen, i.e., including the surrounding delimiters, but
/// keyed by their ASCII lowercase form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Sections {
    inner: IndexMap<String, (String, String)>,
}

impl Sections {
    /// Parse readme text into sections.
    ///
    /// Never fails. A document without any header line yields a single
    /// section keyed by the empty string that holds the whole document.
    /// Every body line is terminated with `\n` regardless of the line
    /// terminator used by the source text.
    pub fn parse(text: &str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut sections = Self::default();
        let mut header = String::new();
        let mut body = String::new();

        for line in text.lines() {
            if is_header(line) {
                sections.commit(header, body);
                header = line.to_owned();
                body = String::new();
                continue;
            }

            body.push_str(line);
            body.push('\n');
        }

        sections.commit(header, body);

        sections
    }

    fn commit(&mut self, header: String, body: String) {
        match self.inner.entry(header.to_ascii_lowercase()) {
            Entry::Occupied(mut entry) => entry.get_mut().1 = body,
            Entry::Vacant(entry) => {
                entry.insert((header, body));
            }
        }
    }

    /// Parse raw readme bytes into sections.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    pub fn parse_bytes(bytes: &[u8]) -> Self {
        Self::parse(String::from_utf8_lossy(bytes).as_ref())
    }

    /// Get body of section by header, ignoring ASCII case.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.inner
            .get(&header.to_ascii_lowercase())
            .map(|(_, body)| body.as_str())
    }

    /// Iterate over header and body pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner
            .values()
            .map(|(header, body)| (header.as_str(), body.as_str()))
    }

    /// Number of sections, preamble included.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if there are no sections at all.
    ///
    /// Parsed documents always contain at least the preamble.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Check if line is a section header, e.g., `*** Setup ***`.
pub fn is_header(line: &str) -> bool {
    let line = line.trim_end();
    line.len() >= DELIMITER.len() * 2 + 1
        && line
            .strip_prefix(DELIMITER)
            .and_then(|rest| rest.strip_suffix(DELIMITER))
            .is_some_and(|label| label.starts_with(' ') && label.ends_with(' '))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;

    fn pairs(sections: &Sections) -> Vec<(&str, &str)> {
        sections.iter().collect()
    }

    #[test]
    fn parse_empty_document() {
        let sections = Sections::parse("");
        assert_eq!(pairs(&sections), vec![("", "")]);
    }

    #[test]
    fn parse_document_without_headers() {
        let sections = Sections::parse("hello\r\nworld");
        assert_eq!(pairs(&sections), vec![("", "hello\nworld\n")]);
    }

    #[test]
    fn parse_duplicate_header_overwrites() {
        let sections = Sections::parse("*** A ***\nx\n*** A ***\ny\n");
        assert_eq!(pairs(&sections), vec![("", ""), ("*** A ***", "y\n")]);
    }

    #[test]
    fn parse_duplicate_header_keeps_first_position() {
        let sections = Sections::parse(indoc! {"
            *** A ***
            a1
            *** B ***
            b
            *** A ***
            a2
        "});
        assert_eq!(
            pairs(&sections),
            vec![("", ""), ("*** A ***", "a2\n"), ("*** B ***", "b\n")]
        );
    }

    #[test]
    fn parse_typical_readme() {
        let sections = Sections::parse(indoc! {"
            xwa_hook_sample
            This hook does things.

            *** Requirements ***
            xwa_hook_main

            *** Setup ***
            Place the dll next to XWingAlliance.exe.

            *** Usage ***
            Fly.
        "});

        assert_eq!(
            pairs(&sections),
            vec![
                ("", "xwa_hook_sample\nThis hook does things.\n\n"),
                ("*** Requirements ***", "xwa_hook_main\n\n"),
                ("*** Setup ***", "Place the dll next to XWingAlliance.exe.\n\n"),
                ("*** Usage ***", "Fly.\n"),
            ]
        );
        assert_eq!(sections.get("*** Usage ***"), Some("Fly.\n"));
    }

    #[test]
    fn parse_preserves_header_case() {
        let sections = Sections::parse("*** setup ***\nx\n");
        assert_eq!(pairs(&sections), vec![("", ""), ("*** setup ***", "x\n")]);
        assert_eq!(sections.get("*** Setup ***"), Some("x\n"));
    }

    #[test]
    fn parse_duplicate_header_ignores_case() {
        let sections = Sections::parse("*** Setup ***\nold\n*** SETUP ***\nnew\n");
        assert_eq!(sections.len(), 2);
        assert_eq!(pairs(&sections), vec![("", ""), ("*** Setup ***", "new\n")]);
    }

    #[test]
    fn parse_strips_byte_order_mark() {
        let sections = Sections::parse_bytes(b"\xef\xbb\xbftitle\n*** Setup ***\n");
        assert_eq!(pairs(&sections), vec![("", "title\n"), ("*** Setup ***", "")]);
    }

    #[test_case("*** Setup ***", true; "plain header")]
    #[test_case("*** Setup ***  ", true; "trailing whitespace")]
    #[test_case("*** Hook Settings ***", true; "label with spaces")]
    #[test_case("*** Setup", false; "missing closing delimiter")]
    #[test_case("***Setup***", false; "missing padding")]
    #[test_case(" *** Setup ***", false; "leading whitespace")]
    #[test_case("******", false; "no label")]
    #[test]
    fn header_detection(line: &str, expect: bool) {
        pretty_assertions::assert_eq!(is_header(line), expect);
    }
}
