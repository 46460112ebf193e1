//! BibTeX format parser implementation.
//!
//! Provides functionality to parse `.bib` databases into reference records.
//!
//! # Example
//!
//! ```
//! use bibrefs::{BibtexParser, ReferenceParser};
//!
//! let input = r#"@inproceedings{vaswani2017,
//!   author = {Ashish Vaswani and Noam Shazeer},
//!   title = {Attention Is All You Need},
//!   booktitle = "Advances in Neural Information Processing Systems",
//!   year = 2017,
//! }"#;
//!
//! let parser = BibtexParser::new();
//!
//! let entries = parser.parse(input);
//! assert_eq!(entries[0].entry_type, "inproceedings");
//! assert_eq!(entries[0].year.as_deref(), Some("2017"));
//! ```

mod parse;
mod structure;

use crate::{ReferenceEntry, ReferenceParser};
use parse::bibtex_parse;

/// Parser for BibTeX databases.
///
/// Recognizes `@type{key, field = value, ...}` entries. Values may be
/// brace-delimited, quoted, numeric or bare words. Text outside entries, as
/// well as `@comment`, `@string` and `@preamble` blocks, is ignored.
#[derive(Debug, Clone, Default)]
pub struct BibtexParser;

impl BibtexParser {
    /// Creates a new BibTeX parser instance.
    ///
    /// # Examples
    ///
    /// ```
    /// use bibrefs::BibtexParser;
    /// let parser = BibtexParser::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ReferenceParser for BibtexParser {
    /// Parses a string containing zero or more BibTeX entries.
    ///
    /// Entries are returned in source order. Duplicate keys are kept here;
    /// merging by key happens in [`ReferenceSet`](crate::ReferenceSet).
    fn parse(&self, input: &str) -> Vec<ReferenceEntry> {
        bibtex_parse(input).into_iter().map(ReferenceEntry::from).collect()
    }
}
