//! LaTeX `\bibitem` parser implementation.
//!
//! Bibliographies typed by hand into a `thebibliography` environment carry no
//! field markup, so fields are recovered heuristically from the citation
//! prose.
//!
//! # Example
//!
//! ```
//! use bibrefs::{BibitemParser, ReferenceParser};
//!
//! let input = r"\begin{thebibliography}{1}
//! \bibitem{brown2020} T. Brown. Language Models are Few-Shot Learners.
//! \newblock arXiv:2005.14165, 2020.
//! \end{thebibliography}";
//!
//! let entries = BibitemParser::new().parse(input);
//! assert_eq!(entries[0].id, "brown2020");
//! assert_eq!(entries[0].arxiv.as_deref(), Some("2005.14165"));
//! ```

mod heuristics;
mod split;
mod structure;

use crate::{ReferenceEntry, ReferenceParser};
use split::split_bibitems;

/// Parser for `\bibitem` bibliographies.
///
/// Works on whole `.tex` files: text outside `\bibitem` entries is ignored
/// and the closing `\end{thebibliography}` is optional.
#[derive(Debug, Clone, Default)]
pub struct BibitemParser;

impl BibitemParser {
    /// Creates a new bibitem parser instance.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ReferenceParser for BibitemParser {
    fn parse(&self, input: &str) -> Vec<ReferenceEntry> {
        split_bibitems(input)
            .into_iter()
            .map(ReferenceEntry::from)
            .collect()
    }
}
