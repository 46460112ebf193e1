//! Conversion of split `\bibitem` entries into reference records.
//!
//! The first logical line is taken as the author list and the second as the
//! title. Every other field comes from the pattern cascades run over the
//! whole item text.

use crate::bibitem::heuristics::{apply_cascades, mentions_book, search_text};
use crate::bibitem::split::{RawBibitem, logical_lines};
use crate::fields::KnownField;
use crate::utils::{collapse_whitespace, strip_trailing_period};
use crate::{BIBITEM_TYPE, ReferenceEntry};

impl RawBibitem {
    /// Rebuild `\bibitem[label]{key} body` from the split pieces.
    pub(crate) fn reconstruct(&self) -> String {
        let mut raw = String::from("\\bibitem");
        if let Some(label) = &self.label {
            raw.push('[');
            raw.push_str(label);
            raw.push(']');
        }
        raw.push('{');
        raw.push_str(&self.key);
        raw.push('}');
        if !self.body.is_empty() {
            raw.push(' ');
            raw.push_str(&self.body);
        }
        raw
    }
}

impl From<RawBibitem> for ReferenceEntry {
    fn from(raw: RawBibitem) -> Self {
        let raw_bibitem = raw.reconstruct();
        let raw_text = collapse_whitespace(&raw.body);

        let mut entry = ReferenceEntry::new(raw.key, BIBITEM_TYPE);
        entry.label = raw.label;

        let lines = logical_lines(&raw.body);
        for (field, line) in [KnownField::Author, KnownField::Title].into_iter().zip(&lines) {
            let value = strip_trailing_period(line);
            if !value.is_empty() {
                entry.set_known(field, value.to_string());
            }
        }

        apply_cascades(&mut entry, &search_text(&raw_text));

        if entry.journal.is_none() && mentions_book(&raw_text) {
            entry.entry_type = "book".to_string();
        }

        entry.raw_text = Some(raw_text);
        entry.raw_bibitem = Some(raw_bibitem);
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(label: Option<&str>, key: &str, body: &str) -> RawBibitem {
        RawBibitem {
            label: label.map(str::to_string),
            key: key.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_reconstruct() {
        assert_eq!(
            raw(Some("Lee19"), "lee2019", "J. Lee.").reconstruct(),
            r"\bibitem[Lee19]{lee2019} J. Lee."
        );
        assert_eq!(raw(None, "k", "Body.").reconstruct(), r"\bibitem{k} Body.");
        assert_eq!(raw(None, "", "").reconstruct(), r"\bibitem{}");
    }

    #[test]
    fn test_author_and_title_from_lines() {
        let entry: ReferenceEntry =
            raw(None, "k", "A. Smith and B. Jones.\n\\newblock Some Title.\n\\newblock 2020.").into();
        assert_eq!(entry.id, "k");
        assert_eq!(entry.entry_type, BIBITEM_TYPE);
        assert_eq!(entry.author.as_deref(), Some("A. Smith and B. Jones"));
        assert_eq!(entry.title.as_deref(), Some("Some Title"));
        assert_eq!(entry.year.as_deref(), Some("2020"));
        assert_eq!(
            entry.raw_text.as_deref(),
            Some("A. Smith and B. Jones. \\newblock Some Title. \\newblock 2020.")
        );
    }

    #[test]
    fn test_single_line_has_no_title() {
        let entry: ReferenceEntry = raw(None, "k", "Anonymous").into();
        assert_eq!(entry.author.as_deref(), Some("Anonymous"));
        assert_eq!(entry.title, None);
    }

    #[test]
    fn test_empty_body() {
        let entry: ReferenceEntry = raw(None, "empty", "").into();
        assert_eq!(entry.author, None);
        assert_eq!(entry.title, None);
        assert_eq!(entry.raw_text.as_deref(), Some(""));
        assert_eq!(entry.raw_bibitem.as_deref(), Some(r"\bibitem{empty}"));
    }

    #[test]
    fn test_book_type() {
        let entry: ReferenceEntry =
            raw(None, "k", r"D. Knuth. \newblock \textit{The TeXbook}. \newblock Addison-Wesley, 1984.")
                .into();
        // the emphasized title is also taken as a journal, so the type stays
        assert_eq!(entry.journal.as_deref(), Some("The TeXbook"));
        assert_eq!(entry.entry_type, BIBITEM_TYPE);

        let entry: ReferenceEntry =
            raw(None, "k", r"A. Author. \newblock \TEXTIT{A Field Guide Book}. \newblock 1990.").into();
        assert_eq!(entry.journal, None);
        assert_eq!(entry.entry_type, "book");
    }
}
