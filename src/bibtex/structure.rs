//! BibTeX intermediate data structures.
//!
//! # Design Decision
//!
//! ## Field Processing Strategy
//! - **Delimited values** (braces, quotes) are cleaned into display text
//! - **Numbers and barewords** are kept exactly as written
//! - **Last-wins**: a field assigned twice keeps its later value
//! - **Open record**: unknown field names are preserved in `extra_fields`

use crate::fields::KnownField;
use crate::utils::{clean_bibtex_value, normalize_page_range};
use crate::ReferenceEntry;
use itertools::Itertools;

/// A field value together with the syntax it was written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FieldValue {
    /// `name = { ... }`
    Braced(String),
    /// `name = "..."`
    Quoted(String),
    /// `name = 2020`
    Number(String),
    /// `name = jan`
    Bare(String),
}

impl FieldValue {
    /// The value as it should appear in the record.
    pub(crate) fn into_text(self) -> String {
        match self {
            FieldValue::Braced(raw) | FieldValue::Quoted(raw) => clean_bibtex_value(&raw),
            FieldValue::Number(raw) | FieldValue::Bare(raw) => raw,
        }
    }

    /// The value written back in its original syntax.
    fn source(&self) -> String {
        match self {
            FieldValue::Braced(raw) => format!("{{{raw}}}"),
            FieldValue::Quoted(raw) => format!("\"{raw}\""),
            FieldValue::Number(raw) | FieldValue::Bare(raw) => raw.clone(),
        }
    }
}

/// One `@type{key, body}` entry as scanned from the source.
#[derive(Debug, Clone)]
pub(crate) struct RawBibtexEntry {
    /// Lowercased entry type.
    pub(crate) entry_type: String,
    pub(crate) key: String,
    /// Field list between the key's comma and the closing brace, trimmed.
    pub(crate) body: String,
    /// Field assignments in source order, names lowercased.
    pub(crate) fields: Vec<(String, FieldValue)>,
    /// Whether the entry ended with its own closing brace.
    pub(crate) closed: bool,
}

impl RawBibtexEntry {
    /// Rebuild `@type{key, body}` from the scanned pieces.
    ///
    /// An unterminated entry may hold an unbalanced value that the added
    /// closing brace would complete, so its body is rebuilt from the fields
    /// that parsed instead of the source text.
    pub(crate) fn reconstruct(&self) -> String {
        let body = if self.closed {
            self.body.clone()
        } else {
            self.fields
                .iter()
                .map(|(name, value)| format!("{name} = {}", value.source()))
                .join(", ")
        };

        if body.is_empty() {
            format!("@{}{{{},}}", self.entry_type, self.key)
        } else {
            format!("@{}{{{}, {}}}", self.entry_type, self.key, body)
        }
    }
}

impl From<RawBibtexEntry> for ReferenceEntry {
    fn from(raw: RawBibtexEntry) -> Self {
        let raw_bibtex = raw.reconstruct();
        let mut entry = ReferenceEntry::new(raw.key, raw.entry_type);

        for (name, value) in raw.fields {
            let text = value.into_text();
            if KnownField::from_name(&name) == Some(KnownField::Pages) {
                entry.set_known(KnownField::Pages, normalize_page_range(&text));
            } else {
                entry.set_field(&name, text);
            }
        }

        entry.raw_bibtex = Some(raw_bibtex);
        entry
    }
}
