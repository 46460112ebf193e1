//! A library for extracting structured bibliographic references from paper sources.
//!
//! `bibrefs` turns the bibliography of a LaTeX paper into a list of
//! [`ReferenceEntry`] records. It reads BibTeX databases when a paper ships
//! them and falls back to the `\bibitem` entries of a `thebibliography`
//! environment otherwise.
//!
//! # Key Features
//!
//! - **BibTeX parsing**: `@type{key, field = value, ...}` entries with
//!   brace-delimited, quoted, numeric and bareword values
//! - **Bibitem heuristics**: author, title, journal, booktitle, publisher,
//!   year, volume, number, pages, DOI, URL, arXiv ID and address recovered
//!   from free-form citation text
//! - **Value cleanup**: accent escapes, math delimiters and grouping braces
//!   decoded into display text
//! - **Directory scanning**: recursive discovery of `.bib` and `.tex` files
//!   with deterministic last-write-wins merging by citation key
//!
//! # Basic Usage
//!
//! ```rust
//! use bibrefs::{BibtexParser, ReferenceParser};
//!
//! let input = "@article{doe2020, author = {John Doe}, title = {A Study}, year = {2020}}";
//!
//! let entries = BibtexParser::new().parse(input);
//! assert_eq!(entries[0].id, "doe2020");
//! assert_eq!(entries[0].title.as_deref(), Some("A Study"));
//! ```
//!
//! # Scanning a Paper Directory
//!
//! ```no_run
//! use bibrefs::extract_references;
//!
//! for reference in extract_references("papers/1706.03762") {
//!     if let Some(arxiv) = reference.arxiv_id() {
//!         println!("{} cites arXiv:{}", reference.id, arxiv);
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! Parsing text never fails: spans that do not look like entries are skipped
//! and fields that cannot be recovered are left as `None`. Only reading a
//! file can fail, reported through [`ReferenceError`]:
//!
//! ```rust
//! use bibrefs::{BibtexParser, ReferenceError, ReferenceParser};
//!
//! match BibtexParser::new().parse_file("missing.bib") {
//!     Ok(entries) => println!("Parsed {} entries", entries.len()),
//!     Err(ReferenceError::Io { path, .. }) => eprintln!("Cannot read {}", path.display()),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```
//!
//! # Thread Safety
//!
//! Parsers hold no state between calls and all compiled patterns are
//! immutable, so parsers can be shared between threads. Enable the
//! `parallel` feature to parse the files of a directory concurrently.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod bibitem;
pub mod bibtex;
pub mod collection;
pub mod extract;
pub mod fields;
mod regex;
mod utils;

// Reexports
pub use bibitem::BibitemParser;
pub use bibtex::BibtexParser;
pub use collection::ReferenceSet;
pub use extract::{ExtractorConfig, ReferenceExtractor, extract_references};
pub use fields::KnownField;
pub use utils::clean_bibtex_value;

/// A specialized Result type for reference operations.
pub type Result<T> = std::result::Result<T, ReferenceError>;

/// Represents errors that can occur while reading bibliography sources.
#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Entry type assigned to every `\bibitem`-derived reference.
pub const BIBITEM_TYPE: &str = "bibitem";

/// Record keys that are not source fields. A source field with one of these
/// names is stored under a `bibtex_` prefix so it cannot shadow the record key.
const RESERVED_KEYS: [&str; 6] = ["id", "type", "label", "raw_text", "raw_bibtex", "raw_bibitem"];

/// A single bibliographic reference with its metadata.
///
/// Known fields are typed; any other BibTeX field lands in
/// [`extra_fields`](Self::extra_fields) under its lowercased name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    /// Citation key
    pub id: String,
    /// Entry kind, e.g. `article` or `bibitem`
    #[serde(rename = "type")]
    pub entry_type: String,
    /// Optional label from `\bibitem[label]{key}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booktitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arxiv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Whitespace-collapsed body of a `\bibitem`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    /// Reconstructed `@type{key, ...}` source of a BibTeX entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_bibtex: Option<String>,
    /// Reconstructed `\bibitem[label]{key} body` source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_bibitem: Option<String>,
    /// Fields without a typed slot, keyed by lowercased name
    #[serde(flatten)]
    pub extra_fields: BTreeMap<String, String>,
}

impl ReferenceEntry {
    /// Creates an entry with the given key and type and no fields.
    pub fn new(id: impl Into<String>, entry_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entry_type: entry_type.into(),
            ..Default::default()
        }
    }

    /// Returns the value of a known field.
    pub fn field(&self, field: KnownField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Sets a known field, replacing any previous value.
    pub fn set_known(&mut self, field: KnownField, value: String) {
        *self.slot_mut(field) = Some(value);
    }

    /// Sets a field by name.
    ///
    /// The name is lowercased. Known names fill their typed slot and
    /// everything else is stored in `extra_fields`. Names that clash with a
    /// record key (`type`, `id`, ...) are stored as `bibtex_<name>`. A later
    /// call for the same name overwrites the earlier value.
    pub fn set_field(&mut self, name: &str, value: String) {
        if let Some(field) = KnownField::from_name(name) {
            self.set_known(field, value);
            return;
        }
        let name = name.to_lowercase();
        let name = if RESERVED_KEYS.contains(&name.as_str()) {
            format!("bibtex_{name}")
        } else {
            name
        };
        self.extra_fields.insert(name, value);
    }

    /// Looks up any field by name, including `id`, `type`, `label` and the
    /// raw source fields.
    pub fn get_field(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        match name.as_str() {
            "id" => Some(self.id.as_str()),
            "type" => Some(self.entry_type.as_str()),
            "label" => self.label.as_deref(),
            "raw_text" => self.raw_text.as_deref(),
            "raw_bibtex" => self.raw_bibtex.as_deref(),
            "raw_bibitem" => self.raw_bibitem.as_deref(),
            other => match KnownField::from_name(other) {
                Some(field) => self.field(field),
                None => self.extra_fields.get(other).map(String::as_str),
            },
        }
    }

    /// Flattens the entry into a name to value map.
    ///
    /// `id` and `type` are always present; absent fields are omitted.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("id".to_string(), self.id.clone());
        map.insert("type".to_string(), self.entry_type.clone());
        let optional = [
            ("label", &self.label),
            ("raw_text", &self.raw_text),
            ("raw_bibtex", &self.raw_bibtex),
            ("raw_bibitem", &self.raw_bibitem),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                map.insert(name.to_string(), value.clone());
            }
        }
        for field in KnownField::ALL {
            if let Some(value) = self.field(field) {
                map.insert(field.as_name().to_string(), value.to_string());
            }
        }
        for (name, value) in &self.extra_fields {
            map.entry(name.clone()).or_insert_with(|| value.clone());
        }
        map
    }

    /// The arXiv identifier this reference points at, if any.
    ///
    /// Prefers the `arxiv` field, then a BibTeX `eprint` whose
    /// `archiveprefix` is arXiv.
    pub fn arxiv_id(&self) -> Option<&str> {
        if let Some(arxiv) = self.arxiv.as_deref() {
            return Some(arxiv);
        }
        let is_arxiv = self
            .extra_fields
            .get("archiveprefix")
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("arxiv"));
        if is_arxiv {
            self.extra_fields.get("eprint").map(String::as_str)
        } else {
            None
        }
    }

    fn slot(&self, field: KnownField) -> &Option<String> {
        match field {
            KnownField::Author => &self.author,
            KnownField::Title => &self.title,
            KnownField::Journal => &self.journal,
            KnownField::Booktitle => &self.booktitle,
            KnownField::Publisher => &self.publisher,
            KnownField::Year => &self.year,
            KnownField::Volume => &self.volume,
            KnownField::Number => &self.number,
            KnownField::Pages => &self.pages,
            KnownField::Doi => &self.doi,
            KnownField::Url => &self.url,
            KnownField::Arxiv => &self.arxiv,
            KnownField::Address => &self.address,
        }
    }

    fn slot_mut(&mut self, field: KnownField) -> &mut Option<String> {
        match field {
            KnownField::Author => &mut self.author,
            KnownField::Title => &mut self.title,
            KnownField::Journal => &mut self.journal,
            KnownField::Booktitle => &mut self.booktitle,
            KnownField::Publisher => &mut self.publisher,
            KnownField::Year => &mut self.year,
            KnownField::Volume => &mut self.volume,
            KnownField::Number => &mut self.number,
            KnownField::Pages => &mut self.pages,
            KnownField::Doi => &mut self.doi,
            KnownField::Url => &mut self.url,
            KnownField::Arxiv => &mut self.arxiv,
            KnownField::Address => &mut self.address,
        }
    }
}

/// Trait for implementing reference parsers.
pub trait ReferenceParser {
    /// Parse a string containing zero or more references.
    ///
    /// Text that does not match the format is skipped, so the result may be
    /// empty but parsing itself never fails.
    fn parse(&self, input: &str) -> Vec<ReferenceEntry>;

    /// Read a UTF-8 file and parse its content.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::Io`] if the file cannot be read or is not
    /// valid UTF-8.
    fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<ReferenceEntry>>
    where
        Self: Sized,
    {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ReferenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.parse(&content))
    }
}
