//! Known reference fields and their names.
//!
//! Field names are matched case-insensitively, the way BibTeX treats them.
//! Anything not listed here is stored verbatim in
//! [`ReferenceEntry::extra_fields`](crate::ReferenceEntry::extra_fields).

/// The semantic fields every parser knows how to fill.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
pub enum KnownField {
    /// author - Author list as written in the source
    Author,
    /// title - Title of the work
    Title,
    /// journal - Journal or periodical name
    Journal,
    /// booktitle - Proceedings or collection title
    Booktitle,
    /// publisher - Publishing house
    Publisher,
    /// year - Four-digit publication year
    Year,
    /// volume - Volume number
    Volume,
    /// number - Issue number
    Number,
    /// pages - Page range
    Pages,
    /// doi - Digital Object Identifier
    Doi,
    /// url - Web address
    Url,
    /// arxiv - arXiv identifier
    Arxiv,
    /// address - Place of publication
    Address,
}

impl KnownField {
    /// All known fields, in canonical order.
    pub const ALL: [KnownField; 13] = [
        KnownField::Author,
        KnownField::Title,
        KnownField::Journal,
        KnownField::Booktitle,
        KnownField::Publisher,
        KnownField::Year,
        KnownField::Volume,
        KnownField::Number,
        KnownField::Pages,
        KnownField::Doi,
        KnownField::Url,
        KnownField::Arxiv,
        KnownField::Address,
    ];

    /// Look up a field by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_name().eq_ignore_ascii_case(name))
    }

    /// The lowercase field name used in BibTeX sources and flat maps.
    pub fn as_name(&self) -> &'static str {
        match self {
            KnownField::Author => "author",
            KnownField::Title => "title",
            KnownField::Journal => "journal",
            KnownField::Booktitle => "booktitle",
            KnownField::Publisher => "publisher",
            KnownField::Year => "year",
            KnownField::Volume => "volume",
            KnownField::Number => "number",
            KnownField::Pages => "pages",
            KnownField::Doi => "doi",
            KnownField::Url => "url",
            KnownField::Arxiv => "arxiv",
            KnownField::Address => "address",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("author", Some(KnownField::Author))]
    #[case("BookTitle", Some(KnownField::Booktitle))]
    #[case("DOI", Some(KnownField::Doi))]
    #[case("arxiv", Some(KnownField::Arxiv))]
    #[case("eprint", None)]
    #[case("", None)]
    fn test_from_name(#[case] name: &str, #[case] expected: Option<KnownField>) {
        assert_eq!(KnownField::from_name(name), expected);
    }

    #[test]
    fn test_names_round_trip() {
        for field in KnownField::ALL {
            assert_eq!(KnownField::from_name(field.as_name()), Some(field));
        }
    }
}
