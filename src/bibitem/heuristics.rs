//! Field recovery from free-form citation text.
//!
//! Every field is filled by a cascade: an ordered list of patterns tried in
//! turn, where the first pattern that yields a non-empty value wins. The
//! cascades themselves form a table that is applied top to bottom, so the
//! precedence between fields is visible in one place.

use crate::fields::KnownField;
use crate::regex::{Captures, Regex};
use crate::utils::{collapse_whitespace, normalize_page_range, strip_trailing_period};
use crate::ReferenceEntry;
use std::sync::LazyLock;

/// Picks the value out of a match, or rejects the match.
type Extract = for<'h> fn(&Captures<'h>) -> Option<&'h str>;

/// Turns an extracted value into the stored field value.
type Finish = fn(&str) -> String;

/// One pattern of a cascade.
struct Rule {
    regex: Regex,
    extract: Extract,
}

impl Rule {
    fn new(pattern: &str) -> Self {
        Self::with(pattern, group1)
    }

    fn with(pattern: &str, extract: Extract) -> Self {
        Self {
            regex: Regex::new(pattern).unwrap(),
            extract,
        }
    }
}

/// The ordered rules for one field.
struct Cascade {
    field: KnownField,
    /// Skip the cascade when this field is already set.
    unless: Option<KnownField>,
    rules: Vec<Rule>,
    finish: Finish,
}

impl Cascade {
    /// Run the rules in order and return the first accepted value.
    fn first_match(&self, text: &str) -> Option<String> {
        self.rules.iter().find_map(|rule| {
            rule.regex
                .captures_iter(text)
                .filter_map(|caps| (rule.extract)(&caps).map(str::trim))
                .find(|value| !value.is_empty())
                .map(self.finish)
        })
    }
}

static CASCADES: LazyLock<Vec<Cascade>> = LazyLock::new(|| {
    vec![
        Cascade {
            field: KnownField::Journal,
            unless: None,
            rules: vec![
                Rule::new(r"\\textit\{([^}]+)\}"),
                Rule::new(r"\\emph\{([^}]+)\}"),
                Rule::new(r"\{\\em\s+([^}]+)\}"),
                Rule::new(r"\\em\s+([^\\{}.,]+)"),
                Rule::new(r"In\s+\{\\[A-Za-z]+\s+([^}]+)\}"),
                Rule::new(r"In\s+\\textit\{([^}]+)\}"),
                Rule::new(r#"In\s+"([^"]+)""#),
                Rule::new(r"In\s+\{\\it\s+([^}]+)\}"),
                Rule::with(
                    r"(?:^|[.,;:]\s+)(In\s+)?((?:[A-Z][^.,;:]*?\s)?(?:Journal|Proceedings|Transactions|Review|Letters)\b[^.,;:]*)",
                    unless_proceedings_introduced_by_in,
                ),
            ],
            finish: str::to_string,
        },
        Cascade {
            field: KnownField::Booktitle,
            unless: Some(KnownField::Journal),
            rules: vec![
                Rule::new(r"(?i)\bIn\s+proc(?:eedings|\.)?\s+of\s+(?:the\s+)?([^.,;]+)"),
                Rule::new(
                    r"(?:^|[.,;:]\s+)(?:In\s+)?((?:[A-Z][^.,;:]*?\s)?(?:Conference|Symposium|Workshop)\b[^.,;:]*)",
                ),
            ],
            finish: str::to_string,
        },
        Cascade {
            field: KnownField::Publisher,
            unless: None,
            rules: vec![
                Rule::new(r"[Pp]ublisher:\s*([^.,;]+)"),
                Rule::new(
                    r"\b([A-Z][\w&'-]*(?:\s+(?:of|and|&|[A-Z][\w&'-]*))*\s+(?:Press|Publishers|Publishing))\b",
                ),
            ],
            finish: str::to_string,
        },
        Cascade {
            field: KnownField::Year,
            unless: None,
            rules: vec![Rule::new(
                r"(?:^|[^\w./:])((?:19|20)\d{2})[a-z]?(?:$|[^\w/.]|\.(?:$|\D))",
            )],
            finish: str::to_string,
        },
        Cascade {
            field: KnownField::Volume,
            unless: None,
            rules: vec![Rule::new(r"(?i)\b(?:volume|vol\.)\s*(\d+)")],
            finish: str::to_string,
        },
        Cascade {
            field: KnownField::Number,
            unless: None,
            rules: vec![Rule::new(r"(?i)\b(?:number|no\.|issue)\s*(\d+)")],
            finish: str::to_string,
        },
        Cascade {
            field: KnownField::Pages,
            unless: None,
            rules: vec![Rule::new(r"(?i)\b(?:pages|pp\.)\s*(\d[\d\-–—]*)")],
            finish: normalize_page_range,
        },
        Cascade {
            field: KnownField::Doi,
            unless: None,
            rules: vec![
                Rule::new(r"(?i)\bdoi\s*[:=]\s*([^\s,;{}]+)"),
                Rule::new(r"(?i)doi\.org/([^\s,;{}]+)"),
            ],
            finish: without_trailing_period,
        },
        Cascade {
            field: KnownField::Url,
            unless: None,
            rules: vec![
                Rule::new(r"\\url\{([^}]+)\}"),
                Rule::new(r"(https?://[^\s,;{}]+)"),
            ],
            finish: without_trailing_period,
        },
        Cascade {
            field: KnownField::Arxiv,
            unless: None,
            rules: vec![
                Rule::new(&format!(r"(?i)arxiv:\s*({ARXIV_ID})")),
                Rule::new(&format!(r"(?i)arxiv\.org/abs/({ARXIV_ID})")),
            ],
            finish: str::to_string,
        },
        Cascade {
            field: KnownField::Address,
            unless: None,
            rules: vec![
                Rule::new(r"(?i)\baddress:\s*([^.;]+)"),
                Rule::new(r"\b([A-Z][a-z]+,\s*[A-Z]{2,})\b"),
                Rule::new(r"\b([A-Z][a-z]+,\s*[A-Z][a-z]+)\b"),
            ],
            finish: without_trailing_period,
        },
    ]
});

/// New-style (`2005.14165v2`) and old-style (`hep-th/9901001`) identifiers.
const ARXIV_ID: &str = r"\d{4}\.\d{4,5}(?:v\d+)?|[A-Za-z][A-Za-z\-]*(?:\.[A-Za-z]{2})?/\d{7}(?:v\d+)?";

static BOOK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\\textit\{[^}]*book[^}]*\}").unwrap());

static NEWBLOCK_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\newblock\b").unwrap());

fn group1<'h>(caps: &Captures<'h>) -> Option<&'h str> {
    caps.get(1).map(|m| m.as_str())
}

/// `In Proceedings ...` is a proceedings, which the booktitle cascade
/// handles. Any other `In <venue>` keeps the venue without the `In`.
fn unless_proceedings_introduced_by_in<'h>(caps: &Captures<'h>) -> Option<&'h str> {
    let phrase = caps.get(2)?.as_str();
    if caps.get(1).is_some() && phrase.contains("Proceedings") {
        None
    } else {
        Some(phrase)
    }
}

fn without_trailing_period(value: &str) -> String {
    strip_trailing_period(value).to_string()
}

/// The text the cascades search: `\newblock` markers removed and non-breaking
/// spaces (`~`) turned into plain spaces.
pub(crate) fn search_text(raw_text: &str) -> String {
    collapse_whitespace(&NEWBLOCK_REGEX.replace_all(raw_text, " ").replace('~', " "))
}

/// Fill every field a cascade can recover from `text`.
pub(crate) fn apply_cascades(entry: &mut ReferenceEntry, text: &str) {
    for cascade in CASCADES.iter() {
        if cascade.unless.is_some_and(|field| entry.field(field).is_some()) {
            continue;
        }
        if let Some(value) = cascade.first_match(text) {
            entry.set_known(cascade.field, value);
        }
    }
}

/// Whether the item looks like a book citation.
pub(crate) fn mentions_book(raw_text: &str) -> bool {
    BOOK_REGEX.is_match(raw_text)
}
