//! BibTeX parsing implementation.
//!
//! This module handles the low-level scanning of BibTeX text into raw entries
//! and field assignments. Entries are found by their `@type{key,` header; the
//! body runs to the matching closing brace, or, for an unterminated entry, to
//! the next entry header.

use crate::bibtex::structure::{FieldValue, RawBibtexEntry};
use crate::regex::Regex;
use std::sync::LazyLock;

/// Entry header candidates: `@type{`.
static ENTRY_START_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([A-Za-z]+)\s*\{").unwrap());

static ENTRY_START_HERE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@[A-Za-z]+\s*\{").unwrap());

/// The citation key and its terminating comma, right after the opening brace.
static KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([^,\s{}=]+)\s*,").unwrap());

/// A field name and its `=`, with the value starting right after the match.
static FIELD_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Za-z_][\w\-:.]*)\s*=\s*").unwrap());

static NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?$").unwrap());

/// Block types that share the `@type{...}` syntax but are not references.
const NON_ENTRY_TYPES: [&str; 3] = ["comment", "string", "preamble"];

/// Parse the content of a BibTeX file into raw entries, in source order.
pub(crate) fn bibtex_parse<S: AsRef<str>>(bibtex_text: S) -> Vec<RawBibtexEntry> {
    let text = bibtex_text.as_ref();
    let mut entries = Vec::new();
    let mut consumed = 0;

    for caps in ENTRY_START_REGEX.captures_iter(text) {
        let Some(header) = caps.get(0) else { continue };
        if header.start() < consumed {
            continue;
        }

        let entry_type = caps[1].to_lowercase();
        let (body_end, resume) = find_body_end(text, header.end());
        consumed = resume;

        if NON_ENTRY_TYPES.contains(&entry_type.as_str()) {
            continue;
        }

        let rest = &text[header.end()..body_end];
        let Some(key_caps) = KEY_REGEX.captures(rest) else {
            continue;
        };
        let key_len = key_caps.get(0).map_or(0, |m| m.end());
        let body = rest[key_len..].trim();

        entries.push(RawBibtexEntry {
            entry_type,
            key: key_caps[1].to_string(),
            body: body.to_string(),
            fields: parse_fields(body),
            closed: resume > body_end,
        });
    }

    entries
}

/// Locate the end of an entry body starting at byte offset `from`.
///
/// Returns the offset where the body ends and the offset where scanning for
/// the next entry may resume. A closing brace at depth zero ends the entry.
/// An entry header at depth zero, or at the start of a line, ends an
/// unterminated entry.
fn find_body_end(text: &str, from: usize) -> (usize, usize) {
    let mut depth = 0usize;
    let mut chars = text[from..].char_indices();

    while let Some((offset, c)) = chars.next() {
        let index = from + offset;
        match c {
            '\\' => {
                chars.next();
            }
            '{' => depth += 1,
            '}' if depth == 0 => return (index, index + 1),
            '}' => depth -= 1,
            '@' if (depth == 0 || at_line_start(text, index))
                && ENTRY_START_HERE_REGEX.is_match(&text[index..]) =>
            {
                return (index, index);
            }
            _ => {}
        }
    }

    (text.len(), text.len())
}

fn at_line_start(text: &str, index: usize) -> bool {
    let before = text[..index].trim_end_matches([' ', '\t']);
    before.is_empty() || before.ends_with('\n')
}

/// Extract every field assignment from an entry body.
///
/// Assignments are matched wherever they occur; text between them (commas,
/// stray tokens, `#` concatenations) is skipped, and a trailing field needs
/// no comma.
pub(crate) fn parse_fields(body: &str) -> Vec<(String, FieldValue)> {
    let mut fields = Vec::new();
    let mut pos = 0;

    while let Some(caps) = FIELD_NAME_REGEX.captures_at(body, pos) {
        let Some(assignment) = caps.get(0) else { break };
        match parse_value(&body[assignment.end()..]) {
            Some((value, len)) => {
                fields.push((caps[1].to_lowercase(), value));
                pos = assignment.end() + len;
            }
            None => {
                pos = assignment.start()
                    + body[assignment.start()..]
                        .chars()
                        .next()
                        .map_or(1, char::len_utf8);
            }
        }
    }

    fields
}

/// Parse one value at the start of `input`, returning it with its byte length.
fn parse_value(input: &str) -> Option<(FieldValue, usize)> {
    match input.chars().next()? {
        '{' => scan_delimited(input, '}').map(|(content, len)| (FieldValue::Braced(content), len)),
        '"' => scan_delimited(input, '"').map(|(content, len)| (FieldValue::Quoted(content), len)),
        _ => {
            let len = input
                .find(|c: char| c == ',' || c == '{' || c == '}' || c == '"' || c.is_whitespace())
                .unwrap_or(input.len());
            if len == 0 {
                return None;
            }
            let token = input[..len].to_string();
            if NUMBER_REGEX.is_match(&token) {
                Some((FieldValue::Number(token), len))
            } else {
                Some((FieldValue::Bare(token), len))
            }
        }
    }
}

/// Scan a value opened by the first character of `input` and closed by
/// `close` at brace depth zero. Nested braces must balance; backslash escapes
/// are skipped. Returns the inner content and the total length consumed.
fn scan_delimited(input: &str, close: char) -> Option<(String, usize)> {
    let mut depth = 0usize;
    let mut chars = input.char_indices().skip(1);

    while let Some((index, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            c if c == close && depth == 0 => {
                return Some((input[1..index].to_string(), index + c.len_utf8()));
            }
            '{' => depth += 1,
            '}' if depth == 0 => return None,
            '}' => depth -= 1,
            _ => {}
        }
    }

    None
}
