//! Splitting of LaTeX bibliographies into items, and of items into logical lines.

use crate::regex::Regex;
use crate::utils::collapse_whitespace;
use std::sync::LazyLock;

/// `\bibitem`, an optional `[label]` and an optional `{key}`.
static BIBITEM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\bibitem\b\s*(?:\[([^\]]*)\])?\s*(?:\{([^}]*)\})?").unwrap()
});

static END_BIBLIOGRAPHY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\end\s*\{thebibliography\}").unwrap());

static NEWBLOCK_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\newblock\b").unwrap());

static SENTENCE_GAP_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.\s+").unwrap());

/// One `\bibitem` as found in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawBibitem {
    pub(crate) label: Option<String>,
    /// Citation key; empty when the item had no `{key}`.
    pub(crate) key: String,
    /// Item text up to the next item or the end of the bibliography, trimmed.
    pub(crate) body: String,
}

/// Split LaTeX text into its `\bibitem` entries, in source order.
///
/// Each body runs up to the next `\bibitem`, the closing
/// `\end{thebibliography}`, or the end of the input.
pub(crate) fn split_bibitems(text: &str) -> Vec<RawBibitem> {
    let headers: Vec<_> = BIBITEM_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some((
                whole.start(),
                whole.end(),
                caps.get(1).map(|m| m.as_str().trim().to_string()),
                caps.get(2).map_or_else(String::new, |m| m.as_str().trim().to_string()),
            ))
        })
        .collect();

    headers
        .iter()
        .enumerate()
        .map(|(i, (_, end, label, key))| {
            let limit = headers.get(i + 1).map_or(text.len(), |next| next.0);
            let region = &text[*end..limit];
            let body = END_BIBLIOGRAPHY_REGEX
                .find(region)
                .map_or(region, |m| &region[..m.start()]);
            RawBibitem {
                label: label.clone(),
                key: key.clone(),
                body: body.trim().to_string(),
            }
        })
        .collect()
}

/// Break an item body into logical lines.
///
/// `\newblock` separates blocks when present, with line breaks inside a
/// block folded into spaces; otherwise each source line is a block. Empty
/// blocks are dropped. The first block is further split into sentences so a
/// leading `Author. Title.` pair yields two lines.
pub(crate) fn logical_lines(body: &str) -> Vec<String> {
    let blocks: Vec<String> = if NEWBLOCK_REGEX.is_match(body) {
        NEWBLOCK_REGEX.split(body).map(collapse_whitespace).collect()
    } else {
        body.lines().map(|line| line.trim().to_string()).collect()
    };

    let mut blocks = blocks.into_iter().filter(|block| !block.is_empty());
    let Some(first) = blocks.next() else {
        return Vec::new();
    };

    let mut lines = split_sentences(&first);
    lines.extend(blocks);
    lines
}

/// Split a block at `. ` gaps followed by an uppercase letter.
///
/// A gap after a single-letter initial (`J. Lee`) is not a sentence end.
/// Each sentence but the last loses its closing period.
fn split_sentences(block: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for gap in SENTENCE_GAP_REGEX.find_iter(block) {
        let next_is_upper = block[gap.end()..]
            .chars()
            .next()
            .is_some_and(char::is_uppercase);
        if !next_is_upper || is_initial(&block[start..gap.start()]) {
            continue;
        }
        sentences.push(block[start..gap.start()].trim().to_string());
        start = gap.end();
    }

    let rest = block[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

/// Whether the last word of `text` is an initial such as `J` or `J.-P`.
fn is_initial(text: &str) -> bool {
    let word = text
        .rsplit(|c: char| c.is_whitespace() || matches!(c, '~' | '.' | '-'))
        .next()
        .unwrap_or_default();
    word.chars().filter(|c| c.is_alphabetic()).count() <= 1
}
