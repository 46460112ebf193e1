use crate::regex::{Captures, Regex};
use itertools::Itertools;
use std::sync::LazyLock;

static UMLAUT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\\"\{([aouiAOUI])\}|\\"([aouiAOUI])"#).unwrap());

static ACUTE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\'\{([eaouiEAOUI])\}|\\'([eaouiEAOUI])").unwrap());

static MATH_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$([^$]*)\$").unwrap());

static MATH_COMMAND_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\([A-Za-z]+)").unwrap());

static BRACES_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^{}]*)\}").unwrap());

static DASH_RUN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-–—]+").unwrap());

/// Cleans a raw BibTeX field value into display text.
///
/// Decodes `\&`, umlaut and acute accent escapes, strips math delimiters and
/// one level of grouping braces, then collapses whitespace. Empty input is
/// returned unchanged.
///
/// # Arguments
///
/// * `value` - The raw value, without its outer delimiters
pub fn clean_bibtex_value(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    let value = value.replace(r"\&", "&");
    let value = UMLAUT_REGEX.replace_all(&value, |caps: &Captures| {
        accented(first_group(caps), umlaut)
    });
    let value = ACUTE_REGEX.replace_all(&value, |caps: &Captures| {
        accented(first_group(caps), acute)
    });
    let value = value.replace(r"\textbackslash{}", r"\");
    let value = MATH_REGEX.replace_all(&value, |caps: &Captures| {
        MATH_COMMAND_REGEX.replace_all(&caps[1], "$1").into_owned()
    });
    let value = BRACES_REGEX.replace_all(&value, "$1");

    collapse_whitespace(&value)
}

/// Collapses every whitespace run to a single space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().join(" ")
}

/// Normalizes a page range to ASCII hyphens.
///
/// En dashes, em dashes and BibTeX `--` all become a single `-`.
pub fn normalize_page_range(pages: &str) -> String {
    DASH_RUN_REGEX.replace_all(pages.trim(), "-").into_owned()
}

/// Removes one trailing period, then surrounding whitespace.
pub fn strip_trailing_period(text: &str) -> &str {
    let text = text.trim();
    text.strip_suffix('.').unwrap_or(text).trim_end()
}

/// Returns whichever alternative of a two-branch accent pattern matched.
fn first_group<'h>(caps: &Captures<'h>) -> &'h str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str())
        .unwrap_or_default()
}

fn accented(letter: &str, table: fn(char) -> Option<char>) -> String {
    letter
        .chars()
        .map(|c| table(c).unwrap_or(c))
        .collect()
}

fn umlaut(c: char) -> Option<char> {
    Some(match c {
        'a' => 'ä',
        'o' => 'ö',
        'u' => 'ü',
        'i' => 'ï',
        'A' => 'Ä',
        'O' => 'Ö',
        'U' => 'Ü',
        'I' => 'Ï',
        _ => return None,
    })
}

fn acute(c: char) -> Option<char> {
    Some(match c {
        'e' => 'é',
        'a' => 'á',
        'o' => 'ó',
        'u' => 'ú',
        'i' => 'í',
        'E' => 'É',
        'A' => 'Á',
        'O' => 'Ó',
        'U' => 'Ú',
        'I' => 'Í',
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(r#"{\"u}ber"#, "über")]
    #[case(r#"\"{a}rger"#, "ärger")]
    #[case(r#"M\"OBIUS"#, "MÖBIUS")]
    #[case(r"\'{e}toile", "étoile")]
    #[case(r"Caf\'{E}", "CafÉ")]
    #[case(r"Smith \& Sons", "Smith & Sons")]
    #[case(r"Title with \textbackslash{}", r"Title with \")]
    #[case(r"Text with {braces}", "Text with braces")]
    #[case("Multiple  spaces", "Multiple spaces")]
    #[case(r"Math $\alpha + \beta$", "Math alpha + beta")]
    #[case(r"Energy $E=mc^2$ bound", "Energy E=mc^2 bound")]
    #[case("  padded\n\tvalue ", "padded value")]
    fn test_clean_bibtex_value(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(clean_bibtex_value(input), expected);
    }

    #[test]
    fn test_clean_bibtex_value_strips_one_brace_level() {
        assert_eq!(clean_bibtex_value("{IBM} Corporation"), "IBM Corporation");
        assert_eq!(clean_bibtex_value("{{IBM}} Corp"), "{IBM} Corp");
    }

    #[test]
    fn test_clean_bibtex_value_empty() {
        assert_eq!(clean_bibtex_value(""), "");
    }

    #[rstest]
    #[case("123–125", "123-125")]
    #[case("123—125", "123-125")]
    #[case("123--125", "123-125")]
    #[case("123-125", "123-125")]
    #[case(" 42 ", "42")]
    fn test_normalize_page_range(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_page_range(input), expected);
    }

    #[rstest]
    #[case("J. Lee.", "J. Lee")]
    #[case("Deep Networks. ", "Deep Networks")]
    #[case("No period", "No period")]
    #[case("Ellipsis..", "Ellipsis.")]
    fn test_strip_trailing_period(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_trailing_period(input), expected);
    }
}
