//! Reference extraction from a directory of paper sources.
//!
//! The extractor picks one strategy per directory: when any BibTeX database
//! is present, every database is parsed and the `.tex` files are ignored.
//! Only when no database exists are LaTeX files containing `\bibitem` parsed
//! instead. Entries from all files are merged by citation key, later files
//! overwriting earlier ones.
//!
//! # Example
//!
//! ```no_run
//! use bibrefs::{ExtractorConfig, ReferenceExtractor};
//!
//! let extractor = ReferenceExtractor::new().with_config(ExtractorConfig {
//!     bibitem_extensions: vec!["tex".to_string(), "bbl".to_string()],
//!     ..Default::default()
//! });
//!
//! let references = extractor.extract_set("papers/1706.03762");
//! if let Some(entry) = references.get("vaswani2017") {
//!     println!("{:?}", entry.title);
//! }
//! ```

use crate::{
    BibitemParser, BibtexParser, ReferenceEntry, ReferenceError, ReferenceParser, ReferenceSet,
    Result,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Marker a LaTeX file must contain to be parsed for references.
const BIBITEM_MARKER: &str = r"\bibitem";

/// Configuration for directory scanning.
///
/// # Examples
///
/// ```
/// use bibrefs::ExtractorConfig;
///
/// let config = ExtractorConfig {
///     max_depth: Some(2),
///     ..Default::default()
/// };
/// assert_eq!(config.bibtex_extensions, vec!["bib"]);
/// ```
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Extensions of BibTeX databases, matched case-insensitively.
    pub bibtex_extensions: Vec<String>,
    /// Extensions of LaTeX files searched for `\bibitem` entries.
    /// Add `"bbl"` to also read BibTeX-generated bibliographies.
    pub bibitem_extensions: Vec<String>,
    /// Maximum recursion depth below the scanned directory; `None` is unbounded.
    pub max_depth: Option<usize>,
    /// Whether to descend into symlinked directories.
    pub follow_links: bool,
    /// Whether to parse files concurrently.
    /// Only has an effect with the `parallel` feature.
    pub run_in_parallel: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            bibtex_extensions: vec!["bib".to_string()],
            bibitem_extensions: vec!["tex".to_string()],
            max_depth: None,
            follow_links: false,
            run_in_parallel: false,
        }
    }
}

/// Extracts the references of a paper from its source directory.
///
/// Extraction never fails: unreadable files and directories are logged and
/// skipped, and a directory without any bibliography yields no references.
#[derive(Debug, Clone, Default)]
pub struct ReferenceExtractor {
    config: ExtractorConfig,
}

impl ReferenceExtractor {
    /// Creates an extractor with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use bibrefs::{ExtractorConfig, ReferenceExtractor};
    ///
    /// let config = ExtractorConfig {
    ///     follow_links: true,
    ///     ..Default::default()
    /// };
    /// let extractor = ReferenceExtractor::new().with_config(config);
    /// ```
    #[must_use]
    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    /// Extracts all references found under `dir`, one per citation key.
    pub fn extract<P: AsRef<Path>>(&self, dir: P) -> Vec<ReferenceEntry> {
        self.extract_set(dir).into_vec()
    }

    /// Like [`extract`](Self::extract), but keeps the keyed collection.
    pub fn extract_set<P: AsRef<Path>>(&self, dir: P) -> ReferenceSet {
        let dir = dir.as_ref();

        let bibtex_files = self.collect_files(dir, &self.config.bibtex_extensions);
        let references = if bibtex_files.is_empty() {
            let latex_files = self.collect_files(dir, &self.config.bibitem_extensions);
            debug!(dir = %dir.display(), files = latex_files.len(), "no BibTeX database, scanning for \\bibitem");
            let parser = BibitemParser::new();
            self.merge_files(&latex_files, |text| {
                text.contains(BIBITEM_MARKER).then(|| parser.parse(text))
            })
        } else {
            debug!(dir = %dir.display(), files = bibtex_files.len(), "parsing BibTeX databases");
            let parser = BibtexParser::new();
            self.merge_files(&bibtex_files, |text| Some(parser.parse(text)))
        };

        if references.is_empty() {
            warn!(dir = %dir.display(), "no bibliography source found");
        }
        references
    }

    /// Recursively list the files under `dir` with one of `extensions`,
    /// sorted by file name within each directory.
    fn collect_files(&self, dir: &Path, extensions: &[String]) -> Vec<PathBuf> {
        let mut walker = WalkDir::new(dir)
            .follow_links(self.config.follow_links)
            .sort_by_file_name();
        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        walker
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    let error = ReferenceError::from(e);
                    warn!(error = %error, "skipping unreadable path");
                    None
                }
            })
            .filter(|entry| entry.path().is_file() && has_extension(entry.path(), extensions))
            .map(walkdir::DirEntry::into_path)
            .collect()
    }

    /// Parse every file in order and merge the entries by key.
    ///
    /// `parse` returns `None` for files that hold no bibliography.
    fn merge_files<F>(&self, paths: &[PathBuf], parse: F) -> ReferenceSet
    where
        F: Fn(&str) -> Option<Vec<ReferenceEntry>> + Sync,
    {
        let parse_path = |path: &PathBuf| -> Vec<ReferenceEntry> {
            match read_source(path) {
                Ok(text) => match parse(&text) {
                    Some(entries) => {
                        debug!(path = %path.display(), entries = entries.len(), "parsed file");
                        entries
                    }
                    None => Vec::new(),
                },
                Err(error) => {
                    warn!(error = %error, "skipping unreadable file");
                    Vec::new()
                }
            }
        };

        #[cfg(feature = "parallel")]
        if self.config.run_in_parallel {
            use rayon::prelude::*;

            let per_file: Vec<Vec<ReferenceEntry>> =
                paths.par_iter().map(|path| parse_path(path)).collect();
            return per_file.into_iter().flatten().collect();
        }

        paths.iter().flat_map(|path| parse_path(path)).collect()
    }
}

/// Extracts the references under `dir` with the default configuration.
///
/// # Examples
///
/// ```no_run
/// let references = bibrefs::extract_references("papers/1706.03762");
/// println!("found {} references", references.len());
/// ```
pub fn extract_references<P: AsRef<Path>>(dir: P) -> Vec<ReferenceEntry> {
    ReferenceExtractor::new().extract(dir)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| ReferenceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::fs;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` and return what it logged at warn level.
    fn warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        let logged = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        (result, logged)
    }

    fn write(dir: &TempDir, name: &str, content: &[u8]) {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn ids(entries: &[ReferenceEntry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.id.as_str()).collect()
    }

    #[test]
    fn test_extract_bibtex_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir,
            "refs.bib",
            b"@article{doe2020, author = {John Doe}, title = {A Study}, year = {2020}}",
        );

        let entries = extract_references(dir.path());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "doe2020");
        assert_eq!(entries[0].entry_type, "article");
        assert_eq!(entries[0].author.as_deref(), Some("John Doe"));
        assert_eq!(entries[0].title.as_deref(), Some("A Study"));
        assert_eq!(entries[0].year.as_deref(), Some("2020"));
    }

    #[test]
    fn test_extract_bibitem_fallback() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir,
            "paper/main.tex",
            br"\documentclass{article}
\begin{document}
\begin{thebibliography}{9}
\bibitem{lee2019} J. Lee. Deep Networks. \newblock In Proceedings of the International Conference on Learning. 2019.
\end{thebibliography}
\end{document}",
        );
        write(&dir, "paper/intro.tex", br"\section{Introduction} No references here.");

        let entries = extract_references(dir.path());
        assert_eq!(ids(&entries), vec!["lee2019"]);
        assert_eq!(entries[0].entry_type, crate::BIBITEM_TYPE);
        assert_eq!(entries[0].author.as_deref(), Some("J. Lee"));
        assert_eq!(entries[0].year.as_deref(), Some("2019"));
    }

    #[test]
    fn test_extract_prefers_bibtex() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "refs.bib", b"@misc{from_bib, title = {Bib}}");
        write(&dir, "main.tex", br"\bibitem{from_tex} T. Author. Tex.");

        assert_eq!(ids(&extract_references(dir.path())), vec!["from_bib"]);
    }

    #[test]
    fn test_extract_last_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "a/refs.bib", b"@misc{shared, title = {Old}}\n@misc{only_a, title = {A}}");
        write(&dir, "b/refs.bib", b"@misc{shared, title = {New}}\n@misc{only_b, title = {B}}");

        let set = ReferenceExtractor::new().extract_set(dir.path());
        assert_eq!(set.len(), 3);
        assert_eq!(set.get("shared").and_then(|e| e.title.as_deref()), Some("New"));
        assert_eq!(ids(&set.into_vec()), vec!["shared", "only_a", "only_b"]);
    }

    #[rstest]
    #[case::empty(&[])]
    #[case::tex_without_bibitem(&[("main.tex", r"\section{Intro}")])]
    #[case::other_files(&[("notes.txt", r"\bibitem{x} Not LaTeX.")])]
    fn test_extract_nothing_found(#[case] files: &[(&str, &str)]) {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            write(&dir, name, content.as_bytes());
        }
        assert!(extract_references(dir.path()).is_empty());
    }

    #[test]
    fn test_extract_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(extract_references(dir.path().join("does-not-exist")).is_empty());
    }

    #[test]
    fn test_extract_skips_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "a.bib", &[0xff, 0xfe, 0x40, 0x00]);
        write(&dir, "b.bib", b"@misc{good, title = {Good}}");

        assert_eq!(ids(&extract_references(dir.path())), vec!["good"]);
    }

    #[test]
    fn test_extract_warns_when_databases_yield_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "bad.bib", &[0xff, 0xfe, 0x40, 0x00]);
        write(&dir, "main.tex", br"\bibitem{ignored} I. Gnored. Tex.");

        let (entries, logged) = warnings(|| extract_references(dir.path()));
        assert!(entries.is_empty());
        assert!(logged.contains("skipping unreadable file"), "{logged}");
        assert!(logged.contains("no bibliography source found"), "{logged}");
    }

    #[test]
    fn test_extract_found_references_do_not_warn() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "refs.bib", b"@misc{ok, title = {Fine}}");

        let (entries, logged) = warnings(|| extract_references(dir.path()));
        assert_eq!(ids(&entries), vec!["ok"]);
        assert_eq!(logged, "");
    }

    #[test]
    fn test_extract_extension_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "REFS.BIB", b"@misc{upper, title = {Upper}}");

        assert_eq!(ids(&extract_references(dir.path())), vec!["upper"]);
    }

    #[test]
    fn test_extract_with_config() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "paper.bbl", br"\bibitem{generated} G. Author. Generated.");
        write(&dir, "deep/deeper/refs.tex", br"\bibitem{nested} N. Author. Nested.");

        assert_eq!(ids(&extract_references(dir.path())), vec!["nested"]);

        let extractor = ReferenceExtractor::new().with_config(ExtractorConfig {
            bibitem_extensions: vec!["tex".to_string(), "bbl".to_string()],
            max_depth: Some(1),
            ..Default::default()
        });
        assert_eq!(ids(&extractor.extract(dir.path())), vec!["generated"]);
    }

    #[test]
    fn test_has_extension() {
        let extensions = vec!["bib".to_string()];
        assert!(has_extension(Path::new("refs.bib"), &extensions));
        assert!(has_extension(Path::new("dir/refs.Bib"), &extensions));
        assert!(!has_extension(Path::new("refs.bibx"), &extensions));
        assert!(!has_extension(Path::new("bib"), &extensions));
    }

    #[test]
    fn test_read_source_error() {
        let error = read_source(Path::new("/definitely/not/here.tex")).unwrap_err();
        assert!(matches!(error, ReferenceError::Io { ref path, .. } if path.ends_with("here.tex")));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_extract_parallel_matches_sequential() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..8 {
            let content = format!("@misc{{shared, note = {{{i}}}}}\n@misc{{key{i}, title = {{T{i}}}}}");
            write(&dir, &format!("refs{i}.bib"), content.as_bytes());
        }

        let sequential = extract_references(dir.path());
        let parallel = ReferenceExtractor::new().with_config(ExtractorConfig {
            run_in_parallel: true,
            ..Default::default()
        })
        .extract(dir.path());

        assert_eq!(parallel, sequential);
        assert_eq!(sequential[0].get_field("note"), Some("7"));
    }
}
