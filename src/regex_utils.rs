//! Regex construction and highlighting utilities.
//!
//! All four pattern roles (content, file name, skip-dirs, skip-files) are
//! compiled once up front into `Patterns`. Compile failures name the role so the
//! caller can report which pattern was bad.

use colored::{ColoredString, Colorize};
use regex::{Regex, RegexBuilder};

use crate::config::{Config, DEFAULT_FILENAME_PATTERN};
use crate::error::{Error, PatternRole};

const REGEX_METACHARACTERS: &[char] = &[
    '.', '^', '$', '*', '+', '?', '{', '}', '[', ']', '|', '(', ')', '\\',
];

/// True when `pattern` contains any regex metacharacter. Purely syntactic.
pub fn is_regex(pattern: &str) -> bool {
    pattern.contains(REGEX_METACHARACTERS)
}

/// A plain name pattern like `py` is treated as a suffix and becomes `py$`.
/// Anything that already looks like a regex is used as-is.
pub fn make_name_pattern(pattern: &str) -> String {
    if pattern.is_empty() || is_regex(pattern) {
        pattern.to_string()
    } else {
        format!("{}$", pattern)
    }
}

fn non_empty(pattern: &Option<String>) -> Option<&str> {
    pattern.as_deref().filter(|p| !p.is_empty())
}

fn compile(pattern: &str, role: PatternRole, case_insensitive: bool) -> Result<Regex, Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source| Error::Pattern {
            role,
            pattern: pattern.to_string(),
            source,
        })
}

/// The compiled patterns for one invocation.
#[derive(Debug, Clone)]
pub struct Patterns {
    pub search: Option<Regex>,
    pub filename: Regex,
    pub skip_dirs: Option<Regex>,
    pub skip_files: Option<Regex>,
}

impl Patterns {
    /// Compile every pattern in `cfg`.
    ///
    /// At least one of the content or name pattern must be present. When only
    /// a content pattern is given, every file name matches. Case folding applies
    /// to the content pattern only.
    pub fn compile(cfg: &Config) -> Result<Self, Error> {
        let search_src = non_empty(&cfg.search_pattern);
        let filename_src = match (non_empty(&cfg.filename_pattern), search_src) {
            (Some(p), _) => p,
            (None, Some(_)) => DEFAULT_FILENAME_PATTERN,
            (None, None) => return Err(Error::NoPattern),
        };

        let search = search_src
            .map(|p| compile(p, PatternRole::Search, cfg.case_insensitive))
            .transpose()?;

        // Report the pattern as the user wrote it, not the suffixed form.
        let filename = compile(&make_name_pattern(filename_src), PatternRole::Filename, false)
            .map_err(|err| match err {
                Error::Pattern { role, source, .. } => Error::Pattern {
                    role,
                    pattern: filename_src.to_string(),
                    source,
                },
                other => other,
            })?;

        let skip_dirs = non_empty(&cfg.skip_dirs_pattern)
            .map(|p| compile(p, PatternRole::SkipDirs, false))
            .transpose()?;
        let skip_files = non_empty(&cfg.skip_files_pattern)
            .map(|p| compile(p, PatternRole::SkipFiles, false))
            .transpose()?;

        Ok(Self {
            search,
            filename,
            skip_dirs,
            skip_files,
        })
    }

    pub fn skips_dir(&self, name: &str) -> bool {
        self.skip_dirs.as_ref().is_some_and(|re| re.is_match(name))
    }

    /// A file is kept when it is not skipped and its name matches.
    pub fn keeps_file(&self, name: &str) -> bool {
        if self.skip_files.as_ref().is_some_and(|re| re.is_match(name)) {
            return false;
        }
        self.filename.is_match(name)
    }
}

/// Wrap every match of `re` in `line` in bold red.
pub fn highlight_segments(line: &str, re: &Regex) -> String {
    let mut result = String::with_capacity(line.len() + 16);
    let mut last = 0;
    for m in re.find_iter(line) {
        let (s, e) = (m.start(), m.end());
        if s > last {
            result.push_str(&line[last..s]);
        }
        let seg: ColoredString = line[s..e].red().bold();
        result.push_str(&seg.to_string());
        last = e;
    }
    if last < line.len() {
        result.push_str(&line[last..]);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(search: Option<&str>, filename: Option<&str>) -> Config {
        Config {
            search_pattern: search.map(str::to_string),
            filename_pattern: filename.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn detects_each_metacharacter() {
        for p in [
            ".abc", "^abc", "abc$", "abc*", "abc+", "abc?", "abc|", "abc\\", "abc{", "abc}",
            "[abc", "abc]", "(abc", "abc)",
        ] {
            assert!(is_regex(p), "{p} should look like a regex");
        }
        assert!(!is_regex("abc"));
        assert!(!is_regex("a-b_c"));
    }

    #[test]
    fn literal_name_pattern_gets_anchored() {
        assert_eq!(make_name_pattern("py"), "py$");
        assert_eq!(make_name_pattern("a-deeply-nested-file"), "a-deeply-nested-file$");
        assert_eq!(make_name_pattern(r"\.py$"), r"\.py$");
        assert_eq!(make_name_pattern("t.r"), "t.r");
    }

    #[test]
    fn missing_patterns_is_an_error() {
        assert!(matches!(Patterns::compile(&cfg(None, None)), Err(Error::NoPattern)));
        assert!(matches!(
            Patterns::compile(&cfg(Some(""), None)),
            Err(Error::NoPattern)
        ));
    }

    #[test]
    fn content_only_matches_every_name() {
        let p = Patterns::compile(&cfg(Some("x"), None)).unwrap();
        assert!(p.keeps_file("anything.rs"));
        assert!(!p.keeps_file(".hidden"));
        assert!(!p.keeps_file("mod.pyc"));
    }

    #[test]
    fn skip_wins_over_name_match() {
        let p = Patterns::compile(&cfg(None, Some("pyc"))).unwrap();
        assert!(!p.keeps_file("mod.pyc"));
        let mut c = cfg(None, Some("pyc"));
        c.skip_files_pattern = None;
        let p = Patterns::compile(&c).unwrap();
        assert!(p.keeps_file("mod.pyc"));
    }

    #[test]
    fn default_skip_dirs() {
        let p = Patterns::compile(&cfg(Some("x"), None)).unwrap();
        for d in [".git", "CVS", "RCS", "__pycache__"] {
            assert!(p.skips_dir(d), "{d}");
        }
        assert!(!p.skips_dir("src"));
    }

    #[test]
    fn compile_error_names_role() {
        let bad = r"*\.txt$";
        let err = Patterns::compile(&cfg(Some(bad), None)).unwrap_err();
        assert_eq!(err.to_string(), format!("Exception compiling search-pattern regex: '{bad}'"));

        let err = Patterns::compile(&cfg(None, Some(bad))).unwrap_err();
        assert_eq!(err.to_string(), format!("Exception compiling filename-pattern regex: '{bad}'"));

        let mut c = cfg(Some("one"), None);
        c.skip_dirs_pattern = Some(bad.into());
        let err = Patterns::compile(&c).unwrap_err();
        assert_eq!(err.to_string(), format!("Exception compiling skip-dirs-pattern regex: '{bad}'"));
    }

    #[test]
    fn case_folding_only_on_content() {
        let mut c = cfg(Some("OnE"), Some("TXT"));
        c.case_insensitive = true;
        let p = Patterns::compile(&c).unwrap();
        assert!(p.search.as_ref().unwrap().is_match("one"));
        assert!(!p.keeps_file("a.txt"));
    }

    #[test]
    fn highlight_wraps_matches() {
        colored::control::set_override(true);
        let re = Regex::new("lo").unwrap();
        let out = highlight_segments("hello", &re);
        assert!(out.starts_with("hel"));
        assert!(out.contains("\u{1b}["));
    }
}
