//! Content path matching.
//!
//! A [`PathMatcher`] decides whether a writer is responsible for a content
//! path. Patterns are regular expressions with full-match semantics: the whole
//! path must match, not just a substring of it.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::WriterError;

/// Pattern used when none is configured: any path ending in `.html`.
pub const DEFAULT_PATH_PATTERN: &str = r".*\.html";

static DEFAULT_MATCHER: Lazy<PathMatcher> = Lazy::new(|| {
    PathMatcher::new(DEFAULT_PATH_PATTERN).expect("default path pattern compiles")
});

/// A compiled, immutable full-match pattern over content paths.
///
/// # Example
///
/// ```rust
/// use standout_web::PathMatcher;
///
/// let matcher = PathMatcher::new(r"/template/.*\.html").unwrap();
/// assert!(matcher.matches("/template/foo/bar/buz.html"));
/// assert!(!matcher.matches("/index.html"));
/// ```
#[derive(Clone)]
pub struct PathMatcher {
    source: String,
    regex: Regex,
}

impl PathMatcher {
    /// Compiles `pattern` for full-match use.
    ///
    /// # Errors
    ///
    /// Returns [`WriterError::InvalidPattern`] if the pattern is not a valid
    /// regular expression.
    pub fn new(pattern: &str) -> Result<Self, WriterError> {
        // Anchor a non-capturing group so alternations like `a|b` stay whole.
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Returns true if the entire `path` matches the pattern.
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The pattern as it was configured, without anchors.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl Default for PathMatcher {
    fn default() -> Self {
        DEFAULT_MATCHER.clone()
    }
}

impl fmt::Debug for PathMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathMatcher").field(&self.source).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_html_suffix() {
        let matcher = PathMatcher::default();
        assert!(matcher.matches("/a/b.html"));
        assert!(matcher.matches("index.html"));
        assert!(!matcher.matches("/a/b"));
        assert!(!matcher.matches("/a/b.htm"));
    }

    #[test]
    fn match_is_not_a_substring_search() {
        let matcher = PathMatcher::default();
        assert!(!matcher.matches("/a/b.html.bak"));
        assert!(!matcher.matches("/a/b.html/c"));
    }

    #[test]
    fn custom_pattern_requires_prefix() {
        let matcher = PathMatcher::new(r"/template/.*\.html").unwrap();
        assert!(matcher.matches("/template/foo/bar/buz.html"));
        assert!(!matcher.matches("/index.html"));
        assert!(!matcher.matches("/other/template/foo.html"));
    }

    #[test]
    fn alternation_is_anchored_as_a_whole() {
        let matcher = PathMatcher::new(r"a\.html|b\.html").unwrap();
        assert!(matcher.matches("a.html"));
        assert!(matcher.matches("b.html"));
        assert!(!matcher.matches("a.htmlx"));
        assert!(!matcher.matches("xb.html"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let result = PathMatcher::new("(unclosed");
        assert!(matches!(result, Err(WriterError::InvalidPattern(_))));
    }

    #[test]
    fn keeps_configured_source() {
        let matcher = PathMatcher::new(r"/t/.*").unwrap();
        assert_eq!(matcher.as_str(), r"/t/.*");
        assert_eq!(PathMatcher::default().as_str(), DEFAULT_PATH_PATTERN);
    }

    #[test]
    fn default_agrees_with_compiled_default_pattern() {
        let compiled = PathMatcher::new(DEFAULT_PATH_PATTERN).unwrap();
        let default = PathMatcher::default();
        for path in ["/a.html", "a.html", "/a.html.bak", "/a.htm", ".html", ""] {
            assert_eq!(default.matches(path), compiled.matches(path), "{}", path);
        }
    }
}
