//! Extraction helpers shared by every source.
//!
//! Two families: CSS-selector lookups over parsed HTML, and regex captures
//! over the JSON-ish application state that pages embed in `<script>` blocks.
//! The latter are tolerant by construction; a missing field yields nothing
//! rather than an error.

use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::error::ScraperError;

/// Parses a CSS selector.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidSelector`] if `css` does not parse.
pub fn selector(css: &str) -> Result<Selector, ScraperError> {
    Selector::parse(css).map_err(|e| ScraperError::InvalidSelector {
        selector: css.to_owned(),
        reason: e.to_string(),
    })
}

/// Text content of an element with whitespace runs collapsed.
#[must_use]
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of every descendant matching `selector`, in document order.
#[must_use]
pub fn select_texts(element: ElementRef<'_>, selector: &Selector) -> Vec<String> {
    element.select(selector).map(element_text).collect()
}

/// Attribute `attr` of every descendant matching `selector` that has it.
#[must_use]
pub fn select_attrs(element: ElementRef<'_>, selector: &Selector, attr: &str) -> Vec<String> {
    element
        .select(selector)
        .filter_map(|el| el.value().attr(attr))
        .map(|v| v.trim().to_owned())
        .collect()
}

/// Text of the last matching descendant, if any.
#[must_use]
pub fn last_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element.select(selector).last().map(element_text)
}

/// Attribute of the last matching descendant, if any.
#[must_use]
pub fn last_attr(element: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    select_attrs(element, selector, attr).pop()
}

/// A script block known to carry embedded application state.
///
/// Only blocks containing one of the caller's marker strings qualify, so
/// field patterns are never run against unrelated scripts.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedState<'a> {
    text: &'a str,
}

impl<'a> EmbeddedState<'a> {
    /// Returns `Some` when `text` contains any of `markers`.
    #[must_use]
    pub fn detect(text: &'a str, markers: &[&str]) -> Option<Self> {
        markers
            .iter()
            .any(|m| text.contains(m))
            .then_some(Self { text })
    }

    /// Whether a sub-structure marker (e.g. `"videoData":`) is present.
    #[must_use]
    pub fn has(&self, marker: &str) -> bool {
        self.text.contains(marker)
    }

    #[must_use]
    pub fn first(&self, pattern: &FieldPattern) -> Option<String> {
        pattern.first(self.text)
    }

    #[must_use]
    pub fn all(&self, pattern: &FieldPattern, limit: usize) -> Vec<String> {
        pattern.all(self.text, limit)
    }

    /// First capture that is not blank. Nested objects often repeat a key
    /// with an empty value before the one that matters.
    #[must_use]
    pub fn first_non_empty(&self, pattern: &FieldPattern) -> Option<String> {
        pattern.first_non_empty(self.text)
    }

    /// First capture parsed as an unsigned integer, `0` when absent.
    #[must_use]
    pub fn first_count(&self, pattern: &FieldPattern) -> u64 {
        self.first(pattern)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }
}

/// A regex with one capture group locating a field value in embedded state.
#[derive(Debug, Clone)]
pub struct FieldPattern {
    regex: Regex,
    unescape: bool,
}

impl FieldPattern {
    /// Matches `"key":"value"` and yields the JSON-unescaped value.
    ///
    /// # Panics
    ///
    /// Panics if `key` produces an invalid regex, which cannot happen since
    /// it is escaped.
    #[must_use]
    pub fn string(key: &str) -> Self {
        let regex = Regex::new(&format!(r#""{}":"((?:[^"\\]|\\.)*)""#, regex::escape(key)))
            .expect("escaped key forms a valid regex");
        Self {
            regex,
            unescape: true,
        }
    }

    /// Matches `"key":123` and yields the digits.
    ///
    /// # Panics
    ///
    /// Panics only on an invalid regex, which an escaped key cannot produce.
    #[must_use]
    pub fn number(key: &str) -> Self {
        let regex = Regex::new(&format!(r#""{}":(\d+)"#, regex::escape(key)))
            .expect("escaped key forms a valid regex");
        Self {
            regex,
            unescape: false,
        }
    }

    /// Wraps a hand-written regex whose first capture group is the value.
    /// String values are JSON-unescaped.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] if `pattern` does not compile.
    pub fn custom(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            unescape: true,
        })
    }

    #[must_use]
    pub fn first(&self, text: &str) -> Option<String> {
        self.regex
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| self.clean(m.as_str()))
    }

    #[must_use]
    pub fn first_non_empty(&self, text: &str) -> Option<String> {
        self.regex
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .map(|m| self.clean(m.as_str()))
            .find(|v| !v.trim().is_empty())
    }

    /// Up to `limit` captures in order of appearance.
    #[must_use]
    pub fn all(&self, text: &str, limit: usize) -> Vec<String> {
        self.regex
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .take(limit)
            .map(|m| self.clean(m.as_str()))
            .collect()
    }

    fn clean(&self, raw: &str) -> String {
        if self.unescape {
            unescape_json_str(raw)
        } else {
            raw.to_owned()
        }
    }
}

/// Decodes JSON string escapes such as `\"` and `\u002F`. Falls back to
/// the raw text if it is not a valid JSON string body.
#[must_use]
pub fn unescape_json_str(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_owned();
    }
    serde_json::from_str::<String>(&format!("\"{raw}\"")).unwrap_or_else(|_| raw.to_owned())
}

/// Number of rows that can be built from parallel columns.
///
/// Independent scans over the same blob can disagree in length when a
/// field is missing from one record. The row count is the shortest of the
/// required columns, capped at `limit`; optional columns are read with
/// [`column`] and may come up short.
#[must_use]
pub fn aligned_rows(required: &[&[String]], limit: usize) -> usize {
    required
        .iter()
        .map(|c| c.len())
        .min()
        .unwrap_or(0)
        .min(limit)
}

/// Index-guarded read of an optional column.
#[must_use]
pub fn column(values: &[String], index: usize) -> Option<&str> {
    values.get(index).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const BLOB: &str = r#"window.__INITIAL_STATE__={"list":[{"bvid":"BV1a","title":"First \"quoted\"","play":120},{"bvid":"BV1b","title":"Second","play":7},{"bvid":"BV1c","title":"Third"}],"pic":"//i0.test/a.jpg"}"#;

    #[test]
    fn detect_requires_a_marker() {
        assert!(EmbeddedState::detect(BLOB, &["__INITIAL_STATE__"]).is_some());
        assert!(EmbeddedState::detect("var x = 1;", &["__INITIAL_STATE__", "_render_data_"]).is_none());
    }

    #[test]
    fn string_pattern_unescapes_values() {
        let state = EmbeddedState::detect(BLOB, &["__INITIAL_STATE__"]).unwrap();
        let titles = state.all(&FieldPattern::string("title"), 10);
        assert_eq!(titles, vec!["First \"quoted\"", "Second", "Third"]);
        assert_eq!(
            state.first(&FieldPattern::string("pic")).as_deref(),
            Some("//i0.test/a.jpg")
        );
    }

    #[test]
    fn first_non_empty_skips_blank_matches() {
        let state = EmbeddedState::detect(
            r#"__INITIAL_STATE__={"a":{"name":""},"b":{"name":"  "},"c":{"name":"Real"}}"#,
            &["__INITIAL_STATE__"],
        )
        .unwrap();
        let name = FieldPattern::string("name");
        assert_eq!(state.first(&name).as_deref(), Some(""));
        assert_eq!(state.first_non_empty(&name).as_deref(), Some("Real"));
        assert_eq!(state.first_non_empty(&FieldPattern::string("face")), None);
    }

    #[test]
    fn number_pattern_and_limit() {
        let state = EmbeddedState::detect(BLOB, &["__INITIAL_STATE__"]).unwrap();
        assert_eq!(state.all(&FieldPattern::number("play"), 1), vec!["120"]);
        assert_eq!(state.first_count(&FieldPattern::number("play")), 120);
        assert_eq!(state.first_count(&FieldPattern::number("coin")), 0);
    }

    #[test]
    fn rows_follow_shortest_required_column() {
        let state = EmbeddedState::detect(BLOB, &["__INITIAL_STATE__"]).unwrap();
        let ids = state.all(&FieldPattern::string("bvid"), 10);
        let titles = state.all(&FieldPattern::string("title"), 10);
        let plays = state.all(&FieldPattern::number("play"), 10);

        let rows = aligned_rows(&[&ids, &titles], 10);
        assert_eq!(rows, 3);
        assert_eq!(column(&plays, 1), Some("7"));
        assert_eq!(column(&plays, 2), None);
        assert_eq!(aligned_rows(&[&ids, &titles], 2), 2);
        assert_eq!(aligned_rows(&[], 5), 0);
    }

    #[test]
    fn unescape_falls_back_on_invalid_escape() {
        assert_eq!(unescape_json_str(r"bad \q escape"), r"bad \q escape");
        assert_eq!(unescape_json_str("plain"), "plain");
    }

    #[test]
    fn selector_helpers() {
        let html = Html::parse_fragment(
            r#"<div><a href="/x"> one </a><a href=" /y ">two
               words</a><a>none</a></div>"#,
        );
        let root = html.root_element();
        let a = selector("a").unwrap();
        assert_eq!(select_texts(root, &a), vec!["one", "two words", "none"]);
        assert_eq!(select_attrs(root, &a, "href"), vec!["/x", "/y"]);
        assert_eq!(last_text(root, &a).as_deref(), Some("none"));
        assert_eq!(last_attr(root, &a, "href").as_deref(), Some("/y"));
        assert!(selector("a[").is_err());
    }
}
