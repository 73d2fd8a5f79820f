//! Tag/value extraction from RIS text.
//!
//! This module handles the low-level scanning of RIS formatted text.

use std::borrow::Cow;

use once_cell::sync::Lazy;

use crate::regex::Regex;
use crate::ris::tags::RisTag;
use crate::utils::{normalize_line_breaks, strip_bom};

/// Matches a tag marker such as `TY  - `.
///
/// The marker must start at an ASCII word boundary so the tail of a longer
/// word is never read as a tag. The space after the hyphen is optional, which
/// lets a bare `ER  -` at the end of a file close the last record.
///
/// `regex_lite` only has ASCII word boundaries, so `regex` is told to use
/// them too.
#[cfg(feature = "lite")]
const TAG_MARKER_PATTERN: &str = r"\b[A-Z][A-Z0-9]  - ?";
#[cfg(not(feature = "lite"))]
const TAG_MARKER_PATTERN: &str = r"(?-u:\b)[A-Z][A-Z0-9]  - ?";

static TAG_MARKER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(TAG_MARKER_PATTERN).expect("tag marker pattern is valid"));

/// A single tag and its value, in the order they appear in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagValue {
    pub tag: RisTag,
    pub value: String,
}

/// Position of a tag marker that has not been emitted yet.
#[derive(Debug)]
struct Marker {
    tag: RisTag,
    start: usize,
    value_start: usize,
}

/// An [Iterator] over the tag/value pairs of a RIS document.
///
/// Line breaks are replaced by spaces before scanning, so a value wrapped over
/// several lines comes back as one line. The value of a tag is everything up to
/// the next tag marker, or the end of the text, trimmed of surrounding
/// whitespace. Text before the first marker is ignored.
///
/// # Examples
///
/// ```
/// use ris2csv::TagValues;
///
/// let pairs: Vec<_> = TagValues::new("TY  - JOUR\nTI  - A long\n  title\nER  -")
///     .map(|pair| (pair.tag.to_string(), pair.value))
///     .collect();
///
/// assert_eq!(
///     pairs,
///     vec![
///         ("TY".to_string(), "JOUR".to_string()),
///         ("TI".to_string(), "A long   title".to_string()),
///         ("ER".to_string(), String::new()),
///     ]
/// );
/// ```
#[derive(Debug)]
pub struct TagValues<'t> {
    text: Cow<'t, str>,
    pending: Option<Marker>,
}

impl<'t> TagValues<'t> {
    /// Create a new [TagValues] over raw RIS text.
    pub fn new(text: &'t str) -> Self {
        let text = normalize_line_breaks(strip_bom(text));
        let pending = find_marker(&text, 0);
        Self { text, pending }
    }
}

/// Find the first tag marker at or after `start`.
fn find_marker(text: &str, start: usize) -> Option<Marker> {
    TAG_MARKER_REGEX.find_at(text, start).map(|m| Marker {
        tag: RisTag::from_marker(&m.as_str()[..2]),
        start: m.start(),
        value_start: m.end(),
    })
}

impl Iterator for TagValues<'_> {
    type Item = TagValue;

    fn next(&mut self) -> Option<Self::Item> {
        let marker = self.pending.take()?;
        let next = find_marker(&self.text, marker.value_start);
        let value_end = next.as_ref().map_or(self.text.len(), |m| m.start);
        self.pending = next;

        Some(TagValue {
            tag: marker.tag,
            value: self.text[marker.value_start..value_end].trim().to_string(),
        })
    }
}
