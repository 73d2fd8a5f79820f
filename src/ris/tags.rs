//! RIS tags.
//!
//! A tag is the two-character code at the start of a RIS line, such as `TY`
//! or `AU`. See: http://en.wikipedia.org/wiki/RIS_(file_format)

use compact_str::CompactString;
use std::borrow::Borrow;
use std::fmt;

/// A validated two-character RIS tag.
///
/// The first character is an ASCII uppercase letter and the second is an
/// ASCII uppercase letter or digit, e.g. `TY`, `A1`, `ER`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct RisTag(CompactString);

impl RisTag {
    /// The tag that terminates a record.
    pub const END_OF_REFERENCE: &'static str = "ER";

    /// Parses a tag, returning `None` when it is not a valid RIS tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use ris2csv::RisTag;
    ///
    /// assert_eq!(RisTag::from_tag("TY").unwrap().as_tag(), "TY");
    /// assert!(RisTag::from_tag("ty").is_none());
    /// assert!(RisTag::from_tag("1A").is_none());
    /// ```
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::is_valid(tag).then(|| Self(CompactString::new(tag)))
    }

    /// Builds a tag from text already matched by the marker pattern.
    pub(crate) fn from_marker(tag: &str) -> Self {
        debug_assert!(Self::is_valid(tag), "marker pattern matched '{tag}'");
        Self(CompactString::new(tag))
    }

    /// Checks whether a string has the shape of a RIS tag.
    pub fn is_valid(tag: &str) -> bool {
        match tag.as_bytes() {
            [first, second] => {
                first.is_ascii_uppercase()
                    && (second.is_ascii_uppercase() || second.is_ascii_digit())
            }
            _ => false,
        }
    }

    /// The tag as it appears in RIS text.
    pub fn as_tag(&self) -> &str {
        &self.0
    }

    /// Check if this tag ends a record.
    pub fn is_end_of_reference(&self) -> bool {
        self.0 == Self::END_OF_REFERENCE
    }
}

impl fmt::Display for RisTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RisTag {
    fn borrow(&self) -> &str {
        &self.0
    }
}
