//! RIS text scanning.
//!
//! RIS is a line-tagged format where every field starts with a two-character
//! tag, two spaces and a hyphen, e.g. `TY  - JOUR`. A record ends with `ER  -`.
//!
//! # Example
//!
//! ```
//! use ris2csv::ris::TagValues;
//!
//! let input = r#"TY  - JOUR
//! TI  - Example Title
//! AU  - Smith, John
//! ER  -"#;
//!
//! let tags: Vec<String> = TagValues::new(input)
//!     .map(|pair| pair.tag.to_string())
//!     .collect();
//!
//! assert_eq!(tags, ["TY", "TI", "AU", "ER"]);
//! ```

mod extract;
mod tags;

pub use extract::{TagValue, TagValues};
pub use tags::RisTag;
