//! Schema tables mapping RIS tags to CSV columns.
//!
//! A schema is loaded once, before any output is written, and is immutable
//! afterwards. It is passed by reference through the conversion.
//!
//! # Example
//!
//! ```
//! use ris2csv::Schema;
//!
//! let schema = Schema::parse("TY,Type,1\nAU,Author,3\n").unwrap();
//!
//! assert_eq!(schema.width(), 3);
//! assert_eq!(schema.column_of("AU"), Some(2));
//! assert_eq!(schema.header(), ["Type (TY)", "", "Author (AU)"]);
//! ```

mod parse;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;

use crate::ris::RisTag;
use crate::{ConversionError, Result};
use parse::schema_parse;

/// Upper bound on column numbers, the column limit of common spreadsheet tools.
pub const MAX_COLUMNS: usize = 16_384;

/// The schema table bundled with the crate, covering the common RIS tags.
const STANDARD_TABLE: &str = include_str!("schema/ris_standard.csv");

static STANDARD_SCHEMA: Lazy<Schema> =
    Lazy::new(|| Schema::parse(STANDARD_TABLE).expect("bundled schema table is valid"));

/// A single mapping from a RIS tag to a CSV column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    /// The RIS tag, e.g. `AU`
    pub tag: RisTag,
    /// Human readable name of the field
    pub label: String,
    /// Zero-based column index
    pub column: usize,
}

impl SchemaEntry {
    /// The header cell for this entry, e.g. `Author (AU)`.
    pub fn header(&self) -> String {
        format!("{} ({})", self.label, self.tag)
    }
}

/// An immutable lookup from RIS tags to CSV columns.
///
/// Tags and column indices are unique within a schema.
#[derive(Debug, Clone)]
pub struct Schema {
    entries: Vec<SchemaEntry>,
    columns: HashMap<RisTag, usize>,
    width: usize,
}

impl Schema {
    /// Builds a schema from entries, checking that tags and columns are unique
    /// and that every column is below [`MAX_COLUMNS`].
    ///
    /// Errors report the 1-based position of the offending entry as its line.
    pub fn new(entries: Vec<SchemaEntry>) -> Result<Self> {
        let last_line = entries.len().max(1);
        Self::from_numbered(
            entries.into_iter().enumerate().map(|(i, e)| (i + 1, e)),
            last_line,
        )
    }

    /// Parses a schema table from text.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Configuration`] if a line is malformed, if
    /// a tag or column number appears twice, or if the table has no entries.
    pub fn parse(table: &str) -> Result<Self> {
        Self::from_numbered(schema_parse(table)?, table.lines().count().max(1))
    }

    /// Loads a schema table from a file.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::SchemaFile`] if the file cannot be read as
    /// UTF-8 text, and [`ConversionError::Configuration`] if it is malformed.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let table = fs::read_to_string(path).map_err(|source| ConversionError::SchemaFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&table)
    }

    /// The bundled schema covering the common RIS tags.
    pub fn standard() -> Self {
        STANDARD_SCHEMA.clone()
    }

    /// `last_line` is reported when the table turns out to have no entries.
    fn from_numbered<I>(numbered: I, last_line: usize) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, SchemaEntry)>,
    {
        let mut entries = Vec::new();
        let mut columns = HashMap::new();
        let mut owners: HashMap<usize, RisTag> = HashMap::new();

        for (line, entry) in numbered {
            if entry.column >= MAX_COLUMNS {
                return Err(ConversionError::Configuration {
                    line,
                    message: format!(
                        "column number {} for tag '{}' exceeds the maximum of {MAX_COLUMNS}",
                        entry.column.saturating_add(1),
                        entry.tag
                    ),
                });
            }
            if columns.contains_key(&entry.tag) {
                return Err(ConversionError::Configuration {
                    line,
                    message: format!("duplicate tag '{}'", entry.tag),
                });
            }
            if let Some(owner) = owners.get(&entry.column) {
                return Err(ConversionError::Configuration {
                    line,
                    message: format!(
                        "column {} for tag '{}' is already used by '{}'",
                        entry.column + 1,
                        entry.tag,
                        owner
                    ),
                });
            }

            owners.insert(entry.column, entry.tag.clone());
            columns.insert(entry.tag.clone(), entry.column);
            entries.push(entry);
        }

        // Every row needs at least one column.
        let Some(width) = entries.iter().map(|e| e.column + 1).max() else {
            return Err(ConversionError::Configuration {
                line: last_line,
                message: "the table has no tag entries".to_string(),
            });
        };

        Ok(Self {
            entries,
            columns,
            width,
        })
    }

    /// Look up the zero-based column of a tag.
    pub fn column_of(&self, tag: &str) -> Option<usize> {
        self.columns.get(tag).copied()
    }

    /// Entries in the order they were defined.
    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    /// Number of columns in every row: the highest column index plus one.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of tags in the schema.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false` for a schema built through [`Schema::new`] or
    /// [`Schema::parse`], which reject tables without entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The header row. Columns without an entry are left empty.
    pub fn header(&self) -> Vec<String> {
        let mut header = vec![String::new(); self.width];
        for entry in &self.entries {
            header[entry.column] = entry.header();
        }
        header
    }
}
