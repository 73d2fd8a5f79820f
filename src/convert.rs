//! RIS to CSV conversion.
//!
//! A [`Converter`] holds an immutable [`ConvertConfig`] and runs the whole
//! pipeline: extract tag/value pairs, accumulate rows, write CSV.
//!
//! # Example
//!
//! ```
//! use ris2csv::{ConvertConfig, Converter, Schema, TrailingRecord};
//!
//! let mut config = ConvertConfig::new();
//! config
//!     .set_schema(Schema::parse("TY,Type,1\nTI,Title,2\n").unwrap())
//!     .set_trailing_record(TrailingRecord::Discard);
//!
//! let mut out = Vec::new();
//! let summary = Converter::with_config(config)
//!     .convert_str("TY  - JOUR\nTI  - Kept\nER  - \nTY  - BOOK\n", &mut out)
//!     .unwrap();
//!
//! assert_eq!(summary.records_written, 1);
//! assert_eq!(summary.trailing_record, Some(TrailingRecord::Discard));
//! ```

pub mod row;
pub mod writer;

use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::ris::TagValues;
use crate::schema::Schema;
use crate::utils::decode_utf8;
use crate::{PathError, Result};
use row::RowAccumulator;
use writer::CsvRowWriter;

/// What to do with a record that has tags but no closing `ER` at end of input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrailingRecord {
    /// Write the partial record as a row.
    #[default]
    Flush,
    /// Drop the partial record.
    Discard,
}

/// Configuration for a conversion.
///
/// # Examples
///
/// ```
/// use ris2csv::{ConvertConfig, Schema, TrailingRecord};
///
/// let mut config = ConvertConfig::new();
/// config.set_trailing_record(TrailingRecord::Discard);
/// assert_eq!(config.schema().len(), Schema::standard().len());
/// ```
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Tag to column mapping
    schema: Schema,
    /// Policy for a record left open at end of input
    trailing_record: TrailingRecord,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvertConfig {
    /// Creates a configuration using the bundled standard schema.
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: Schema::standard(),
            trailing_record: TrailingRecord::default(),
        }
    }

    /// Sets the schema
    pub fn set_schema(&mut self, schema: Schema) -> &mut Self {
        self.schema = schema;
        self
    }

    /// Sets the policy for a trailing record without `ER`
    pub fn set_trailing_record(&mut self, policy: TrailingRecord) -> &mut Self {
        self.trailing_record = policy;
        self
    }

    /// The schema rows are built against
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The policy for a trailing record without `ER`
    pub fn trailing_record(&self) -> TrailingRecord {
        self.trailing_record
    }
}

/// Counts describing a finished conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Data rows written, not counting the header
    pub records_written: usize,
    /// Tag/value pairs found in the input
    pub pairs_read: usize,
    /// Pairs skipped because their tag is not in the schema
    pub pairs_skipped: usize,
    /// Distinct unknown tags, sorted
    pub unknown_tags: Vec<String>,
    /// Set when the input ended inside a record, with the policy applied
    pub trailing_record: Option<TrailingRecord>,
}

/// Converts RIS text into CSV.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConvertConfig,
}

impl Converter {
    /// Creates a converter for a schema with default settings otherwise.
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        let mut config = ConvertConfig::new();
        config.set_schema(schema);
        Self { config }
    }

    /// Creates a converter from a full configuration.
    #[must_use]
    pub fn with_config(config: ConvertConfig) -> Self {
        Self { config }
    }

    /// The configuration this converter runs with.
    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Converts RIS text and writes the CSV to `out`.
    ///
    /// The header is always written, so input without any tags produces a
    /// header-only table.
    pub fn convert_str<W: Write>(&self, text: &str, out: W) -> Result<ConversionSummary> {
        let schema = &self.config.schema;
        let mut writer = CsvRowWriter::new(out);
        writer.write_header(schema)?;

        let mut accumulator = RowAccumulator::new(schema);
        let mut pairs_read = 0;
        for pair in TagValues::new(text) {
            pairs_read += 1;
            debug!(tag = %pair.tag, value = %pair.value, "extracted");
            if let Some(row) = accumulator.push(pair) {
                writer.write_row(&row)?;
            }
        }

        let trailing_record = match accumulator.finish() {
            None => None,
            Some(row) => {
                let policy = self.config.trailing_record;
                match policy {
                    TrailingRecord::Flush => {
                        warn!("input ended without a closing ER tag, writing the last record");
                        writer.write_row(&row)?;
                    }
                    TrailingRecord::Discard => {
                        warn!("input ended without a closing ER tag, discarding the last record");
                    }
                }
                Some(policy)
            }
        };

        let summary = ConversionSummary {
            records_written: writer.rows_written(),
            pairs_read,
            pairs_skipped: accumulator.skipped(),
            unknown_tags: accumulator.unknown_tags().map(ToString::to_string).collect(),
            trailing_record,
        };
        writer.into_inner()?;

        if !summary.unknown_tags.is_empty() {
            info!(
                skipped = summary.pairs_skipped,
                tags = %summary.unknown_tags.iter().join(", "),
                "tags not present in the schema were skipped"
            );
        }
        info!(records = summary.records_written, "conversion complete");

        Ok(summary)
    }

    /// Reads all of `reader` as UTF-8 and converts it.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Decode`](crate::ConversionError::Decode)
    /// before anything is written if the input is not valid UTF-8.
    pub fn convert_reader<R: Read, W: Write>(
        &self,
        mut reader: R,
        out: W,
    ) -> Result<ConversionSummary> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let text = decode_utf8(bytes)?;
        self.convert_str(&text, out)
    }

    /// Converts the RIS file at `input` into a CSV file at `output`.
    ///
    /// The input is read and decoded completely first. The CSV is written to
    /// a temporary file next to `output` and moved into place once complete,
    /// so a failed conversion never leaves a partial or changed output file.
    pub fn convert_file<P, Q>(&self, input: P, output: Q) -> Result<ConversionSummary>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let input = input.as_ref();
        let output = output.as_ref();

        let bytes = fs::read(input).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PathError::NotFound(input.to_path_buf()).into(),
            _ => crate::ConversionError::from(e),
        })?;
        let text = decode_utf8(bytes)?;

        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = tempfile::Builder::new()
            .prefix(".ris2csv-")
            .suffix(".tmp")
            .tempfile_in(dir)?;

        let summary = self.convert_str(&text, temp.as_file_mut())?;
        temp.as_file().sync_all()?;

        // An existing output keeps its mode. New files are readable by all.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = match fs::metadata(output) {
                Ok(existing) => existing.permissions(),
                Err(_) => fs::Permissions::from_mode(0o644),
            };
            temp.as_file().set_permissions(permissions)?;
        }

        temp.persist(output).map_err(|e| e.error)?;
        info!(input = %input.display(), output = %output.display(), "wrote CSV");

        Ok(summary)
    }
}
