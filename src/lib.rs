//! Convert RIS bibliographic records into a single flat CSV table.
//!
//! `ris2csv` reads a schema table describing which RIS tags map to which CSV
//! columns, scans RIS text for tag/value pairs, and writes one CSV row per
//! record.
//!
//! # Basic Usage
//!
//! ```rust
//! use ris2csv::{Converter, Schema};
//!
//! let schema = Schema::parse("TY,Type,1\nAU,Author,2\n").unwrap();
//! let input = "TY  - JOUR\nAU  - Smith, J.\nER  - \n";
//!
//! let mut out = Vec::new();
//! let summary = Converter::new(schema).convert_str(input, &mut out).unwrap();
//!
//! assert_eq!(summary.records_written, 1);
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "Type (TY),Author (AU)\nJOUR,\"Smith, J.\"\n"
//! );
//! ```
//!
//! # Schema Tables
//!
//! Each line of a schema table is `TAG,Label,ColumnNumber`, with a 1-based
//! column number. When no table is supplied, [`Schema::standard`] provides
//! a mapping for the common RIS tags.
//!
//! # Error Handling
//!
//! The library uses a custom [`Result`] type that wraps [`ConversionError`]:
//!
//! ```rust
//! use ris2csv::{ConversionError, Schema};
//!
//! match Schema::parse("TY,Type,zero") {
//!     Err(ConversionError::Configuration { line, message }) => {
//!         eprintln!("schema line {line}: {message}")
//!     }
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```
//!
//! Tags that are not in the schema are never errors. They are skipped,
//! logged through `tracing`, and counted in the [`ConversionSummary`].

use std::path::PathBuf;
use thiserror::Error;

pub mod convert;
pub mod prompt;
mod regex;
pub mod ris;
pub mod schema;
mod utils;

// Reexports
pub use convert::{ConversionSummary, ConvertConfig, Converter, TrailingRecord};
pub use ris::{RisTag, TagValue, TagValues};
pub use schema::{Schema, SchemaEntry};

/// A specialized Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConversionError>;

/// Represents errors that can occur while converting RIS to CSV.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("Unable to decode the RIS input: {message}. It may use a different encoding")]
    Decode { message: String },

    #[error("Invalid schema table at line {line}: {message}")]
    Configuration { line: usize, message: String },

    #[error("Unable to read schema table {}: {source}", .path.display())]
    SchemaFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(String),
}

impl From<csv::Error> for ConversionError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io) => ConversionError::Io(io),
                kind => ConversionError::Csv(format!("{kind:?}")),
            }
        } else {
            ConversionError::Csv(err.to_string())
        }
    }
}

/// Problems with a user-supplied input or output path.
///
/// In interactive mode these are recovered by asking again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Please end your path with '.{expected}': {}", .path.display())]
    WrongExtension {
        path: PathBuf,
        expected: &'static str,
    },

    #[error("That path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("That path appears invalid: {}: {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let error = ConversionError::Configuration {
            line: 3,
            message: "duplicate tag 'AU'".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid schema table at line 3: duplicate tag 'AU'"
        );
    }

    #[test]
    fn test_path_error_display() {
        let error = PathError::WrongExtension {
            path: PathBuf::from("refs.txt"),
            expected: "ris",
        };
        assert_eq!(error.to_string(), "Please end your path with '.ris': refs.txt");
    }

    #[test]
    fn test_csv_io_error_becomes_io() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let error: ConversionError = csv::Error::from(io).into();
        assert!(matches!(error, ConversionError::Io(_)));
    }
}
