//! Schema table parsing.
//!
//! Each line of a table is `TAG,Label,ColumnNumber` with a 1-based column
//! number. Labels may be quoted to contain commas. Blank lines and lines
//! starting with `#` are skipped.

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;

use crate::ris::RisTag;
use crate::schema::SchemaEntry;
use crate::{ConversionError, Result};

/// One line of a schema table, before validation.
#[derive(Debug, Deserialize)]
struct RawSchemaRow {
    tag: String,
    label: String,
    column: i64,
}

/// Parse a schema table into entries paired with their line numbers.
pub(crate) fn schema_parse(table: &str) -> Result<Vec<(usize, SchemaEntry)>> {
    let mut entries = Vec::new();

    for (index, text) in table.lines().enumerate() {
        let line = index + 1;
        let text = text.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let entry = read_line(text)
            .and_then(|record| parse_record(&record))
            .map_err(|message| ConversionError::Configuration { line, message })?;
        entries.push((line, entry));
    }

    Ok(entries)
}

/// Split one line into fields with standard CSV quoting rules.
fn read_line(text: &str) -> std::result::Result<StringRecord, String> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut record = StringRecord::new();
    reader.read_record(&mut record).map_err(|e| e.to_string())?;
    Ok(record)
}

/// Validate a single record, returning a message describing the problem.
fn parse_record(record: &StringRecord) -> std::result::Result<SchemaEntry, String> {
    if record.len() != 3 {
        return Err(format!(
            "expected 3 fields (TAG,Label,ColumnNumber), found {}",
            record.len()
        ));
    }

    let raw: RawSchemaRow = record
        .deserialize(None)
        .map_err(|_| format!("column number must be a positive integer, found '{}'", &record[2]))?;

    let tag = RisTag::from_tag(&raw.tag).ok_or_else(|| format!("invalid RIS tag '{}'", raw.tag))?;

    if raw.label.is_empty() {
        return Err(format!("missing label for tag '{tag}'"));
    }

    let column = match usize::try_from(raw.column) {
        Ok(column) if column >= 1 => column,
        _ => {
            return Err(format!(
                "column number must be a positive integer, found '{}'",
                raw.column
            ));
        }
    };

    Ok(SchemaEntry {
        tag,
        label: raw.label,
        column: column - 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn entry(tag: &str, label: &str, column: usize) -> SchemaEntry {
        SchemaEntry {
            tag: RisTag::from_tag(tag).unwrap(),
            label: label.to_string(),
            column,
        }
    }

    #[test]
    fn test_parse_simple_table() {
        let entries = schema_parse("TY,Type,1\nAU,Author,2\n").unwrap();
        assert_eq!(
            entries,
            vec![(1, entry("TY", "Type", 0)), (2, entry("AU", "Author", 1))]
        );
    }

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        let table = "# tag,label,column\n\nTY,Type,1\n   \nAU,Author,2\n";
        let entries = schema_parse(table).unwrap();
        assert_eq!(
            entries,
            vec![(3, entry("TY", "Type", 0)), (5, entry("AU", "Author", 1))]
        );
    }

    #[test]
    fn test_parse_quoted_label_and_whitespace() {
        let entries = schema_parse(" SN,\"ISSN, ISBN\", 4 \r\n").unwrap();
        assert_eq!(entries, vec![(1, entry("SN", "ISSN, ISBN", 3))]);
    }

    #[test]
    fn test_parse_empty_table() {
        assert!(schema_parse("").unwrap().is_empty());
    }

    #[rstest]
    #[case("TY,Type", "expected 3 fields")]
    #[case("TY,Type,1,extra", "expected 3 fields")]
    #[case("TY,Type,one", "column number must be a positive integer, found 'one'")]
    #[case("TY,Type,0", "column number must be a positive integer, found '0'")]
    #[case("TY,Type,-2", "column number must be a positive integer, found '-2'")]
    #[case("ty,Type,1", "invalid RIS tag 'ty'")]
    #[case("TYP,Type,1", "invalid RIS tag 'TYP'")]
    #[case("TY,,1", "missing label for tag 'TY'")]
    fn test_parse_invalid_line(#[case] table: &str, #[case] expected: &str) {
        match schema_parse(table) {
            Err(ConversionError::Configuration { line, message }) => {
                assert_eq!(line, 1);
                assert!(
                    message.contains(expected),
                    "'{message}' does not contain '{expected}'"
                );
            }
            other => panic!("expected a configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_reports_line_number() {
        let err = schema_parse("TY,Type,1\nAU,Author,2\nPY,Year\n").unwrap_err();
        assert!(matches!(err, ConversionError::Configuration { line: 3, .. }));
    }
}
