//! CSV output.
//!
//! Fields are quoted only when they contain a delimiter, a quote or a line
//! break. Embedded quotes are doubled. Every record ends with a single `\n`
//! on every platform.

use std::io::Write;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::Result;
use crate::convert::row::Row;
use crate::schema::Schema;

/// Writes the header and the rows of a conversion.
pub struct CsvRowWriter<W: Write> {
    writer: csv::Writer<W>,
    rows_written: usize,
}

impl<W: Write> CsvRowWriter<W> {
    /// Wraps `inner` in a CSV writer with minimal quoting and `\n` line ends.
    pub fn new(inner: W) -> Self {
        let writer = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(inner);

        Self {
            writer,
            rows_written: 0,
        }
    }

    /// Writes the `Label (TAG)` header row of `schema`.
    pub fn write_header(&mut self, schema: &Schema) -> Result<()> {
        self.writer.write_record(schema.header())?;
        Ok(())
    }

    /// Writes one data row and counts it.
    pub fn write_row(&mut self, row: &Row) -> Result<()> {
        self.writer.write_record(row.fields())?;
        self.rows_written += 1;
        Ok(())
    }

    /// Number of data rows written, not counting the header.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush buffered output and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv::ReaderBuilder;
    use pretty_assertions::assert_eq;

    fn schema() -> Schema {
        Schema::parse("TY,Type,1\nAU,Author,2\n").unwrap()
    }

    fn row(values: &[Option<&str>]) -> Row {
        let mut row = Row::blank(values.len());
        for (column, value) in values.iter().enumerate() {
            if let Some(value) = value {
                row.set(column, value.to_string());
            }
        }
        row
    }

    fn write(rows: &[Row]) -> String {
        let mut writer = CsvRowWriter::new(Vec::new());
        writer.write_header(&schema()).unwrap();
        for row in rows {
            writer.write_row(row).unwrap();
        }
        assert_eq!(writer.rows_written(), rows.len());
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_header_only() {
        assert_eq!(write(&[]), "Type (TY),Author (AU)\n");
    }

    #[test]
    fn test_unset_cells_are_empty_fields() {
        let out = write(&[row(&[Some("JOUR"), None]), row(&[None, Some("Doe")])]);
        assert_eq!(out, "Type (TY),Author (AU)\nJOUR,\n,Doe\n");
    }

    #[test]
    fn test_quoting() {
        let out = write(&[row(&[Some("JOUR"), Some("Smith, J.")])]);
        assert_eq!(out, "Type (TY),Author (AU)\nJOUR,\"Smith, J.\"\n");

        let out = write(&[row(&[Some("say \"hi\""), Some("plain")])]);
        assert_eq!(out, "Type (TY),Author (AU)\n\"say \"\"hi\"\"\",plain\n");
    }

    #[test]
    fn test_no_carriage_returns() {
        let rows = [row(&[Some("a"), None]), row(&[None, Some("d")])];
        let out = write(&rows);
        assert!(!out.contains('\r'));
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn test_values_survive_quoting() {
        let tricky = [
            "Smith, J.",
            "A \"quoted\" title",
            "line\nbreak",
            "trailing,",
        ];
        let rows: Vec<Row> = tricky
            .iter()
            .map(|value| row(&[Some("JOUR"), Some(value)]))
            .collect();
        let out = write(&rows);

        let mut reader = ReaderBuilder::new().from_reader(out.as_bytes());
        let read: Vec<String> = reader
            .records()
            .map(|record| record.unwrap()[1].to_string())
            .collect();
        assert_eq!(read, tricky);
    }
}
