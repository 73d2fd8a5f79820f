//! Rows and the accumulator that builds them.
//!
//! # Design Decision
//!
//! - **Last-wins**: a repeated tag overwrites the earlier value in its column.
//! - **Empty records**: `ER` always emits a row, even when no tag was seen
//!   since the previous `ER`. The row is then all empty.
//! - **Unknown tags**: tags missing from the schema are skipped and logged
//!   once per distinct tag. They still mark the record as in progress.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::ris::{RisTag, TagValue};
use crate::schema::Schema;

/// One output row with a cell per schema column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<Option<String>>,
}

impl Row {
    /// Create a row with `width` unset cells.
    pub fn blank(width: usize) -> Self {
        Self {
            cells: vec![None; width],
        }
    }

    /// Store a value, replacing any earlier one.
    ///
    /// # Panics
    ///
    /// Panics if `column` is outside the row.
    pub fn set(&mut self, column: usize, value: String) {
        self.cells[column] = Some(value);
    }

    /// The value in `column`, or `None` if it is unset or outside the row.
    pub fn get(&self, column: usize) -> Option<&str> {
        self.cells.get(column).and_then(|cell| cell.as_deref())
    }

    /// Number of cells, set or not.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check that the row has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Check that no cell has been set.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// The cells as CSV fields, with unset cells as empty strings.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|cell| cell.as_deref().unwrap_or(""))
    }
}

/// Whether the accumulator is inside a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// No tag seen since the start or the last `ER`.
    AwaitingTag,
    /// At least one tag seen since the start or the last `ER`.
    InRecord,
}

/// Buffers tag values into a row and hands the row back when a record ends.
#[derive(Debug)]
pub struct RowAccumulator<'s> {
    schema: &'s Schema,
    row: Row,
    state: RecordState,
    unknown_tags: BTreeSet<RisTag>,
    skipped: usize,
}

impl<'s> RowAccumulator<'s> {
    /// Create an accumulator with a blank row of the schema's width.
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            row: Row::blank(schema.width()),
            state: RecordState::AwaitingTag,
            unknown_tags: BTreeSet::new(),
            skipped: 0,
        }
    }

    /// Whether a record is currently open.
    pub fn state(&self) -> RecordState {
        self.state
    }

    /// Add one tag/value pair, returning the finished row when the tag is `ER`.
    pub fn push(&mut self, pair: TagValue) -> Option<Row> {
        let TagValue { tag, value } = pair;
        let ends_record = tag.is_end_of_reference();

        match self.schema.column_of(tag.as_tag()) {
            Some(column) => self.row.set(column, value),
            None if ends_record => {}
            None => self.skip(tag),
        }

        if ends_record {
            self.state = RecordState::AwaitingTag;
            let width = self.schema.width();
            return Some(std::mem::replace(&mut self.row, Row::blank(width)));
        }

        self.state = RecordState::InRecord;
        None
    }

    /// Take the partial row left at the end of input, if a record is open.
    pub fn finish(&mut self) -> Option<Row> {
        match self.state {
            RecordState::AwaitingTag => None,
            RecordState::InRecord => {
                self.state = RecordState::AwaitingTag;
                let width = self.schema.width();
                Some(std::mem::replace(&mut self.row, Row::blank(width)))
            }
        }
    }

    /// Distinct tags that were not found in the schema, in sorted order.
    pub fn unknown_tags(&self) -> impl Iterator<Item = &RisTag> {
        self.unknown_tags.iter()
    }

    /// Number of pairs skipped because their tag is not in the schema.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn skip(&mut self, tag: RisTag) {
        self.skipped += 1;
        if self.unknown_tags.contains(&tag) {
            debug!(%tag, "skipping tag not present in the schema");
        } else {
            warn!(%tag, "skipping tag not present in the schema");
            self.unknown_tags.insert(tag);
        }
    }
}
