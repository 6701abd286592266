//! Table types.

use super::{runs_plain_text, InlineRun};
use serde::{Deserialize, Serialize};

/// A table structure with a single header row.
///
/// Every body row carries exactly `header_cells.len()` cells; use
/// [`Table::normalize`] after mutating rows directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Header cell texts
    pub header_cells: Vec<String>,

    /// Body rows
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create a table from a header.
    pub fn with_header<S: Into<String>>(header: impl IntoIterator<Item = S>) -> Self {
        Self {
            header_cells: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Add a row, padding it (or widening the header) so column counts agree.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
        self.normalize();
    }

    /// Get the number of body rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.header_cells.len()
    }

    /// Check if the table has no header and no rows.
    pub fn is_empty(&self) -> bool {
        self.header_cells.is_empty() && self.rows.is_empty()
    }

    /// Pad short rows with empty cells. Rows longer than the header widen
    /// the header with empty strings instead of being truncated.
    pub fn normalize(&mut self) {
        let widest = self
            .rows
            .iter()
            .map(|r| r.cells.len())
            .max()
            .unwrap_or(0)
            .max(self.header_cells.len());

        self.header_cells.resize(widest, String::new());
        for row in &mut self.rows {
            row.cells.resize_with(widest, TableCell::empty);
        }
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        let mut lines = vec![self.header_cells.join("\t")];
        lines.extend(self.rows.iter().map(TableRow::plain_text));
        lines.join("\n")
    }
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in the row
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(TableCell::text).collect())
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(TableCell::plain_text)
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell content
    pub runs: Vec<InlineRun>,
}

impl TableCell {
    /// Create a new cell with text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![InlineRun::text(text)],
        }
    }

    /// Create an empty cell.
    pub fn empty() -> Self {
        Self { runs: Vec::new() }
    }

    /// Create a cell from inline runs.
    pub fn with_runs(runs: Vec<InlineRun>) -> Self {
        Self { runs }
    }

    /// Get plain text content.
    pub fn plain_text(&self) -> String {
        runs_plain_text(&self.runs)
    }

    /// Check if the cell is empty.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(InlineRun::is_blank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_new() {
        let table = Table::default();
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn test_short_row_is_padded() {
        let mut table = Table::with_header(["Name", "Age", "City"]);
        table.add_row(TableRow::from_strings(["Alice"]));

        assert_eq!(table.column_count(), 3);
        assert_eq!(table.rows[0].cells.len(), 3);
        assert!(table.rows[0].cells[1].is_empty());
        assert!(table.rows[0].cells[2].is_empty());
    }

    #[test]
    fn test_long_row_widens_header() {
        let mut table = Table::with_header(["A"]);
        table.add_row(TableRow::from_strings(["1"]));
        table.add_row(TableRow::from_strings(["2", "extra"]));

        assert_eq!(table.header_cells, vec!["A".to_string(), String::new()]);
        assert!(table.rows.iter().all(|r| r.cells.len() == 2));
    }

    #[test]
    fn test_cell_text() {
        let cell = TableCell::text("Hello");
        assert_eq!(cell.plain_text(), "Hello");
        assert!(!cell.is_empty());
    }
}
