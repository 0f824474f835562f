//! Table types.

use serde::{Deserialize, Serialize};

use super::{Block, Paragraph};
use crate::parser::xml::Node;

/// A table structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Attributes of the table element
    pub attributes: Vec<(String, String)>,

    /// Rows and other table-level content (`w:tblPr`, `w:tblGrid`)
    pub content: Vec<TableContent>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.content.push(TableContent::Row(row));
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &TableRow> {
        self.content.iter().filter_map(|c| match c {
            TableContent::Row(row) => Some(row),
            TableContent::Other(_) => None,
        })
    }

    /// Iterate mutably over rows.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut TableRow> {
        self.content.iter_mut().filter_map(|c| match c {
            TableContent::Row(row) => Some(row),
            TableContent::Other(_) => None,
        })
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows().count()
    }

    /// Get the number of columns (based on first row).
    pub fn column_count(&self) -> usize {
        self.rows().next().map(|r| r.cells().count()).unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Content of a table element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableContent {
    /// A table row
    Row(TableRow),
    /// Anything else, kept verbatim
    Other(Node),
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Attributes of the row element
    pub attributes: Vec<(String, String)>,

    /// Cells and other row-level content (`w:trPr`)
    pub content: Vec<RowContent>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            attributes: Vec::new(),
            content: cells.into_iter().map(RowContent::Cell).collect(),
        }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(TableCell::text).collect())
    }

    /// Iterate over cells.
    pub fn cells(&self) -> impl Iterator<Item = &TableCell> {
        self.content.iter().filter_map(|c| match c {
            RowContent::Cell(cell) => Some(cell),
            RowContent::Other(_) => None,
        })
    }

    /// Iterate mutably over cells.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut TableCell> {
        self.content.iter_mut().filter_map(|c| match c {
            RowContent::Cell(cell) => Some(cell),
            RowContent::Other(_) => None,
        })
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells()
            .map(|c| c.plain_text())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// Content of a row element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowContent {
    /// A table cell
    Cell(TableCell),
    /// Anything else, kept verbatim
    Other(Node),
}

/// A table cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Attributes of the cell element
    pub attributes: Vec<(String, String)>,

    /// Cell content; `w:tcPr` is kept as an opaque block
    pub content: Vec<Block>,
}

impl TableCell {
    /// Create a new cell with text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_content(vec![Paragraph::with_text(text)])
    }

    /// Create a cell with multiple paragraphs.
    pub fn with_content(content: Vec<Paragraph>) -> Self {
        Self {
            attributes: Vec::new(),
            content: content.into_iter().map(Block::Paragraph).collect(),
        }
    }

    /// Iterate over the paragraphs directly inside the cell.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.content.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// Iterate mutably over the paragraphs directly inside the cell.
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.content.iter_mut().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// Get plain text content.
    pub fn plain_text(&self) -> String {
        self.paragraphs()
            .map(|p| p.plain_text())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Check if the cell is empty.
    pub fn is_empty(&self) -> bool {
        self.plain_text().trim().is_empty()
    }
}
