//! Document model types for DOCX content.
//!
//! This module defines the intermediate representation that bridges the
//! DOCX package layer and the placeholder filler. Formatting is carried as
//! opaque XML so that everything the filler does not touch is written back
//! unchanged.

mod document;
mod paragraph;
mod table;

pub use document::{Block, Document};
pub use paragraph::{InlineContent, Paragraph, RunContent, RunGroup, TextRun};
pub use table::{RowContent, Table, TableCell, TableContent, TableRow};
