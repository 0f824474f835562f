//! DOCX parsing module.

mod body;
mod package;
pub mod xml;

pub use body::{read_document, write_document};
pub use package::{DocxPackage, MAIN_PART};
