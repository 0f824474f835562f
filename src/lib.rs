//! # docfill
//!
//! Fill `{{PLACEHOLDER}}` markers in Word (DOCX) templates.
//!
//! This library opens a DOCX package, substitutes markers in the body
//! paragraphs and table cells while keeping run formatting, and writes the
//! package back with every other part untouched. On top of the filler it
//! ships the patient-document generator: a template catalog, form data,
//! value formatting and per-user sessions.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docfill::{fill_file, PlaceholderMap};
//!
//! fn main() -> docfill::Result<()> {
//!     let map = PlaceholderMap::new()
//!         .with("{{NOME_PACIENTE}}", "Ana Lima")
//!         .with("{{DATA_HOJE}}", "05/03/2024");
//!
//!     let stats = fill_file("templates/recibo.docx", "Recibo_Ana.docx", &map)?;
//!     println!("{} replacements", stats.total_replacements());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Formatting preservation**: markers inside one run keep that run's style
//! - **Split markers**: markers spread over several runs are still replaced
//! - **Tables**: paragraphs directly inside table cells are filled
//! - **Lossless packages**: parts other than the main document are copied byte for byte
//! - **Batch generation**: missing templates are reported, not fatal

pub mod auth;
pub mod detect;
pub mod error;
pub mod fill;
pub mod generate;
pub mod model;
pub mod parser;
pub mod session;

// Re-export commonly used types
pub use auth::{CredentialVerifier, StaticCredentials};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_docx};
pub use error::{Error, Result};
pub use fill::{
    fill, fill_bytes, fill_template, fill_template_with_stats, find_markers, FillStats,
    PlaceholderMap,
};
pub use generate::{
    DocumentKind, GeneratedDocument, GenerationReport, Generator, MissingTemplate, PatientForm,
    Procedure, Selection, TemplateCatalog,
};
pub use model::{
    Block, Document, InlineContent, Paragraph, RunGroup, Table, TableCell, TableRow, TextRun,
};
pub use parser::DocxPackage;
pub use session::Session;

use std::io::Read;
use std::path::Path;

/// Parse a DOCX file and return its body as a document model.
///
/// # Example
///
/// ```no_run
/// use docfill::parse_file;
///
/// let doc = parse_file("template.docx").unwrap();
/// println!("Tables: {}", doc.tables().count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    DocxPackage::open(path)?.document()
}

/// Parse a DOCX package from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    DocxPackage::from_bytes(data)?.document()
}

/// Parse a DOCX package from a reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    DocxPackage::from_reader(reader)?.document()
}

/// Extract the plain text of a DOCX file.
///
/// # Example
///
/// ```no_run
/// use docfill::extract_text;
///
/// let text = extract_text("template.docx").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(parse_file(path)?.plain_text())
}

/// List the distinct `{{NAME}}` markers of a DOCX file.
///
/// Markers are found in the document text, so a marker split across runs
/// is still listed.
pub fn list_placeholders<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let doc = parse_file(path)?;
    Ok(find_markers(&doc.plain_text()))
}

/// Fill a DOCX file and write the result to `output`.
///
/// # Example
///
/// ```no_run
/// use docfill::{fill_file, PlaceholderMap};
///
/// let map = PlaceholderMap::new().with("{{CID}}", "CID: L90");
/// fill_file("atestado.docx", "Atestado_Ana.docx", &map).unwrap();
/// ```
pub fn fill_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    map: &PlaceholderMap,
) -> Result<FillStats> {
    Docfill::new()
        .with_placeholders(map.clone())
        .open(input)?
        .save(output)
}

/// Builder for filling DOCX templates.
///
/// # Example
///
/// ```no_run
/// use docfill::Docfill;
///
/// let filled = Docfill::new()
///     .with("{{NOME_PACIENTE}}", "Ana Lima")
///     .with("{{CPF_PACIENTE}}", "123.456.789-00")
///     .open("template.docx")?;
/// println!("{:?}", filled.stats());
/// filled.save("Contrato_Ana.docx")?;
/// # Ok::<(), docfill::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Docfill {
    map: PlaceholderMap,
}

impl Docfill {
    /// Create a builder with an empty placeholder map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a marker and its replacement.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.map.insert(key, value);
        self
    }

    /// Add every entry of a placeholder map.
    pub fn with_placeholders(mut self, map: PlaceholderMap) -> Self {
        for (key, value) in map.iter() {
            self.map.insert(key, value);
        }
        self
    }

    /// Get the placeholder map built so far.
    pub fn placeholders(&self) -> &PlaceholderMap {
        &self.map
    }

    /// Open and fill a DOCX file.
    pub fn open<P: AsRef<Path>>(self, path: P) -> Result<FilledDocument> {
        let package = DocxPackage::open(path)?;
        self.fill_package(package)
    }

    /// Fill a DOCX package held in memory.
    pub fn open_bytes(self, data: &[u8]) -> Result<FilledDocument> {
        let package = DocxPackage::from_bytes(data)?;
        self.fill_package(package)
    }

    fn fill_package(self, mut package: DocxPackage) -> Result<FilledDocument> {
        let stats = fill::fill_package(&mut package, &self.map)?;
        Ok(FilledDocument { package, stats })
    }
}

/// Result of filling a DOCX package.
#[derive(Debug, Clone)]
pub struct FilledDocument {
    package: DocxPackage,
    stats: FillStats,
}

impl FilledDocument {
    /// Get the substitution statistics.
    pub fn stats(&self) -> &FillStats {
        &self.stats
    }

    /// Get the filled package.
    pub fn package(&self) -> &DocxPackage {
        &self.package
    }

    /// Get the filled body.
    pub fn document(&self) -> Result<Document> {
        self.package.document()
    }

    /// Serialize the package to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.package.to_bytes()
    }

    /// Write the package to a file and return the statistics.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<FillStats> {
        self.package.save(path)?;
        Ok(self.stats.clone())
    }
}
