//! Batch generation of patient documents from the template catalog.
//!
//! # Example
//!
//! ```no_run
//! use docfill::generate::{DocumentKind, Generator, PatientForm, Selection, TemplateCatalog};
//!
//! fn main() -> docfill::Result<()> {
//!     let generator = Generator::new(TemplateCatalog::new("templates"));
//!     let selection = Selection::new().with_document(DocumentKind::PaymentReceipt);
//!     let form = PatientForm::new("Ana Lima");
//!
//!     let today = chrono::Local::now().date_naive();
//!     let report = generator.generate(&form, &selection, today)?;
//!     for doc in &report.documents {
//!         std::fs::write(&doc.file_name, &doc.bytes)?;
//!     }
//!     for missing in &report.missing {
//!         eprintln!("missing template: {}", missing.path.display());
//!     }
//!     Ok(())
//! }
//! ```

mod catalog;
mod form;
mod format;

pub use catalog::{output_file_name, DocumentKind, Procedure, TemplateCatalog, TemplateRequest};
pub use form::{PatientForm, Selection, PROCEDURES_MARKER, PROCEDURES_MARKER_ASCII};
pub use format::{cid_label, days_to_words, format_currency, image_discount_clause, numbered_list};

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fill::{fill_template_with_stats, FillStats, PlaceholderMap};

/// A filled document ready for download.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    /// Label shown to the user
    pub label: String,

    /// Suggested file name
    pub file_name: String,

    /// DOCX bytes
    pub bytes: Vec<u8>,

    /// Substitution statistics
    pub stats: FillStats,
}

/// A requested document whose template file was not found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingTemplate {
    /// Label of the requested document
    pub label: String,

    /// Path that was looked up
    pub path: PathBuf,
}

/// Outcome of a generation request.
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    /// Documents produced, in request order
    pub documents: Vec<GeneratedDocument>,

    /// Requested documents skipped because their template is missing
    pub missing: Vec<MissingTemplate>,
}

impl GenerationReport {
    /// Check if every requested document was produced.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Combined substitution statistics.
    pub fn total_stats(&self) -> FillStats {
        self.documents
            .iter()
            .fold(FillStats::default(), |mut acc, doc| {
                acc.paragraphs_visited += doc.stats.paragraphs_visited;
                acc.paragraphs_matched += doc.stats.paragraphs_matched;
                acc.run_replacements += doc.stats.run_replacements;
                acc.fallback_replacements += doc.stats.fallback_replacements;
                acc
            })
    }
}

/// Generates documents for a form and a selection.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    catalog: TemplateCatalog,
}

impl Generator {
    /// Create a generator over a template catalog.
    pub fn new(catalog: TemplateCatalog) -> Self {
        Self { catalog }
    }

    /// Get the template catalog.
    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Resolve the template requests for a selection.
    pub fn plan(&self, form: &PatientForm, selection: &Selection) -> Vec<TemplateRequest> {
        self.catalog.requests(
            &selection.documents,
            &selection.procedures,
            form.name.trim(),
        )
    }

    /// Generate every selected document.
    ///
    /// Refuses with [`Error::MissingPatientName`] before touching any
    /// template when the patient name is blank. A missing template is
    /// recorded in the report and the remaining documents are still
    /// produced.
    pub fn generate(
        &self,
        form: &PatientForm,
        selection: &Selection,
        date: NaiveDate,
    ) -> Result<GenerationReport> {
        if !form.has_name() {
            return Err(Error::MissingPatientName);
        }

        let map = form
            .scoped_to(selection)
            .placeholder_map(&selection.procedures, date);

        let mut report = GenerationReport::default();
        for request in self.plan(form, selection) {
            match fill_request(&request, &map)? {
                Some(document) => report.documents.push(document),
                None => {
                    log::warn!("Template not found: {}", request.path.display());
                    report.missing.push(MissingTemplate {
                        label: request.label,
                        path: request.path,
                    });
                }
            }
        }

        log::info!(
            "Generated {} documents for {} ({} missing templates)",
            report.documents.len(),
            form.name.trim(),
            report.missing.len()
        );
        Ok(report)
    }
}

fn fill_request(request: &TemplateRequest, map: &PlaceholderMap) -> Result<Option<GeneratedDocument>> {
    let filled = fill_template_with_stats(&request.path, map)?;
    Ok(filled.map(|(bytes, stats)| GeneratedDocument {
        label: request.label.clone(),
        file_name: request.file_name.clone(),
        bytes,
        stats,
    }))
}
