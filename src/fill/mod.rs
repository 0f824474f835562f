//! Placeholder substitution for DOCX documents.
//!
//! The filler walks every top-level paragraph and then every paragraph
//! directly inside the cells of every top-level table (row-major,
//! left-to-right). For each marker found in a paragraph it first tries to
//! replace the marker inside individual runs so the run keeps its
//! formatting. When Word has split a marker across several runs no single
//! run contains that occurrence; the paragraph text is then rewritten as one
//! run carrying the first run's formatting.
//!
//! Substitution is a single pass in map order. Replacement values are not
//! scanned again for markers, but a later marker can still match text that
//! an earlier replacement produced in the same paragraph.
//!
//! # Example
//!
//! ```
//! use docfill::fill::{fill, PlaceholderMap};
//! use docfill::model::{Document, Paragraph, TextRun};
//!
//! let mut doc = Document::new();
//! doc.add_paragraph(Paragraph::with_runs([
//!     TextRun::new("Paciente: "),
//!     TextRun::bold("{{NOME_PACIENTE}}"),
//! ]));
//!
//! let map = PlaceholderMap::new().with("{{NOME_PACIENTE}}", "Ana Lima");
//! let stats = fill(&mut doc, &map);
//!
//! assert_eq!(doc.plain_text(), "Paciente: Ana Lima");
//! assert_eq!(stats.run_replacements, 1);
//! ```

mod placeholders;

pub use placeholders::{find_markers, PlaceholderMap};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Document, Paragraph};
use crate::parser::DocxPackage;

/// Statistics collected while filling a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillStats {
    /// Paragraphs examined
    pub paragraphs_visited: u32,

    /// Paragraphs that contained at least one marker
    pub paragraphs_matched: u32,

    /// Runs rewritten in place
    pub run_replacements: u32,

    /// Paragraphs rewritten as a whole because a marker spanned runs
    pub fallback_replacements: u32,
}

impl FillStats {
    /// Check if any paragraph lost run formatting.
    pub fn has_fallbacks(&self) -> bool {
        self.fallback_replacements > 0
    }

    /// Total number of replacements performed.
    pub fn total_replacements(&self) -> u32 {
        self.run_replacements + self.fallback_replacements
    }
}

/// Replace every marker of `map` in the document, in place.
pub fn fill(doc: &mut Document, map: &PlaceholderMap) -> FillStats {
    let mut stats = FillStats::default();

    for paragraph in doc.paragraphs_mut() {
        fill_paragraph(paragraph, map, &mut stats);
    }

    for table in doc.tables_mut() {
        for row in table.rows_mut() {
            for cell in row.cells_mut() {
                for paragraph in cell.paragraphs_mut() {
                    fill_paragraph(paragraph, map, &mut stats);
                }
            }
        }
    }

    log::debug!(
        "Filled {} of {} paragraphs ({} run, {} fallback replacements)",
        stats.paragraphs_matched,
        stats.paragraphs_visited,
        stats.run_replacements,
        stats.fallback_replacements
    );
    stats
}

/// Replace markers in a single paragraph.
pub fn fill_paragraph(paragraph: &mut Paragraph, map: &PlaceholderMap, stats: &mut FillStats) {
    stats.paragraphs_visited += 1;

    let text = paragraph.plain_text();
    if text.is_empty() || !map.keys().any(|k| !k.is_empty() && text.contains(k)) {
        return;
    }
    stats.paragraphs_matched += 1;

    for (key, value) in map.iter() {
        if key.is_empty() || !paragraph.plain_text().contains(key) {
            continue;
        }

        let occurrences = paragraph.plain_text().matches(key).count();
        let mut replaced = 0;
        for run in paragraph.runs_mut() {
            let count = run.replace_text(key, value);
            if count > 0 {
                replaced += count;
                stats.run_replacements += 1;
            }
        }

        if replaced < occurrences {
            log::warn!(
                "Marker {} spans several runs; paragraph formatting collapsed to its first run",
                key
            );
            let full = paragraph.plain_text();
            paragraph.set_text(&full.replace(key, value));
            stats.fallback_replacements += 1;
        }
    }
}

/// Fill the main document part of an opened package.
pub fn fill_package(package: &mut DocxPackage, map: &PlaceholderMap) -> Result<FillStats> {
    let mut doc = package.document()?;
    let stats = fill(&mut doc, map);
    package.set_document(&doc)?;
    Ok(stats)
}

/// Fill a DOCX package held in memory and return the new package bytes.
pub fn fill_bytes(data: &[u8], map: &PlaceholderMap) -> Result<Vec<u8>> {
    let mut package = DocxPackage::from_bytes(data)?;
    fill_package(&mut package, map)?;
    package.to_bytes()
}

/// Fill a template file and return the finished document bytes.
///
/// Returns `Ok(None)` when the template does not exist; a template that
/// exists but cannot be read as DOCX is an error.
pub fn fill_template<P: AsRef<Path>>(path: P, map: &PlaceholderMap) -> Result<Option<Vec<u8>>> {
    Ok(fill_template_with_stats(path, map)?.map(|(bytes, _)| bytes))
}

/// Like [`fill_template`], also returning the substitution statistics.
pub fn fill_template_with_stats<P: AsRef<Path>>(
    path: P,
    map: &PlaceholderMap,
) -> Result<Option<(Vec<u8>, FillStats)>> {
    let path = path.as_ref();
    if !path.exists() {
        log::debug!("Template not found: {}", path.display());
        return Ok(None);
    }
    let mut package = DocxPackage::open(path)?;
    let stats = fill_package(&mut package, map)?;
    Ok(Some((package.to_bytes()?, stats)))
}
