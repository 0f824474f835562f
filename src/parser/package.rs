//! DOCX package reader and writer using the `zip` crate.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::detect::detect_format_from_bytes;
use crate::error::{Error, Result};
use crate::model::Document;

use super::body::{read_document, write_document};
use super::xml;

/// Name of the main document part.
pub const MAIN_PART: &str = "word/document.xml";

/// A single entry of the ZIP container.
#[derive(Debug, Clone)]
struct Entry {
    name: String,
    compression: CompressionMethod,
    is_dir: bool,
    data: Vec<u8>,
}

/// An opened DOCX package.
///
/// Every entry is held in memory in its original order; only the main
/// document part is ever rewritten.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    entries: Vec<Entry>,
}

impl DocxPackage {
    /// Open a DOCX file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Read a DOCX package from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        detect_format_from_bytes(data)?;

        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut bytes = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut bytes)?;
            entries.push(Entry {
                name: file.name().to_string(),
                compression: file.compression(),
                is_dir: file.is_dir(),
                data: bytes,
            });
        }

        let package = Self { entries };
        if package.part(MAIN_PART).is_none() {
            return Err(Error::MissingPart(MAIN_PART.into()));
        }
        log::debug!("Opened DOCX package with {} parts", package.entries.len());
        Ok(package)
    }

    /// Read a DOCX package from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Get the raw bytes of a part by name.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.data.as_slice())
    }

    /// Names of all parts in container order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Parse the main document part.
    pub fn document(&self) -> Result<Document> {
        let data = self
            .part(MAIN_PART)
            .ok_or_else(|| Error::MissingPart(MAIN_PART.into()))?;
        read_document(xml::parse(data)?)
    }

    /// Replace the main document part with a serialized document.
    pub fn set_document(&mut self, doc: &Document) -> Result<()> {
        let data = xml::write(&write_document(doc)?)?;
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.name == MAIN_PART)
            .ok_or_else(|| Error::MissingPart(MAIN_PART.into()))?;
        entry.data = data;
        Ok(())
    }

    /// Write the package to an in-memory buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for entry in &self.entries {
            let options = SimpleFileOptions::default().compression_method(entry.compression);
            if entry.is_dir {
                writer.add_directory(entry.name.as_str(), options)?;
            } else {
                writer.start_file(entry.name.as_str(), options)?;
                writer.write_all(&entry.data)?;
            }
        }
        Ok(writer.finish()?.into_inner())
    }

    /// Write the package to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Build a minimal package around a document.
    ///
    /// Useful for tests and for producing documents from scratch; the
    /// package carries only the parts Word needs to open the file.
    pub fn from_document(doc: &Document) -> Result<Self> {
        let entries = vec![
            Entry {
                name: "[Content_Types].xml".into(),
                compression: CompressionMethod::Deflated,
                is_dir: false,
                data: CONTENT_TYPES.as_bytes().to_vec(),
            },
            Entry {
                name: "_rels/.rels".into(),
                compression: CompressionMethod::Deflated,
                is_dir: false,
                data: PACKAGE_RELS.as_bytes().to_vec(),
            },
            Entry {
                name: MAIN_PART.into(),
                compression: CompressionMethod::Deflated,
                is_dir: false,
                data: xml::write(&write_document(doc)?)?,
            },
        ];
        Ok(Self { entries })
    }
}

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"</Types>"#
);

const PACKAGE_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"</Relationships>"#
);
