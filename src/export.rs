//! Word document export for generated summaries.
//!
//! Writes a minimal Office Open XML package (`.docx`) with zip, escaping text
//! through quick-xml, and can read the same layout back.

use crate::config::ExportConfig;
use crate::summary::SummaryStyle;
use chrono::{DateTime, Local};
use lazy_static::lazy_static;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Heading written at the top of every document
pub const DOCUMENT_TITLE: &str = "AI Website Summary";

/// MIME type for `.docx` files
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const MAX_NAME_ATTEMPTS: u32 = 1000;

lazy_static! {
    static ref EXPORT_NAME: Regex = Regex::new(r"^summary_\d+(?:_\d+)?\.docx$").unwrap();
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="480" w:after="0"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="28"/></w:rPr></w:style></w:styles>"#;

const DOCUMENT_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

const DOCUMENT_CLOSE: &str = "<w:sectPr/></w:body></w:document>";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write document: {0}")]
    Io(#[from] io::Error),
    #[error("document archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("document XML error: {0}")]
    Xml(String),
    #[error("document is missing expected content: {0}")]
    Malformed(String),
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("could not find a free file name for timestamp {0}")]
    NameExhausted(i64),
}

/// Run details recorded alongside the summary
#[derive(Debug, Clone)]
pub struct ExportMetadata {
    pub source_url: String,
    pub model: String,
    pub style: SummaryStyle,
    pub generated_at: DateTime<Local>,
}

impl ExportMetadata {
    pub fn new(source_url: impl Into<String>, model: impl Into<String>, style: SummaryStyle) -> Self {
        Self {
            source_url: source_url.into(),
            model: model.into(),
            style,
            generated_at: Local::now(),
        }
    }

    /// The four metadata paragraphs, in document order
    pub fn lines(&self) -> [String; 4] {
        [
            format!("Source URL: {}", self.source_url),
            format!("Model Used: {}", self.model),
            format!("Summary Type: {}", self.style),
            format!("Generated At: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S")),
        ]
    }
}

/// Contents of an exported document, as read back from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentContents {
    pub title: String,
    pub metadata: Vec<String>,
    pub summary: String,
}

/// Writes summaries into the export directory and serves them back by name
#[derive(Debug, Clone)]
pub struct Exporter {
    dir: PathBuf,
    retain: Option<usize>,
}

impl Exporter {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            retain: config.retain,
        }
    }

    /// Write a new document and return its file name.
    ///
    /// Names never overwrite an existing file; if `summary_<ts>.docx` is
    /// taken a numeric suffix is added.
    pub fn export(&self, summary: &str, metadata: &ExportMetadata) -> Result<String, ExportError> {
        fs::create_dir_all(&self.dir)?;

        let timestamp = metadata.generated_at.timestamp();
        let (file_name, file) = self.create_unique(timestamp)?;
        let path = self.dir.join(&file_name);

        if let Err(e) = write_docx(file, summary, metadata) {
            // Leave no half-written document behind
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        info!(file = %file_name, "Exported summary document");

        if let Some(keep) = self.retain {
            match self.prune(keep) {
                Ok(0) => {}
                Ok(removed) => info!(removed, "Pruned old summary documents"),
                Err(e) => warn!(error = %e, "Failed to prune old summary documents"),
            }
        }

        Ok(file_name)
    }

    fn create_unique(&self, timestamp: i64) -> Result<(String, File), ExportError> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let file_name = export_file_name(timestamp, attempt);
            let path = self.dir.join(&file_name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((file_name, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(ExportError::NameExhausted(timestamp))
    }

    /// Map a requested file name to an exported document on disk.
    ///
    /// Only names produced by [`Exporter::export`] are accepted, so path
    /// separators and `..` never reach the filesystem.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, ExportError> {
        if !is_export_name(name) {
            return Err(ExportError::NotFound(name.to_string()));
        }

        let path = self.dir.join(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ExportError::NotFound(name.to_string()))
        }
    }

    /// Delete all but the newest `keep` exported documents; returns how many were removed
    pub fn prune(&self, keep: usize) -> Result<usize, ExportError> {
        let mut documents = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if !is_export_name(&name) {
                continue;
            }
            let modified = entry.metadata()?.modified()?;
            documents.push((modified, name, entry.path()));
        }

        // Newest first; the name breaks ties within the same mtime
        documents.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));

        let mut removed = 0;
        for (_, _, path) in documents.into_iter().skip(keep) {
            fs::remove_file(&path)?;
            removed += 1;
        }
        Ok(removed)
    }
}

/// `summary_<ts>.docx`, or `summary_<ts>_<n>.docx` for later attempts
fn export_file_name(timestamp: i64, attempt: u32) -> String {
    if attempt == 0 {
        format!("summary_{timestamp}.docx")
    } else {
        format!("summary_{timestamp}_{attempt}.docx")
    }
}

/// Whether `name` has the exact shape of an exported document name
pub fn is_export_name(name: &str) -> bool {
    EXPORT_NAME.is_match(name)
}

fn write_docx(file: File, summary: &str, metadata: &ExportMetadata) -> Result<(), ExportError> {
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
        ("_rels/.rels", PACKAGE_RELS_XML.to_string()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.to_string()),
        ("word/styles.xml", STYLES_XML.to_string()),
        ("word/document.xml", document_xml(summary, metadata)),
    ];

    for (name, content) in parts {
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
    }

    let mut file = zip.finish()?;
    file.flush()?;
    Ok(())
}

fn document_xml(summary: &str, metadata: &ExportMetadata) -> String {
    let mut xml = String::from(DOCUMENT_OPEN);

    xml.push_str(&heading(DOCUMENT_TITLE));
    for line in metadata.lines() {
        xml.push_str(&paragraph(&line));
    }
    xml.push_str("<w:p/>");
    for line in summary.split('\n') {
        xml.push_str(&paragraph(line));
    }

    xml.push_str(DOCUMENT_CLOSE);
    xml
}

fn heading(text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape(text)
    )
}

fn paragraph(text: &str) -> String {
    if text.is_empty() {
        return "<w:p/>".to_string();
    }
    format!(
        r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape(text)
    )
}

/// Read an exported document back into its title, metadata lines and summary
pub fn read_document(path: &Path) -> Result<DocumentContents, ExportError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let mut xml = String::new();
    archive.by_name("word/document.xml")?.read_to_string(&mut xml)?;

    let paragraphs = parse_paragraphs(&xml)?;
    if paragraphs.len() < 7 {
        return Err(ExportError::Malformed(format!(
            "expected at least 7 paragraphs, found {}",
            paragraphs.len()
        )));
    }

    Ok(DocumentContents {
        title: paragraphs[0].clone(),
        metadata: paragraphs[1..5].to_vec(),
        summary: paragraphs[6..].join("\n"),
    })
}

/// Text of every `w:p` in `document.xml`, in order
fn parse_paragraphs(xml: &str) -> Result<Vec<String>, ExportError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ExportError::Xml(e.to_string()))?;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => current = Some(String::new()),
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) if e.name().as_ref() == b"w:p" => paragraphs.push(String::new()),
            Event::End(e) => match e.name().as_ref() {
                b"w:p" => {
                    if let Some(text) = current.take() {
                        paragraphs.push(text);
                    }
                }
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Text(text) if in_text => {
                let raw = String::from_utf8_lossy(&text);
                let decoded = unescape(&raw).map_err(|e| ExportError::Xml(e.to_string()))?;
                current.get_or_insert_with(String::new).push_str(&decoded);
            }
            Event::GeneralRef(entity) if in_text => {
                let reference = format!("&{};", String::from_utf8_lossy(&entity));
                let decoded = unescape(&reference).map_err(|e| ExportError::Xml(e.to_string()))?;
                current.get_or_insert_with(String::new).push_str(&decoded);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn exporter_in(dir: &TempDir, retain: Option<usize>) -> Exporter {
        Exporter::new(&ExportConfig {
            dir: dir.path().to_path_buf(),
            retain,
        })
    }

    fn metadata_at(timestamp: i64) -> ExportMetadata {
        ExportMetadata {
            source_url: "https://example.com/article?a=1&b=2".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            style: SummaryStyle::Bullets,
            generated_at: Local.timestamp_opt(timestamp, 0).unwrap(),
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let exporter = exporter_in(&dir, None);
        let metadata = metadata_at(1_700_000_000);
        let summary = "- First point <with> markup & entities\n\n- Second \"quoted\" point\n  indented line";

        let name = exporter.export(summary, &metadata).unwrap();
        assert_eq!(name, "summary_1700000000.docx");

        let contents = read_document(&dir.path().join(&name)).unwrap();
        assert_eq!(contents.title, DOCUMENT_TITLE);
        assert_eq!(contents.metadata, metadata.lines().to_vec());
        assert_eq!(contents.summary, summary);
    }

    #[test]
    fn test_metadata_lines() {
        let metadata = metadata_at(1_700_000_000);
        let lines = metadata.lines();
        assert_eq!(lines[0], "Source URL: https://example.com/article?a=1&b=2");
        assert_eq!(lines[1], "Model Used: llama-3.1-8b-instant");
        assert_eq!(lines[2], "Summary Type: bullets");
        assert!(lines[3].starts_with("Generated At: 2023-11-1"));
    }

    #[test]
    fn test_same_second_exports_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let exporter = exporter_in(&dir, None);
        let metadata = metadata_at(1_700_000_000);

        let first = exporter.export("one", &metadata).unwrap();
        let second = exporter.export("two", &metadata).unwrap();
        let third = exporter.export("three", &metadata).unwrap();

        assert_eq!(first, "summary_1700000000.docx");
        assert_eq!(second, "summary_1700000000_1.docx");
        assert_eq!(third, "summary_1700000000_2.docx");

        let contents = read_document(&dir.path().join(&first)).unwrap();
        assert_eq!(contents.summary, "one");
    }

    #[test]
    fn test_resolve_rejects_unknown_and_traversal_names() {
        let dir = TempDir::new().unwrap();
        let exporter = exporter_in(&dir, None);
        fs::write(dir.path().join("secret.txt"), "secret").unwrap();

        for name in [
            "summary_123.docx",
            "secret.txt",
            "../secret.txt",
            "..%2Fsecret.txt",
            "/etc/passwd",
            "summary_1.docx/../secret.txt",
            "",
        ] {
            assert!(
                matches!(exporter.resolve(name), Err(ExportError::NotFound(_))),
                "{name} should not resolve"
            );
        }
    }

    #[test]
    fn test_resolve_exported_file() {
        let dir = TempDir::new().unwrap();
        let exporter = exporter_in(&dir, None);
        let name = exporter.export("text", &metadata_at(42)).unwrap();
        assert_eq!(exporter.resolve(&name).unwrap(), dir.path().join(&name));
    }

    #[test]
    fn test_retention_keeps_newest() {
        let dir = TempDir::new().unwrap();
        let exporter = exporter_in(&dir, Some(2));
        fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

        for ts in [100, 200, 300, 400] {
            exporter.export("text", &metadata_at(ts)).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(20));
        }

        let mut remaining: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        remaining.sort();
        assert_eq!(
            remaining,
            vec!["notes.txt", "summary_300.docx", "summary_400.docx"]
        );
    }

    #[test]
    fn test_export_name_pattern() {
        assert!(is_export_name("summary_1700000000.docx"));
        assert!(is_export_name("summary_1700000000_3.docx"));
        assert!(!is_export_name("summary_.docx"));
        assert!(!is_export_name("summary_17.docx.bak"));
        assert!(!is_export_name("xsummary_17.docx"));
        assert!(!is_export_name("summary_17.pdf"));
    }

    #[test]
    fn test_read_rejects_non_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary_1.docx");
        fs::write(&path, "not a zip").unwrap();
        assert!(matches!(read_document(&path), Err(ExportError::Zip(_))));
    }
}
