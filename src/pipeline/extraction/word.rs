//! Modern Word (.docx) decoder.
//!
//! A .docx file is a ZIP archive of WordprocessingML parts. Text is read
//! from the header parts, the main document and the footer parts, in that
//! order. Every paragraph (table cells included) becomes one or more
//! fragments: a manual line break starts a new fragment.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader as XmlReader;
use zip::ZipArchive;

use super::types::{BatchExtraction, FormatDecoder};
use super::DecodeError;
use crate::pipeline::import::{FormatFamily, SourceFile, SourceFormat};

const MAIN_DOCUMENT_PART: &str = "word/document.xml";

pub struct DocxDecoder;

impl FormatDecoder for DocxDecoder {
    fn family(&self) -> FormatFamily {
        FormatFamily::WordModern
    }

    fn extract_batch(&self, files: &[SourceFile]) -> BatchExtraction {
        BatchExtraction::per_file(files, |source| match source.format {
            SourceFormat::Docx => extract_docx(&source.path),
            other => Err(DecodeError::UnsupportedFormat(other)),
        })
    }
}

/// Extract paragraph lines from a .docx file.
pub fn extract_docx(path: &Path) -> Result<Vec<String>, DecodeError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| DecodeError::Archive(e.to_string()))?;

    let mut headers = Vec::new();
    let mut footers = Vec::new();
    for name in archive.file_names() {
        if is_part(name, "word/header") {
            headers.push(name.to_string());
        } else if is_part(name, "word/footer") {
            footers.push(name.to_string());
        }
    }
    headers.sort_by(|a, b| part_order(a).cmp(&part_order(b)));
    footers.sort_by(|a, b| part_order(a).cmp(&part_order(b)));

    let mut parts = headers;
    parts.push(MAIN_DOCUMENT_PART.to_string());
    parts.extend(footers);

    let mut lines = Vec::new();
    for part in parts {
        let xml = match read_zip_entry(&mut archive, &part) {
            Ok(xml) => xml,
            Err(e) if part == MAIN_DOCUMENT_PART => return Err(e),
            Err(e) => {
                tracing::debug!(part = %part, error = %e, "Skipping unreadable docx part");
                continue;
            }
        };
        for paragraph in parse_paragraphs(&xml)? {
            lines.extend(paragraph.split('\n').map(str::to_string));
        }
    }

    tracing::debug!(file = %path.display(), lines = lines.len(), "Extracted docx text");
    Ok(lines)
}

fn is_part(name: &str, prefix: &str) -> bool {
    name.starts_with(prefix) && name.ends_with(".xml") && !name.contains("/_rels/")
}

/// Sort key putting `header2.xml` before `header10.xml`.
fn part_order(name: &str) -> (usize, String) {
    let digits: String = name.chars().filter(|c| c.is_ascii_digit()).collect();
    (digits.parse().unwrap_or(0), name.to_string())
}

fn read_zip_entry(archive: &mut ZipArchive<File>, name: &str) -> Result<String, DecodeError> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| DecodeError::Archive(format!("{name}: {e}")))?;
    let mut buffer = Vec::new();
    entry.read_to_end(&mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Collect the text of every `w:p` element. Tabs become `\t`, breaks `\n`.
/// Only tabs and breaks inside a run count; `w:tabs` in paragraph
/// properties are tab-stop definitions.
pub fn parse_paragraphs(xml: &str) -> Result<Vec<String>, DecodeError> {
    let mut reader = XmlReader::from_str(xml);
    let mut buf = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_text = false;
    let mut run_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"p" => {
                    if depth == 0 {
                        current.clear();
                    }
                    depth += 1;
                }
                b"r" => run_depth += 1,
                b"t" => in_text = true,
                b"tab" if run_depth > 0 => current.push('\t'),
                b"br" | b"cr" if run_depth > 0 => current.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"tab" if run_depth > 0 => current.push('\t'),
                b"br" | b"cr" if run_depth > 0 => current.push('\n'),
                b"p" if depth == 0 => paragraphs.push(String::new()),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text {
                    let text = e.unescape().map_err(|err| DecodeError::Xml(err.to_string()))?;
                    current.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"r" => run_depth = run_depth.saturating_sub(1),
                b"t" => in_text = false,
                b"p" => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => return Err(DecodeError::Xml(err.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|b| *b == b':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;

    const W_NS: &str = "xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"";

    fn body(paragraphs: &str) -> String {
        format!("<?xml version=\"1.0\"?><w:document {W_NS}><w:body>{paragraphs}</w:body></w:document>")
    }

    fn write_docx(path: &Path, parts: &[(&str, String)]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, content) in parts {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn paragraphs_join_runs() {
        let xml = body(
            "<w:p><w:r><w:t>Hello </w:t></w:r><w:r><w:t>World</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Second</w:t></w:r></w:p>",
        );
        assert_eq!(parse_paragraphs(&xml).unwrap(), vec!["Hello World", "Second"]);
    }

    #[test]
    fn tabs_and_breaks_are_kept() {
        let xml = body("<w:p><w:r><w:t>A</w:t><w:tab/><w:t>B</w:t><w:br/><w:t>C</w:t></w:r></w:p>");
        assert_eq!(parse_paragraphs(&xml).unwrap(), vec!["A\tB\nC"]);
    }

    #[test]
    fn empty_paragraphs_are_reported() {
        let xml = body("<w:p/><w:p><w:r><w:t>x</w:t></w:r></w:p><w:p></w:p>");
        assert_eq!(parse_paragraphs(&xml).unwrap(), vec!["", "x", ""]);
    }

    #[test]
    fn tab_stop_definitions_are_not_text() {
        let xml = body(
            "<w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/>\
             <w:tab w:val=\"right\" w:pos=\"9000\"/></w:tabs></w:pPr>\
             <w:r><w:t>A</w:t><w:tab/><w:t>B</w:t></w:r></w:p>",
        );
        assert_eq!(parse_paragraphs(&xml).unwrap(), vec!["A\tB"]);
    }

    #[test]
    fn table_cells_are_paragraphs() {
        let xml = body(
            "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>Cell 1</w:t></w:r></w:p></w:tc>\
             <w:tc><w:p><w:r><w:t>Cell 2</w:t></w:r></w:p></w:tc></w:tr></w:tbl>",
        );
        assert_eq!(parse_paragraphs(&xml).unwrap(), vec!["Cell 1", "Cell 2"]);
    }

    #[test]
    fn entities_are_unescaped() {
        let xml = body("<w:p><w:r><w:t>Fish &amp; Chips</w:t></w:r></w:p>");
        assert_eq!(parse_paragraphs(&xml).unwrap(), vec!["Fish & Chips"]);
    }

    #[test]
    fn extracts_headers_body_and_footers_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.docx");
        let header = format!(
            "<w:hdr {W_NS}><w:p><w:r><w:t>Header text</w:t></w:r></w:p></w:hdr>"
        );
        let footer = format!(
            "<w:ftr {W_NS}><w:p><w:r><w:t>Footer text</w:t></w:r></w:p></w:ftr>"
        );
        write_docx(
            &path,
            &[
                ("word/footer1.xml", footer),
                (
                    "word/document.xml",
                    body("<w:p><w:r><w:t>Line one</w:t><w:br/><w:t>Line two</w:t></w:r></w:p>"),
                ),
                ("word/header1.xml", header),
            ],
        );

        let lines = extract_docx(&path).unwrap();
        assert_eq!(lines, vec!["Header text", "Line one", "Line two", "Footer text"]);
    }

    #[test]
    fn missing_main_part_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        write_docx(&path, &[("word/other.xml", "<x/>".to_string())]);
        assert!(matches!(extract_docx(&path), Err(DecodeError::Archive(_))));
    }

    #[test]
    fn not_a_zip_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.docx");
        std::fs::write(&path, "plain text pretending").unwrap();
        assert!(extract_docx(&path).is_err());
    }

    #[test]
    fn header_order_is_numeric() {
        let mut names = vec!["word/header10.xml", "word/header2.xml", "word/header1.xml"];
        names.sort_by(|a, b| part_order(a).cmp(&part_order(b)));
        assert_eq!(names, vec!["word/header1.xml", "word/header2.xml", "word/header10.xml"]);
    }
}
