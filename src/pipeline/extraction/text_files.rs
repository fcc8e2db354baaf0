//! Text-family decoder: txt, log, csv, tsv, xml, html and srt.
//!
//! Every file is read as bytes and decoded through the encoding candidate
//! loop first; the format-specific parser then works on the decoded text.

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader as XmlReader;
use scraper::Html;

use super::encoding::decode_text;
use super::sentence::SentenceSegmenter;
use super::types::{BatchExtraction, FormatDecoder};
use super::DecodeError;
use crate::pipeline::import::{FormatFamily, SourceFile, SourceFormat};

pub struct TextFileDecoder;

impl FormatDecoder for TextFileDecoder {
    fn family(&self) -> FormatFamily {
        FormatFamily::Text
    }

    fn extract_batch(&self, files: &[SourceFile]) -> BatchExtraction {
        let segmenter = SentenceSegmenter::new();
        BatchExtraction::per_file(files, |source| extract_text_file(source, &segmenter))
    }
}

fn extract_text_file(
    source: &SourceFile,
    segmenter: &SentenceSegmenter,
) -> Result<Vec<String>, DecodeError> {
    let text = read_decoded(&source.path)?;
    match source.format {
        SourceFormat::Txt | SourceFormat::Log => Ok(split_lines(&text)),
        SourceFormat::Csv => parse_delimited(&text, b','),
        SourceFormat::Tsv => parse_delimited(&text, b'\t'),
        SourceFormat::Xml => parse_xml_text(&text),
        SourceFormat::Html => Ok(parse_html_text(&text)),
        SourceFormat::Srt => {
            let cues = parse_srt_cues(&text)?;
            Ok(segmenter.split(&cues.join(" ")))
        }
        other => Err(DecodeError::UnsupportedFormat(other)),
    }
}

fn read_decoded(path: &Path) -> Result<String, DecodeError> {
    let bytes = std::fs::read(path)?;
    let (text, encoding) = decode_text(&bytes)?;
    tracing::debug!(file = %path.display(), encoding = encoding.name(), "Decoded text file");
    Ok(text)
}

/// One entry per line. `\r\n`, `\n` and a lone `\r` all end a line.
pub fn split_lines(text: &str) -> Vec<String> {
    universal_newlines(text).lines().map(str::to_string).collect()
}

fn universal_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Every cell of every row, row-major. Ragged rows are accepted.
pub fn parse_delimited(text: &str, delimiter: u8) -> Result<Vec<String>, DecodeError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut cells = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DecodeError::Delimited(e.to_string()))?;
        cells.extend(record.iter().map(str::to_string));
    }
    Ok(cells)
}

/// Leading text (and CDATA) of every element, in document order.
///
/// Only the text between an element's start tag and its first child or
/// end tag counts; text trailing a child element is not collected.
pub fn parse_xml_text(xml: &str) -> Result<Vec<String>, DecodeError> {
    let mut reader = XmlReader::from_str(xml);
    let mut buf = Vec::new();
    let mut texts = Vec::new();
    let mut pending: Option<String> = None;

    let flush = |pending: &mut Option<String>, texts: &mut Vec<String>| {
        if let Some(text) = pending.take() {
            if !text.is_empty() {
                texts.push(text);
            }
        }
    };

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) => {
                flush(&mut pending, &mut texts);
                pending = Some(String::new());
            }
            Ok(Event::End(_)) | Ok(Event::Empty(_)) => flush(&mut pending, &mut texts),
            Ok(Event::Text(e)) => {
                if let Some(text) = pending.as_mut() {
                    let unescaped = e.unescape().map_err(|err| DecodeError::Xml(err.to_string()))?;
                    text.push_str(&unescaped);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(text) = pending.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(DecodeError::Xml(format!(
                    "at position {}: {err}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
        buf.clear();
    }
    flush(&mut pending, &mut texts);

    Ok(texts)
}

/// Visible text nodes, each split on newlines. Script and style bodies are skipped.
pub fn parse_html_text(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut lines = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|el| el.name()))
            .is_some_and(|name| matches!(name, "script" | "style" | "noscript"));
        if hidden {
            continue;
        }
        lines.extend(text.split('\n').map(str::to_string));
    }
    lines
}

/// Cue texts of a SubRip file, each cue's lines joined with a space.
pub fn parse_srt_cues(text: &str) -> Result<Vec<String>, DecodeError> {
    let normalized = universal_newlines(text);
    let mut cues = Vec::new();
    let mut saw_block = false;

    for block in normalized.split("\n\n") {
        let lines: Vec<&str> = block.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.is_empty() {
            continue;
        }
        saw_block = true;
        let Some(timing) = lines.iter().position(|line| line.contains("-->")) else {
            tracing::debug!(block = %lines[0], "Skipping subtitle block without timing line");
            continue;
        };
        let cue = lines[timing + 1..]
            .iter()
            .map(|line| line.trim())
            .collect::<Vec<_>>()
            .join(" ");
        if !cue.is_empty() {
            cues.push(cue);
        }
    }

    if saw_block && cues.is_empty() {
        return Err(DecodeError::Subtitle("no timed cues found".into()));
    }
    Ok(cues)
}
