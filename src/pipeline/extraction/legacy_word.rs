//! Legacy Word (.doc) decoder.
//!
//! The backend is chosen once per batch by a capability probe:
//! an external converter found on `PATH`, else the built-in OLE reader,
//! else nothing. Without a backend the bucket yields no fragments and a
//! `NoLegacyWordBackend` warning is raised for the caller.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::types::{BatchExtraction, DecoderSettings, ExtractionWarning, FileExtraction, FormatDecoder};
use super::DecodeError;
use crate::pipeline::import::{FormatFamily, SourceFile};

const FIB_MAGIC: u16 = 0xA5EC;
/// Index of the fcClx/lcbClx pair in the FIB's FcLcb array.
const CLX_FCLCB_INDEX: usize = 33;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyWordBackend {
    External { program: String, path: PathBuf },
    Builtin,
}

impl LegacyWordBackend {
    pub fn name(&self) -> &str {
        match self {
            Self::External { program, .. } => program,
            Self::Builtin => "builtin",
        }
    }
}

pub struct LegacyWordDecoder {
    settings: DecoderSettings,
}

impl LegacyWordDecoder {
    pub fn new(settings: DecoderSettings) -> Self {
        Self { settings }
    }

    /// Pick the backend for a batch. `None` means `.doc` files cannot be read.
    pub fn probe_backend(&self) -> Option<LegacyWordBackend> {
        for program in &self.settings.external_doc_converters {
            if let Some(path) = find_on_path(program) {
                return Some(LegacyWordBackend::External {
                    program: program.clone(),
                    path,
                });
            }
        }
        if self.settings.builtin_doc_reader {
            return Some(LegacyWordBackend::Builtin);
        }
        None
    }
}

impl FormatDecoder for LegacyWordDecoder {
    fn family(&self) -> FormatFamily {
        FormatFamily::WordLegacy
    }

    fn extract_batch(&self, files: &[SourceFile]) -> BatchExtraction {
        if files.is_empty() {
            return BatchExtraction::default();
        }

        let Some(backend) = self.probe_backend() else {
            tracing::warn!(files = files.len(), "No legacy Word backend available");
            return BatchExtraction {
                files: files
                    .iter()
                    .map(|source| FileExtraction {
                        source: source.clone(),
                        result: Ok(Vec::new()),
                    })
                    .collect(),
                warnings: vec![ExtractionWarning::NoLegacyWordBackend {
                    skipped_files: files.len(),
                }],
            };
        };

        tracing::info!(backend = backend.name(), files = files.len(), "Reading legacy Word files");
        BatchExtraction::per_file(files, |source| match &backend {
            LegacyWordBackend::External { program, path } => {
                run_external_converter(program, path, &source.path)
            }
            LegacyWordBackend::Builtin => read_doc_builtin(&source.path),
        })
    }
}

fn find_on_path(program: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        if cfg!(windows) {
            let exe = dir.join(format!("{program}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

/// Flags that make the known converters print one unwrapped line per paragraph.
fn converter_args(program: &str) -> &'static [&'static str] {
    match program {
        "antiword" => &["-w", "0"],
        "catdoc" => &["-w"],
        _ => &[],
    }
}

fn run_external_converter(
    program: &str,
    executable: &Path,
    file: &Path,
) -> Result<Vec<String>, DecodeError> {
    let output = Command::new(executable)
        .args(converter_args(program))
        .arg(file)
        .output()
        .map_err(|e| DecodeError::ExternalConverter {
            program: program.to_string(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(DecodeError::ExternalConverter {
            program: program.to_string(),
            reason: format!(
                "exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    let text = String::from_utf8_lossy(&output.stdout);
    Ok(text.lines().map(str::to_string).collect())
}

// ═══════════════════════════════════════════
// Built-in reader (OLE compound file + piece table)
// ═══════════════════════════════════════════

#[derive(Debug, Clone)]
struct FibInfo {
    use_table1: bool,
    fc_min: u32,
    fc_mac: u32,
    fc_clx: u32,
    lcb_clx: u32,
}

#[derive(Debug, Clone)]
struct TextPiece {
    cp_start: u32,
    cp_end: u32,
    file_offset: u32,
    unicode: bool,
}

/// Read paragraphs straight out of the `WordDocument` stream.
pub fn read_doc_builtin(path: &Path) -> Result<Vec<String>, DecodeError> {
    let file = File::open(path)?;
    let mut ole = cfb::CompoundFile::open(file)
        .map_err(|e| DecodeError::LegacyDocument(format!("not an OLE compound file: {e}")))?;

    let word_stream = read_stream(&mut ole, "WordDocument")?;
    let fib = parse_fib(&word_stream)
        .ok_or_else(|| DecodeError::LegacyDocument("invalid File Information Block".into()))?;

    let mut raw = String::new();
    if fib.fc_clx != 0 && fib.lcb_clx != 0 {
        let table_name = if fib.use_table1 { "1Table" } else { "0Table" };
        match read_stream(&mut ole, table_name) {
            Ok(table_stream) => {
                let pieces = parse_text_pieces(&table_stream, fib.fc_clx, fib.lcb_clx);
                raw = decode_pieces(&word_stream, &pieces);
            }
            Err(e) => tracing::debug!(error = %e, "Table stream unreadable, using text range"),
        }
    }
    if raw.is_empty() {
        raw = decode_simple_range(&word_stream, fib.fc_min, fib.fc_mac);
    }

    Ok(split_word_paragraphs(&raw))
}

fn read_stream(ole: &mut cfb::CompoundFile<File>, name: &str) -> Result<Vec<u8>, DecodeError> {
    let mut stream = ole
        .open_stream(name)
        .map_err(|e| DecodeError::LegacyDocument(format!("{name} stream: {e}")))?;
    let mut data = Vec::new();
    stream.read_to_end(&mut data)?;
    Ok(data)
}

fn read_u16_le(data: &[u8], offset: usize) -> Option<u16> {
    data.get(offset..offset + 2)
        .map(|bytes| u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u32_le(data: &[u8], offset: usize) -> Option<u32> {
    data.get(offset..offset + 4)
        .map(|bytes| u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn parse_fib(word_stream: &[u8]) -> Option<FibInfo> {
    if read_u16_le(word_stream, 0)? != FIB_MAGIC {
        return None;
    }
    let flags = read_u16_le(word_stream, 0x0A)?;
    let fc_min = read_u32_le(word_stream, 0x18)?;
    let fc_mac = read_u32_le(word_stream, 0x1C)?;

    // Skip the variable-length FibRgW and FibRgLw arrays.
    let mut pos = 32usize;
    let csw = read_u16_le(word_stream, pos)? as usize;
    pos += 2 + csw * 2;
    let cslw = read_u16_le(word_stream, pos)? as usize;
    pos += 2 + cslw * 4;
    let cb_rg_fc_lcb = read_u16_le(word_stream, pos)? as usize;
    pos += 2;

    let (fc_clx, lcb_clx) = if cb_rg_fc_lcb > CLX_FCLCB_INDEX {
        let offset = pos + CLX_FCLCB_INDEX * 8;
        (read_u32_le(word_stream, offset)?, read_u32_le(word_stream, offset + 4)?)
    } else {
        (0, 0)
    };

    Some(FibInfo {
        use_table1: flags & 0x0200 != 0,
        fc_min,
        fc_mac,
        fc_clx,
        lcb_clx,
    })
}

fn parse_text_pieces(table_stream: &[u8], fc_clx: u32, lcb_clx: u32) -> Vec<TextPiece> {
    let start = fc_clx as usize;
    let end = start + lcb_clx as usize;
    let Some(clx) = table_stream.get(start..end) else {
        return Vec::new();
    };

    let mut pos = 0usize;
    while pos < clx.len() {
        let clxt = clx[pos];
        pos += 1;
        match clxt {
            // Prc: property modifiers, skipped.
            0x02 => {
                let Some(cb) = read_u16_le(clx, pos) else { break };
                pos += 2 + cb as usize;
            }
            // Pcdt: the piece table itself.
            0x01 => {
                let Some(lcb) = read_u32_le(clx, pos).map(|v| v as usize) else { break };
                pos += 4;
                let Some(plc) = clx.get(pos..pos + lcb) else { break };
                if lcb < 4 {
                    break;
                }
                let piece_count = (lcb - 4) / 12;
                let cps: Vec<u32> = (0..=piece_count)
                    .map(|i| read_u32_le(plc, i * 4).unwrap_or(0))
                    .collect();
                let pcd = &plc[(piece_count + 1) * 4..];
                return (0..piece_count)
                    .map(|i| {
                        let fc = read_u32_le(pcd, i * 8 + 2).unwrap_or(0);
                        let unicode = fc & 0x4000_0000 == 0;
                        TextPiece {
                            cp_start: cps[i],
                            cp_end: cps[i + 1],
                            file_offset: if unicode { fc } else { (fc & 0x3FFF_FFFF) / 2 },
                            unicode,
                        }
                    })
                    .collect();
            }
            _ => break,
        }
    }
    Vec::new()
}

fn decode_pieces(word_stream: &[u8], pieces: &[TextPiece]) -> String {
    let mut out = String::new();
    for piece in pieces {
        if piece.cp_end <= piece.cp_start {
            continue;
        }
        let char_count = (piece.cp_end - piece.cp_start) as usize;
        let byte_count = if piece.unicode { char_count * 2 } else { char_count };
        let start = piece.file_offset as usize;
        let Some(slice) = word_stream.get(start..start + byte_count) else {
            continue;
        };
        if piece.unicode {
            out.push_str(&utf16le_lossy(slice));
        } else {
            // Compressed pieces are cp1252; encoding_rs maps the 0x80..0x9F range.
            let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(slice);
            out.push_str(&text);
        }
    }
    out
}

fn decode_simple_range(word_stream: &[u8], fc_min: u32, fc_mac: u32) -> String {
    let start = fc_min as usize;
    let end = (fc_mac as usize).min(word_stream.len());
    if end <= start {
        return String::new();
    }
    utf16le_lossy(&word_stream[start..end])
}

fn utf16le_lossy(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Turn Word's raw character stream into paragraphs.
///
/// Field instructions (between 0x13 and 0x14) are dropped while field
/// results are kept. Paragraph marks, line breaks, page breaks and table
/// cell marks (0x07) all end a paragraph.
fn split_word_paragraphs(raw: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    // One entry per open field: true once its separator was seen.
    let mut fields: Vec<bool> = Vec::new();

    for ch in raw.chars() {
        match ch {
            '\u{13}' => fields.push(false),
            '\u{14}' => {
                if let Some(last) = fields.last_mut() {
                    *last = true;
                }
            }
            '\u{15}' => {
                fields.pop();
            }
            _ if fields.iter().any(|seen_separator| !seen_separator) => {}
            '\r' | '\n' | '\u{07}' | '\u{0B}' | '\u{0C}' => {
                paragraphs.push(std::mem::take(&mut current));
            }
            '\t' => current.push('\t'),
            c if c.is_control() => {}
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}
