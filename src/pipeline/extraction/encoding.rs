//! Character encoding detection for plain-text inputs.
//!
//! Detection produces an ordered list of candidate encodings, most
//! trustworthy first:
//! 1. BOM (Byte Order Mark)
//! 2. UTF-16 without BOM, recognised by its null-byte pattern
//! 3. UTF-8
//! 4. chardetng statistical guess for legacy encodings
//!
//! Each candidate is tried strictly (malformed input rejects it) until one
//! decodes the whole buffer.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

use super::DecodeError;

/// Candidate encodings for `buffer`, in the order they should be tried.
pub fn candidate_encodings(buffer: &[u8]) -> Vec<&'static Encoding> {
    let mut candidates: Vec<&'static Encoding> = Vec::with_capacity(4);
    let mut push = |encoding: &'static Encoding| {
        if !candidates.contains(&encoding) {
            candidates.push(encoding);
        }
    };

    if let Some((encoding, _)) = Encoding::for_bom(buffer) {
        push(encoding);
    }

    if let Some(encoding) = detect_utf16_without_bom(buffer) {
        push(encoding);
    }

    push(UTF_8);

    let mut detector = EncodingDetector::new();
    detector.feed(buffer, true);
    push(detector.guess(None, false));

    candidates
}

/// Decode `buffer` with the first candidate that accepts it.
pub fn decode_text(buffer: &[u8]) -> Result<(String, &'static Encoding), DecodeError> {
    let bom = Encoding::for_bom(buffer);
    let candidates = candidate_encodings(buffer);

    for encoding in &candidates {
        let input = match bom {
            Some((bom_encoding, bom_len)) if bom_encoding == *encoding => &buffer[bom_len..],
            _ => buffer,
        };
        let (text, had_errors) = encoding.decode_without_bom_handling(input);
        if !had_errors {
            tracing::debug!(encoding = encoding.name(), "Decoded text buffer");
            return Ok((text.into_owned(), encoding));
        }
    }

    Err(DecodeError::EncodingExhausted {
        tried: candidates.iter().map(|e| e.name().to_string()).collect(),
    })
}

/// UTF-16 without BOM: ASCII-range text leaves every other byte null.
fn detect_utf16_without_bom(buffer: &[u8]) -> Option<&'static Encoding> {
    let total_pairs = buffer.len() / 2;
    if total_pairs <= 4 {
        return None;
    }

    let nulls_at_odd = buffer.iter().skip(1).step_by(2).filter(|&&b| b == 0).count();
    let nulls_at_even = buffer.iter().step_by(2).filter(|&&b| b == 0).count();

    if nulls_at_odd > total_pairs * 3 / 4 && nulls_at_even < total_pairs / 4 {
        return Some(UTF_16LE);
    }
    if nulls_at_even > total_pairs * 3 / 4 && nulls_at_odd < total_pairs / 4 {
        return Some(UTF_16BE);
    }
    None
}
