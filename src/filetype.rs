//! Heuristic text/binary classification.
//!
//! Only a short prefix of the file is inspected. A buffer counts as text when
//! enough of it is printable ASCII, or failing that, enough of it decodes as
//! UTF-8 sequences. A text verdict is overridden for well-known compressed and
//! archive formats.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::error;

/// Bytes read from the start of a file.
pub const BLOCK_SIZE: usize = 64;
/// Minimum fraction of acceptable bytes for a text verdict.
pub const DEFAULT_CONFIDENCE: f64 = 0.7;

/// Magic numbers matched at offset 0.
pub const BINARY_SIGNATURES: &[(&str, &[u8])] = &[
    ("bzip2", &[0x42, 0x5A, 0x68]),
    ("gzip", &[0x1F, 0x8B, 0x08]),
    ("tar.z lzw", &[0x1F, 0x9D]),
    ("tar.z lzh", &[0x1F, 0xA0]),
    ("zip", &[0x50, 0x4B, 0x03, 0x04]),
    ("pkzip empty", &[0x50, 0x4B, 0x05, 0x06]),
    ("pkzip multi", &[0x50, 0x4B, 0x07, 0x08]),
    ("7zip", &[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C]),
];

fn is_ascii_text(b: u8) -> bool {
    (32..=126).contains(&b) || matches!(b, 9 | 10 | 12 | 13)
}

fn ratio(valid: usize, total: usize) -> f64 {
    valid as f64 / total as f64
}

/// Share of bytes that are printable ASCII or tab/newline/form-feed/CR.
fn ascii_score(data: &[u8]) -> f64 {
    ratio(data.iter().filter(|&&b| is_ascii_text(b)).count(), data.len())
}

/// Number of continuation bytes a lead byte announces, for the 2..=6 byte forms.
fn continuation_len(lead: u8) -> Option<usize> {
    match lead {
        b if b & 0xE0 == 0xC0 => Some(1),
        b if b & 0xF0 == 0xE0 => Some(2),
        b if b & 0xF8 == 0xF0 => Some(3),
        b if b & 0xFC == 0xF8 => Some(4),
        b if b & 0xFE == 0xFC => Some(5),
        _ => None,
    }
}

/// Share of bytes that are ASCII text or part of a complete UTF-8 sequence.
///
/// The historical 5 and 6 byte forms are accepted.
fn utf8_score(data: &[u8]) -> f64 {
    let mut valid = 0;
    let mut i = 0;
    while i < data.len() {
        let b = data[i];
        if is_ascii_text(b) {
            valid += 1;
        } else if let Some(n) = continuation_len(b) {
            let tail = data.get(i + 1..=i + n);
            if tail.is_some_and(|t| t.iter().all(|c| c & 0xC0 == 0x80)) {
                valid += n + 1;
                i += n;
            }
        }
        i += 1;
    }
    ratio(valid, data.len())
}

pub fn has_binary_signature(data: &[u8]) -> bool {
    BINARY_SIGNATURES.iter().any(|(_, sig)| data.starts_with(sig))
}

/// Classify an in-memory prefix. Empty buffers are not text.
pub fn is_text_bytes(data: &[u8], confidence: f64) -> bool {
    if data.is_empty() {
        return false;
    }
    let looks_like_text =
        ascii_score(data) >= confidence || utf8_score(data) >= confidence;
    looks_like_text && !has_binary_signature(data)
}

/// Classify the file at `path` from its first `BLOCK_SIZE` bytes.
///
/// Read failures are logged and the file is treated as binary.
pub fn is_text(path: &Path, confidence: f64) -> bool {
    let mut buf = Vec::with_capacity(BLOCK_SIZE);
    let read = File::open(path).and_then(|f| f.take(BLOCK_SIZE as u64).read_to_end(&mut buf));
    match read {
        Ok(_) => is_text_bytes(&buf, confidence),
        Err(err) => {
            error!(path = %path.display(), %err, "is_text: read failed");
            false
        }
    }
}

pub fn is_binary(path: &Path) -> bool {
    !is_text(path, DEFAULT_CONFIDENCE)
}
