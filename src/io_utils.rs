//! I/O convenience helpers used by the search engine.
//!
//! File contents are decoded lossily so that a stray invalid byte does not
//! abort the scan of an otherwise textual file.

use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

/// Read a whole file into lines without their terminators.
pub fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_string)
        .collect())
}

/// Read the next path from a newline-delimited list, trimmed, skipping blank
/// lines. `None` at end of input.
pub fn next_listed_path<R: BufRead + ?Sized>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            return Ok(Some(trimmed.to_string()));
        }
    }
}
