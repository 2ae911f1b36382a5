//! File input and output helpers for alignment descriptions and settings.

use std::fs::File;
use std::io::{self, Read, Write};

pub mod alignment_json;

pub use alignment_json::{read_alignment_json, write_alignment_json};

/// Reads a file to string.
pub fn read_to_string(path: &str) -> io::Result<String> {
    let mut buffer = String::new();
    File::open(path)?.read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Writes a string to a file, replacing its contents.
pub fn write_string(path: &str, contents: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())
}
