//! Verifier: raw substring search for previously embedded text.
//!
//! No marker parsing and no chunk awareness.  Both embedding strategies
//! write the text as raw bytes, so a plain substring test finds it in
//! either kind of output.

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::embed::EmbedStrategy;

/// True if `needle` occurs contiguously in `haystack`.  An empty needle
/// is always found.
pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    if needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}

pub fn verify(file_bytes: &[u8], expected: &str) -> bool {
    contains(file_bytes, expected.as_bytes())
}

/// Per-text outcome of [`verify_embedding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub funny_hash:   bool,
    pub plate_phrase: bool,
}

impl VerifyReport {
    /// Both texts present.
    pub fn is_verified(&self) -> bool {
        self.funny_hash && self.plate_phrase
    }

    /// Everything `strategy` writes is present.  For PNG chunk output that
    /// is the funny hash alone.
    pub fn is_verified_for(&self, strategy: EmbedStrategy) -> bool {
        self.funny_hash && (self.plate_phrase || !strategy.carries_phrase())
    }
}

pub fn verify_embedding(file_bytes: &[u8], funny_hash: &str, plate_phrase: &str) -> VerifyReport {
    VerifyReport {
        funny_hash:   verify(file_bytes, funny_hash),
        plate_phrase: verify(file_bytes, plate_phrase),
    }
}

pub fn verify_file<P: AsRef<Path>>(path: P, funny_hash: &str, plate_phrase: &str) -> io::Result<VerifyReport> {
    let bytes = fs::read(path)?;
    Ok(verify_embedding(&bytes, funny_hash, plate_phrase))
}
