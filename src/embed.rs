//! Container embedder: write a copy of a file with the fingerprint inside.
//!
//! ```no_run
//! use funnyhash::embed::{embed_file, EmbedOptions};
//!
//! let outcome = embed_file("photo.png", "ABC-123 | CAT-DOG-42", "CAT-DOG", &EmbedOptions::default())?;
//! println!("{}", outcome.output_path.display());
//! # Ok::<(), funnyhash::embed::EmbedError>(())
//! ```
//!
//! # Strategies
//! | Strategy    | When                                         | Suffix       |
//! |-------------|----------------------------------------------|--------------|
//! | `PngChunk`  | `.png` name, PNG signature, clean chunk walk | `.hashpng`   |
//! | `PlainText` | everything else, and any PNG failure          | `.funnycopy` |
//!
//! A PNG that fails to walk is not an error: the plain-text strategy takes
//! over and the failure is logged.  The source file is only ever read.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

use crate::png::{self, ChecksumMode};

pub const FUNNY_HASH_MARKER:   &str = "<!-- FUNNY-HASH: ";
pub const PLATE_PHRASE_MARKER: &str = "<!-- PLATE-PHRASE: ";
pub const MARKER_END:          &str = " -->\n";

// ── Options ──────────────────────────────────────────────────────────────────

/// Configuration for [`embed`] and [`embed_file`].
#[derive(Debug, Clone, Default)]
pub struct EmbedOptions {
    /// Trailing field of the injected PNG chunk.
    pub checksum:   ChecksumMode,
    /// Skip the PNG strategy even for PNG input.
    pub plain_only: bool,
}

// ── Strategy ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedStrategy {
    PlainText,
    PngChunk,
}

impl EmbedStrategy {
    /// Whether output written this way contains the plate phrase.  The PNG
    /// chunk only carries the funny hash.
    pub fn carries_phrase(self) -> bool {
        matches!(self, EmbedStrategy::PlainText)
    }

    /// Recognise an output file by its suffix.
    pub fn from_output_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        [EmbedStrategy::PlainText, EmbedStrategy::PngChunk]
            .into_iter()
            .find(|s| name.ends_with(&format!(".{}", s.suffix())))
    }

    /// Extension appended to the source path.
    pub fn suffix(self) -> &'static str {
        match self {
            EmbedStrategy::PlainText => "funnycopy",
            EmbedStrategy::PngChunk  => "hashpng",
        }
    }
}

impl fmt::Display for EmbedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EmbedStrategy::PlainText => "plain-text",
            EmbedStrategy::PngChunk  => "png-chunk",
        })
    }
}

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("Cannot read source {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("Cannot write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

// ── In-memory embedding ──────────────────────────────────────────────────────

/// Bytes ready to write plus the strategy that produced them.
#[derive(Debug, Clone)]
pub struct Embedded {
    pub bytes:    Vec<u8>,
    pub strategy: EmbedStrategy,
}

/// Source bytes verbatim followed by the two marker lines.
pub fn plain_text_embedding(src: &[u8], funny_hash: &str, plate_phrase: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(
        src.len() + 1 + FUNNY_HASH_MARKER.len() + PLATE_PHRASE_MARKER.len()
            + 2 * MARKER_END.len() + funny_hash.len() + plate_phrase.len(),
    );
    out.extend_from_slice(src);
    out.push(b'\n');
    for (marker, text) in [(FUNNY_HASH_MARKER, funny_hash), (PLATE_PHRASE_MARKER, plate_phrase)] {
        out.extend_from_slice(marker.as_bytes());
        out.extend_from_slice(text.as_bytes());
        out.extend_from_slice(MARKER_END.as_bytes());
    }
    out
}

/// Case-insensitive `.png` suffix check on the file name.  A file named
/// exactly `.png` matches too.
pub fn has_png_name(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|n| n.ends_with(".png"))
}

/// Pick a strategy and build the output bytes.
///
/// The PNG chunk only carries `funny_hash`; `plate_phrase` is written by
/// the plain-text strategy alone.
pub fn embed(
    source_name: &Path,
    src: &[u8],
    funny_hash: &str,
    plate_phrase: &str,
    opts: &EmbedOptions,
) -> Embedded {
    if !opts.plain_only && has_png_name(source_name) && png::has_signature(src) {
        match png::inject_funny_hash(src, funny_hash, opts.checksum) {
            Ok(bytes) => return Embedded { bytes, strategy: EmbedStrategy::PngChunk },
            Err(e) => warn!(
                source = %source_name.display(),
                error = %e,
                "PNG chunk embedding failed, falling back to plain text"
            ),
        }
    }
    Embedded {
        bytes:    plain_text_embedding(src, funny_hash, plate_phrase),
        strategy: EmbedStrategy::PlainText,
    }
}

// ── On-disk embedding ────────────────────────────────────────────────────────

/// `<source>.<suffix>`; the original extension is kept.
pub fn output_path(source: &Path, strategy: EmbedStrategy) -> PathBuf {
    let mut name = OsString::from(source.as_os_str());
    name.push(".");
    name.push(strategy.suffix());
    PathBuf::from(name)
}

/// Result of [`embed_file`].
#[derive(Debug, Clone)]
pub struct EmbedOutcome {
    pub output_path: PathBuf,
    pub strategy:    EmbedStrategy,
    pub bytes_written: u64,
}

/// Read `source`, embed, and write the copy next to it.
///
/// The copy is written to a temporary file in the same directory and
/// renamed into place, so a failed write leaves no partial output.
pub fn embed_file<P: AsRef<Path>>(
    source: P,
    funny_hash: &str,
    plate_phrase: &str,
    opts: &EmbedOptions,
) -> Result<EmbedOutcome, EmbedError> {
    let source = source.as_ref();
    let src = fs::read(source).map_err(|e| EmbedError::Read { path: source.to_owned(), source: e })?;

    let embedded = embed(source, &src, funny_hash, plate_phrase, opts);
    let output_path = output_path(source, embedded.strategy);
    write_atomic(&output_path, &embedded.bytes)
        .map_err(|e| EmbedError::Write { path: output_path.clone(), source: e })?;

    debug!(
        source = %source.display(),
        output = %output_path.display(),
        strategy = %embedded.strategy,
        bytes = embedded.bytes.len(),
        "embedded fingerprint"
    );
    Ok(EmbedOutcome {
        output_path,
        strategy: embedded.strategy,
        bytes_written: embedded.bytes.len() as u64,
    })
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::png::{write_chunk, IEND, IHDR, PNG_SIGNATURE};

    fn tiny_png() -> Vec<u8> {
        let mut buf = PNG_SIGNATURE.to_vec();
        write_chunk(&mut buf, &IHDR, &[0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0], ChecksumMode::Crc32).unwrap();
        write_chunk(&mut buf, &IEND, &[], ChecksumMode::Crc32).unwrap();
        buf
    }

    #[test]
    fn plain_text_layout_is_exact() {
        let out = plain_text_embedding(b"data", "FH", "PP");
        assert_eq!(out, b"data\n<!-- FUNNY-HASH: FH -->\n<!-- PLATE-PHRASE: PP -->\n");
    }

    #[test]
    fn png_name_is_case_insensitive() {
        assert!(has_png_name(Path::new("a/B.PNG")));
        assert!(has_png_name(Path::new("x.png")));
        assert!(!has_png_name(Path::new("x.png.txt")));
        assert!(!has_png_name(Path::new("png")));
        assert!(has_png_name(Path::new("dir/.png")));
        assert!(has_png_name(Path::new(".PNG")));
    }

    #[test]
    fn png_requires_name_and_signature() {
        let png = tiny_png();
        let opts = EmbedOptions::default();
        assert_eq!(embed(Path::new("i.png"), &png, "F", "P", &opts).strategy, EmbedStrategy::PngChunk);
        assert_eq!(embed(Path::new("i.bin"), &png, "F", "P", &opts).strategy, EmbedStrategy::PlainText);
        assert_eq!(embed(Path::new("i.png"), b"not a png", "F", "P", &opts).strategy, EmbedStrategy::PlainText);
    }

    #[test]
    fn plain_only_skips_png() {
        let opts = EmbedOptions { plain_only: true, ..Default::default() };
        let out = embed(Path::new("i.png"), &tiny_png(), "F", "P", &opts);
        assert_eq!(out.strategy, EmbedStrategy::PlainText);
    }

    #[test]
    fn strategy_from_output_suffix() {
        assert_eq!(EmbedStrategy::from_output_path(Path::new("a.png.hashpng")), Some(EmbedStrategy::PngChunk));
        assert_eq!(EmbedStrategy::from_output_path(Path::new("a.txt.FUNNYCOPY")), Some(EmbedStrategy::PlainText));
        assert_eq!(EmbedStrategy::from_output_path(Path::new("a.png")), None);
        assert!(!EmbedStrategy::PngChunk.carries_phrase());
        assert!(EmbedStrategy::PlainText.carries_phrase());
    }

    #[test]
    fn output_path_appends_suffix() {
        assert_eq!(output_path(Path::new("/tmp/a.png"), EmbedStrategy::PngChunk), PathBuf::from("/tmp/a.png.hashpng"));
        assert_eq!(output_path(Path::new("notes"), EmbedStrategy::PlainText), PathBuf::from("notes.funnycopy"));
    }
}
