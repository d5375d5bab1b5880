//! PNG chunk walker and `tEXt` injector.
//!
//! # Layout
//! ```text
//! [ signature (8 B) ][ chunk ]*
//! chunk = [ length u32 BE ][ type (4 B) ][ data (length B) ][ crc (4 B) ]
//! ```
//! The walk ends after the `IEND` chunk or at end of buffer, whichever
//! comes first.  All offsets are bounds-checked before slicing; a length
//! field that overruns the buffer yields [`PngError::Truncated`].
//!
//! # Injected chunk
//! One `tEXt` chunk goes immediately before `IEND`:
//! ```text
//! data = [ 0x00 ][ "FunnyHash=" ][ funny hash text ]
//! ```
//! With [`ChecksumMode::Placeholder`] (the default) its CRC field is four
//! zero bytes, which is NOT a valid CRC.  Strict PNG decoders will report
//! the output as corrupt.  [`ChecksumMode::Crc32`] writes the real CRC-32
//! over type + data instead.

use std::io::{self, Cursor, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher;
use thiserror::Error;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];
pub const IEND: [u8; 4] = *b"IEND";
pub const IHDR: [u8; 4] = *b"IHDR";
pub const TEXT: [u8; 4] = *b"tEXt";
/// Stand-in for the `tEXt` keyword field.
pub const KEYWORD_PLACEHOLDER: u8 = 0x00;
/// Written in place of the CRC under [`ChecksumMode::Placeholder`].
pub const CRC_PLACEHOLDER: [u8; 4] = [0; 4];
pub const FUNNY_HASH_PREFIX: &[u8] = b"FunnyHash=";

/// Length + type prefix.
pub const CHUNK_HEADER_SIZE: usize = 8;
pub const CHUNK_CRC_SIZE: usize = 4;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PngError {
    #[error("Not a PNG stream (signature mismatch)")]
    BadSignature,
    #[error("Chunk at offset {offset} declares {declared} data bytes but only {available} remain")]
    Truncated { offset: usize, declared: u64, available: usize },
    #[error("Chunk stream ends without IEND")]
    MissingIend,
    #[error("Text too long for one chunk ({0} bytes)")]
    TextTooLong(usize),
}

/// How the injected chunk's trailing field is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumMode {
    #[default]
    Placeholder,
    Crc32,
}

// ── Chunk ────────────────────────────────────────────────────────────────────

/// One chunk borrowed from the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Offset of the length field within the buffer.
    pub offset: usize,
    pub kind:   [u8; 4],
    pub data:   &'a [u8],
    pub crc:    [u8; 4],
    raw:        &'a [u8],
}

impl<'a> Chunk<'a> {
    /// Type tag as text (lossy for non-ASCII tags).
    pub fn kind_str(&self) -> String {
        String::from_utf8_lossy(&self.kind).into_owned()
    }

    pub fn is_iend(&self) -> bool { self.kind == IEND }

    /// On-disk size: header + data + CRC.
    pub fn total_len(&self) -> usize { self.raw.len() }

    /// The chunk exactly as it appears in the source.
    pub fn raw(&self) -> &'a [u8] { self.raw }

    /// True if the stored CRC matches type + data.
    pub fn crc_valid(&self) -> bool {
        u32::from_be_bytes(self.crc) == chunk_crc(&self.kind, self.data)
    }
}

// ── Walker ───────────────────────────────────────────────────────────────────

/// Iterator over the chunks of a PNG buffer.
///
/// Yields each chunk in order, stops after `IEND`, and yields at most one
/// error (after which it is exhausted).
pub struct ChunkWalker<'a> {
    buf:  &'a [u8],
    pos:  usize,
    done: bool,
}

impl<'a> ChunkWalker<'a> {
    pub fn new(buf: &'a [u8]) -> Result<Self, PngError> {
        if !has_signature(buf) {
            return Err(PngError::BadSignature);
        }
        Ok(Self { buf, pos: PNG_SIGNATURE.len(), done: false })
    }

    /// Offset of the next unread byte.  After a clean walk this is the end
    /// of `IEND`; anything beyond it is trailing data.
    pub fn position(&self) -> usize { self.pos }

    fn read_chunk(&self) -> Result<Chunk<'a>, PngError> {
        let offset    = self.pos;
        let remaining = self.buf.len() - offset;
        let truncated = |declared: u64| PngError::Truncated {
            offset,
            declared,
            available: remaining.saturating_sub(CHUNK_HEADER_SIZE),
        };

        if remaining < CHUNK_HEADER_SIZE {
            return Err(truncated(0));
        }
        let mut cur = Cursor::new(&self.buf[offset..offset + CHUNK_HEADER_SIZE]);
        let length  = cur.read_u32::<BigEndian>().map_err(|_| truncated(0))?;
        let mut kind = [0u8; 4];
        kind.copy_from_slice(&self.buf[offset + 4..offset + CHUNK_HEADER_SIZE]);

        let total = (length as usize)
            .checked_add(CHUNK_HEADER_SIZE + CHUNK_CRC_SIZE)
            .filter(|&t| t <= remaining)
            .ok_or_else(|| truncated(length as u64))?;

        let raw      = &self.buf[offset..offset + total];
        let data_end = CHUNK_HEADER_SIZE + length as usize;
        let mut crc  = [0u8; 4];
        crc.copy_from_slice(&raw[data_end..]);

        Ok(Chunk { offset, kind, data: &raw[CHUNK_HEADER_SIZE..data_end], crc, raw })
    }
}

impl<'a> Iterator for ChunkWalker<'a> {
    type Item = Result<Chunk<'a>, PngError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.buf.len() {
            return None;
        }
        match self.read_chunk() {
            Ok(chunk) => {
                self.pos += chunk.total_len();
                self.done = chunk.is_iend();
                Some(Ok(chunk))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// True if `buf` starts with the PNG signature.
pub fn has_signature(buf: &[u8]) -> bool {
    buf.starts_with(&PNG_SIGNATURE)
}

/// Walk every chunk, failing on the first malformed one.
pub fn walk_chunks(buf: &[u8]) -> Result<Vec<Chunk<'_>>, PngError> {
    ChunkWalker::new(buf)?.collect()
}

// ── Writing ──────────────────────────────────────────────────────────────────

/// CRC-32 over type + data, as PNG defines it.
pub fn chunk_crc(kind: &[u8; 4], data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(kind);
    hasher.update(data);
    hasher.finalize()
}

/// Serialise one chunk.
pub fn write_chunk<W: Write>(mut writer: W, kind: &[u8; 4], data: &[u8], mode: ChecksumMode) -> io::Result<()> {
    let length = u32::try_from(data.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "chunk data exceeds u32"))?;
    writer.write_u32::<BigEndian>(length)?;
    writer.write_all(kind)?;
    writer.write_all(data)?;
    match mode {
        ChecksumMode::Placeholder => writer.write_all(&CRC_PLACEHOLDER)?,
        ChecksumMode::Crc32       => writer.write_u32::<BigEndian>(chunk_crc(kind, data))?,
    }
    Ok(())
}

/// Payload of the injected `tEXt` chunk.
pub fn text_payload(funny_hash: &str) -> Vec<u8> {
    let mut data = Vec::with_capacity(1 + FUNNY_HASH_PREFIX.len() + funny_hash.len());
    data.push(KEYWORD_PLACEHOLDER);
    data.extend_from_slice(FUNNY_HASH_PREFIX);
    data.extend_from_slice(funny_hash.as_bytes());
    data
}

/// The complete injected chunk, ready to splice in.
pub fn text_chunk(funny_hash: &str, mode: ChecksumMode) -> Result<Vec<u8>, PngError> {
    let data = text_payload(funny_hash);
    if u32::try_from(data.len()).is_err() {
        return Err(PngError::TextTooLong(data.len()));
    }
    let mut out = Vec::with_capacity(CHUNK_HEADER_SIZE + data.len() + CHUNK_CRC_SIZE);
    write_chunk(&mut out, &TEXT, &data, mode).map_err(|_| PngError::TextTooLong(data.len()))?;
    Ok(out)
}

/// Copy `buf` with a `tEXt` chunk carrying `funny_hash` inserted before
/// `IEND`.  Everything up to and including `IEND` is copied byte for byte;
/// anything after `IEND` is not copied.
pub fn inject_funny_hash(buf: &[u8], funny_hash: &str, mode: ChecksumMode) -> Result<Vec<u8>, PngError> {
    let injected = text_chunk(funny_hash, mode)?;
    let mut out  = Vec::with_capacity(buf.len() + injected.len());
    out.extend_from_slice(&PNG_SIGNATURE);

    for chunk in ChunkWalker::new(buf)? {
        let chunk = chunk?;
        if chunk.is_iend() {
            out.extend_from_slice(&injected);
            out.extend_from_slice(chunk.raw());
            return Ok(out);
        }
        out.extend_from_slice(chunk.raw());
    }
    Err(PngError::MissingIend)
}

/// Find a previously injected funny hash in a PNG's `tEXt` chunks.
pub fn read_funny_hash(buf: &[u8]) -> Option<String> {
    ChunkWalker::new(buf)
        .ok()?
        .map_while(Result::ok)
        .filter(|c| c.kind == TEXT)
        .find_map(|c| {
            let body = c.data.strip_prefix(&[KEYWORD_PLACEHOLDER])?;
            let text = body.strip_prefix(FUNNY_HASH_PREFIX)?;
            Some(String::from_utf8_lossy(text).into_owned())
        })
}
