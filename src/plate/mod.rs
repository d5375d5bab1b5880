//! Plate codec: digest bytes → plate / word hash, and plate ↔ phrase.
//!
//! # Plate
//! Six symbols from `A–Z0–9`, one per digest byte (`byte % 36`), with a
//! hyphen after the third: `XXX-XXX`.
//!
//! # Word hash
//! `WORD-WORD-NUM`: the first two digest bytes pick a letter each
//! (`byte % 26`), the letter's row picks a word (`letter_index % row_len`),
//! and the third byte is printed as a decimal number.
//!
//! # Phrase encode / decode
//! [`encode_plate_to_phrase`] and [`decode_phrase_to_plate`] are two
//! independent functions, NOT inverses.  Digits are folded onto the letters
//! `A..J` when encoding, so decoding cannot tell `A` from `0`, and every
//! letter `A..J` comes back as a digit.  Words containing a hyphen split
//! into tokens that match nothing and are dropped.  Decode is a best-effort
//! convenience; callers inspect [`DecodedPlate::dropped`] to see what was
//! lost.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::wordlist::{letter_for_word, words_for};

/// Plate alphabet: 26 letters then 10 digits.
pub const PLATE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
/// Digest bytes consumed by [`make_plate`].
pub const PLATE_SYMBOLS: usize = 6;
/// Digest bytes consumed by [`make_word_hash`].
pub const WORD_HASH_BYTES: usize = 3;
/// Stride between successive word choices within a row.
const PHRASE_STRIDE: usize = 7;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PlateError {
    #[error("Digest too short: need {needed} bytes, got {got}")]
    DigestTooShort { needed: usize, got: usize },
}

fn require(digest: &[u8], needed: usize) -> Result<(), PlateError> {
    if digest.len() < needed {
        return Err(PlateError::DigestTooShort { needed, got: digest.len() });
    }
    Ok(())
}

// ── Plate ────────────────────────────────────────────────────────────────────

/// A `XXX-XXX` plate over `A–Z0–9`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Plate(String);

impl Plate {
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Plate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn make_plate(digest: &[u8]) -> Result<Plate, PlateError> {
    require(digest, PLATE_SYMBOLS)?;
    let mut plate = String::with_capacity(PLATE_SYMBOLS + 1);
    for (i, &b) in digest[..PLATE_SYMBOLS].iter().enumerate() {
        plate.push(PLATE_ALPHABET[b as usize % PLATE_ALPHABET.len()] as char);
        if i == 2 {
            plate.push('-');
        }
    }
    Ok(Plate(plate))
}

// ── Word hash ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordHash {
    Words { first: &'static str, second: &'static str, number: u8 },
    /// A derived letter had no words.  Unreachable with the built-in table.
    Unknown,
}

impl fmt::Display for WordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordHash::Words { first, second, number } => write!(f, "{first}-{second}-{number}"),
            WordHash::Unknown => f.write_str("UNKNOWN-UNKNOWN"),
        }
    }
}

impl Serialize for WordHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn pick_word(byte: u8) -> Option<&'static str> {
    let index = byte as usize % 26;
    let words = words_for((b'A' + index as u8) as char)?;
    if words.is_empty() {
        return None;
    }
    Some(words[index % words.len()])
}

pub fn make_word_hash(digest: &[u8]) -> Result<WordHash, PlateError> {
    require(digest, WORD_HASH_BYTES)?;
    Ok(match (pick_word(digest[0]), pick_word(digest[1])) {
        (Some(first), Some(second)) => WordHash::Words { first, second, number: digest[2] },
        _ => WordHash::Unknown,
    })
}

// ── Phrase encode ────────────────────────────────────────────────────────────

/// Encode any plate-like string as a hyphen-joined word phrase.
///
/// Position `i` counts every input character, skipped ones included.
/// Characters that resolve to no table letter contribute nothing.
pub fn encode_plate_to_phrase(plate: &str) -> String {
    let mut words: Vec<&'static str> = Vec::with_capacity(plate.len());
    for (i, c) in plate.chars().enumerate() {
        let mut c = c.to_ascii_uppercase();
        if let Some(d) = c.to_digit(10) {
            c = (b'A' + (d % 26) as u8) as char;
        }
        let Some(row) = words_for(c) else { continue };
        if row.is_empty() {
            continue;
        }
        words.push(row[(i * PHRASE_STRIDE) % row.len()]);
    }
    words.join("-")
}

// ── Phrase decode ────────────────────────────────────────────────────────────

/// Result of [`decode_phrase_to_plate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodedPlate {
    /// Recovered symbols: digits for `A..J`, letters `K..Z` otherwise.
    pub plate:   String,
    /// Tokens that matched no table word, in input order.
    pub dropped: Vec<String>,
}

impl DecodedPlate {
    /// True when every token resolved.
    pub fn is_complete(&self) -> bool {
        self.dropped.is_empty()
    }
}

/// Best-effort reverse of [`encode_plate_to_phrase`].  See the module docs
/// for why this is lossy.
pub fn decode_phrase_to_plate(phrase: &str) -> DecodedPlate {
    let mut out = DecodedPlate::default();
    for token in phrase.split('-').filter(|t| !t.is_empty()) {
        let word = token.to_ascii_uppercase();
        match letter_for_word(&word) {
            Some(letter @ 'A'..='J') => out.plate.push((b'0' + (letter as u8 - b'A')) as char),
            Some(letter)             => out.plate.push(letter),
            None                     => out.dropped.push(word),
        }
    }
    if !out.is_complete() {
        debug!(dropped = ?out.dropped, "phrase decode dropped unknown tokens");
    }
    out
}
