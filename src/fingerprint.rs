//! The record shown to the user and written into output artifacts.
//!
//! ```
//! use funnyhash::digest::{digest_bytes, HashAlgorithm};
//! use funnyhash::fingerprint::Fingerprint;
//!
//! let digest = digest_bytes(b"hello", HashAlgorithm::Sha256);
//! let fp = Fingerprint::derive(&digest, None)?;
//! assert!(fp.funny_hash.starts_with(fp.plate.as_str()));
//! # Ok::<(), funnyhash::plate::PlateError>(())
//! ```

use std::io::Read;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::digest::{digest_file, digest_reader, Digest, DigestError, HashAlgorithm};
use crate::plate::{encode_plate_to_phrase, make_plate, make_word_hash, Plate, PlateError, WordHash};

/// Where the phrase's input plate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlateSource {
    Generated,
    Override,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fingerprint {
    pub algorithm:    HashAlgorithm,
    pub digest_hex:   String,
    pub plate:        Plate,
    pub word_hash:    WordHash,
    /// `"<plate> | <word hash>"`.
    pub funny_hash:   String,
    pub plate_phrase: String,
    pub plate_source: PlateSource,
}

#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error(transparent)]
    Digest(#[from] DigestError),
    #[error(transparent)]
    Plate(#[from] PlateError),
}

impl Fingerprint {
    /// Derive every display string from a finished digest.
    ///
    /// A blank `plate_override` counts as absent.  A non-blank one is
    /// encoded as given, surrounding whitespace included.
    pub fn derive(digest: &Digest, plate_override: Option<&str>) -> Result<Self, PlateError> {
        let bytes     = digest.as_bytes();
        let plate     = make_plate(bytes)?;
        let word_hash = make_word_hash(bytes)?;

        let (phrase_input, plate_source) = match plate_override {
            Some(s) if !s.trim().is_empty() => (s, PlateSource::Override),
            _                        => (plate.as_str(), PlateSource::Generated),
        };
        let plate_phrase = encode_plate_to_phrase(phrase_input);

        Ok(Self {
            algorithm: digest.algorithm(),
            digest_hex: digest.to_hex(),
            funny_hash: format!("{plate} | {word_hash}"),
            plate,
            word_hash,
            plate_phrase,
            plate_source,
        })
    }

    pub fn from_reader<R: Read>(
        reader: R,
        algorithm: HashAlgorithm,
        plate_override: Option<&str>,
    ) -> Result<Self, FingerprintError> {
        let digest = digest_reader(reader, algorithm)?;
        Ok(Self::derive(&digest, plate_override)?)
    }

    pub fn from_file<P: AsRef<Path>>(
        path: P,
        algorithm: HashAlgorithm,
        plate_override: Option<&str>,
    ) -> Result<Self, FingerprintError> {
        let digest = digest_file(path, algorithm)?;
        Ok(Self::derive(&digest, plate_override)?)
    }
}
