//! Digest engine: selectable cryptographic hashes over file contents.
//!
//! # Algorithms
//! Every algorithm is a tag of [`HashAlgorithm`].  Dispatch happens in one
//! place ([`Engine`]) via a `match` on the tag; there is no trait object
//! and no registry.
//!
//! | Tag      | Digest length |
//! |----------|---------------|
//! | `md5`    | 16 B          |
//! | `sha1`   | 20 B          |
//! | `sha256` | 32 B          |
//! | `blake3` | 32 B          |
//!
//! # Input
//! Readers are consumed incrementally in [`READ_CHUNK_SIZE`] pieces, so the
//! digest step itself never needs the whole file in memory.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::Serialize;
use sha2::Digest as _;
use thiserror::Error;
use tracing::debug;

/// Read granularity for [`digest_reader`]: 1 MiB.
pub const READ_CHUNK_SIZE: usize = 1 << 20;

// ── HashAlgorithm ────────────────────────────────────────────────────────────

/// Hash algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    #[default]
    Sha256,
    Blake3,
}

impl HashAlgorithm {
    /// Every supported algorithm, in display order.
    pub const ALL: [HashAlgorithm; 4] = [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha256,
        HashAlgorithm::Blake3,
    ];

    /// Canonical lower-case name.
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Md5    => "md5",
            HashAlgorithm::Sha1   => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Blake3 => "blake3",
        }
    }

    /// Parse from a CLI string.  Accepts the hyphenated spellings too.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "md5"               => Some(HashAlgorithm::Md5),
            "sha1"   | "sha-1"   => Some(HashAlgorithm::Sha1),
            "sha256" | "sha-256" => Some(HashAlgorithm::Sha256),
            "blake3"            => Some(HashAlgorithm::Blake3),
            _                   => None,
        }
    }

    /// Output length in bytes.
    #[inline]
    pub fn digest_len(self) -> usize {
        match self {
            HashAlgorithm::Md5    => 16,
            HashAlgorithm::Sha1   => 20,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Blake3 => 32,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Digest ───────────────────────────────────────────────────────────────────

/// Finished digest bytes, tagged with the algorithm that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    algorithm: HashAlgorithm,
    bytes:     Vec<u8>,
}

impl Digest {
    pub fn algorithm(&self) -> HashAlgorithm { self.algorithm }
    pub fn as_bytes(&self) -> &[u8] { &self.bytes }
    pub fn len(&self) -> usize { self.bytes.len() }
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    /// Lower-case hex rendering (diagnostics and JSON output).
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] { &self.bytes }
}

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum DigestError {
    #[error("Cannot read input: {0}")]
    Io(#[from] io::Error),
    /// The hasher produced no output.  Never hand this downstream.
    #[error("{algorithm} produced an empty digest")]
    Empty { algorithm: HashAlgorithm },
}

// ── Engine ───────────────────────────────────────────────────────────────────

/// Running hash state for one algorithm.
enum Engine {
    Md5(md5::Md5),
    Sha1(sha1::Sha1),
    Sha256(sha2::Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl Engine {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Md5    => Engine::Md5(md5::Md5::new()),
            HashAlgorithm::Sha1   => Engine::Sha1(sha1::Sha1::new()),
            HashAlgorithm::Sha256 => Engine::Sha256(sha2::Sha256::new()),
            HashAlgorithm::Blake3 => Engine::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Engine::Md5(h)    => h.update(data),
            Engine::Sha1(h)   => h.update(data),
            Engine::Sha256(h) => h.update(data),
            Engine::Blake3(h) => { h.update(data); }
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Engine::Md5(h)    => h.finalize().to_vec(),
            Engine::Sha1(h)   => h.finalize().to_vec(),
            Engine::Sha256(h) => h.finalize().to_vec(),
            Engine::Blake3(h) => h.finalize().as_bytes().to_vec(),
        }
    }
}

// ── Entry points ─────────────────────────────────────────────────────────────

/// Hash everything `reader` yields, [`READ_CHUNK_SIZE`] bytes at a time.
pub fn digest_reader<R: Read>(mut reader: R, algorithm: HashAlgorithm) -> Result<Digest, DigestError> {
    let mut engine = Engine::new(algorithm);
    let mut buf    = vec![0u8; READ_CHUNK_SIZE];
    let mut total  = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0)  => break,
            Ok(n)  => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        engine.update(&buf[..n]);
        total += n as u64;
    }

    let bytes = engine.finalize();
    if bytes.is_empty() {
        return Err(DigestError::Empty { algorithm });
    }
    debug!(algorithm = algorithm.name(), bytes_read = total, "digest computed");
    Ok(Digest { algorithm, bytes })
}

/// Hash an in-memory buffer.
pub fn digest_bytes(data: &[u8], algorithm: HashAlgorithm) -> Digest {
    let mut engine = Engine::new(algorithm);
    engine.update(data);
    Digest { algorithm, bytes: engine.finalize() }
}

/// Hash a file on disk.
pub fn digest_file<P: AsRef<Path>>(path: P, algorithm: HashAlgorithm) -> Result<Digest, DigestError> {
    digest_reader(File::open(path)?, algorithm)
}
