//! One user's workflow: load a file, generate its fingerprint, embed it,
//! verify it.
//!
//! Each step checks what it depends on and refuses with a
//! [`SessionError`] before touching the filesystem when something is
//! missing.  Changing the file, the algorithm, or the plate override
//! discards the current fingerprint, so a stale one can never be embedded.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::digest::HashAlgorithm;
use crate::embed::{embed_file, EmbedError, EmbedOptions, EmbedOutcome};
use crate::fingerprint::{Fingerprint, FingerprintError};
use crate::verify::{verify_file, VerifyReport};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No file loaded — load a file first")]
    NoFileLoaded,
    #[error("No fingerprint yet — generate one first")]
    NotGenerated,
    #[error("Plate phrase is empty — the plate override contains no usable characters")]
    EmptyPhrase,
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
    #[error(transparent)]
    Embed(#[from] EmbedError),
    #[error("Cannot read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
}

#[derive(Debug, Default)]
pub struct Session {
    file:           Option<PathBuf>,
    algorithm:      HashAlgorithm,
    plate_override: Option<String>,
    fingerprint:    Option<Fingerprint>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_algorithm(algorithm: HashAlgorithm) -> Self {
        Self { algorithm, ..Self::default() }
    }

    // ── State ─────────────────────────────────────────────────────────────────

    pub fn load<P: Into<PathBuf>>(&mut self, path: P) {
        self.file = Some(path.into());
        self.fingerprint = None;
    }

    pub fn set_algorithm(&mut self, algorithm: HashAlgorithm) {
        if self.algorithm != algorithm {
            self.algorithm = algorithm;
            self.fingerprint = None;
        }
    }

    /// `None` or a blank string means "use the generated plate".
    pub fn set_plate_override(&mut self, plate: Option<String>) {
        let plate = plate.filter(|p| !p.trim().is_empty());
        if self.plate_override != plate {
            self.plate_override = plate;
            self.fingerprint = None;
        }
    }

    pub fn file(&self) -> Option<&Path> { self.file.as_deref() }
    pub fn algorithm(&self) -> HashAlgorithm { self.algorithm }
    pub fn fingerprint(&self) -> Option<&Fingerprint> { self.fingerprint.as_ref() }

    // ── Actions ───────────────────────────────────────────────────────────────

    /// Hash the loaded file and derive its fingerprint.
    pub fn generate(&mut self) -> Result<&Fingerprint, SessionError> {
        let file = self.file.as_ref().ok_or(SessionError::NoFileLoaded)?;
        let fp = Fingerprint::from_file(file, self.algorithm, self.plate_override.as_deref())?;
        info!(
            file = %file.display(),
            algorithm = self.algorithm.name(),
            funny_hash = %fp.funny_hash,
            "fingerprint generated"
        );
        Ok(self.fingerprint.insert(fp))
    }

    /// Write an annotated copy of the loaded file.
    pub fn embed(&self, opts: &EmbedOptions) -> Result<EmbedOutcome, SessionError> {
        let file = self.file.as_ref().ok_or(SessionError::NoFileLoaded)?;
        let fp = self.fingerprint.as_ref().ok_or(SessionError::NotGenerated)?;
        if fp.plate_phrase.is_empty() {
            return Err(SessionError::EmptyPhrase);
        }
        let outcome = embed_file(file, &fp.funny_hash, &fp.plate_phrase, opts)?;
        info!(
            output = %outcome.output_path.display(),
            strategy = %outcome.strategy,
            "annotated copy written"
        );
        Ok(outcome)
    }

    /// Look for the current fingerprint in `target`, or in the loaded file
    /// when `target` is `None`.
    pub fn verify(&self, target: Option<&Path>) -> Result<VerifyReport, SessionError> {
        let file = self.file.as_deref().ok_or(SessionError::NoFileLoaded)?;
        let fp = self.fingerprint.as_ref().ok_or(SessionError::NotGenerated)?;
        let target = target.unwrap_or(file);
        verify_file(target, &fp.funny_hash, &fp.plate_phrase)
            .map_err(|e| SessionError::Read { path: target.to_owned(), source: e })
    }
}
