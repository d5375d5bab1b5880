use funnyhash::digest::{digest_bytes, digest_file, HashAlgorithm};
use funnyhash::embed::{embed_file, output_path, EmbedOptions, EmbedStrategy};
use funnyhash::fingerprint::Fingerprint;
use funnyhash::png::{self, ChecksumMode, CRC_PLACEHOLDER, IEND, IHDR, PNG_SIGNATURE, TEXT};
use funnyhash::session::{Session, SessionError};
use funnyhash::verify::{verify, verify_file};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const IHDR_DATA: [u8; 13] = [0, 0, 0, 1, 0, 0, 0, 1, 8, 2, 0, 0, 0];

/// Signature + IHDR + IEND, with real CRCs: 8 + 25 + 12 = 45 bytes.
fn minimal_png() -> Vec<u8> {
    let mut buf = PNG_SIGNATURE.to_vec();
    png::write_chunk(&mut buf, &IHDR, &IHDR_DATA, ChecksumMode::Crc32).unwrap();
    png::write_chunk(&mut buf, &IEND, &[], ChecksumMode::Crc32).unwrap();
    buf
}

fn write_file(dir: &TempDir, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, data).unwrap();
    path
}

#[test]
fn test_digest_file_matches_bytes() {
    let dir = TempDir::new().unwrap();
    let data = b"Digest engine determinism check";
    let path = write_file(&dir, "d.bin", data);

    for alg in HashAlgorithm::ALL {
        let a = digest_file(&path, alg).unwrap();
        let b = digest_file(&path, alg).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, digest_bytes(data, alg));
    }
}

#[test]
fn test_plain_embed_and_verify() {
    let dir = TempDir::new().unwrap();
    let src = write_file(&dir, "ten.bin", b"0123456789");
    let funny_hash = "ABC-123 | CAT-DOG-42";
    let phrase = "CAT-DOG";

    let outcome = embed_file(&src, funny_hash, phrase, &EmbedOptions::default()).unwrap();
    assert_eq!(outcome.strategy, EmbedStrategy::PlainText);
    assert_eq!(outcome.output_path, dir.path().join("ten.bin.funnycopy"));

    let out = fs::read(&outcome.output_path).unwrap();
    assert_eq!(
        out,
        b"0123456789\n<!-- FUNNY-HASH: ABC-123 | CAT-DOG-42 -->\n<!-- PLATE-PHRASE: CAT-DOG -->\n"
    );

    assert!(verify_file(&outcome.output_path, funny_hash, phrase).unwrap().is_verified());
    let original = verify_file(&src, funny_hash, phrase).unwrap();
    assert!(!original.is_verified());
    assert_eq!(fs::read(&src).unwrap(), b"0123456789");
}

#[test]
fn test_png_embed_exact_layout() {
    let dir = TempDir::new().unwrap();
    let source = minimal_png();
    let src = write_file(&dir, "tiny.png", &source);
    let funny_hash = "ABC-123 | CAT-DOG-42";

    let outcome = embed_file(&src, funny_hash, "CAT-DOG", &EmbedOptions::default()).unwrap();
    assert_eq!(outcome.strategy, EmbedStrategy::PngChunk);
    assert_eq!(outcome.output_path, dir.path().join("tiny.png.hashpng"));

    let out = fs::read(&outcome.output_path).unwrap();

    let mut text_data = vec![0u8];
    text_data.extend_from_slice(b"FunnyHash=");
    text_data.extend_from_slice(funny_hash.as_bytes());

    let mut expected = Vec::new();
    expected.extend_from_slice(&source[..8]);              // signature
    expected.extend_from_slice(&source[8..33]);            // IHDR, byte-identical
    expected.extend_from_slice(&(text_data.len() as u32).to_be_bytes());
    expected.extend_from_slice(b"tEXt");
    expected.extend_from_slice(&text_data);
    expected.extend_from_slice(&CRC_PLACEHOLDER);
    expected.extend_from_slice(&source[33..45]);           // IEND, byte-identical
    assert_eq!(out, expected);

    let kinds: Vec<[u8; 4]> = png::walk_chunks(&out).unwrap().iter().map(|c| c.kind).collect();
    assert_eq!(kinds, vec![IHDR, TEXT, IEND]);
    assert!(verify(&out, funny_hash));
}

#[test]
fn test_png_copy_verifies_funny_hash_only() {
    let dir = TempDir::new().unwrap();
    let src = write_file(&dir, "pic.png", &minimal_png());

    let mut session = Session::new();
    session.load(&src);
    session.generate().unwrap();
    let outcome = session.embed(&EmbedOptions::default()).unwrap();
    assert_eq!(EmbedStrategy::from_output_path(&outcome.output_path), Some(EmbedStrategy::PngChunk));

    let report = session.verify(Some(outcome.output_path.as_path())).unwrap();
    assert!(report.funny_hash);
    assert!(!report.plate_phrase);
    assert!(!report.is_verified());
    assert!(report.is_verified_for(outcome.strategy));

    let untouched = session.verify(None).unwrap();
    assert!(!untouched.is_verified_for(EmbedStrategy::PngChunk));
}

#[test]
fn test_png_named_only_by_extension() {
    let dir = TempDir::new().unwrap();
    let src = write_file(&dir, ".png", &minimal_png());
    let outcome = embed_file(&src, "FH", "PP", &EmbedOptions::default()).unwrap();
    assert_eq!(outcome.strategy, EmbedStrategy::PngChunk);
    assert_eq!(outcome.output_path, dir.path().join(".png.hashpng"));
}

#[test]
fn test_png_placeholder_crc_is_flagged_invalid() {
    let dir = TempDir::new().unwrap();
    let src = write_file(&dir, "crc.png", &minimal_png());

    let fake = embed_file(&src, "F", "P", &EmbedOptions::default()).unwrap();
    let chunks_fake = fs::read(&fake.output_path).unwrap();
    let injected = png::walk_chunks(&chunks_fake).unwrap()[1];
    assert!(!injected.crc_valid(), "placeholder CRC must not validate");

    let opts = EmbedOptions { checksum: ChecksumMode::Crc32, ..Default::default() };
    let real = embed_file(&src, "F", "P", &opts).unwrap();
    let chunks_real = fs::read(&real.output_path).unwrap();
    assert!(png::walk_chunks(&chunks_real).unwrap().iter().all(|c| c.crc_valid()));
}

#[test]
fn test_truncated_png_falls_back_to_plain_text() {
    let dir = TempDir::new().unwrap();
    let mut source = minimal_png();
    source.truncate(33);
    source.extend_from_slice(&1000u32.to_be_bytes());
    source.extend_from_slice(b"IDAT");
    source.extend_from_slice(&[0xAB; 6]);
    let src = write_file(&dir, "broken.PNG", &source);

    let outcome = embed_file(&src, "FH", "PP", &EmbedOptions::default()).unwrap();
    assert_eq!(outcome.strategy, EmbedStrategy::PlainText);
    assert_eq!(outcome.output_path, output_path(&src, EmbedStrategy::PlainText));
    assert!(!output_path(&src, EmbedStrategy::PngChunk).exists());

    let out = fs::read(&outcome.output_path).unwrap();
    assert!(out.starts_with(&source));
    assert_eq!(&out[source.len()..], b"\n<!-- FUNNY-HASH: FH -->\n<!-- PLATE-PHRASE: PP -->\n");
}

#[test]
fn test_png_signature_with_other_name_uses_plain_text() {
    let dir = TempDir::new().unwrap();
    let src = write_file(&dir, "image.dat", &minimal_png());
    let outcome = embed_file(&src, "FH", "PP", &EmbedOptions::default()).unwrap();
    assert_eq!(outcome.strategy, EmbedStrategy::PlainText);
}

#[test]
fn test_embed_missing_source_leaves_nothing() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("absent.txt");
    assert!(embed_file(&src, "FH", "PP", &EmbedOptions::default()).is_err());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_session_workflow() {
    let dir = TempDir::new().unwrap();
    let src = write_file(&dir, "notes.txt", b"session workflow contents");

    let mut session = Session::with_algorithm(HashAlgorithm::Md5);
    assert!(matches!(session.embed(&EmbedOptions::default()), Err(SessionError::NoFileLoaded)));

    session.load(&src);
    assert!(matches!(session.embed(&EmbedOptions::default()), Err(SessionError::NotGenerated)));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1, "refusal must not write");

    let fp = session.generate().unwrap().clone();
    assert_eq!(fp, Fingerprint::from_file(&src, HashAlgorithm::Md5, None).unwrap());

    let outcome = session.embed(&EmbedOptions::default()).unwrap();
    assert!(session.verify(Some(outcome.output_path.as_path())).unwrap().is_verified());
    assert!(!session.verify(None).unwrap().is_verified());

    session.set_algorithm(HashAlgorithm::Sha1);
    assert!(session.fingerprint().is_none());
}

#[test]
fn test_session_override_changes_phrase() {
    let dir = TempDir::new().unwrap();
    let src = write_file(&dir, "o.bin", b"override");

    let mut session = Session::new();
    session.load(&src);
    let generated = session.generate().unwrap().plate_phrase.clone();

    session.set_plate_override(Some("T3ST1NG".into()));
    assert!(session.fingerprint().is_none());
    let custom = session.generate().unwrap();
    assert_eq!(custom.plate_phrase, funnyhash::encode_plate_to_phrase("T3ST1NG"));
    assert_ne!(custom.plate_phrase, generated);
}

#[test]
fn test_session_rejects_empty_phrase() {
    let dir = TempDir::new().unwrap();
    let src = write_file(&dir, "e.bin", b"empty phrase");

    let mut session = Session::new();
    session.load(&src);
    session.set_plate_override(Some("?!#".into()));
    session.generate().unwrap();
    assert!(matches!(session.embed(&EmbedOptions::default()), Err(SessionError::EmptyPhrase)));
    assert!(!Path::new(&output_path(&src, EmbedStrategy::PlainText)).exists());
}
