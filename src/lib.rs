pub mod digest;
pub mod wordlist;
pub mod plate;
pub mod fingerprint;
pub mod png;
pub mod embed;
pub mod verify;
pub mod session;

pub use digest::{Digest, HashAlgorithm, digest_bytes, digest_file, digest_reader};
pub use plate::{Plate, WordHash, DecodedPlate, make_plate, make_word_hash, encode_plate_to_phrase, decode_phrase_to_plate};
pub use fingerprint::Fingerprint;
pub use png::ChecksumMode;
pub use embed::{EmbedOptions, EmbedStrategy, embed, embed_file};
pub use verify::{VerifyReport, verify};
pub use session::Session;
