use clap::{Parser, Subcommand};
use funnyhash::digest::{digest_file, HashAlgorithm};
use funnyhash::embed::{EmbedOptions, EmbedStrategy};
use funnyhash::fingerprint::Fingerprint;
use funnyhash::plate::{decode_phrase_to_plate, encode_plate_to_phrase};
use funnyhash::png::{self, ChecksumMode, ChunkWalker};
use funnyhash::session::Session;
use funnyhash::verify::verify_file;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "funnyhash", about = "Memorable file fingerprints, embedded into file copies")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the raw digest of a file
    Hash {
        input: PathBuf,
        /// Algorithm: md5, sha1, sha256 (default), blake3
        #[arg(short, long, default_value = "sha256")]
        algorithm: String,
    },
    /// Derive the plate, word hash and plate phrase of a file
    Generate {
        input: PathBuf,
        #[arg(short, long, default_value = "sha256")]
        algorithm: String,
        /// Custom plate string to build the phrase from (e.g. T3ST1NG)
        #[arg(short, long)]
        plate: Option<String>,
        /// Print the fingerprint as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write <input>.funnycopy or <input>.hashpng with the fingerprint inside
    Embed {
        input: PathBuf,
        #[arg(short, long, default_value = "sha256")]
        algorithm: String,
        #[arg(short, long)]
        plate: Option<String>,
        /// Write a real CRC-32 into the injected PNG chunk
        #[arg(long)]
        crc: bool,
        /// Always use plain-text embedding
        #[arg(long)]
        plain: bool,
    },
    /// Check whether a file contains a fingerprint
    ///
    /// A .hashpng copy only carries the funny hash; its plate phrase is
    /// reported as "not embedded" and does not fail the check.
    Verify {
        input: PathBuf,
        /// Regenerate the expected text from this source file
        #[arg(short, long, conflicts_with_all = ["funny_hash", "phrase"])]
        source: Option<PathBuf>,
        #[arg(short, long, default_value = "sha256")]
        algorithm: String,
        #[arg(short, long)]
        plate: Option<String>,
        #[arg(long)]
        funny_hash: Option<String>,
        #[arg(long)]
        phrase: Option<String>,
    },
    /// Encode a plate-like string as a word phrase
    Encode {
        plate: String,
    },
    /// Best-effort decode of a word phrase back to plate symbols
    Decode {
        phrase: String,
    },
    /// List the chunks of a PNG file
    Chunks {
        input: PathBuf,
    },
    /// List supported hash algorithms
    Algorithms,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {

        // ── Hash ─────────────────────────────────────────────────────────────
        Commands::Hash { input, algorithm } => {
            let alg = parse_algorithm(&algorithm)?;
            let digest = digest_file(&input, alg)?;
            println!("{}  {}  ({})", digest.to_hex(), input.display(), alg);
        }

        // ── Generate ─────────────────────────────────────────────────────────
        Commands::Generate { input, algorithm, plate, json } => {
            let mut session = Session::with_algorithm(parse_algorithm(&algorithm)?);
            session.load(input);
            session.set_plate_override(plate);
            let fp = session.generate()?;
            if json {
                println!("{}", serde_json::to_string_pretty(fp)?);
            } else {
                print_fingerprint(fp);
            }
        }

        // ── Embed ────────────────────────────────────────────────────────────
        Commands::Embed { input, algorithm, plate, crc, plain } => {
            let mut session = Session::with_algorithm(parse_algorithm(&algorithm)?);
            session.load(input);
            session.set_plate_override(plate);
            print_fingerprint(session.generate()?);

            let opts = EmbedOptions {
                checksum:   if crc { ChecksumMode::Crc32 } else { ChecksumMode::Placeholder },
                plain_only: plain,
            };
            let outcome = session.embed(&opts)?;
            println!("Embedded ({}): {}", outcome.strategy, outcome.output_path.display());
        }

        // ── Verify ───────────────────────────────────────────────────────────
        Commands::Verify { input, source, algorithm, plate, funny_hash, phrase } => {
            let report = match source {
                Some(src) => {
                    let mut session = Session::with_algorithm(parse_algorithm(&algorithm)?);
                    session.load(src);
                    session.set_plate_override(plate);
                    session.generate()?;
                    session.verify(Some(input.as_path()))?
                }
                None => {
                    let (Some(fh), Some(ph)) = (funny_hash, phrase) else {
                        return Err("pass --source, or both --funny-hash and --phrase".into());
                    };
                    verify_file(&input, &fh, &ph)?
                }
            };
            let strategy = EmbedStrategy::from_output_path(&input).unwrap_or(EmbedStrategy::PlainText);
            println!("  Funny hash    {}", found(report.funny_hash));
            if strategy.carries_phrase() || report.plate_phrase {
                println!("  Plate phrase  {}", found(report.plate_phrase));
            } else {
                println!("  Plate phrase  not embedded (.hashpng carries the funny hash only)");
            }
            let verified = report.is_verified_for(strategy);
            println!("{}", if verified { "Data FOUND inside file" } else { "Data NOT found" });
            if !verified {
                std::process::exit(1);
            }
        }

        // ── Encode / Decode ──────────────────────────────────────────────────
        Commands::Encode { plate } => {
            println!("{}", encode_plate_to_phrase(&plate));
        }

        Commands::Decode { phrase } => {
            let decoded = decode_phrase_to_plate(&phrase);
            println!("{}", decoded.plate);
            if !decoded.is_complete() {
                eprintln!("Dropped unknown words: {}", decoded.dropped.join(", "));
            }
        }

        // ── Chunks ───────────────────────────────────────────────────────────
        Commands::Chunks { input } => {
            let data = std::fs::read(&input)?;
            println!("PNG: {}", input.display());
            println!("{:>10} {:<6} {:>10}  CRC", "Offset", "Type", "Length");
            let mut walker = ChunkWalker::new(&data)?;
            for chunk in walker.by_ref() {
                let chunk = chunk?;
                println!("{:>10} {:<6} {:>10}  {}{}",
                    chunk.offset, chunk.kind_str(), chunk.data.len(),
                    hex::encode(chunk.crc),
                    if chunk.crc_valid() { "" } else { " (invalid)" });
            }
            let trailing = data.len() - walker.position();
            if trailing > 0 {
                println!("{trailing} trailing byte(s) after IEND");
            }
            if let Some(fh) = png::read_funny_hash(&data) {
                println!("FunnyHash: {fh}");
            }
        }

        // ── Algorithms ───────────────────────────────────────────────────────
        Commands::Algorithms => {
            for alg in HashAlgorithm::ALL {
                println!("{:<8} {:>3} bytes", alg.name(), alg.digest_len());
            }
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn parse_algorithm(s: &str) -> Result<HashAlgorithm, String> {
    HashAlgorithm::from_name(s).ok_or_else(|| {
        format!("Unknown algorithm '{s}' (expected md5, sha1, sha256 or blake3)")
    })
}

fn print_fingerprint(fp: &Fingerprint) {
    println!("── Fingerprint ({}) ──────────────────────────────", fp.algorithm);
    println!("  Digest        {}", fp.digest_hex);
    println!("  Funny hash    {}", fp.funny_hash);
    println!("  Plate phrase  {}", fp.plate_phrase);
}

fn found(present: bool) -> &'static str {
    if present { "found" } else { "missing" }
}
