//! Command-line front end.
//!
//! Keys, sets and signatures live in plain files: set and universe files
//! are UTF-8 with one member per line, key and signature files carry one
//! line of base64-wrapped DER. A small-universe key file names the
//! universe file on its second line, and `keygen` echoes that path under
//! each key block so the two stay together.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::OsRng;
use rss::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::process::ExitCode;
use std::time::Instant;

type Bls12_381 = ark_bls12_381::Bls12_381;
type Derler = AccumulatorOnly<Bls12_381>;

#[derive(Parser)]
#[command(name = "rss", about = "Policy-based redactable set signatures", disable_version_flag = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a key pair (small needs a universe file)
    Keygen {
        scheme: Scheme,
        args: Vec<String>,
    },
    /// Sign a set: sign_key_file set_file [policy]
    Sign {
        scheme: Scheme,
        args: Vec<String>,
    },
    /// Redact a signature: ver_key_file set_file subset_file [policy] sig_file
    Redact {
        scheme: Scheme,
        args: Vec<String>,
    },
    /// Verify a signature: ver_key_file set_file sig_file
    Verify {
        scheme: Scheme,
        args: Vec<String>,
    },
    /// Run the sanity scenarios
    Test,
    /// Time keygen, sign, redact and verify on a fixed example
    Perf {
        scheme: Scheme,
    },
}

#[derive(ValueEnum, Clone, Copy, PartialEq, Eq)]
enum Scheme {
    Small,
    Large,
    Derler,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Keygen { scheme, args } => handle_keygen(scheme, &args),
        Command::Sign { scheme, args } => handle_sign(scheme, &args),
        Command::Redact { scheme, args } => handle_redact(scheme, &args),
        Command::Verify { scheme, args } => handle_verify(scheme, &args),
        Command::Test => handle_test(),
        Command::Perf { scheme } => handle_perf(scheme),
    }
}

fn check_arg_count(args: &[String], expected: usize) -> Result<(), String> {
    if args.len() < expected {
        Err("Too few arguments.".to_string())
    } else if args.len() > expected {
        Err("Too many arguments.".to_string())
    } else {
        Ok(())
    }
}

fn load_lines(path: &str, what: &str) -> Result<Vec<String>, String> {
    let contents =
        fs::read_to_string(path).map_err(|e| format!("{what} file: can't read {path}: {e}"))?;
    Ok(contents.lines().map(str::to_string).collect())
}

fn load_set(path: &str) -> Result<BTreeSet<String>, String> {
    Ok(load_lines(path, "Set")?.into_iter().collect())
}

fn load_universe(path: &str) -> Result<Universe, String> {
    Ok(Universe::from_members(load_lines(path, "Universe")?))
}

/// A key file holds the base64 DER body on line one and, for the small
/// universe scheme, the universe file path on line two.
fn load_key_file(path: &str) -> Result<(Vec<u8>, Option<String>), String> {
    let lines = load_lines(path, "Key")?;
    let body = lines
        .first()
        .ok_or_else(|| format!("Key file: {path} is empty"))?;
    let der = BASE64
        .decode(body.trim())
        .map_err(|e| format!("Key file: bad base64 in {path}: {e}"))?;
    Ok((der, lines.get(1).map(|l| l.trim().to_string())))
}

fn load_signature_file(path: &str) -> Result<Vec<u8>, String> {
    let lines = load_lines(path, "Signature")?;
    let body = lines
        .first()
        .ok_or_else(|| format!("Signature file: {path} is empty"))?;
    BASE64
        .decode(body.trim())
        .map_err(|e| format!("Signature file: bad base64 in {path}: {e}"))
}

fn universe_for(path: Option<&String>) -> Result<(Universe, String), String> {
    let path = path.ok_or("Missing universe.")?;
    Ok((load_universe(path)?, path.clone()))
}

fn print_key_blocks(ver_key: &[u8], sign_key: &[u8], universe_path: Option<&str>) {
    println!("=== Verification Key ===");
    println!("{}", BASE64.encode(ver_key));
    if let Some(path) = universe_path {
        println!("{path}");
    }
    println!("\t------------ 8< -----------");
    println!("=== Signing Key ===");
    println!("{}", BASE64.encode(sign_key));
    if let Some(path) = universe_path {
        println!("{path}");
    }
}

fn handle_keygen(scheme: Scheme, args: &[String]) -> Result<(), String> {
    let mut rng = OsRng;
    match scheme {
        Scheme::Small => {
            check_arg_count(args, 1)?;
            let universe = load_universe(&args[0])?;
            let (sk, vk) = SmallUniverse::key_gen(&mut rng, Some(&universe))
                .map_err(|e| format!("Key generation failed: {e:?}"))?;
            print_key_blocks(
                &vk.to_der().map_err(|e| format!("{e:?}"))?,
                &sk.to_der().map_err(|e| format!("{e:?}"))?,
                Some(args[0].as_str()),
            );
        }
        Scheme::Large => {
            check_arg_count(args, 0)?;
            let (sk, vk) = LargeUniverse::key_gen(&mut rng, None)
                .map_err(|e| format!("Key generation failed: {e:?}"))?;
            print_key_blocks(
                &vk.to_der().map_err(|e| format!("{e:?}"))?,
                &sk.to_der().map_err(|e| format!("{e:?}"))?,
                None,
            );
        }
        Scheme::Derler => {
            check_arg_count(args, 0)?;
            let (sk, vk) = Derler::key_gen(&mut rng, None)
                .map_err(|e| format!("Key generation failed: {e:?}"))?;
            print_key_blocks(
                &vk.to_der().map_err(|e| format!("{e:?}"))?,
                &sk.to_der().map_err(|e| format!("{e:?}"))?,
                None,
            );
        }
    }
    Ok(())
}

fn handle_sign(scheme: Scheme, args: &[String]) -> Result<(), String> {
    let mut rng = OsRng;
    check_arg_count(args, if scheme == Scheme::Derler { 2 } else { 3 })?;
    let (key_der, universe_path) = load_key_file(&args[0])?;
    let set = load_set(&args[1])?;

    let encoded = match scheme {
        Scheme::Small => {
            let (universe, _) = universe_for(universe_path.as_ref())?;
            let sk = SmallUniverseSigningKey::from_der(&key_der, universe)
                .map_err(|e| format!("Key file: {e:?}"))?;
            let sig = SmallUniverse::sign(&mut rng, &sk, &set, Some(args[2].as_str()))
                .map_err(|e| format!("RSS sign: {e:?}"))?;
            sig.to_der()
        }
        Scheme::Large => {
            let sk = LargeUniverseSigningKey::from_der(&key_der)
                .map_err(|e| format!("Key file: {e:?}"))?;
            let sig = LargeUniverse::sign(&mut rng, &sk, &set, Some(args[2].as_str()))
                .map_err(|e| format!("RSS sign: {e:?}"))?;
            sig.to_der()
        }
        Scheme::Derler => {
            let sk = AccumulatorOnlySigningKey::<Bls12_381>::from_der(&key_der)
                .map_err(|e| format!("Key file: {e:?}"))?;
            let sig = Derler::sign(&mut rng, &sk, &set, None)
                .map_err(|e| format!("RSS sign: {e:?}"))?;
            sig.to_der().map_err(|e| format!("RSS sign: {e:?}"))?
        }
    };
    println!("{}", BASE64.encode(encoded));
    Ok(())
}

fn handle_redact(scheme: Scheme, args: &[String]) -> Result<(), String> {
    check_arg_count(args, if scheme == Scheme::Derler { 4 } else { 5 })?;
    let (key_der, universe_path) = load_key_file(&args[0])?;
    let set = load_set(&args[1])?;
    let subset = load_set(&args[2])?;
    let sig_der = load_signature_file(if scheme == Scheme::Derler {
        &args[3]
    } else {
        &args[4]
    })?;

    let redacted = match scheme {
        Scheme::Small => {
            let (universe, _) = universe_for(universe_path.as_ref())?;
            let vk = SmallUniverseVerificationKey::from_der(&key_der, universe)
                .map_err(|e| format!("Key file: {e:?}"))?;
            let sig = SmallUniverseSignature::from_der(&sig_der)
                .map_err(|e| format!("Signature file: {e:?}"))?;
            SmallUniverse::redact(&vk, &set, &subset, &sig, Some(args[3].as_str()))
                .map_err(|e| format!("RSS redact: {e:?}"))?
                .map(|s| s.to_der())
        }
        Scheme::Large => {
            let vk = LargeUniverseVerificationKey::from_der(&key_der)
                .map_err(|e| format!("Key file: {e:?}"))?;
            let sig = LargeUniverseSignature::from_der(&sig_der)
                .map_err(|e| format!("Signature file: {e:?}"))?;
            LargeUniverse::redact(&vk, &set, &subset, &sig, Some(args[3].as_str()))
                .map_err(|e| format!("RSS redact: {e:?}"))?
                .map(|s| s.to_der())
        }
        Scheme::Derler => {
            let vk = AccumulatorOnlyVerificationKey::<Bls12_381>::from_der(&key_der)
                .map_err(|e| format!("Key file: {e:?}"))?;
            let sig = AccumulatorOnlySignature::<Bls12_381>::from_der(&sig_der)
                .map_err(|e| format!("Signature file: {e:?}"))?;
            match Derler::redact(&vk, &set, &subset, &sig, None)
                .map_err(|e| format!("RSS redact: {e:?}"))?
            {
                Some(s) => Some(s.to_der().map_err(|e| format!("RSS redact: {e:?}"))?),
                None => None,
            }
        }
    };

    match redacted {
        Some(der) => println!("{}", BASE64.encode(der)),
        None => println!("Redacted set is not valid."),
    }
    Ok(())
}

fn handle_verify(scheme: Scheme, args: &[String]) -> Result<(), String> {
    check_arg_count(args, 3)?;
    let (key_der, universe_path) = load_key_file(&args[0])?;
    let set = load_set(&args[1])?;
    let sig_der = load_signature_file(&args[2])?;

    let accepted = match scheme {
        Scheme::Small => {
            let (universe, _) = universe_for(universe_path.as_ref())?;
            let vk = SmallUniverseVerificationKey::from_der(&key_der, universe)
                .map_err(|e| format!("Key file: {e:?}"))?;
            let sig = SmallUniverseSignature::from_der(&sig_der)
                .map_err(|e| format!("Signature file: {e:?}"))?;
            SmallUniverse::verify(&vk, &sig, &set).map_err(|e| format!("RSS verify: {e:?}"))?
        }
        Scheme::Large => {
            let vk = LargeUniverseVerificationKey::from_der(&key_der)
                .map_err(|e| format!("Key file: {e:?}"))?;
            let sig = LargeUniverseSignature::from_der(&sig_der)
                .map_err(|e| format!("Signature file: {e:?}"))?;
            LargeUniverse::verify(&vk, &sig, &set).map_err(|e| format!("RSS verify: {e:?}"))?
        }
        Scheme::Derler => {
            let vk = AccumulatorOnlyVerificationKey::<Bls12_381>::from_der(&key_der)
                .map_err(|e| format!("Key file: {e:?}"))?;
            let sig = AccumulatorOnlySignature::<Bls12_381>::from_der(&sig_der)
                .map_err(|e| format!("Signature file: {e:?}"))?;
            Derler::verify(&vk, &sig, &set).map_err(|e| format!("RSS verify: {e:?}"))?
        }
    };

    if accepted {
        println!("\t=> \u{1b}[32mAccept.\u{1b}[0m");
    } else {
        println!("\t=> \u{1b}[31mReject.\u{1b}[0m");
    }
    Ok(())
}

/// Reduced RSA prime size so the sanity and perf runs finish quickly
const FAST_PRIME_BITS: u64 = 512;

fn sample_set() -> BTreeSet<String> {
    ["hello", "good", "fun", "dog", "cat"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn sample_subset() -> BTreeSet<String> {
    ["hello", "good"].iter().map(|m| m.to_string()).collect()
}

fn report(name: &str, passed: bool) {
    if passed {
        println!("{name}: \u{1b}[32mpassed\u{1b}[0m");
    } else {
        println!("{name}: \u{1b}[31mFAILED\u{1b}[0m");
    }
}

fn handle_test() -> Result<(), String> {
    let mut rng = OsRng;
    let set = sample_set();
    let subset = sample_subset();

    // Large universe
    {
        let (sk, vk) = LargeUniverse::key_gen_with_prime_bits(&mut rng, FAST_PRIME_BITS);
        let policy = "(hello and good) or (fun and dog and cat)";
        let sig = LargeUniverse::sign(&mut rng, &sk, &set, Some(policy))
            .map_err(|e| format!("large-universe sign: {e:?}"))?;
        let verified = LargeUniverse::verify(&vk, &sig, &set)
            .map_err(|e| format!("large-universe verify: {e:?}"))?;
        report("large-universe sign/verify", verified);

        let redacted = LargeUniverse::redact(&vk, &set, &subset, &sig, Some("hello and good"))
            .map_err(|e| format!("large-universe redact: {e:?}"))?;
        let verified = match &redacted {
            Some(sig) => LargeUniverse::verify(&vk, sig, &subset)
                .map_err(|e| format!("large-universe verify: {e:?}"))?,
            None => false,
        };
        report("large-universe redact/verify", verified);

        let round_trip = LargeUniverseSignature::from_der(&sig.to_der())
            .map(|decoded| decoded == sig)
            .unwrap_or(false);
        report("large-universe DER round trip", round_trip);
    }

    // Small universe
    {
        let universe = Universe::from_members(sample_set());
        let (sk, vk) = SmallUniverse::key_gen_with_prime_bits(&mut rng, &universe, FAST_PRIME_BITS);
        let current = universe.characteristic_sequence(&set).unwrap();
        let target = universe.characteristic_sequence(&subset).unwrap();
        let policy = format!("{current}, {target}");

        let sig = SmallUniverse::sign(&mut rng, &sk, &set, Some(policy.as_str()))
            .map_err(|e| format!("small-universe sign: {e:?}"))?;
        let verified = SmallUniverse::verify(&vk, &sig, &set)
            .map_err(|e| format!("small-universe verify: {e:?}"))?;
        report("small-universe sign/verify", verified);

        let redacted = SmallUniverse::redact(&vk, &set, &subset, &sig, Some(target.as_str()))
            .map_err(|e| format!("small-universe redact: {e:?}"))?;
        let verified = match &redacted {
            Some(sig) => SmallUniverse::verify(&vk, sig, &subset)
                .map_err(|e| format!("small-universe verify: {e:?}"))?,
            None => false,
        };
        report("small-universe redact/verify", verified);
    }

    // Accumulator only
    {
        let (sk, vk) =
            Derler::key_gen(&mut rng, None).map_err(|e| format!("derler keygen: {e:?}"))?;
        let sig = Derler::sign(&mut rng, &sk, &set, None)
            .map_err(|e| format!("derler sign: {e:?}"))?;
        let verified =
            Derler::verify(&vk, &sig, &set).map_err(|e| format!("derler verify: {e:?}"))?;
        report("derler sign/verify", verified);

        let redacted = Derler::redact(&vk, &set, &subset, &sig, None)
            .map_err(|e| format!("derler redact: {e:?}"))?;
        let verified = match &redacted {
            Some(sig) => {
                Derler::verify(&vk, sig, &subset).map_err(|e| format!("derler verify: {e:?}"))?
            }
            None => false,
        };
        report("derler redact/verify", verified);
    }

    Ok(())
}

fn handle_perf(scheme: Scheme) -> Result<(), String> {
    let mut rng = OsRng;
    let set = sample_set();
    let subset = sample_subset();

    match scheme {
        Scheme::Large => {
            let start = Instant::now();
            let (sk, vk) = LargeUniverse::key_gen_with_prime_bits(&mut rng, FAST_PRIME_BITS);
            println!("keygen: {:?}", start.elapsed());

            let start = Instant::now();
            let sig = LargeUniverse::sign(
                &mut rng,
                &sk,
                &set,
                Some("(hello and good) or (fun and dog and cat)"),
            )
            .map_err(|e| format!("{e:?}"))?;
            println!("sign:   {:?}", start.elapsed());

            let start = Instant::now();
            let redacted = LargeUniverse::redact(&vk, &set, &subset, &sig, Some("hello and good"))
                .map_err(|e| format!("{e:?}"))?
                .ok_or("redaction unexpectedly refused")?;
            println!("redact: {:?}", start.elapsed());

            let start = Instant::now();
            LargeUniverse::verify(&vk, &redacted, &subset).map_err(|e| format!("{e:?}"))?;
            println!("verify: {:?}", start.elapsed());
        }
        Scheme::Small => {
            let universe = Universe::from_members(sample_set());
            let current = universe.characteristic_sequence(&set).unwrap();
            let target = universe.characteristic_sequence(&subset).unwrap();

            let start = Instant::now();
            let (sk, vk) =
                SmallUniverse::key_gen_with_prime_bits(&mut rng, &universe, FAST_PRIME_BITS);
            println!("keygen: {:?}", start.elapsed());

            let start = Instant::now();
            let sig =
                SmallUniverse::sign(&mut rng, &sk, &set, Some(format!("{current}, {target}").as_str()))
                    .map_err(|e| format!("{e:?}"))?;
            println!("sign:   {:?}", start.elapsed());

            let start = Instant::now();
            let redacted = SmallUniverse::redact(&vk, &set, &subset, &sig, Some(target.as_str()))
                .map_err(|e| format!("{e:?}"))?
                .ok_or("redaction unexpectedly refused")?;
            println!("redact: {:?}", start.elapsed());

            let start = Instant::now();
            SmallUniverse::verify(&vk, &redacted, &subset).map_err(|e| format!("{e:?}"))?;
            println!("verify: {:?}", start.elapsed());
        }
        Scheme::Derler => {
            let start = Instant::now();
            let (sk, vk) = Derler::key_gen(&mut rng, None).map_err(|e| format!("{e:?}"))?;
            println!("keygen: {:?}", start.elapsed());

            let start = Instant::now();
            let sig = Derler::sign(&mut rng, &sk, &set, None).map_err(|e| format!("{e:?}"))?;
            println!("sign:   {:?}", start.elapsed());

            let start = Instant::now();
            let redacted = Derler::redact(&vk, &set, &subset, &sig, None)
                .map_err(|e| format!("{e:?}"))?
                .ok_or("redaction unexpectedly refused")?;
            println!("redact: {:?}", start.elapsed());

            let start = Instant::now();
            Derler::verify(&vk, &redacted, &subset).map_err(|e| format!("{e:?}"))?;
            println!("verify: {:?}", start.elapsed());
        }
    }
    Ok(())
}
