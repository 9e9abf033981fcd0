//! KESTREL CLI
//!
//! `b2sum`-style BLAKE2b checksums with keyed, salted and personalized modes.

mod checksum;
mod config;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use kestrel_blake2b::hash::HEADER_SIZE;
use kestrel_blake2b::io::hash_reader_buffered;
use kestrel_blake2b::{Digest, HashConfig, Params, hash_block_header};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

use config::Config;

/// kb2sum - BLAKE2b checksums
#[derive(Parser)]
#[command(name = "kb2sum")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Hash parameters shared by `sum` and `check`
#[derive(Args, Debug, Default)]
struct HashArgs {
    /// Digest length in bytes (1-64)
    #[arg(short, long)]
    length: Option<usize>,

    /// File whose raw contents (up to 64 bytes) are the MAC key
    #[arg(long)]
    key_file: Option<PathBuf>,

    /// Salt as hex (up to 16 bytes)
    #[arg(long)]
    salt: Option<String>,

    /// Personalization as hex (up to 16 bytes)
    #[arg(long)]
    personal: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print checksums of files (stdin when none are given or for `-`)
    Sum {
        /// Files to hash
        files: Vec<PathBuf>,

        #[command(flatten)]
        hash: HashArgs,
    },

    /// Verify checksums listed in a file
    Check {
        /// Checksum list produced by `sum`
        #[arg(required = true)]
        list: PathBuf,

        #[command(flatten)]
        hash: HashArgs,
    },

    /// Hash an 80-byte block header given as 160 hex digits
    Header {
        /// Header bytes as hex
        #[arg(required = true)]
        hex: String,
    },

    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    run(Cli::parse())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    // `init-config` and `header` never read the config file, so a broken
    // file cannot stop them
    match cli.command {
        Commands::InitConfig { force } => {
            init_logging(cli.verbose, &Config::default());
            init_config(&config_path, force)
        }
        Commands::Header { hex } => {
            init_logging(cli.verbose, &Config::default());
            hash_header(&hex)
        }
        Commands::Sum { files, hash } => {
            let config = load_config(cli.config.as_deref(), &config_path, cli.verbose)?;
            sum_files(&files, &hash, &config)
        }
        Commands::Check { list, hash } => {
            let config = load_config(cli.config.as_deref(), &config_path, cli.verbose)?;
            check_files(&list, &hash, &config)
        }
    }
}

/// Load and validate configuration, initializing logging in between
///
/// An explicit `--config` file must exist; the default path falls back to
/// built-in defaults.
fn load_config(explicit: Option<&Path>, path: &Path, verbose: bool) -> anyhow::Result<Config> {
    let config = if explicit.is_some() {
        Config::load(path).with_context(|| format!("loading config {}", path.display()))?
    } else {
        Config::load_or_default()?
    };

    init_logging(verbose, &config);
    config.validate()?;

    Ok(config)
}

fn init_logging(verbose: bool, config: &Config) {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };

    // A subscriber may already be installed when commands run in-process
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(io::stderr)
        .try_init();
}

/// Merge command-line overrides with configured defaults
fn build_params(args: &HashArgs, config: &Config) -> anyhow::Result<Params> {
    let salt = match &args.salt {
        Some(hex_str) => hex::decode(hex_str).context("decoding --salt")?,
        None => config.salt_bytes()?,
    };
    let personal = match &args.personal {
        Some(hex_str) => hex::decode(hex_str).context("decoding --personal")?,
        None => config.personal_bytes()?,
    };

    let mut params = Params::new()
        .digest_length(args.length.unwrap_or(config.hash.digest_length))
        .salt(&salt)
        .personal(&personal);

    if let Some(path) = &args.key_file {
        let key = Zeroizing::new(
            std::fs::read(path).with_context(|| format!("reading key {}", path.display()))?,
        );
        params = params.key(&key);
    }

    Ok(params)
}

fn open_input(name: &str) -> anyhow::Result<Box<dyn Read>> {
    if name == "-" {
        Ok(Box::new(io::stdin().lock()))
    } else {
        let file = File::open(name).with_context(|| format!("opening {name}"))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

fn digest_input(name: &str, hash_config: &HashConfig, config: &Config) -> anyhow::Result<Digest> {
    let reader = open_input(name)?;
    let digest = hash_reader_buffered(hash_config, reader, config.io.read_buffer_size)
        .with_context(|| format!("hashing {name}"))?;
    tracing::debug!("Hashed {} ({} bytes out)", name, digest.len());
    Ok(digest)
}

/// Print a checksum line for each input
fn sum_files(files: &[PathBuf], args: &HashArgs, config: &Config) -> anyhow::Result<()> {
    let hash_config = build_params(args, config)?.build()?;

    let names: Vec<String> = if files.is_empty() {
        vec!["-".to_string()]
    } else {
        files.iter().map(|f| f.display().to_string()).collect()
    };

    for name in &names {
        let digest = digest_input(name, &hash_config, config)?;
        println!("{}", checksum::format_line(&digest, name));
    }

    Ok(())
}

/// Verify every line of a checksum list
fn check_files(list: &Path, args: &HashArgs, config: &Config) -> anyhow::Result<()> {
    let file = File::open(list).with_context(|| format!("opening {}", list.display()))?;
    let params = build_params(args, config)?;

    let mut failed = 0usize;
    let mut checked = 0usize;

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let entry = match checksum::parse_line(&line) {
            Ok(Some(entry)) => entry,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!("{}:{}: {}", list.display(), index + 1, e);
                failed += 1;
                continue;
            }
        };

        // Digest length follows the listed checksum
        let hash_config = params.clone().digest_length(entry.expected.len()).build()?;
        checked += 1;

        match digest_input(entry.name, &hash_config, config) {
            Ok(digest) if digest.verify(&entry.expected) => println!("{}: OK", entry.name),
            Ok(_) => {
                println!("{}: FAILED", entry.name);
                failed += 1;
            }
            Err(e) => {
                println!("{}: FAILED open or read", entry.name);
                tracing::warn!("{:#}", e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} listed checksums did NOT match", failed, checked);
    }

    tracing::info!("{} checksums verified", checked);
    Ok(())
}

/// Hash a hex-encoded 80-byte block header
fn hash_header(hex_str: &str) -> anyhow::Result<()> {
    let bytes = hex::decode(hex_str.trim()).context("decoding header hex")?;
    let header: [u8; HEADER_SIZE] = bytes.as_slice().try_into().map_err(|_| {
        anyhow::anyhow!("header must be {} bytes, got {}", HEADER_SIZE, bytes.len())
    })?;

    println!("{}", hex::encode(hash_block_header(&header)));
    Ok(())
}

/// Write the default configuration
fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    Config::default().save(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = Config::default();
        config.hash.digest_length = 20;
        config.hash.salt = Some(hex::encode(b"from-config"));

        let args = HashArgs {
            length: Some(32),
            salt: Some(hex::encode(b"from-cli")),
            ..HashArgs::default()
        };

        let built = build_params(&args, &config).unwrap().build().unwrap();
        assert_eq!(built.digest_length(), 32);
        assert_eq!(&built.parameter_block().salt()[..8], b"from-cli");
    }

    #[test]
    fn test_config_defaults_apply() {
        let mut config = Config::default();
        config.hash.digest_length = 20;
        config.hash.personal = Some(hex::encode(b"cfg"));

        let built = build_params(&HashArgs::default(), &config)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(built.digest_length(), 20);
        assert_eq!(&built.parameter_block().personal()[..3], b"cfg");
    }

    #[test]
    fn test_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let key_path = dir.path().join("key");
        std::fs::write(&key_path, [0x42u8; 32]).unwrap();

        let args = HashArgs {
            key_file: Some(key_path),
            ..HashArgs::default()
        };
        let built = build_params(&args, &Config::default())
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(built.parameter_block().key_length(), 32);
        assert_eq!(
            built.hash(b""),
            kestrel_blake2b::hash(b"", &[0x42; 32], 64, b"", b"").unwrap()
        );
    }

    #[test]
    fn test_check_files_detects_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let data_path = dir.path().join("data.bin");
        std::fs::write(&data_path, b"checked content").unwrap();
        let name = data_path.display().to_string();

        let good = kestrel_blake2b::hash(b"checked content", b"", 32, b"", b"").unwrap();
        let list_path = dir.path().join("sums");
        std::fs::write(&list_path, format!("{}\n", checksum::format_line(&good, &name))).unwrap();

        let config = Config::default();
        assert!(check_files(&list_path, &HashArgs::default(), &config).is_ok());

        std::fs::write(&data_path, b"tampered content").unwrap();
        assert!(check_files(&list_path, &HashArgs::default(), &config).is_err());
    }

    #[test]
    fn test_header_length_checked() {
        assert!(hash_header(&"00".repeat(HEADER_SIZE)).is_ok());
        assert!(hash_header(&"00".repeat(HEADER_SIZE - 1)).is_err());
        assert!(hash_header("not hex").is_err());
    }

    fn run_args(args: &[&str]) -> anyhow::Result<()> {
        let mut argv = vec!["kb2sum"];
        argv.extend_from_slice(args);
        run(Cli::try_parse_from(argv)?)
    }

    #[test]
    fn test_init_config_force_replaces_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid toml").unwrap();
        let path_str = path.to_str().unwrap();

        assert!(Config::load(&path).is_err());
        assert!(run_args(&["--config", path_str, "init-config"]).is_err());

        run_args(&["--config", path_str, "init-config", "--force"]).unwrap();

        let repaired = Config::load(&path).unwrap();
        assert!(repaired.validate().is_ok());
        assert_eq!(repaired.hash.digest_length, 64);
    }

    #[test]
    fn test_init_config_force_replaces_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, format!("[hash]\nsalt = \"{}\"\n", "00".repeat(17))).unwrap();
        let path_str = path.to_str().unwrap();

        assert!(Config::load(&path).unwrap().validate().is_err());

        // Hashing still refuses the invalid salt
        let data_path = dir.path().join("data.bin");
        std::fs::write(&data_path, b"data").unwrap();
        assert!(run_args(&["--config", path_str, "sum", data_path.to_str().unwrap()]).is_err());

        run_args(&["--config", path_str, "init-config", "--force"]).unwrap();

        let repaired = Config::load(&path).unwrap();
        assert!(repaired.validate().is_ok());
        assert!(repaired.hash.salt.is_none());
    }

    #[test]
    fn test_header_ignores_broken_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid toml").unwrap();

        let header = "00".repeat(HEADER_SIZE);
        assert!(run_args(&["--config", path.to_str().unwrap(), "header", &header]).is_ok());
    }

    #[test]
    fn test_init_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        assert!(init_config(&path, false).is_ok());
        assert!(init_config(&path, false).is_err());
        assert!(init_config(&path, true).is_ok());
        assert!(Config::load(&path).is_ok());
    }
}
