//! Build automation tasks for KESTREL
//!
//! Run with: cargo xtask <command>

use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "KESTREL build automation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all tests
    Test,

    /// Run clippy lints
    Lint,

    /// Check formatting
    Fmt,

    /// Run all CI checks
    Ci,

    /// Run the BLAKE2b benchmarks
    Bench,

    /// Run a fuzz target (requires cargo-fuzz and a nightly toolchain)
    Fuzz {
        /// Target name
        #[arg(default_value = "fuzz_blake2b")]
        target: String,

        /// Seconds to run for
        #[arg(long, default_value_t = 60)]
        seconds: u64,
    },

    /// Generate documentation
    Doc,
}

const CLIPPY_ARGS: &[&str] = &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"];

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Test => {
            run_command("cargo", &["test", "--workspace"])?;
        }
        Commands::Lint => {
            run_command("cargo", CLIPPY_ARGS)?;
        }
        Commands::Fmt => {
            run_command("cargo", &["fmt", "--all", "--check"])?;
        }
        Commands::Ci => {
            println!("Running CI checks...");
            run_command("cargo", &["fmt", "--all", "--check"])?;
            run_command("cargo", CLIPPY_ARGS)?;
            run_command("cargo", &["test", "--workspace"])?;
            run_command("cargo", &["test", "--workspace", "--doc"])?;
            println!("All CI checks passed!");
        }
        Commands::Bench => {
            run_command("cargo", &["bench", "-p", "kestrel-blake2b"])?;
        }
        Commands::Fuzz { target, seconds } => {
            let max_time = format!("-max_total_time={seconds}");
            run_command(
                "cargo",
                &["+nightly", "fuzz", "run", "--fuzz-dir", "fuzz", &target, "--", &max_time],
            )?;
        }
        Commands::Doc => {
            run_command("cargo", &["doc", "--workspace", "--no-deps", "--open"])?;
        }
    }

    Ok(())
}

fn run_command(program: &str, args: &[&str]) -> anyhow::Result<()> {
    let status = Command::new(program).args(args).status()?;

    if !status.success() {
        anyhow::bail!("{} {:?} failed", program, args);
    }

    Ok(())
}
