use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(author, version, about = "treesift automation commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the test suite with cargo nextest, then doctests
    Test {
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        release: bool,
    },
    /// Check formatting and run clippy with warnings denied
    Lint,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Test { profile, release } => run_tests(profile, release)?,
        Commands::Lint => run_lint()?,
    }
    Ok(())
}

fn run_tests(profile: Option<String>, release: bool) -> Result<()> {
    let mut nextest = cargo(&["nextest", "run", "--workspace"]);
    if let Some(profile) = profile {
        nextest.arg("--profile").arg(profile);
    }
    if release {
        nextest.arg("--release");
    }
    run("cargo nextest run", nextest)?;
    // nextest does not run doctests
    run("cargo test --doc", cargo(&["test", "--doc", "--workspace"]))
}

fn run_lint() -> Result<()> {
    run("cargo fmt --check", cargo(&["fmt", "--all", "--check"]))?;
    run(
        "cargo clippy",
        cargo(&[
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ]),
    )
}

fn cargo(args: &[&str]) -> Command {
    let mut cmd = Command::new(std::env::var("CARGO").unwrap_or_else(|_| "cargo".into()));
    cmd.args(args);
    cmd
}

fn run(label: &str, mut cmd: Command) -> Result<()> {
    let status = cmd
        .status()
        .with_context(|| format!("failed to spawn {label}"))?;
    if !status.success() {
        anyhow::bail!("{label} failed");
    }
    Ok(())
}
