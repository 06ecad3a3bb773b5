//! Koru offline tool
//!
//! Runs the analysis core and the local extractor without a server:
//!
//! ```text
//! koru analyze records.json     # JSON array of records → analysis
//! koru analyze -                # read the array from stdin
//! koru extract "slept 5h, headache"
//! ```

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use koru::extract::HeuristicExtractor;
use koru::journal::analyze_values;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "koru")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Health journal pattern engine (offline)")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a JSON array of structured records
    Analyze {
        /// Path to the JSON file, or `-` for stdin
        path: PathBuf,
        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Extract a structured record from free text with the local extractor
    Extract {
        /// Check-in text
        text: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "koru=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Analyze { path, compact } => {
            let input = read_input(&path)?;
            let value: Value = serde_json::from_str(&input)
                .with_context(|| format!("{} is not valid JSON", path.display()))?;

            let Value::Array(records) = value else {
                bail!("expected a JSON array of records");
            };

            let analysis = analyze_values(&records).context("invalid record")?;

            let output = if compact {
                serde_json::to_string(&analysis)?
            } else {
                serde_json::to_string_pretty(&analysis)?
            };
            println!("{}", output);
        }

        Command::Extract { text } => {
            let text = text.join(" ");
            if text.trim().is_empty() {
                bail!("nothing to extract: text is empty");
            }

            let record = HeuristicExtractor::new().extract_record(&text);
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("failed to read stdin")?;
        return Ok(input);
    }

    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
