//! Koru CLI
//!
//! Command-line client for the Koru API:
//! - Log check-ins and confirm drafts
//! - Browse the timeline
//! - Show patterns and predictions
//! - Import a CSV journal

use chrono::Local;
use clap::{Parser, Subcommand};
use koru::extract::HeuristicExtractor;
use koru::import::JournalCsvReader;
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "koru-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Health journal check-ins and pattern insights")]
#[command(long_about = "Kōru turns free-text health check-ins into structured records\nand finds what tends to come before your bad (and good) days.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8000", global = true)]
    pub api_url: String,

    /// User the entries belong to
    #[arg(short, long, default_value = "default-user", global = true)]
    pub user: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log a free-text check-in as a draft
    Checkin {
        /// What happened today
        text: Vec<String>,
        /// Entry date, YYYY-MM-DD (default: today)
        #[arg(short, long)]
        date: Option<String>,
        /// Chronic condition tag (e.g. diabetes)
        #[arg(long)]
        condition: Option<String>,
        /// Confirm the draft immediately
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Confirm a draft entry
    Confirm {
        /// Entry ID returned by `checkin`
        entry_id: String,
        /// Edited record as a JSON object
        #[arg(long)]
        data: String,
    },

    /// List confirmed entries
    Timeline {
        /// Month filter, YYYY-MM
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Show detected patterns, stats and predictions
    Patterns,

    /// Show system status
    Status,

    /// Import check-ins from a CSV file with `date` and `text` columns
    Import {
        /// Path to CSV file
        path: PathBuf,
        /// Only parse and extract locally; nothing is sent to the API
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Checkin {
            text,
            date,
            condition,
            yes,
        } => {
            let text = text.join(" ");
            if text.trim().is_empty() {
                eprintln!("Nothing to log: text is empty");
                std::process::exit(1);
            }

            let date = date.unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());

            let draft = post_draft(&client, &cli.api_url, &cli.user, &date, &text, condition).await?;
            let entry_id = draft_entry_id(&draft)?.to_string();

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&draft)?);
            } else {
                println!("Draft {} ({})", entry_id, date);
                print_record(&draft["extracted_data"]);
            }

            if yes {
                confirm(&client, &cli.api_url, &entry_id, &draft["extracted_data"]).await?;
                println!("Confirmed");
            } else if cli.format != "json" {
                println!();
                println!("Confirm with:");
                println!(
                    "  koru-cli confirm {} --data '{}'",
                    entry_id, draft["extracted_data"]
                );
            }
        }

        Commands::Confirm { entry_id, data } => {
            let record: Value = match serde_json::from_str(&data) {
                Ok(value) => value,
                Err(e) => {
                    eprintln!("--data is not valid JSON: {}", e);
                    std::process::exit(1);
                }
            };

            confirm(&client, &cli.api_url, &entry_id, &record).await?;
            println!("Confirmed {}", entry_id);
        }

        Commands::Timeline { month } => {
            let mut request = client.get(format!("{}/entries/{}", cli.api_url, cli.user));
            if let Some(month) = &month {
                request = request.query(&[("month", month)]);
            }

            let data = expect_success(request.send().await?, "Timeline request").await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                print_timeline(&data);
            }
        }

        Commands::Patterns => {
            let response = client
                .get(format!("{}/patterns/{}", cli.api_url, cli.user))
                .send()
                .await?;
            let data = expect_success(response, "Patterns request").await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                print_patterns(&data);
            }
        }

        Commands::Status => {
            let response = client.get(format!("{}/health", cli.api_url)).send().await;

            match response {
                Ok(resp) => {
                    let code = resp.status();
                    let health: Value = resp.json().await.unwrap_or(Value::Null);

                    println!("Koru v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!("API Status: {}", health["status"].as_str().unwrap_or("unknown"));

                    if let Some(services) = health["services"].as_object() {
                        println!();
                        println!("Services:");
                        for (name, status) in services {
                            println!("  {:<10} {}", name, status.as_str().unwrap_or("-"));
                        }
                    }

                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }

                    if !code.is_success() {
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("Cannot connect to Koru API at {}", cli.api_url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the Koru API server is running:");
                    eprintln!("  cargo run --bin koru-api");
                    std::process::exit(1);
                }
            }
        }

        Commands::Import { path, dry_run } => {
            if !path.exists() {
                eprintln!("File not found: {:?}", path);
                std::process::exit(1);
            }

            let result = JournalCsvReader::new().read_path(&path)?;

            println!("Read results:");
            println!("  Rows: {}", result.rows.len());
            println!("  Rows failed: {}", result.rows_failed);

            if !result.errors.is_empty() {
                println!();
                println!("Errors (first 10):");
                for error in result.errors.iter().take(10) {
                    println!("  {}", error);
                }
            }

            if dry_run {
                let extractor = HeuristicExtractor::new();
                println!();
                for row in &result.rows {
                    let record = extractor.extract_record(&row.text);
                    println!("{}  {}", row.date, serde_json::to_string(&record)?);
                }
                println!();
                println!("(Dry run - no data was imported)");
            } else if !result.rows.is_empty() {
                println!();
                println!("Importing check-ins...");

                let mut success = 0;
                let mut failed = 0;

                for row in result.rows {
                    let date = row.date.format("%Y-%m-%d").to_string();
                    let outcome = async {
                        let draft =
                            post_draft(&client, &cli.api_url, &cli.user, &date, &row.text, None).await?;
                        let entry_id = draft_entry_id(&draft)
                            .map_err(|e| format!("{} (row dated {})", e, date))?;
                        confirm(&client, &cli.api_url, entry_id, &draft["extracted_data"]).await
                    }
                    .await;

                    match outcome {
                        Ok(()) => success += 1,
                        Err(e) => {
                            eprintln!("  Line {}: {}", row.line, e);
                            failed += 1;
                        }
                    }
                }

                println!("  Imported: {}", success);
                if failed > 0 {
                    println!("  Failed: {}", failed);
                }
            }
        }

        Commands::Config { output } => {
            let config = koru::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

async fn post_draft(
    client: &reqwest::Client,
    api_url: &str,
    user: &str,
    date: &str,
    text: &str,
    condition: Option<String>,
) -> CliResult<Value> {
    let mut body = json!({
        "user_id": user,
        "text": text,
        "date": date,
    });
    if let Some(condition) = condition {
        body["condition"] = Value::String(condition);
    }

    let response = client
        .post(format!("{}/entries/draft", api_url))
        .json(&body)
        .send()
        .await?;

    expect_success(response, "Check-in").await
}

async fn confirm(
    client: &reqwest::Client,
    api_url: &str,
    entry_id: &str,
    record: &Value,
) -> CliResult<()> {
    let response = client
        .patch(format!("{}/entries/{}/confirm", api_url, entry_id))
        .json(&json!({ "extracted_data": record }))
        .send()
        .await?;

    expect_success(response, "Confirm").await.map(|_| ())
}

/// Id of a freshly created draft; a response without one is an error
fn draft_entry_id(draft: &Value) -> CliResult<&str> {
    match draft["entry_id"].as_str() {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err("draft response has no entry_id".into()),
    }
}

/// Parse a JSON body, or turn the API's error envelope into an error
async fn expect_success(response: reqwest::Response, what: &str) -> CliResult<Value> {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    if status.is_success() {
        return Ok(serde_json::from_str(&text).unwrap_or(Value::Null));
    }

    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(text);

    Err(format!("{} failed ({}): {}", what, status, message).into())
}

fn print_record(record: &Value) {
    let list = |key: &str| {
        record[key]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "-".to_string())
    };
    let field = |key: &str| match &record[key] {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    println!("  {:<12} {}", "Symptoms", list("symptoms"));
    println!("  {:<12} {}", "Sleep", field("sleep"));
    println!("  {:<12} {}", "Sleep hours", field("sleep_hours"));
    println!("  {:<12} {}", "Food", list("food"));
    println!("  {:<12} {}", "Stress", field("stress"));
    println!("  {:<12} {}", "Exercise", field("exercise"));
    println!("  {:<12} {}", "Mood", field("mood"));
}

fn print_timeline(data: &Value) {
    let entries = data["entries"].as_array().cloned().unwrap_or_default();

    if entries.is_empty() {
        println!("No confirmed entries yet.");
        println!();
        println!("Log your first check-in with:");
        println!("  koru-cli checkin \"slept 6h, mild headache\" --yes");
        return;
    }

    println!("{:<12} {:<8} {}", "Date", "Mood", "Tags");
    println!("{}", "-".repeat(60));

    for entry in entries {
        let tags = entry["tags"]
            .as_array()
            .map(|t| t.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(", "))
            .unwrap_or_default();

        println!(
            "{:<12} {:<8} {}",
            entry["date"].as_str().unwrap_or("-"),
            entry["mood"].as_str().unwrap_or("-"),
            tags
        );
    }
}

fn print_patterns(data: &Value) {
    if data["has_enough_data"] != Value::Bool(true) {
        println!("Not enough confirmed check-ins yet to find patterns.");
        return;
    }

    let patterns = data["patterns"].as_array().cloned().unwrap_or_default();
    if patterns.is_empty() {
        println!("No patterns found yet.");
    } else {
        println!("{:<20} {:<14} {:>6} {:>8}  {}", "Cause", "Effect", "Pct", "Count", "Strength");
        println!("{}", "-".repeat(64));
        for p in &patterns {
            println!(
                "{:<20} {:<14} {:>5}% {:>4}/{:<3}  {}",
                p["cause"].as_str().unwrap_or("-"),
                p["effect"].as_str().unwrap_or("-"),
                p["percentage"].as_u64().unwrap_or(0),
                p["occurrences"].as_u64().unwrap_or(0),
                p["total"].as_u64().unwrap_or(0),
                p["strength"].as_str().unwrap_or("-"),
            );
        }
    }

    let stats = &data["stats"];
    println!();
    println!("Entries analyzed: {}", stats["total_entries"].as_u64().unwrap_or(0));
    if let Some(avg) = stats["avg_sleep_hours"].as_f64() {
        println!("Average sleep: {:.1}h", avg);
    }
    println!("Exercise rate: {}%", stats["exercise_rate"].as_u64().unwrap_or(0));

    let predictions = data["predictions"].as_array().cloned().unwrap_or_default();
    if !predictions.is_empty() {
        println!();
        println!("Insights:");
        for p in predictions {
            println!(
                "  {} {}",
                p["icon"].as_str().unwrap_or("-"),
                p["text"].as_str().unwrap_or("")
            );
            if let Some(tip) = p["tip"].as_str() {
                println!("     {}", tip);
            }
        }
    }
}

fn format_duration(seconds: u64) -> String {
    let days = seconds / 86400;
    let hours = (seconds % 86400) / 3600;
    let minutes = (seconds % 3600) / 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}
