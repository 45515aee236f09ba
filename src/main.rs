use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use vericheck::config::Config;
use vericheck::db::{Database, HISTORY_PAGE_SIZE};
use vericheck::history::{record_batch, record_scan};
use vericheck::output::terminal;
use vericheck::scoring::wire::ScanRequest;
use vericheck::scoring::{evaluate, ContentType, RuleSet, ScoreInput};

/// VeriCheck: trust scoring for URLs, messages and job postings.
///
/// Scores content against a fixed, auditable rule table and explains
/// which rules fired.
#[derive(Parser)]
#[command(name = "vericheck", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Score a single piece of content
    Analyze {
        /// Content type: url, text or job
        #[arg(long = "type", short = 't', default_value = "text")]
        content_type: String,

        /// The content to score (read verbatim from stdin when omitted)
        content: Option<String>,

        /// Save the scan to this user's history
        #[arg(long)]
        email: Option<String>,

        /// Print the raw JSON result
        #[arg(long)]
        json: bool,
    },

    /// Score a JSON-lines file of {"type", "data"} records
    Batch {
        /// Input file, one JSON request per line
        file: PathBuf,

        /// Save every scan to this user's history, in file order
        #[arg(long)]
        email: Option<String>,
    },

    /// Show a user's most recent scans
    History {
        /// The user's email address
        #[arg(long)]
        email: String,

        /// Number of entries to show (max 10)
        #[arg(long, default_value = "10")]
        limit: u32,

        /// Print the raw JSON entries
        #[arg(long)]
        json: bool,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Print the active rule table
    Rules {
        /// Print the rule table as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show system status (DB stats, verdict counts, rule table size)
    Status,

    /// Run the HTTP API
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (default: VERICHECK_PORT or 5000)
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind (default: VERICHECK_BIND or 127.0.0.1)
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a user so scans can be attributed to them
    Add {
        #[arg(long)]
        email: String,

        #[arg(long)]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vericheck=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            info!("Initializing VeriCheck database...");
            let db = init_database(&config)?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nNext: register a user with");
            println!("  vericheck user add --email you@example.com --name \"Your Name\"");
        }

        Commands::Analyze {
            content_type,
            content,
            email,
            json,
        } => {
            let rules = config.load_rules()?;
            let content = match content {
                Some(c) => c,
                None => read_stdin()?,
            };
            let input = ScoreInput::new(ContentType::parse(&content_type), content);
            if let ContentType::Other(ref other) = input.content_type {
                warn!(content_type = %other, "Unrecognized content type, scoring as passthrough");
            }

            let result = evaluate(&input, &rules);

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                terminal::display_score(&input, &result);
            }

            // History is written only after the result is out; a storage
            // problem is reported but doesn't change the exit status.
            if let Some(email) = email {
                match open_database(&config) {
                    Ok(db) => {
                        if !record_scan(db.as_ref(), &email, &input, &result).await {
                            eprintln!("{}", format!("Scan not saved for {email}").dimmed());
                        }
                    }
                    Err(e) => warn!(error = %e, "History unavailable, scan not saved"),
                }
            }
        }

        Commands::Batch { file, email } => {
            let rules = config.load_rules()?;
            run_batch(&config, &rules, &file, email.as_deref()).await?;
        }

        Commands::History { email, limit, json } => {
            let db = open_database(&config)?;
            let entries = match db.find_user_by_email(&email).await? {
                Some(user) => db.fetch_history(user.id, limit.min(HISTORY_PAGE_SIZE)).await?,
                None => anyhow::bail!("No user registered with email {email}"),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                terminal::display_history(&email, &entries);
            }
        }

        Commands::User {
            command: UserCommands::Add { email, name },
        } => {
            let db = init_database(&config)?;
            let user = db.create_user(&name, &email).await?;
            println!(
                "{} Registered {} <{}> (id {})",
                "✓".green(),
                user.full_name,
                user.email,
                user.id
            );
        }

        Commands::Rules { json } => {
            let rules = config.load_rules()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rules)?);
            } else {
                terminal::display_rules(&rules, &rules_origin(&config));
            }
        }

        Commands::Status => {
            if !vericheck::status::is_initialized(&config.db_path) {
                vericheck::status::show_uninitialized(&config.db_path);
                return Ok(());
            }
            let db = open_database(&config)?;
            let rules = config.load_rules()?;
            vericheck::status::show(&db, &config.db_path, &rules, &rules_origin(&config)).await?;
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let rules = config.load_rules()?;
            info!(
                domains = rules.trusted_domains().len(),
                keywords = rules.suspicious_keywords().len(),
                origin = %rules_origin(&config),
                "Rule table loaded"
            );
            let rules = Arc::new(vericheck::scoring::SharedRules::new(rules));
            let db = init_database(&config)?;
            let port = port.unwrap_or(config.port);
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            vericheck::web::run_server(config, db, rules, port, &bind).await?;
        }
    }

    Ok(())
}

/// Score every line of a JSON-lines file, printing one result per line.
async fn run_batch(
    config: &Config,
    rules: &RuleSet,
    file: &Path,
    email: Option<&str>,
) -> Result<()> {
    let reader = BufReader::new(
        std::fs::File::open(file).with_context(|| format!("Failed to open {}", file.display()))?,
    );
    let lines: Vec<String> = reader
        .lines()
        .collect::<std::io::Result<_>>()
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let pb = ProgressBar::new(lines.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Scoring [{bar:30}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut scored = Vec::with_capacity(lines.len());
    let mut skipped = 0usize;
    for (n, line) in lines.iter().enumerate() {
        pb.inc(1);
        if line.trim().is_empty() {
            continue;
        }
        let request: ScanRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                warn!(line = n + 1, error = %e, "Skipping malformed line");
                skipped += 1;
                continue;
            }
        };
        let (input, _) = request.into_parts();
        let result = evaluate(&input, rules);
        pb.suspend(|| println!("{}", serde_json::to_string(&result).unwrap_or_default()));
        scored.push((input, result));
    }
    pb.finish_and_clear();

    info!(scored = scored.len(), skipped, "Batch complete");

    let Some(email) = email else {
        return Ok(());
    };

    let db = match open_database(config) {
        Ok(db) => db,
        Err(e) => {
            warn!(error = %e, "History unavailable, batch not saved");
            return Ok(());
        }
    };

    let saved = record_batch(db.as_ref(), email, &scored).await;

    eprintln!("Saved {saved}/{} scans for {email}", scored.len());
    Ok(())
}

fn read_stdin() -> Result<String> {
    read_content(std::io::stdin().lock())
}

/// Read content verbatim. Trailing newlines count toward the text length
/// like any other character.
fn read_content(mut reader: impl Read) -> Result<String> {
    let mut buf = String::new();
    reader
        .read_to_string(&mut buf)
        .context("Failed to read content from stdin")?;
    Ok(buf)
}

fn rules_origin(config: &Config) -> String {
    match config.rules_path {
        Some(ref path) => path.display().to_string(),
        None => "built-in".to_string(),
    }
}

/// Open the existing database.
#[cfg(feature = "sqlite")]
fn open_database(config: &Config) -> Result<Arc<dyn Database>> {
    vericheck::db::open_sqlite(&config.db_path)
}

/// Initialize the database (create if needed).
#[cfg(feature = "sqlite")]
fn init_database(config: &Config) -> Result<Arc<dyn Database>> {
    vericheck::db::initialize_sqlite(&config.db_path)
}

#[cfg(not(feature = "sqlite"))]
fn open_database(_config: &Config) -> Result<Arc<dyn Database>> {
    anyhow::bail!(
        "History storage is not compiled in.\n\
         Rebuild with: cargo build --features sqlite"
    )
}

#[cfg(not(feature = "sqlite"))]
fn init_database(config: &Config) -> Result<Arc<dyn Database>> {
    open_database(config)
}
