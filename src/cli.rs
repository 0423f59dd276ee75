//! CLI interface for replay-learnings

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use crate::config::{Config, StoreAdapter};
use crate::gateway;
use crate::hooks::HookInput;
use crate::replay::{KeywordExtractor, QueryBuilder, ReplayEngine, ReplayOutcome, ResultFormatter};

#[derive(Parser)]
#[command(name = "replay-learnings")]
#[command(about = "Surface stored learnings relevant to a prompt", long_about = None)]
#[command(version)]
struct Cli {
    /// Learnings database (defaults to ~/.pro-workflow/data.db)
    #[arg(long, global = true, env = "PRO_WORKFLOW_DB")]
    db: Option<PathBuf>,

    /// How to query the store
    #[arg(long, global = true, value_enum)]
    adapter: Option<StoreAdapter>,

    /// Lookup timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a hook payload on stdin and print matching learnings to stderr (default)
    Hook,
    /// Show the keywords and match expression extracted from a prompt
    Keywords {
        /// Prompt text
        prompt: String,
    },
    /// Search the store for a prompt and print the advisory to stdout
    Search {
        /// Prompt text
        prompt: String,
    },
    /// Print the effective configuration
    Config,
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Hook) => {
            run_hook(&cli).await;
            Ok(())
        }
        Some(Commands::Keywords { ref prompt }) => show_keywords(prompt),
        Some(Commands::Search { ref prompt }) => {
            let config = load_config(&cli)?;
            search(&config, prompt).await
        }
        Some(Commands::Config) => {
            let config = load_config(&cli)?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// Load the config file and apply command-line overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    apply_overrides(cli, &mut config);
    Ok(config)
}

/// Hook mode config: an unusable file falls back to defaults, but the
/// command-line overrides still apply
fn hook_config(cli: &Cli) -> Config {
    load_config(cli).unwrap_or_else(|e| {
        debug!(error = %e, "Falling back to default config");
        let mut config = Config::default();
        apply_overrides(cli, &mut config);
        config
    })
}

fn apply_overrides(cli: &Cli, config: &mut Config) {
    if let Some(db) = &cli.db {
        config.store.path = Some(db.clone());
    }
    if let Some(adapter) = cli.adapter {
        config.store.adapter = adapter;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.search.timeout_ms = timeout_ms;
    }
}

fn build_engine(config: &Config) -> ReplayEngine {
    let gateway = gateway::from_config(&config.store, config.timeout());
    ReplayEngine::new(gateway, ResultFormatter::new(&config.search.banner))
}

/// Hook mode: every failure is silent and the process exits successfully
async fn run_hook(cli: &Cli) {
    let config = hook_config(cli);

    // A panic in the pipeline must neither print nor change the exit status
    std::panic::set_hook(Box::new(|info| debug!(%info, "Replay panicked")));

    let input = HookInput::read_from(std::io::stdin().lock());
    let engine = build_engine(&config);
    let replay = tokio::spawn(async move { engine.run(input.prompt()).await.into_advisory() });

    let advisory = match replay.await {
        Ok(advisory) => advisory,
        Err(e) => {
            debug!(error = %e, "Replay task failed");
            None
        }
    };

    if let Some(advisory) = advisory {
        let mut stderr = std::io::stderr().lock();
        if let Err(e) = writeln!(stderr, "{}", advisory) {
            debug!(error = %e, "Failed to write advisory");
        }
    }
}

fn show_keywords(prompt: &str) -> Result<()> {
    let keywords = KeywordExtractor::new().extract(Some(prompt));
    if keywords.is_empty() {
        println!("No keywords (prompt too short or only stop words)");
        return Ok(());
    }

    println!("Keywords: {}", keywords.join(", "));
    match QueryBuilder::new().build(&keywords) {
        Ok(expr) => println!("Match:    {}", expr),
        Err(e) => println!("Match:    none ({})", e),
    }
    Ok(())
}

async fn search(config: &Config, prompt: &str) -> Result<()> {
    let engine = build_engine(config);

    match engine.run(Some(prompt)).await {
        ReplayOutcome::Advisory(text) => println!("{}", text),
        ReplayOutcome::NoMatches => println!("No relevant learnings found"),
        ReplayOutcome::Skipped(e) => println!("Nothing searched: {}", e),
    }
    Ok(())
}
