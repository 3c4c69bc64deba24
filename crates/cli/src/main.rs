use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use wayfarer_agents::ConversationRouter;
use wayfarer_core::{analyze_message, build_system_prompt, score_query, ConversationTurn};
use wayfarer_llm::{
    max_tokens_from_env, CompletionClient, CompletionConfig, OpenAiCompatClient, UnconfiguredClient,
};
use wayfarer_observability::{init_tracing, AppMetrics};
use wayfarer_storage::{LocationStore, MemoryStore, Store};

#[derive(Debug, Parser)]
#[command(name = "wayfarer")]
#[command(about = "Wayfarer travel assistant CLI")]
struct Cli {
    #[arg(long, env = "WAYFARER_LOCATIONS_PATH", default_value = "data/locations.json")]
    locations: PathBuf,

    #[arg(long, env = "WAYFARER_DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive chat; history is kept for the session.
    Chat {
        #[arg(long)]
        location: Option<String>,
    },
    Locations,
    /// Show query type, duration and travel gate result for a message.
    Classify { message: String },
    /// Print the system prompt that would be sent for a location.
    Prompt {
        #[arg(long)]
        location: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("wayfarer_cli");
    let cli = Cli::parse();

    match cli.command {
        Command::Classify { message } => {
            let analysis = analyze_message(&message);
            let scores = score_query(&message)
                .iter()
                .map(|(kind, score)| (kind.as_str().to_string(), serde_json::json!(score)))
                .collect::<serde_json::Map<_, _>>();

            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "query_type": analysis.query_type,
                    "duration_days": analysis.duration_days,
                    "travel_related": analysis.travel_related,
                    "scores": scores,
                }))?
            );
        }
        Command::Locations => {
            let store = build_store(&cli.locations, cli.database_url.as_deref()).await?;
            for name in store.list_names().await? {
                println!("{name}");
            }
        }
        Command::Prompt { location } => {
            let store = build_store(&cli.locations, cli.database_url.as_deref()).await?;
            let record = match location.as_deref() {
                Some(name) => {
                    let record = store.get(name).await?;
                    if record.is_none() {
                        eprintln!("unknown location '{name}', showing the generic prompt");
                    }
                    record
                }
                None => None,
            };
            println!("{}", build_system_prompt(record.as_ref()));
        }
        Command::Chat { location } => {
            let store = build_store(&cli.locations, cli.database_url.as_deref()).await?;
            run_chat(build_router(store)?, location).await?;
        }
    }

    Ok(())
}

async fn run_chat(router: ConversationRouter<Store>, location: Option<String>) -> Result<()> {
    let mut history: Vec<ConversationTurn> = Vec::new();

    match location.as_deref() {
        Some(name) => println!("Wayfarer chat for {name}. type 'exit' to quit."),
        None => println!("Wayfarer chat (no destination selected). type 'exit' to quit."),
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        let reply = router
            .respond(message, location.as_deref(), &history)
            .await?;
        history.push(ConversationTurn::from(message));

        println!("\n{reply}\n");
    }

    Ok(())
}

async fn build_store(locations: &PathBuf, database_url: Option<&str>) -> Result<Store> {
    let seed = MemoryStore::from_json_file(locations)
        .with_context(|| format!("failed loading locations from {}", locations.display()))?;

    match database_url {
        Some(url) => {
            let store = Store::sqlite(url).await?;
            store.import_from(&seed).await?;
            Ok(store)
        }
        None => Ok(Store::Memory(seed)),
    }
}

fn build_router(store: Store) -> Result<ConversationRouter<Store>> {
    let metrics = AppMetrics::shared();

    let client: Arc<dyn CompletionClient> = match CompletionConfig::from_env() {
        Some(config) => {
            Arc::new(OpenAiCompatClient::new(config).context("failed to build completion client")?)
        }
        None => {
            eprintln!("WAYFARER_LLM_API_KEY is not set; travel questions will return an error.");
            Arc::new(UnconfiguredClient)
        }
    };

    Ok(ConversationRouter::new(Arc::new(store), client, metrics)
        .with_max_tokens(max_tokens_from_env()))
}
