mod commands;
mod render;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use sobras_core::ai::create_client;
use sobras_core::{
    AiConfig, AppController, Favorites, FavoritesStore, JsonFileStore, NoCamera,
};

use commands::{parse_command, Command, HELP};
use session::{Flow, Session};

#[derive(Parser)]
#[command(name = "sobras")]
#[command(about = "Sobras Mágicas IA: recetas a partir de lo que tienes en la nevera", long_about = None)]
struct Cli {
    /// Directory holding saved favorites (default: ~/.sobras-magicas)
    #[arg(long, env = "SOBRAS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// AI provider: "gemini" or "fake"
    #[arg(long, env = "SOBRAS_AI_PROVIDER", default_value = "gemini")]
    provider: String,

    /// Model name, overriding SOBRAS_AI_MODEL
    #[arg(long)]
    model: Option<String>,
}

/// Log to stderr so records never interleave with the rendered screen.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let model = cli.model;
    let ai_client = create_client(&cli.provider, || {
        AiConfig::from_env().map(|mut config| {
            if let Some(model) = model {
                config.model = model;
            }
            config
        })
    })
    .context("Failed to create AI client")?;

    let data_dir = cli.data_dir.unwrap_or_else(JsonFileStore::default_dir);
    tracing::info!(data_dir = %data_dir.display(), provider = %cli.provider, "Starting");
    let store = JsonFileStore::new(data_dir);
    let favorites = Favorites::load(FavoritesStore::new(Arc::new(store)));

    let mut session = Session::new(
        AppController::new(favorites),
        ai_client,
        Box::new(NoCamera),
    );

    println!("{}", render::render(session.app()));
    println!("\n(help para ver los comandos)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        if matches!(command, Command::Photo(_) | Command::Snap | Command::Generate) {
            println!("Cocinando ideas...");
        }

        let message = match session.execute(command).await {
            Ok(Flow::Quit) => break,
            Ok(Flow::ShowHelp) => {
                println!("{}", HELP);
                continue;
            }
            Ok(Flow::Continue) => None,
            Err(e) => {
                tracing::debug!(error = %e, "Command failed");
                e.user_message()
            }
        };

        println!("\n{}", render::render(session.app()));
        if let Some(message) = message {
            println!("\n{}", message);
        }
    }

    Ok(())
}
