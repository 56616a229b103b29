//! apothecary binary entry point.

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use apothecary::agent_loop::{LoopRunner, RunRequest};
use apothecary::cli::{ChatArgs, Cli, Commands, ServeArgs};
use apothecary::config::AgentConfig;
use apothecary::server::{self, AppState};
use apothecary::store::{MemoryStore, PharmacyStore};
use apothecary::tools::{ToolDispatcher, ToolRegistry};
use apothecary::types::{AgentEvent, ChatMessage, ToolStatus};

const DEFAULT_LOG_FILTER: &str = "apothecary=info,tower_http=info";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Serve(args) => handle_serve(args).await,
        Commands::Chat(args) => handle_chat(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn build_runner(config: &AgentConfig) -> LoopRunner {
    let store: Arc<dyn PharmacyStore> = Arc::new(MemoryStore::seeded());
    let dispatcher = ToolDispatcher::new(Arc::new(ToolRegistry::pharmacy()), Some(store));
    LoopRunner::new(config, dispatcher)
}

async fn handle_serve(args: ServeArgs) -> apothecary::error::Result<()> {
    let config = AgentConfig::load()?;
    let addr = args.bind.unwrap_or(config.bind_addr);
    server::serve(addr, AppState::new(build_runner(&config))).await
}

async fn handle_chat(args: ChatArgs) -> apothecary::error::Result<()> {
    let config = AgentConfig::load()?;
    let runner = build_runner(&config);

    let mut request = RunRequest::new(vec![ChatMessage::user(args.prompt)]);
    request.locale_hint = args.locale;
    request.caller = args.user;

    let mut handle = runner.start(request);
    let mut failed = false;
    while let Some(event) = handle.next_event().await {
        match event {
            AgentEvent::Delta { text } => {
                print!("{text}");
                let _ = std::io::stdout().flush();
            }
            AgentEvent::ToolStatus { status, tool } => match status {
                ToolStatus::Running => eprintln!("\n[{tool}] running"),
                ToolStatus::Done => eprintln!("[{tool}] done"),
            },
            AgentEvent::Error { message } => {
                failed = true;
                eprintln!("\n{message}");
            }
            AgentEvent::Done => break,
        }
    }
    println!();

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
