//! CLI definitions for the `apothecary` binary.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};

/// Pharmacist assistant agent
#[derive(Parser, Debug)]
#[command(name = "apothecary", version, about = "Streaming pharmacist assistant agent")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP API over the demo store
    Serve(ServeArgs),
    /// Run one conversation turn in the terminal
    Chat(ChatArgs),
}

/// Arguments for `apothecary serve`.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides config and APOTHECARY_BIND)
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

/// Arguments for `apothecary chat`.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Reply language hint (he, en)
    #[arg(short, long)]
    pub locale: Option<String>,

    /// Caller identity passed to identity-aware tools
    #[arg(short, long)]
    pub user: Option<String>,

    /// User prompt
    pub prompt: String,
}
