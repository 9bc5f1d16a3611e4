use anyhow::{Context, Result};
use clap::Parser;
use std::env;

use ponder::providers::configs::{GroqProviderConfig, DEFAULT_MODEL};
use ponder::providers::groq::GroqProvider;
use ponder::session::{ChatSession, DEFAULT_SYSTEM_PROMPT};

mod renderer;
mod session;

#[derive(Parser)]
#[command(name = "ponder", version, about, long_about = None)]
struct Cli {
    /// Model to use (openai/gpt-oss-20b or deepseek-r1-distill-llama-70b)
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Groq API key (can also be set via GROQ_API_KEY environment variable)
    #[arg(long)]
    api_key: Option<String>,

    /// Override the API host
    #[arg(long)]
    host: Option<String>,

    /// Advertise the browser search tool on every request
    #[arg(long)]
    web_search: bool,

    /// System prompt for the session
    #[arg(long, default_value = DEFAULT_SYSTEM_PROMPT)]
    system: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let api_key = cli
        .api_key
        .clone()
        .or_else(|| env::var("GROQ_API_KEY").ok())
        .context("API key must be provided via --api-key or GROQ_API_KEY environment variable")?;

    let mut config = GroqProviderConfig::new(api_key, &cli.model).with_web_search(cli.web_search);
    if let Some(host) = &cli.host {
        config = config.with_host(host);
    }
    let provider = GroqProvider::new(config)?;

    let chat_session = ChatSession::new(&cli.system);
    session::ChatLoop::new(provider, chat_session).start().await
}
