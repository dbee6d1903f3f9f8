//! Phaseforge server - idea-to-execution-plan backend

mod server;

use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::Parser;

use phaseforge_core::agents::{PlannerAgent, ResearchAgent, VerifierAgent};
use phaseforge_core::config::Config;
use phaseforge_core::llm::LlmClient;
use phaseforge_core::orchestrator::PlanOrchestrator;
use phaseforge_core::state::FileStateStore;

#[derive(Parser)]
#[command(name = "phaseforge-server")]
#[command(author, version, about = "Idea-to-execution-plan backend", long_about = None)]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8000)]
    port: u16,

    /// Override the session state file path from the config
    #[arg(long)]
    state_file: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("phaseforge=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = Config::load().context("Failed to load configuration")?;

    let api_key = config
        .llm
        .resolved_api_key()?
        .ok_or_else(|| anyhow!("No LLM API key found. Set GROQ_API_KEY environment variable."))?;

    tracing::info!(
        model = %config.llm.model,
        api_key = %config.llm.redacted_api_key()?.unwrap_or_default(),
        "Loaded configuration"
    );

    let llm_client = LlmClient::builder()
        .config(config.llm.clone())
        .api_key(api_key)
        .build()?;

    let research = Arc::new(ResearchAgent::new(config.research.clone())?);
    let planner = Arc::new(PlannerAgent::new(llm_client));
    let verifier = VerifierAgent::new(config.github.clone())?;

    let state_path = cli.state_file.unwrap_or_else(|| config.state.path.clone());
    let store = FileStateStore::new(state_path);
    tracing::info!(state_file = %store.path().display(), "Using session state store");
    let store = Arc::new(store);

    let orchestrator = Arc::new(PlanOrchestrator::new(research, planner, verifier, store));

    server::run_serve(orchestrator, &cli.bind, cli.port).await
}
