//! Gemcode - CLI coding agent backed by Gemini.
//!
//! This is the main entry point for the gemcode CLI.

mod agent;
mod config;

use agent::{Agent, AgentError};
use clap::Parser;
use config::RunConfig;
use gemcode_provider::GeminiProvider;
use gemcode_tools::{ToolContext, ToolRegistry};
use gemcode_util::log::{LogConfig, LogLevel};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "gemcode")]
#[command(author, version, about = "CLI coding agent backed by Gemini", long_about = None)]
struct Cli {
    /// Prompt to send to the agent
    #[arg(num_args = 1.., required = true)]
    prompt: Vec<String>,

    /// Print function calls and token counts
    #[arg(short, long)]
    verbose: bool,

    /// Model ID to use
    #[arg(long, short, default_value = config::DEFAULT_MODEL)]
    model: String,

    /// Directory the agent works in
    #[arg(long, short, default_value = config::DEFAULT_WORKDIR)]
    workdir: PathBuf,

    /// Maximum number of agent turns
    #[arg(long, default_value_t = config::DEFAULT_MAX_TURNS)]
    max_turns: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    gemcode_util::log::init(LogConfig {
        print: true,
        level,
        ..Default::default()
    });

    let prompt = cli.prompt.join(" ");
    let config = RunConfig::resolve(cli.model, &cli.workdir, cli.max_turns, cli.verbose)?;

    info!(model = %config.model, workdir = %config.working_dir.display(), "starting run");

    if config.verbose {
        println!("User prompt: {prompt}");
    }

    let provider = Arc::new(GeminiProvider::new(&config.api_key, &config.model)?);
    let ctx = ToolContext::new(&config.working_dir);

    // Ctrl-C cancels the run, including any script the agent started
    let abort = ctx.abort.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            abort.cancel();
        }
    });

    let agent = Agent::new(
        provider,
        ToolRegistry::with_builtins(),
        ctx,
        config.max_turns,
        config.verbose,
    );

    match agent.run(&prompt).await {
        Ok(outcome) => {
            println!("{}", outcome.text);
            if config.verbose {
                println!(
                    "Total tokens: {} over {} turns",
                    outcome.usage.total(),
                    outcome.turns
                );
            }
            Ok(())
        }
        Err(AgentError::Cancelled) => {
            eprintln!("Interrupted.");
            std::process::exit(130);
        }
        Err(err) => Err(err.into()),
    }
}
