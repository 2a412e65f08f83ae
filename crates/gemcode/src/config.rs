//! Run configuration.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default model when none is given on the command line.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-001";

/// Default working directory the agent operates in.
pub const DEFAULT_WORKDIR: &str = "./calculator";

/// Default cap on agent turns.
pub const DEFAULT_MAX_TURNS: u32 = 20;

/// Resolved configuration for a single agent run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// API key for the Gemini endpoint.
    pub api_key: String,
    /// Model ID to use.
    pub model: String,
    /// Directory the tools are confined to, canonicalized.
    pub working_dir: PathBuf,
    /// Maximum number of agent turns before giving up.
    pub max_turns: u32,
    /// Print function calls and token counts.
    pub verbose: bool,
}

impl RunConfig {
    /// Build a configuration from CLI values plus the environment.
    pub fn resolve(
        model: String,
        workdir: &Path,
        max_turns: u32,
        verbose: bool,
    ) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .with_context(|| format!("{API_KEY_ENV} environment variable is not set"))?;

        if max_turns == 0 {
            bail!("max turns must be at least 1");
        }

        if !workdir.is_dir() {
            bail!(
                "working directory {} does not exist or is not a directory",
                workdir.display()
            );
        }

        // Canonicalize so the sandbox check compares real paths
        let working_dir = workdir
            .canonicalize()
            .with_context(|| format!("failed to resolve {}", workdir.display()))?;

        Ok(Self {
            api_key,
            model,
            working_dir,
            max_turns,
            verbose,
        })
    }
}
