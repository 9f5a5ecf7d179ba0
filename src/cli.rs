//! Command line interface for the PR title generator

use crate::{GeneratorConfig, Result};
use clap::{Parser, ValueEnum};

/// Generate PR titles from branch names and commit history
#[derive(Parser)]
#[command(name = "titlegen")]
#[command(about = "Generates pull-request titles from git branch and commit context")]
#[command(version = "1.0.0")]
#[command(long_about = r#"
Generate PR titles from branch names and commit history

The tool filters ticket prefixes, hash suffixes and templated noise out of
the branch name and commit messages, builds a bounded semantic context from
what remains and generates a short title from it. When the generation
backend is unavailable or times out, a deterministic template built from the
strongest context tokens is used instead.

Examples:
  titlegen                          # Title for the current branch against main
  titlegen --branch feature/auth    # Title for a specific branch
  titlegen --base develop           # Compare against a different base
  titlegen --model phi-2            # Use a different backend model
  titlegen --temperature 0.5        # Adjust generation creativity
"#)]
pub struct Cli {
    /// Branch to analyze (defaults to current branch)
    #[arg(long)]
    pub branch: Option<String>,

    /// Base branch to compare against
    #[arg(long, default_value = "main")]
    pub base: String,

    /// Maximum number of commits to analyze
    #[arg(long, default_value = "20")]
    pub max_commits: usize,

    /// Backend model to use
    #[arg(long, default_value = "tiny-llama")]
    pub model: ModelType,

    /// Generation temperature (0.1-1.0)
    #[arg(long, default_value = "0.7")]
    pub temperature: f32,

    /// Maximum title length
    #[arg(long, default_value = "50")]
    pub max_length: usize,

    /// Backend timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,
}

/// Supported backend models
#[derive(Clone, Debug, ValueEnum)]
pub enum ModelType {
    #[value(name = "tiny-llama")]
    TinyLlama,
    #[value(name = "phi-2")]
    Phi2,
    #[value(name = "gemma-2b")]
    Gemma2b,
    #[value(name = "llama-2-7b")]
    Llama2_7b,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::TinyLlama => "tiny-llama",
            ModelType::Phi2 => "phi-2",
            ModelType::Gemma2b => "gemma-2b",
            ModelType::Llama2_7b => "llama-2-7b",
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments before any git or backend work starts.
    pub fn validate(&self) -> Result<()> {
        self.to_config().validate()
    }

    /// Convert CLI arguments to a GeneratorConfig
    pub fn to_config(&self) -> GeneratorConfig {
        GeneratorConfig::default()
            .with_model(self.model.as_str())
            .with_temperature(self.temperature)
            .with_max_length(self.max_length)
            .with_max_commits(self.max_commits)
            .with_timeout_secs(self.timeout)
            .with_verbose(self.verbose)
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            branch: None,
            base: "main".to_string(),
            max_commits: 20,
            model: ModelType::TinyLlama,
            temperature: 0.7,
            max_length: 50,
            timeout: 30,
            verbose: false,
        }
    }
}
