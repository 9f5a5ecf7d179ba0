//! PR Title Generator Library
//!
//! Turns noisy git metadata (branch slugs, commit messages) into a bounded,
//! high-signal context and generates a clean PR title from it.

pub mod cli;
pub mod context;
pub mod error;
pub mod filter;
pub mod generate;
pub mod git;
pub mod postprocess;

pub use error::{Error, Result};

/// Configuration for the PR title generator
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub model_name: String,
    pub temperature: f32,
    pub max_length: usize,
    pub max_commits: usize,
    /// Character budget for the serialized context handed to the backend.
    pub context_budget: usize,
    /// Timeout for a single backend call, in seconds.
    pub timeout_secs: u64,
    pub verbose: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model_name: "tiny-llama".to_string(),
            temperature: 0.7,
            max_length: 50,
            max_commits: 20,
            context_budget: 240,
            timeout_secs: 30,
            verbose: false,
        }
    }
}

impl GeneratorConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_name = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_max_commits(mut self, max_commits: usize) -> Self {
        self.max_commits = max_commits;
        self
    }

    pub fn with_context_budget(mut self, context_budget: usize) -> Self {
        self.context_budget = context_budget;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Validate parameter bounds before any git or backend work starts.
    pub fn validate(&self) -> Result<()> {
        if self.temperature < 0.1 || self.temperature > 1.0 {
            return Err(Error::InvalidTemperature {
                temp: self.temperature,
            });
        }

        if self.max_length == 0 {
            return Err(Error::InvalidMaxLength {
                length: self.max_length,
            });
        }

        let supported_models = ["tiny-llama", "phi-2", "gemma-2b", "llama-2-7b"];
        if !supported_models.contains(&self.model_name.as_str()) {
            return Err(Error::UnsupportedModel {
                name: self.model_name.clone(),
            });
        }

        Ok(())
    }
}
