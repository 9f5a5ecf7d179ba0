//! Error types for the PR title generator

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

// Exit-code classes, so callers can tell a misconfigured invocation apart
// from a broken environment or a dead backend.
pub const EXIT_ENVIRONMENT: i32 = 1;
pub const EXIT_CONFIGURATION: i32 = 2;
pub const EXIT_BACKEND: i32 = 3;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not a git repository: {path}")]
    NotGitRepository { path: PathBuf },

    #[error("Could not determine current branch")]
    NoBranch,

    #[error("Branch '{branch}' not found")]
    BranchNotFound { branch: String },

    #[error("No usable context between '{base}' and '{branch}': no commits and an empty branch slug")]
    NoContext { base: String, branch: String },

    #[error("Title generation failed: {message}")]
    GenerationFailed { message: String },

    #[error("Title generation timed out after {seconds}s")]
    GenerationTimeout { seconds: u64 },

    #[error("Model '{name}' not supported")]
    UnsupportedModel { name: String },

    #[error("Invalid temperature: {temp}. Must be between 0.1 and 1.0")]
    InvalidTemperature { temp: f32 },

    #[error("Invalid max length: {length}. Must be greater than 0")]
    InvalidMaxLength { length: usize },
}

impl Error {
    /// Classify this error into one of the three process exit codes.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::UnsupportedModel { .. }
            | Error::InvalidTemperature { .. }
            | Error::InvalidMaxLength { .. }
            | Error::Regex(_) => EXIT_CONFIGURATION,

            Error::GenerationFailed { .. }
            | Error::GenerationTimeout { .. }
            | Error::Json(_) => EXIT_BACKEND,

            Error::Git(_)
            | Error::Io(_)
            | Error::NotGitRepository { .. }
            | Error::NoBranch
            | Error::BranchNotFound { .. }
            | Error::NoContext { .. } => EXIT_ENVIRONMENT,
        }
    }
}
