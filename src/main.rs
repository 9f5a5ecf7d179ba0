//! titlegen - Main entry point
//!
//! Generates a PR title from the current branch and commit history:
//! git facts -> noise filter -> bounded context -> backend -> post-processing.

use std::env;
use std::process;
use titlegen::{
    cli::Cli,
    context::ContextBuilder,
    filter::NoiseFilter,
    generate::{PatternBackend, TitleGenerator},
    git::GitRepo,
    postprocess, Error, Result,
};

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse_args();

    // Fail fast on bad parameters before touching git or the backend.
    if let Err(e) = cli.validate() {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let current_dir = env::current_dir().map_err(Error::Io)?;

    if cli.verbose {
        println!("Working directory: {}", current_dir.display());
    }

    let git_repo = GitRepo::open(&current_dir)?;

    if cli.verbose {
        println!("Git repository found at: {}", git_repo.root_path().display());
    }

    let branch_name = match &cli.branch {
        Some(branch) => branch.clone(),
        None => git_repo.current_branch()?,
    };

    if cli.verbose {
        println!("Analyzing branch: {}", branch_name);
        println!("Base branch: {}", cli.base);
    }

    if !git_repo.branch_exists(&branch_name) {
        return Err(Error::BranchNotFound {
            branch: branch_name,
        });
    }

    let commits = git_repo.get_commits_between(&cli.base, &branch_name, cli.max_commits)?;

    if cli.verbose {
        println!("Found {} commits to analyze", commits.len());
        for (i, commit) in commits.iter().enumerate().take(5) {
            println!("  {}: {}", i + 1, commit.raw_message());
        }
        if commits.len() > 5 {
            println!("  ... and {} more", commits.len() - 5);
        }
    }

    let config = cli.to_config();

    // Filter noise out of the branch name and commit subjects.
    let filter = NoiseFilter::new()?;
    let branch_ref = filter.filter_branch(&branch_name);
    let commit_tokens: Vec<_> = commits
        .iter()
        .map(|c| filter.filter_commit(c.raw_message()))
        .collect();

    if cli.verbose {
        println!("Branch decomposition: {:#?}", branch_ref);
    }

    // Build the bounded context; zero commits is fine as long as the branch
    // slug carries something.
    let builder = ContextBuilder::new(config.context_budget);
    let context = builder.build(&branch_ref, &commit_tokens, config.max_commits);

    if context.is_empty() {
        return Err(Error::NoContext {
            base: cli.base.clone(),
            branch: branch_name,
        });
    }

    if cli.verbose {
        println!("Context for backend: {}", serde_json::to_string(&context)?);
        println!("Serialized blob: {}", context.serialize());
    }

    let generator = TitleGenerator::new(config, PatternBackend::new())?;
    let candidate = generator.generate_title(&context).await?;

    if cli.verbose {
        println!("Raw candidate: {}", candidate);
    }

    let title = postprocess::process(
        &candidate,
        context.ticket.as_deref(),
        generator.config().max_length,
    );

    println!("{}", title);

    Ok(())
}
