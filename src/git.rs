//! Git repository operations and validation

use crate::{Error, Result};
use git2::{Commit, Oid, Repository};
use std::path::{Path, PathBuf};

/// Git repository wrapper supplying the raw facts the pipeline consumes:
/// current branch name and the bounded commit range between base and branch.
pub struct GitRepo {
    repo: Repository,
    root_path: PathBuf,
}

impl GitRepo {
    /// Open and validate a git repository at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // git2 walks up from the path to find .git
        let repo = Repository::open(path).map_err(|_| Error::NotGitRepository {
            path: path.to_path_buf(),
        })?;
        let root_path = repo
            .workdir()
            .ok_or_else(|| Error::NotGitRepository {
                path: path.to_path_buf(),
            })?
            .to_path_buf();

        Ok(Self { repo, root_path })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Get the current branch name.
    pub fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;

        if let Some(name) = head.shorthand() {
            Ok(name.to_string())
        } else {
            Err(Error::NoBranch)
        }
    }

    /// Check if a branch exists locally or on a remote.
    pub fn branch_exists(&self, branch_name: &str) -> bool {
        self.repo
            .find_branch(branch_name, git2::BranchType::Local)
            .is_ok()
            || self
                .repo
                .find_branch(branch_name, git2::BranchType::Remote)
                .is_ok()
    }

    /// Get up to `max_commits` commits on `branch` that are not on `base`,
    /// newest first. Merge commits are skipped.
    ///
    /// An empty range is not an error here: the pipeline degrades to a
    /// branch-slug-only title when there are no commits to analyze.
    pub fn get_commits_between(
        &self,
        base: &str,
        branch: &str,
        max_commits: usize,
    ) -> Result<Vec<CommitInfo>> {
        let branch_oid = self.resolve_reference(branch)?;
        let base_oid = self.resolve_reference(base)?;

        let merge_base = self.repo.merge_base(base_oid, branch_oid)?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(branch_oid)?;
        revwalk.hide(merge_base)?;
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;

        let mut commits = Vec::new();

        for oid in revwalk {
            if commits.len() >= max_commits {
                break;
            }

            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;

            if commit.parent_count() > 1 {
                continue;
            }

            commits.push(CommitInfo::from_commit(&commit));
        }

        Ok(commits)
    }

    /// Resolve a branch name or ref to an OID.
    fn resolve_reference(&self, reference: &str) -> Result<Oid> {
        if let Ok(reference) = self.repo.find_reference(reference) {
            if let Ok(resolved) = reference.resolve() {
                if let Some(oid) = resolved.target() {
                    return Ok(oid);
                }
            }
        }

        if let Ok(branch) = self.repo.find_branch(reference, git2::BranchType::Local) {
            if let Some(oid) = branch.get().target() {
                return Ok(oid);
            }
        }

        if let Ok(branch) = self.repo.find_branch(reference, git2::BranchType::Remote) {
            if let Some(oid) = branch.get().target() {
                return Ok(oid);
            }
        }

        let full_ref = format!("refs/heads/{}", reference);
        if let Ok(reference) = self.repo.find_reference(&full_ref) {
            if let Some(oid) = reference.target() {
                return Ok(oid);
            }
        }

        let remote_ref = format!("refs/remotes/origin/{}", reference);
        if let Ok(reference) = self.repo.find_reference(&remote_ref) {
            if let Some(oid) = reference.target() {
                return Ok(oid);
            }
        }

        Err(Error::BranchNotFound {
            branch: reference.to_string(),
        })
    }
}

/// Information about a single commit
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub hash: String,
    pub message: String,
    pub author: String,
    pub timestamp: i64,
}

impl CommitInfo {
    fn from_commit(commit: &Commit) -> Self {
        Self {
            hash: commit.id().to_string(),
            message: commit.message().unwrap_or("").to_string(),
            author: commit.author().name().unwrap_or("Unknown").to_string(),
            timestamp: commit.time().seconds(),
        }
    }

    /// The trimmed raw message, as handed to the noise filter.
    pub fn raw_message(&self) -> &str {
        self.message.trim()
    }
}
