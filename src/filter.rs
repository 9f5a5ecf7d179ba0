//! Noise filtering for branch names and commit messages
//!
//! Everything here is a pure function of its input: the same branch name or
//! commit message always produces the same tokens. Recognizers are kept as an
//! ordered rule table so new branch-naming conventions are added as data, not
//! as new control flow.

use crate::Result;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

/// Weight given to intent hints (stripped `fix/` prefixes, conventional
/// commit types). High enough to survive truncation, below a long
/// domain word.
pub const HINT_WEIGHT: u32 = 4;

/// Where a token was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenSource {
    Branch,
    Commit,
}

/// A cleaned lowercase word with an informativeness weight.
///
/// Longer non-stopword tokens weigh more; stopwords and bare numbers are
/// down-weighted rather than removed, so phrases like "stuck with remediation"
/// keep their connective words when the budget allows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredToken {
    pub text: String,
    pub source: TokenSource,
    pub weight: u32,
}

/// Decomposed branch name: ticket prefix, intent hint and slug words.
///
/// The raw name is kept alongside so the decomposition stays lossless modulo
/// the filtered noise.
#[derive(Debug, Clone)]
pub struct BranchRef {
    pub raw: String,
    pub ticket: Option<String>,
    pub tokens: Vec<FilteredToken>,
}

/// What a matched branch pattern means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BranchRole {
    /// Dropped outright (tool namespaces, ref prefixes).
    Noise,
    /// Stripped from the slug but kept as a weighted hint token.
    Hint,
    /// Extracted as the ticket prefix (searched in the first path segment).
    Ticket,
    /// Trailing short-hex suffix, dropped when it contains a digit.
    HashSuffix,
}

struct BranchRule {
    pattern: Regex,
    role: BranchRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommitRole {
    /// Merge/revert boilerplate; the whole message yields zero tokens.
    Boilerplate,
    /// Conventional-commit type prefix, kept as a hint token.
    TypePrefix,
    /// Parenthetical short-hex reference, pure noise.
    HashRef,
}

struct CommitRule {
    pattern: Regex,
    role: CommitRole,
}

/// Rule-table-driven noise filter for branch names and commit messages.
pub struct NoiseFilter {
    branch_rules: Vec<BranchRule>,
    commit_rules: Vec<CommitRule>,
    stopwords: HashSet<&'static str>,
}

impl NoiseFilter {
    pub fn new() -> Result<Self> {
        // Order matters: namespaces come off before the ticket is searched in
        // the first remaining path segment, and the hash suffix is only
        // recognized at the very end of the slug.
        let branch_rules = vec![
            BranchRule {
                pattern: Regex::new(r"^(?:refs/heads/|refs/remotes/|origin/|cursor/)")?,
                role: BranchRole::Noise,
            },
            BranchRule {
                pattern: Regex::new(
                    r"(?i)^(feature|feat|fix|bugfix|hotfix|chore|docs|release)/",
                )?,
                role: BranchRole::Hint,
            },
            BranchRule {
                pattern: Regex::new(r"(?i)\b([a-z]{2,}-[0-9]+)\b")?,
                role: BranchRole::Ticket,
            },
            BranchRule {
                pattern: Regex::new(r"-([0-9a-fA-F]{4,8})$")?,
                role: BranchRole::HashSuffix,
            },
        ];

        let commit_rules = vec![
            CommitRule {
                pattern: Regex::new(r"(?i)^\s*(?:merge\b|revert\b)")?,
                role: CommitRole::Boilerplate,
            },
            CommitRule {
                pattern: Regex::new(
                    r"(?i)^(fix|feat|feature|bug|hotfix|refactor|docs|style|test|chore|perf|ci|build)(\([^)]*\))?!?:\s*",
                )?,
                role: CommitRole::TypePrefix,
            },
            CommitRule {
                pattern: Regex::new(r"\(\s*[0-9a-f]{6,40}\s*\)")?,
                role: CommitRole::HashRef,
            },
        ];

        // Down-weighted, not removed: dropping connectives outright can erase
        // meaning ("stuck with remediation").
        let stopwords = [
            "a", "an", "the", "and", "or", "but", "of", "to", "in", "on", "for", "with", "by",
            "at", "is", "are", "was", "it", "this", "that", "into", "from",
        ]
        .into_iter()
        .collect();

        Ok(Self {
            branch_rules,
            commit_rules,
            stopwords,
        })
    }

    /// Decompose a branch name into ticket prefix, hint and slug tokens.
    pub fn filter_branch(&self, raw: &str) -> BranchRef {
        let mut working = raw.trim().to_string();
        let mut ticket = None;
        let mut tokens = Vec::new();

        for rule in &self.branch_rules {
            match rule.role {
                BranchRole::Noise => {
                    // Namespaces stack (refs/remotes/origin/...), and the
                    // anchored pattern only ever matches the front, so strip
                    // to a fixpoint.
                    loop {
                        let stripped = rule.pattern.replace(&working, "").into_owned();
                        if stripped == working {
                            break;
                        }
                        working = stripped;
                    }
                }
                BranchRole::Hint => {
                    if let Some(caps) = rule.pattern.captures(&working) {
                        tokens.push(FilteredToken {
                            text: caps[1].to_lowercase(),
                            source: TokenSource::Branch,
                            weight: HINT_WEIGHT,
                        });
                        working = rule.pattern.replace(&working, "").into_owned();
                    }
                }
                BranchRole::Ticket => {
                    let segment_end = working.find('/').unwrap_or(working.len());
                    if let Some(m) = rule.pattern.find(&working[..segment_end]) {
                        ticket = Some(m.as_str().to_uppercase());
                        let range = m.range();
                        working.replace_range(range, "");
                    }
                }
                BranchRole::HashSuffix => {
                    if let Some(caps) = rule.pattern.captures(&working) {
                        // Require a digit so slug words that happen to be
                        // hex-alphabet ("deed", "face") are not eaten.
                        if caps[1].chars().any(|c| c.is_ascii_digit()) {
                            let start = caps.get(0).map(|m| m.start()).unwrap_or(working.len());
                            working.truncate(start);
                        }
                    }
                }
            }
        }

        tokens.extend(self.tokenize(&working, &['-', '_', '/'], TokenSource::Branch));

        BranchRef {
            raw: raw.to_string(),
            ticket,
            tokens,
        }
    }

    /// Filter one commit message down to its informative tokens.
    ///
    /// Only the subject line is considered. Merge and revert boilerplate
    /// produces zero tokens; a conventional-commit type prefix becomes a hint
    /// token; short-hex references are dropped.
    pub fn filter_commit(&self, raw: &str) -> Vec<FilteredToken> {
        let subject = raw.lines().next().unwrap_or("").trim();
        let mut working = subject.to_string();
        let mut tokens = Vec::new();

        for rule in &self.commit_rules {
            match rule.role {
                CommitRole::Boilerplate => {
                    if rule.pattern.is_match(&working) {
                        return Vec::new();
                    }
                }
                CommitRole::TypePrefix => {
                    if let Some(caps) = rule.pattern.captures(&working) {
                        tokens.push(FilteredToken {
                            text: caps[1].to_lowercase(),
                            source: TokenSource::Commit,
                            weight: HINT_WEIGHT,
                        });
                        working = rule.pattern.replace(&working, "").into_owned();
                    }
                }
                CommitRole::HashRef => {
                    working = rule.pattern.replace_all(&working, " ").into_owned();
                }
            }
        }

        tokens.extend(self.tokenize(&working, &[' '], TokenSource::Commit));
        tokens
    }

    fn tokenize(&self, text: &str, separators: &[char], source: TokenSource) -> Vec<FilteredToken> {
        text.split(|c: char| separators.contains(&c) || c.is_whitespace())
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .filter(|word| !word.is_empty() && !is_bare_hex(word))
            .map(|word| {
                let weight = self.weight_of(&word);
                FilteredToken {
                    text: word,
                    source,
                    weight,
                }
            })
            .collect()
    }

    /// Weight policy: stopwords and bare numbers sink to 1, everything else
    /// scales with length (longer words carry more signal), capped at 12.
    fn weight_of(&self, word: &str) -> u32 {
        if self.stopwords.contains(word) || word.chars().all(|c| c.is_ascii_digit()) {
            1
        } else {
            (word.chars().count() as u32).clamp(2, 12)
        }
    }
}

/// An unparenthesized commit-hash fragment: 7+ hex characters with at least
/// one digit.
fn is_bare_hex(word: &str) -> bool {
    word.len() >= 7
        && word.chars().all(|c| c.is_ascii_hexdigit())
        && word.chars().any(|c| c.is_ascii_digit())
}
