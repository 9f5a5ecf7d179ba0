//! Bounded context assembly from filtered tokens
//!
//! Token survival under the character budget is a sort-and-slice over the
//! explicit weights assigned by the filter, so the weighting policy stays
//! independent from the truncation mechanics.

use crate::filter::{BranchRef, FilteredToken};
use serde::Serialize;

/// Deduplicated, budget-bounded token sequence plus the ticket prefix.
///
/// The ticket is carried in its own field, never mixed into the token stream,
/// so it can be re-applied to the title no matter what the backend does with
/// the free text.
#[derive(Debug, Clone, Serialize)]
pub struct Context {
    pub ticket: Option<String>,
    tokens: Vec<FilteredToken>,
}

impl Context {
    /// Surviving tokens in their original relative order.
    pub fn tokens(&self) -> &[FilteredToken] {
        &self.tokens
    }

    /// The `n` highest-weight tokens, original order preserved among ties.
    pub fn top_tokens(&self, n: usize) -> Vec<&FilteredToken> {
        let mut ranked: Vec<(usize, &FilteredToken)> = self.tokens.iter().enumerate().collect();
        ranked.sort_by(|(apos, a), (bpos, b)| b.weight.cmp(&a.weight).then(apos.cmp(bpos)));
        ranked.into_iter().take(n).map(|(_, t)| t).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Serialize the token stream as a single space-joined blob.
    pub fn serialize(&self) -> String {
        let words: Vec<&str> = self.tokens.iter().map(|t| t.text.as_str()).collect();
        words.join(" ")
    }
}

/// Builds a [Context] from branch and commit tokens under a character budget.
pub struct ContextBuilder {
    budget: usize,
}

impl ContextBuilder {
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    /// Combine branch tokens and per-commit token streams into one bounded
    /// context.
    ///
    /// Only the first `max_commits` commit streams are considered (hard cap).
    /// Duplicate words (case-insensitive) collapse to one entry keeping the
    /// highest weight and earliest position. Survival under the budget is
    /// decided in (weight desc, position asc) order; survivors are then
    /// re-ordered by original position. No token is ever split.
    pub fn build(
        &self,
        branch: &BranchRef,
        commits: &[Vec<FilteredToken>],
        max_commits: usize,
    ) -> Context {
        let commit_tokens = commits
            .iter()
            .take(max_commits)
            .flat_map(|stream| stream.iter());

        let mut merged: Vec<FilteredToken> = Vec::new();
        for token in branch.tokens.iter().chain(commit_tokens) {
            match merged
                .iter_mut()
                .find(|kept| kept.text.eq_ignore_ascii_case(&token.text))
            {
                Some(kept) => kept.weight = kept.weight.max(token.weight),
                None => merged.push(token.clone()),
            }
        }

        let mut ranked: Vec<usize> = (0..merged.len()).collect();
        ranked.sort_by(|&a, &b| {
            merged[b]
                .weight
                .cmp(&merged[a].weight)
                .then(a.cmp(&b))
        });

        // Greedy whole-token selection: a token survives only if it fits in
        // the remaining budget including its joining space.
        let mut used = 0usize;
        let mut survivors: Vec<usize> = Vec::new();
        for idx in ranked {
            let cost = merged[idx].text.len() + if survivors.is_empty() { 0 } else { 1 };
            if used + cost <= self.budget {
                used += cost;
                survivors.push(idx);
            }
        }
        survivors.sort_unstable();

        let tokens = survivors.into_iter().map(|i| merged[i].clone()).collect();

        Context {
            ticket: branch.ticket.clone(),
            tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{NoiseFilter, TokenSource};

    fn token(text: &str, weight: u32) -> FilteredToken {
        FilteredToken {
            text: text.to_string(),
            source: TokenSource::Commit,
            weight,
        }
    }

    fn branch_ref(raw: &str) -> BranchRef {
        NoiseFilter::new().unwrap().filter_branch(raw)
    }

    #[test]
    fn test_case_insensitive_dedup_keeps_highest_weight() {
        let builder = ContextBuilder::new(200);
        let commits = vec![
            vec![token("Remediation", 3)],
            vec![token("remediation", 11)],
        ];
        let context = builder.build(&branch_ref("misc"), &commits, 20);

        let hits: Vec<_> = context
            .tokens()
            .iter()
            .filter(|t| t.text.eq_ignore_ascii_case("remediation"))
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].weight, 11);
        // Earliest position wins: the first spelling is the one kept.
        assert_eq!(hits[0].text, "Remediation");
    }

    #[test]
    fn test_budget_is_respected_without_splitting_tokens() {
        let builder = ContextBuilder::new(18);
        let commits = vec![vec![
            token("remediation", 11),
            token("scheduler", 9),
            token("watchdog", 8),
        ]];
        let context = builder.build(&branch_ref(""), &commits, 20);

        let blob = context.serialize();
        assert!(blob.len() <= 18);
        // Every emitted word is a whole input token.
        for word in blob.split(' ') {
            assert!(["remediation", "scheduler", "watchdog"].contains(&word));
        }
        // "remediation scheduler" is 21 chars, so only one of the two big
        // tokens fits alongside the smallest.
        assert!(blob.contains("remediation"));
    }

    #[test]
    fn test_lowest_weight_tokens_dropped_first() {
        let builder = ContextBuilder::new(12);
        let commits = vec![vec![
            token("of", 1),
            token("remediation", 11),
        ]];
        let context = builder.build(&branch_ref(""), &commits, 20);

        let words: Vec<&str> = context.tokens().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(words, vec!["remediation"]);
    }

    #[test]
    fn test_survivors_keep_original_relative_order() {
        let builder = ContextBuilder::new(200);
        let commits = vec![vec![
            token("first", 2),
            token("second", 9),
            token("third", 5),
        ]];
        let context = builder.build(&branch_ref(""), &commits, 20);

        let words: Vec<&str> = context.tokens().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(words, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_max_commits_is_a_hard_cap() {
        let builder = ContextBuilder::new(200);
        let commits = vec![
            vec![token("kept", 5)],
            vec![token("dropped", 5)],
        ];
        let context = builder.build(&branch_ref(""), &commits, 1);

        let words: Vec<&str> = context.tokens().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(words, vec!["kept"]);
    }

    #[test]
    fn test_ticket_is_carried_separately() {
        let builder = ContextBuilder::new(200);
        let context = builder.build(&branch_ref("cursor/CRU-310-fix-bottle-stuck"), &[], 20);

        assert_eq!(context.ticket.as_deref(), Some("CRU-310"));
        assert!(!context.serialize().contains("CRU-310"));
        assert!(!context.serialize().contains("cru"));
    }

    #[test]
    fn test_identical_input_gives_identical_context() {
        let builder = ContextBuilder::new(80);
        let branch = branch_ref("fix/JIRA-9-cache-eviction");
        let commits = vec![vec![token("eviction", 8), token("cache", 5)]];

        let a = builder.build(&branch, &commits, 20);
        let b = builder.build(&branch, &commits, 20);
        assert_eq!(a.serialize(), b.serialize());
    }

    #[test]
    fn test_top_tokens_rank_by_weight_then_position() {
        let builder = ContextBuilder::new(200);
        let commits = vec![vec![
            token("minor", 2),
            token("remediation", 11),
            token("scheduler", 9),
        ]];
        let context = builder.build(&branch_ref(""), &commits, 20);

        let top: Vec<&str> = context.top_tokens(2).iter().map(|t| t.text.as_str()).collect();
        assert_eq!(top, vec!["remediation", "scheduler"]);
    }
}
