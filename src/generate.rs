//! Title generation backends
//!
//! Generation sits behind the [TitleBackend] capability so the pipeline never
//! depends on a live model: the shipped [PatternBackend] assembles candidates
//! from an action-pattern table, and the driver recovers from any backend
//! failure or timeout with a deterministic template built from the
//! top-weighted context tokens.

use crate::{context::Context, Error, GeneratorConfig, Result};
use std::collections::HashMap;
use std::time::Duration;

/// Capability interface for title generation.
///
/// A backend receives the bounded, cleaned context and the generation
/// parameters and returns raw candidate text. Whether that happens through
/// model inference or template assembly is the backend's business; the model
/// identifier is passed through untouched.
#[allow(async_fn_in_trait)]
pub trait TitleBackend {
    async fn generate(&self, context: &Context, config: &GeneratorConfig) -> Result<String>;
}

/// Drives a backend with a timeout and a deterministic fallback.
pub struct TitleGenerator<B: TitleBackend> {
    backend: B,
    config: GeneratorConfig,
}

impl<B: TitleBackend> TitleGenerator<B> {
    pub fn new(config: GeneratorConfig, backend: B) -> Result<Self> {
        config.validate()?;
        Ok(Self { backend, config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a raw title candidate for the context.
    ///
    /// The backend call is the single suspension point of the pipeline and
    /// runs under the configured timeout. Backend errors and timeouts are
    /// recovered locally via the fallback template; only an empty context has
    /// no recovery.
    pub async fn generate_title(&self, context: &Context) -> Result<String> {
        let timeout = Duration::from_secs(self.config.timeout_secs);
        match tokio::time::timeout(timeout, self.backend.generate(context, &self.config)).await {
            Ok(Ok(candidate)) => Ok(candidate),
            Ok(Err(err)) => {
                log::warn!("title backend failed ({err}), falling back to template");
                self.fallback_title(context)
            }
            Err(_) => {
                log::warn!(
                    "title backend timed out after {}s, falling back to template",
                    self.config.timeout_secs
                );
                // With no tokens to build the template from, the timeout
                // itself is the diagnostic.
                self.fallback_title(context)
                    .map_err(|_| Error::GenerationTimeout {
                        seconds: self.config.timeout_secs,
                    })
            }
        }
    }

    /// Deterministic template built from the two highest-weight tokens.
    fn fallback_title(&self, context: &Context) -> Result<String> {
        let top: Vec<String> = context
            .top_tokens(2)
            .into_iter()
            .map(|t| t.text.clone())
            .collect();

        if top.is_empty() {
            return Err(Error::GenerationFailed {
                message: "no context tokens available for fallback".to_string(),
            });
        }

        Ok(format!("Update {}", top.join(" ")))
    }
}

/// Pattern-table backend: picks an action from the context's hint words and
/// fills a pattern with the strongest subject tokens.
pub struct PatternBackend {
    action_patterns: HashMap<&'static str, Vec<&'static str>>,
}

impl PatternBackend {
    pub fn new() -> Self {
        let mut action_patterns = HashMap::new();

        action_patterns.insert(
            "fix",
            vec!["Fix {subject}", "Resolve {subject}", "Correct {subject}"],
        );
        action_patterns.insert(
            "feature",
            vec![
                "Add {subject}",
                "Implement {subject}",
                "Introduce {subject}",
            ],
        );
        action_patterns.insert(
            "refactor",
            vec![
                "Refactor {subject}",
                "Improve {subject}",
                "Optimize {subject}",
            ],
        );
        action_patterns.insert("update", vec!["Update {subject}"]);

        Self { action_patterns }
    }

    fn determine_action(&self, context: &Context) -> &'static str {
        let has = |words: &[&str]| {
            context
                .tokens()
                .iter()
                .any(|t| words.contains(&t.text.as_str()))
        };

        if has(&["fix", "bugfix", "hotfix", "bug", "issue"]) {
            "fix"
        } else if has(&["feat", "feature", "add", "implement"]) {
            "feature"
        } else if has(&["refactor", "improve", "cleanup"]) {
            "refactor"
        } else {
            "update"
        }
    }

    fn subject(&self, context: &Context, action: &str) -> String {
        let words: Vec<String> = context
            .top_tokens(4)
            .into_iter()
            .map(|t| t.text.clone())
            .filter(|text| text != action)
            .collect();
        words.join(" ")
    }
}

impl Default for PatternBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TitleBackend for PatternBackend {
    async fn generate(&self, context: &Context, config: &GeneratorConfig) -> Result<String> {
        if context.is_empty() {
            return Err(Error::GenerationFailed {
                message: "empty context".to_string(),
            });
        }

        log::debug!(
            "pattern backend generating for model '{}' over {} tokens",
            config.model_name,
            context.tokens().len()
        );

        let action = self.determine_action(context);
        let subject = self.subject(context, action);

        let patterns = &self.action_patterns[action];
        // Temperature deterministically selects the pattern flavour.
        let index = (config.temperature * patterns.len() as f32) as usize;
        let pattern = patterns.get(index).unwrap_or(&patterns[0]);

        Ok(pattern.replace("{subject}", &subject))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextBuilder;
    use crate::filter::NoiseFilter;
    use crate::postprocess;

    struct FailingBackend;

    impl TitleBackend for FailingBackend {
        async fn generate(&self, _context: &Context, _config: &GeneratorConfig) -> Result<String> {
            Err(Error::GenerationFailed {
                message: "backend unavailable".to_string(),
            })
        }
    }

    struct SlowBackend;

    impl TitleBackend for SlowBackend {
        async fn generate(&self, _context: &Context, _config: &GeneratorConfig) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("never returned".to_string())
        }
    }

    fn context_for(branch: &str, commits: &[&str]) -> Context {
        let filter = NoiseFilter::new().unwrap();
        let branch_ref = filter.filter_branch(branch);
        let commit_tokens: Vec<_> = commits.iter().map(|c| filter.filter_commit(c)).collect();
        ContextBuilder::new(240).build(&branch_ref, &commit_tokens, 20)
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = GeneratorConfig::default().with_temperature(2.0);
        assert!(matches!(
            TitleGenerator::new(config, PatternBackend::new()),
            Err(Error::InvalidTemperature { .. })
        ));
    }

    #[tokio::test]
    async fn test_pattern_backend_is_deterministic() {
        let generator =
            TitleGenerator::new(GeneratorConfig::default(), PatternBackend::new()).unwrap();
        let context = context_for(
            "cursor/CRU-310-fix-bottle-stuck-issue-with-remediation-f8b5",
            &["Block remediation system implementation", "test improvements"],
        );

        let first = generator.generate_title(&context).await.unwrap();
        let second = generator.generate_title(&context).await.unwrap();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[tokio::test]
    async fn test_fix_hint_selects_fix_action() {
        let generator =
            TitleGenerator::new(GeneratorConfig::default(), PatternBackend::new()).unwrap();
        let context = context_for("fix/JIRA-1-cache-eviction", &["fix: evict stale entries"]);

        let title = generator.generate_title(&context).await.unwrap();
        assert!(
            title.starts_with("Fix") || title.starts_with("Resolve") || title.starts_with("Correct"),
            "unexpected title: {title}"
        );
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back_to_template() {
        let generator = TitleGenerator::new(GeneratorConfig::default(), FailingBackend).unwrap();
        let context = context_for("fix/bottle-stuck", &["fix: bottle stuck with remediation"]);

        let title = generator.generate_title(&context).await.unwrap();
        assert!(title.starts_with("Update "));
        assert!(title.contains("remediation"));
    }

    #[tokio::test]
    async fn test_backend_timeout_falls_back_to_template() {
        let config = GeneratorConfig::default().with_timeout_secs(1);
        let generator = TitleGenerator::new(config, SlowBackend).unwrap();
        let context = context_for("fix/bottle-stuck", &["fix: bottle stuck with remediation"]);

        let title = generator.generate_title(&context).await.unwrap();
        assert!(title.starts_with("Update "));
    }

    #[tokio::test]
    async fn test_timeout_with_empty_context_reports_timeout() {
        let config = GeneratorConfig::default().with_timeout_secs(1);
        let generator = TitleGenerator::new(config, SlowBackend).unwrap();
        let context = context_for("", &[]);

        let result = generator.generate_title(&context).await;
        assert!(matches!(result, Err(Error::GenerationTimeout { seconds: 1 })));
    }

    #[tokio::test]
    async fn test_empty_context_has_no_fallback() {
        let generator = TitleGenerator::new(GeneratorConfig::default(), FailingBackend).unwrap();
        let context = context_for("", &[]);

        let result = generator.generate_title(&context).await;
        assert!(matches!(result, Err(Error::GenerationFailed { .. })));
    }

    #[tokio::test]
    async fn test_timeout_fallback_still_postprocesses_cleanly() {
        let config = GeneratorConfig::default().with_timeout_secs(1);
        let generator = TitleGenerator::new(config, SlowBackend).unwrap();
        let context = context_for(
            "cursor/CRU-310-fix-bottle-stuck-issue-with-remediation-f8b5",
            &["Block remediation system implementation"],
        );

        let candidate = generator.generate_title(&context).await.unwrap();
        let title = postprocess::process(&candidate, context.ticket.as_deref(), 50);

        assert!(!title.is_empty());
        assert!(title.len() <= 50);
        assert!(title.starts_with("CRU-310: "));
    }

    #[tokio::test]
    async fn test_end_to_end_example() {
        let generator =
            TitleGenerator::new(GeneratorConfig::default(), PatternBackend::new()).unwrap();
        let context = context_for(
            "cursor/CRU-310-fix-bottle-stuck-issue-with-remediation-f8b5",
            &["Block remediation system implementation", "test improvements"],
        );

        assert_eq!(context.ticket.as_deref(), Some("CRU-310"));

        let candidate = generator.generate_title(&context).await.unwrap();
        let title = postprocess::process(&candidate, context.ticket.as_deref(), 50);

        assert!(title.starts_with("CRU-310: "));
        assert!(title.len() <= 50);
    }

    #[tokio::test]
    async fn test_slug_only_degradation_when_no_commits() {
        let generator =
            TitleGenerator::new(GeneratorConfig::default(), PatternBackend::new()).unwrap();
        let context = context_for("fix/bottle-stuck-issue", &[]);

        let candidate = generator.generate_title(&context).await.unwrap();
        let title = postprocess::process(&candidate, None, 50);
        assert!(!title.is_empty());
    }
}
