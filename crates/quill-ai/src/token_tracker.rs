//! Token usage accounting for a conversation.

use std::collections::HashMap;

use crate::TokenUsage;

/// Cumulative token usage per provider.
///
/// Streaming calls report no usage; they are counted in
/// [`unreported_calls`](TokenTracker::unreported_calls) so totals can be
/// read as a lower bound.
#[derive(Debug, Clone, Default)]
pub struct TokenTracker {
    total: TokenUsage,
    by_provider: HashMap<String, TokenUsage>,
    call_count: u64,
    unreported_calls: u64,
}

impl TokenTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed call.
    pub fn record(&mut self, provider: &str, usage: Option<&TokenUsage>) {
        self.call_count += 1;

        let Some(usage) = usage else {
            self.unreported_calls += 1;
            return;
        };

        accumulate(&mut self.total, usage);
        accumulate(
            self.by_provider.entry(provider.to_string()).or_default(),
            usage,
        );
    }

    pub fn total(&self) -> &TokenUsage {
        &self.total
    }

    pub fn for_provider(&self, provider: &str) -> Option<&TokenUsage> {
        self.by_provider.get(provider)
    }

    pub fn call_count(&self) -> u64 {
        self.call_count
    }

    /// Calls whose backend reported no usage.
    pub fn unreported_calls(&self) -> u64 {
        self.unreported_calls
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn accumulate(into: &mut TokenUsage, usage: &TokenUsage) {
    into.prompt_tokens = into.prompt_tokens.saturating_add(usage.prompt_tokens);
    into.completion_tokens = into
        .completion_tokens
        .saturating_add(usage.completion_tokens);
    into.total_tokens = into.total_tokens.saturating_add(usage.total_tokens);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_per_provider_and_total() {
        let mut tracker = TokenTracker::new();
        tracker.record("anthropic", Some(&TokenUsage::from_counts(10, 5)));
        tracker.record("openai", Some(&TokenUsage::from_counts(3, 4)));
        tracker.record("anthropic", Some(&TokenUsage::from_counts(1, 1)));

        assert_eq!(tracker.call_count(), 3);
        assert_eq!(tracker.total().total_tokens, 24);
        let anthropic = tracker.for_provider("anthropic").unwrap();
        assert_eq!(anthropic.prompt_tokens, 11);
        assert_eq!(anthropic.completion_tokens, 6);
        assert!(tracker.for_provider("deepseek").is_none());
    }

    #[test]
    fn missing_usage_counts_as_unreported() {
        let mut tracker = TokenTracker::new();
        tracker.record("openai", None);
        assert_eq!(tracker.call_count(), 1);
        assert_eq!(tracker.unreported_calls(), 1);
        assert_eq!(tracker.total(), &TokenUsage::default());
        assert!(tracker.for_provider("openai").is_none());
    }

    #[test]
    fn reported_total_is_kept_as_given() {
        let mut tracker = TokenTracker::new();
        let usage = TokenUsage {
            prompt_tokens: 2,
            completion_tokens: 2,
            total_tokens: 7,
        };
        tracker.record("deepseek", Some(&usage));
        assert_eq!(tracker.total().total_tokens, 7);
    }

    #[test]
    fn reset_clears_everything() {
        let mut tracker = TokenTracker::new();
        tracker.record("openai", Some(&TokenUsage::from_counts(1, 2)));
        tracker.record("openai", None);
        tracker.reset();
        assert_eq!(tracker.call_count(), 0);
        assert_eq!(tracker.unreported_calls(), 0);
        assert_eq!(tracker.total().total_tokens, 0);
    }
}
