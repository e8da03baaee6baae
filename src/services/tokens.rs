//! Token accounting for the embedding service's rate limit.

use std::time::{Duration, Instant};

use tiktoken_rs::CoreBPE;

use crate::error::IngestError;

/// Length of the rate-limit window imposed by the embedding service.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Deterministic token counter matched to the embedding model's encoding.
///
/// The `text-embedding-3-*` family uses the cl100k_base encoding; counting the
/// same text always yields the same estimate, so rate accounting is stable
/// across runs.
pub struct TokenCounter {
    bpe: CoreBPE,
}

impl TokenCounter {
    pub fn new() -> Result<Self, IngestError> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| IngestError::Tokenizer(e.to_string()))?;
        Ok(Self { bpe })
    }

    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }

    pub fn count_batch<'a>(&self, texts: impl IntoIterator<Item = &'a str>) -> usize {
        texts.into_iter().map(|t| self.count(t)).sum()
    }
}

/// Sliding one-minute token window.
///
/// Pure bookkeeping: callers pass in the current instant and perform the
/// actual sleep themselves, which keeps the budget invariant unit-testable
/// without waiting out real windows.
#[derive(Debug)]
pub struct TokenBudget {
    max_tokens_per_window: usize,
    used: usize,
    window_start: Instant,
}

impl TokenBudget {
    pub fn new(max_tokens_per_window: usize, now: Instant) -> Self {
        Self {
            max_tokens_per_window,
            used: 0,
            window_start: now,
        }
    }

    /// Whether submitting `batch_tokens` now would exceed the window budget.
    /// Returns the required wait, `max(window - elapsed, 0)`, if so. The
    /// caller must wait and then call [`reset`](Self::reset) before
    /// submitting.
    pub fn check(&self, batch_tokens: usize, now: Instant) -> Option<Duration> {
        if self.used + batch_tokens <= self.max_tokens_per_window {
            return None;
        }
        let elapsed = now.duration_since(self.window_start);
        Some(RATE_LIMIT_WINDOW.saturating_sub(elapsed))
    }

    /// Start a fresh window after a rate-limit wait.
    pub fn reset(&mut self, now: Instant) {
        self.used = 0;
        self.window_start = now;
    }

    /// Record tokens submitted in the current window.
    pub fn record(&mut self, tokens: usize) {
        self.used += tokens;
    }

    pub fn used(&self) -> usize {
        self.used
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_is_deterministic() {
        let counter = TokenCounter::new().unwrap();
        let text = "The quick brown fox jumps over the lazy dog.";
        let first = counter.count(text);
        let second = counter.count(text);
        assert_eq!(first, second);
        assert!(first > 0);
    }

    #[test]
    fn test_batch_count_is_sum_of_parts() {
        let counter = TokenCounter::new().unwrap();
        let a = "first piece of text";
        let b = "second piece of text";
        assert_eq!(
            counter.count_batch([a, b]),
            counter.count(a) + counter.count(b)
        );
    }

    #[test]
    fn test_budget_allows_up_to_limit() {
        let t0 = Instant::now();
        let mut budget = TokenBudget::new(100, t0);

        assert!(budget.check(60, t0).is_none());
        budget.record(60);
        assert!(budget.check(40, t0).is_none());
        budget.record(40);
        assert_eq!(budget.used(), 100);
    }

    #[test]
    fn test_budget_requires_wait_when_exceeded() {
        let t0 = Instant::now();
        let mut budget = TokenBudget::new(100, t0);
        budget.record(90);

        let wait = budget.check(20, t0 + Duration::from_secs(10));
        assert_eq!(wait, Some(Duration::from_secs(50)));
    }

    #[test]
    fn test_wait_never_negative() {
        let t0 = Instant::now();
        let mut budget = TokenBudget::new(100, t0);
        budget.record(100);

        let wait = budget.check(1, t0 + Duration::from_secs(90));
        assert_eq!(wait, Some(Duration::ZERO));
    }

    #[test]
    fn test_reset_opens_a_new_window() {
        let t0 = Instant::now();
        let mut budget = TokenBudget::new(100, t0);
        budget.record(100);

        let t1 = t0 + Duration::from_secs(61);
        assert!(budget.check(50, t1).is_some());
        budget.reset(t1);
        assert!(budget.check(50, t1).is_none());
        assert_eq!(budget.used(), 0);
    }

    #[test]
    fn test_rolling_window_never_exceeds_budget() {
        // Simulate a batch sequence and assert the invariant: within any
        // single window, recorded tokens stay at or below the budget.
        let t0 = Instant::now();
        let mut budget = TokenBudget::new(100, t0);
        let mut now = t0;
        let mut waits = 0;

        for batch_tokens in [40, 40, 40, 40, 40] {
            if let Some(wait) = budget.check(batch_tokens, now) {
                now += wait;
                budget.reset(now);
                waits += 1;
            }
            budget.record(batch_tokens);
            assert!(budget.used() <= 100);
            now += Duration::from_secs(1);
        }

        // 40+40 fits, the third batch crosses, 40+40 fits, the fifth crosses.
        assert_eq!(waits, 2);
    }
}
