//! Auto-summarize trigger policy

use crate::config::SummaryConfig;

/// When to summarize and how much of the conversation to include
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoSummarizePolicy {
    /// Fire whenever the log length is a positive multiple of this
    pub every: usize,
    /// Trailing turns handed to the summarizer
    pub window: usize,
}

impl AutoSummarizePolicy {
    pub fn new(every: usize, window: usize) -> Self {
        Self { every, window }
    }

    /// Whether a log of `len` turns is due for a digest.
    /// A zero period disables the trigger.
    pub fn is_due(&self, len: usize) -> bool {
        self.every > 0 && len >= self.every && len % self.every == 0
    }
}

impl Default for AutoSummarizePolicy {
    fn default() -> Self {
        Self::new(10, 10)
    }
}

impl From<&SummaryConfig> for AutoSummarizePolicy {
    fn from(config: &SummaryConfig) -> Self {
        Self::new(config.every, config.window)
    }
}

/// Stateful wrapper that fires at most once for each length reached
#[derive(Debug, Clone, Default)]
pub struct SummaryTrigger {
    policy: AutoSummarizePolicy,
    last_fired: Option<usize>,
}

impl SummaryTrigger {
    pub fn new(policy: AutoSummarizePolicy) -> Self {
        Self {
            policy,
            last_fired: None,
        }
    }

    pub fn policy(&self) -> AutoSummarizePolicy {
        self.policy
    }

    /// Evaluate the trigger for the current log length.
    /// Call only after an assistant turn has been appended.
    pub fn check(&mut self, len: usize) -> bool {
        if !self.policy.is_due(len) || self.last_fired == Some(len) {
            return false;
        }
        self.last_fired = Some(len);
        true
    }

    /// Forget previous firings (the log was reset)
    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}
