//! Bounded retry around a single scenario attempt.
use super::error::HarnessError;

pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Retry budget and classification switch for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Also retry contract violations, not just transport failures.
    pub retry_contract_violations: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_contract_violations: false,
        }
    }
}

/// Final attempt result plus how many attempts were made.
#[derive(Debug)]
pub struct Attempted<T> {
    pub result: Result<T, HarnessError>,
    pub attempts: u32,
}

impl RetryPolicy {
    pub fn is_retryable(&self, err: &HarnessError) -> bool {
        match err {
            HarnessError::Transport(_) => true,
            HarnessError::ContractViolation(_) => self.retry_contract_violations,
            HarnessError::Configuration(_) | HarnessError::PrerequisiteUnmet(_) => false,
        }
    }

    /// Invoke `attempt` (1-based attempt number) until it succeeds, fails
    /// terminally, or the retry budget is spent.
    pub fn run<T, F>(&self, scenario: &str, mut attempt: F) -> Attempted<T>
    where
        F: FnMut(u32) -> Result<T, HarnessError>,
    {
        let max_attempts = self.max_retries.saturating_add(1);
        let mut attempts = 0_u32;
        loop {
            attempts += 1;
            let result = attempt(attempts);
            let retry = match &result {
                Ok(_) => false,
                Err(err) => attempts < max_attempts && self.is_retryable(err),
            };
            if !retry {
                return Attempted { result, attempts };
            }
            if let Err(err) = &result {
                tracing::warn!(
                    scenario,
                    attempt = attempts + 1,
                    max_attempts,
                    error = %err,
                    "retrying scenario"
                );
            }
        }
    }
}
