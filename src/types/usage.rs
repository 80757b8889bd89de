//! Token usage accounting.

use serde::{Deserialize, Serialize};

/// Token usage for one or more model calls.
///
/// `total_tokens` always equals `prompt_tokens + completion_tokens`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl Usage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    /// Merge another usage into this one (accumulate).
    pub fn merge(&mut self, other: &Usage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens = self.prompt_tokens + self.completion_tokens;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_total_consistent() {
        let mut total = Usage::default();
        total.merge(&Usage::new(10, 5));
        total.merge(&Usage::new(7, 3));
        assert_eq!(total, Usage::new(17, 8));
        assert_eq!(total.total_tokens, 25);
    }
}
