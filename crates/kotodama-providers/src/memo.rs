//! Process-lifetime memo of models that reject a custom sampling temperature.
//!
//! The set only grows. A lost update under a race costs one redundant
//! rejected attempt, never a wrong answer.

use std::collections::HashSet;

use parking_lot::RwLock;

/// Remembers which models must be called with the vendor's default temperature.
pub trait TemperatureMemo: Send + Sync {
    /// Whether `model` is known to reject a custom temperature.
    fn is_unsupported(&self, model: &str) -> bool;

    /// Record that `model` rejected a custom temperature.
    fn mark_unsupported(&self, model: &str);
}

/// In-memory [`TemperatureMemo`], shared across requests via `Arc`.
#[derive(Debug, Default)]
pub struct InMemoryTemperatureMemo {
    models: RwLock<HashSet<String>>,
}

impl InMemoryTemperatureMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything (tests).
    pub fn clear(&self) {
        self.models.write().clear();
    }

    pub fn len(&self) -> usize {
        self.models.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.read().is_empty()
    }
}

impl TemperatureMemo for InMemoryTemperatureMemo {
    fn is_unsupported(&self, model: &str) -> bool {
        self.models.read().contains(model)
    }

    fn mark_unsupported(&self, model: &str) {
        self.models.write().insert(model.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_mark_and_query() {
        let memo = InMemoryTemperatureMemo::new();
        assert!(!memo.is_unsupported("gpt-4o"));
        memo.mark_unsupported("gpt-4o");
        memo.mark_unsupported("gpt-4o");
        assert!(memo.is_unsupported("gpt-4o"));
        assert!(!memo.is_unsupported("gpt-4o-mini"));
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_clear() {
        let memo = InMemoryTemperatureMemo::new();
        memo.mark_unsupported("o1-preview");
        memo.clear();
        assert!(memo.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_marks() {
        let memo = Arc::new(InMemoryTemperatureMemo::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let memo = Arc::clone(&memo);
            handles.push(tokio::spawn(async move {
                memo.mark_unsupported(&format!("model-{}", i % 4));
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(memo.len(), 4);
    }
}
