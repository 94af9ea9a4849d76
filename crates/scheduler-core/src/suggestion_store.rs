use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::Compound;

/// The most recently generated suggestion, held between a `generate` call
/// and the matching `log` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub compound: Compound,
    pub score: f64,
    pub changed_dimension: Option<String>,
    pub reasoning: String,
    pub key: String,
}

/// Holds at most one pending suggestion. The core accepts any
/// implementation of this trait and must not assume file I/O; it is
/// exclusively owned and single-writer per user.
#[async_trait]
pub trait SuggestionStore: Send + Sync {
    async fn save(&self, suggestion: Suggestion) -> anyhow::Result<()>;
    async fn load(&self) -> anyhow::Result<Option<Suggestion>>;
    async fn clear(&self) -> anyhow::Result<()>;
}

/// In-memory variant, the primary vehicle for tests.
#[derive(Default)]
pub struct InMemorySuggestionStore {
    slot: RwLock<Option<Suggestion>>,
}

#[async_trait]
impl SuggestionStore for InMemorySuggestionStore {
    async fn save(&self, suggestion: Suggestion) -> anyhow::Result<()> {
        *self.slot.write().await = Some(suggestion);
        Ok(())
    }

    async fn load(&self) -> anyhow::Result<Option<Suggestion>> {
        Ok(self.slot.read().await.clone())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        *self.slot.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sample_suggestion() -> Suggestion {
        let mut values = BTreeMap::new();
        values.insert(
            "scale".to_string(),
            crate::domain::Signature::Scale {
                name: "pentatonic_minor".to_string(),
            },
        );
        Suggestion {
            compound: Compound::new(values),
            score: 1.0,
            changed_dimension: None,
            reasoning: "Building foundation".to_string(),
            key: "C".to_string(),
        }
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = InMemorySuggestionStore::default();
        assert!(store.load().await.unwrap().is_none());
        store.save(sample_suggestion()).await.unwrap();
        assert!(store.load().await.unwrap().is_some());
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
