//! File-backed pending-suggestion slot, for hosts that run the engine as
//! a short-lived CLI process rather than a long-running service (where
//! `InMemorySuggestionStore` would lose the suggestion between
//! invocations).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use scheduler_core::{Suggestion, SuggestionStore};
use tokio::fs;
use tokio::sync::Mutex;

pub struct FileSuggestionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSuggestionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl SuggestionStore for FileSuggestionStore {
    async fn save(&self, suggestion: Suggestion) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let json = serde_json::to_vec_pretty(&suggestion)?;
        fs::write(&self.path, json).await?;
        Ok(())
    }

    async fn load(&self) -> anyhow::Result<Option<Suggestion>> {
        let _guard = self.lock.lock().await;
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear(&self) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sample() -> Suggestion {
        let mut values = BTreeMap::new();
        values.insert(
            "scale".to_string(),
            scheduler_core::domain::Signature::Scale {
                name: "pentatonic_minor".to_string(),
            },
        );
        Suggestion {
            compound: scheduler_core::domain::Compound::new(values),
            score: 1.0,
            changed_dimension: None,
            reasoning: "Building foundation".to_string(),
            key: "C".to_string(),
        }
    }

    #[tokio::test]
    async fn save_load_clear_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSuggestionStore::new(dir.path().join("suggestion.json"));
        assert!(store.load().await.unwrap().is_none());
        store.save(sample()).await.unwrap();
        assert_eq!(store.load().await.unwrap().unwrap().key, "C");
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
