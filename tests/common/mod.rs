// tests/common/mod.rs
use std::sync::Arc;

use scheduler::{DimensionRegistry, Engine, InMemoryRepository, Settings};
use scheduler_core::suggestion_store::InMemorySuggestionStore;

/// A fresh `Engine` wired to an in-memory repository and suggestion
/// store, with default dimensions and settings. Each test gets its own
/// isolated state.
pub fn setup_engine() -> Engine {
    setup_engine_with_repo().0
}

/// Like `setup_engine`, but also hands back the repository so a test can
/// inspect persisted state directly (e.g. after edit/delete).
pub fn setup_engine_with_repo() -> (Engine, Arc<InMemoryRepository>) {
    let repo = Arc::new(InMemoryRepository::default());
    let engine = Engine::new(
        repo.clone(),
        Arc::new(InMemorySuggestionStore::default()),
        DimensionRegistry::with_defaults(),
        Settings::default(),
    );
    (engine, repo)
}

/// A seeded linear congruential generator exposed as a `rand_unit`
/// closure, so suggestion selection is reproducible across test runs.
pub fn seeded_rand_unit(mut seed: u64) -> impl FnMut() -> f64 {
    move || {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((seed >> 11) as f64) / (u64::MAX >> 11) as f64
    }
}
