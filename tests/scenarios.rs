mod common;

use scheduler_core::domain::{count_dimension_changes, Signature};

use common::{seeded_rand_unit, setup_engine};

#[tokio::test]
async fn scenario_1_entry_point_with_no_history() {
    let engine = setup_engine();
    let mut rand_unit = seeded_rand_unit(1);

    let suggestion = engine.generate_compound_suggestion(&mut rand_unit).await.unwrap();

    assert_eq!(
        suggestion.compound.get("scale"),
        Some(&Signature::Scale {
            name: "pentatonic_minor".to_string()
        })
    );
    assert_eq!(
        suggestion.compound.get("position"),
        Some(&Signature::Position { name: "E".to_string() })
    );
    assert_eq!(
        suggestion.compound.get("rhythm"),
        Some(&Signature::Rhythm {
            name: "8ths".to_string(),
            pattern: "xx".to_string()
        })
    );
    assert_eq!(
        suggestion.compound.get("note-pattern"),
        Some(&Signature::NotePattern {
            name: "stepwise".to_string()
        })
    );
    assert!(suggestion.reasoning.contains("Building foundation"));
    assert!(["C", "G", "D", "A", "E", "Am", "Em"].contains(&suggestion.key.as_str()));
}

#[tokio::test]
async fn scenario_2_expansion_unlocks_tier_0_scale_neighbor_only() {
    let engine = setup_engine();
    let mut rand_unit = seeded_rand_unit(2);

    let first = engine.generate_compound_suggestion(&mut rand_unit).await.unwrap();
    let logged = engine
        .log_compound_practice(&first.compound, 210, None)
        .await
        .unwrap();
    assert_eq!(logged.npm, 420);

    let next = engine.generate_compound_suggestion(&mut rand_unit).await.unwrap();
    assert!(count_dimension_changes(&first.compound, &next.compound) <= 1);

    // `minor` is a tier-0 scale neighbor of `pentatonic_minor`; a
    // position change away from `E` would be 2 dimension changes and
    // must never appear as the sole difference alongside a scale change.
    if let Some(Signature::Scale { name }) = next.compound.get("scale") {
        if name == "minor" {
            assert_eq!(
                next.compound.get("position"),
                Some(&Signature::Position { name: "E".to_string() })
            );
        }
    }
}

#[tokio::test]
async fn scenario_3_mastery_latches_and_excludes_from_stay() {
    let engine = setup_engine();
    let mut rand_unit = seeded_rand_unit(3);

    let suggestion = engine.generate_compound_suggestion(&mut rand_unit).await.unwrap();
    let compound = suggestion.compound.clone();

    for _ in 0..3 {
        engine.log_compound_practice(&compound, 250, None).await.unwrap();
    }

    // A 4th log at a much lower BPM must not un-master the compound.
    engine.log_compound_practice(&compound, 100, None).await.unwrap();

    let next = engine.generate_compound_suggestion(&mut rand_unit).await.unwrap();
    // The mastered compound must never be proposed as a STAY candidate
    // (a candidate identical to itself with no dimension change).
    if next.compound.compound_id() == compound.compound_id() {
        assert!(next.changed_dimension.is_some());
    }
}

#[tokio::test]
async fn scenario_4_one_change_invariant_holds_over_a_long_run() {
    let engine = setup_engine();
    let mut rand_unit = seeded_rand_unit(4);
    let mut bpm_seed = seeded_rand_unit(40);

    let mut prev_logged = engine
        .generate_compound_suggestion(&mut rand_unit)
        .await
        .unwrap()
        .compound;

    for _ in 0..100 {
        let bpm = 60 + (bpm_seed() * 60.0) as u32;
        engine.log_compound_practice(&prev_logged, bpm.max(1), None).await.unwrap();
        let suggestion = engine.generate_compound_suggestion(&mut rand_unit).await.unwrap();
        assert!(count_dimension_changes(&prev_logged, &suggestion.compound) <= 1);
        prev_logged = suggestion.compound;
    }
}

#[tokio::test]
async fn scenario_5_streak_with_freeze() {
    use chrono::NaiveDate;
    use scheduler_core::ports::Repository;

    let repository = scheduler_storage::InMemoryRepository::default();

    let mut streak = repository.get_streak_info().await.unwrap();
    streak.update(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    repository
        .update_streak_data(streak.current_streak, streak.longest_streak, streak.last_practice_date, streak.streak_freezes)
        .await
        .unwrap();
    assert_eq!(streak.current_streak, 1);

    let mut streak = repository.get_streak_info().await.unwrap();
    streak.update(NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
    repository
        .update_streak_data(streak.current_streak, streak.longest_streak, streak.last_practice_date, streak.streak_freezes)
        .await
        .unwrap();
    assert_eq!(streak.current_streak, 2);

    repository.add_streak_freezes(1).await.unwrap();

    let mut streak = repository.get_streak_info().await.unwrap();
    streak.update(NaiveDate::from_ymd_opt(2024, 1, 18).unwrap());
    repository
        .update_streak_data(streak.current_streak, streak.longest_streak, streak.last_practice_date, streak.streak_freezes)
        .await
        .unwrap();
    assert_eq!(streak.current_streak, 3);
    assert_eq!(streak.streak_freezes, 0);

    let mut streak = repository.get_streak_info().await.unwrap();
    streak.update(NaiveDate::from_ymd_opt(2024, 1, 21).unwrap());
    repository
        .update_streak_data(streak.current_streak, streak.longest_streak, streak.last_practice_date, streak.streak_freezes)
        .await
        .unwrap();
    assert_eq!(streak.current_streak, 1);
    assert_eq!(streak.longest_streak, 3);
}

#[tokio::test]
async fn scenario_6_note_pattern_unlocks_at_requirement_one() {
    use std::sync::Arc;

    use scheduler_core::ports::Repository;
    use scheduler_core::suggestion_store::InMemorySuggestionStore;
    use scheduler_core::{DimensionRegistry, Engine, Settings};
    use scheduler_storage::InMemoryRepository;

    let repository = Arc::new(InMemoryRepository::default());
    let engine = Engine::new(
        repository.clone(),
        Arc::new(InMemorySuggestionStore::default()),
        DimensionRegistry::with_defaults(),
        Settings::default(),
    );
    let mut rand_unit = seeded_rand_unit(6);

    assert!(!repository.is_dimension_unlocked("note-pattern").await.unwrap());

    let first = engine.generate_compound_suggestion(&mut rand_unit).await.unwrap();
    engine.log_compound_practice(&first.compound, 210, None).await.unwrap();

    assert!(repository.is_dimension_unlocked("note-pattern").await.unwrap());

    // A later `generate` call is now free to vary note-pattern even on
    // a second compound that hasn't itself expanded yet.
    let second = engine.generate_compound_suggestion(&mut rand_unit).await.unwrap();
    engine.log_compound_practice(&second.compound, 210, None).await.unwrap();
    let third = engine.generate_compound_suggestion(&mut rand_unit).await.unwrap();

    // No assertion of certainty that note-pattern varies on this exact
    // call (selection is probabilistic); this asserts the invariant
    // that whenever it does vary, it's within the one-change budget.
    assert!(count_dimension_changes(&second.compound, &third.compound) <= 1);
}
