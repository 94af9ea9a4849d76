mod common;

use scheduler_core::domain::Compound;
use scheduler_core::ports::PracticeEntryUpdate;
use scheduler_core::{Repository, SchedulerError};

use common::{seeded_rand_unit, setup_engine_with_repo};

#[tokio::test]
async fn edit_practice_entry_rebuilds_derived_stats() {
    let (engine, repo) = setup_engine_with_repo();
    let mut rand_unit = seeded_rand_unit(7);

    let suggestion = engine.generate_compound_suggestion(&mut rand_unit).await.unwrap();
    let entry = engine
        .log_compound_practice(&suggestion.compound, 210, None)
        .await
        .unwrap();

    engine
        .edit_practice_entry(
            entry.id,
            PracticeEntryUpdate {
                scale: entry.scale.clone(),
                position: entry.position.clone(),
                rhythm: entry.rhythm.clone(),
                rhythm_pattern: entry.rhythm_pattern.clone(),
                note_pattern: entry.note_pattern.clone(),
                articulation: entry.articulation.clone(),
                key: entry.key.clone(),
                bpm: 300,
                npm: 600,
                reasoning: entry.reasoning.clone(),
            },
        )
        .await
        .unwrap();

    let edited = repo.get_practice_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(edited.npm, 600);

    let stats = repo.get_all_compound_stats().await.unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].best_npm, 600, "rebuild must replay the edited npm");
}

#[tokio::test]
async fn edit_nonexistent_practice_entry_is_a_missing_precondition() {
    let (engine, _repo) = setup_engine_with_repo();
    let err = engine
        .edit_practice_entry(
            999,
            PracticeEntryUpdate {
                scale: "pentatonic_minor".to_string(),
                position: "E".to_string(),
                rhythm: "8ths".to_string(),
                rhythm_pattern: "xx".to_string(),
                note_pattern: None,
                articulation: None,
                key: "C".to_string(),
                bpm: 210,
                npm: 420,
                reasoning: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulerError::MissingPrecondition(_)));
}

#[tokio::test]
async fn delete_practice_entry_rebuilds_derived_stats() {
    let (engine, repo) = setup_engine_with_repo();
    let mut rand_unit = seeded_rand_unit(9);

    let first = engine.generate_compound_suggestion(&mut rand_unit).await.unwrap();
    let entry = engine
        .log_compound_practice(&first.compound, 210, None)
        .await
        .unwrap();
    let second = engine.generate_compound_suggestion(&mut rand_unit).await.unwrap();
    engine.log_compound_practice(&second.compound, 210, None).await.unwrap();

    engine.delete_practice_entry(entry.id).await.unwrap();

    assert!(repo.get_practice_by_id(entry.id).await.unwrap().is_none());
    assert_eq!(repo.get_total_practice_count().await.unwrap(), 1);
}

#[tokio::test]
async fn delete_nonexistent_practice_entry_is_a_missing_precondition() {
    let (engine, _repo) = setup_engine_with_repo();
    let err = engine.delete_practice_entry(999).await.unwrap_err();
    assert!(matches!(err, SchedulerError::MissingPrecondition(_)));
}

#[tokio::test]
async fn log_last_suggestion_logs_the_pending_compound() {
    let (engine, repo) = setup_engine_with_repo();
    let mut rand_unit = seeded_rand_unit(3);

    let suggestion = engine.generate_compound_suggestion(&mut rand_unit).await.unwrap();
    let entry = engine.log_last_suggestion(210).await.unwrap();

    assert_eq!(
        Compound::from_practice_entry(&entry).compound_id(),
        suggestion.compound.compound_id()
    );
    assert_eq!(repo.get_total_practice_count().await.unwrap(), 1);
}

#[tokio::test]
async fn log_last_suggestion_with_no_pending_suggestion_is_a_missing_precondition() {
    let (engine, _repo) = setup_engine_with_repo();
    let err = engine.log_last_suggestion(210).await.unwrap_err();
    assert!(matches!(err, SchedulerError::MissingPrecondition(_)));
}
