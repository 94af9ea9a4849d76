//! Four-component candidate scoring. Every function here is pure and
//! synchronous; the generator supplies already-fetched snapshots.

use crate::config::Settings;
use crate::domain::{compounds_equal, Compound, CompoundStats};

/// One related compound's readiness signal: its EMA and which dimension
/// differs from the candidate being scored.
pub struct RelatedReadiness {
    pub ema_npm: f64,
    pub changed_dimension: String,
}

/// Only nonzero for a STAY candidate (`candidate == current`).
fn consolidation(candidate: &Compound, current: &Compound, current_stats: Option<&CompoundStats>) -> f64 {
    if !compounds_equal(candidate, current) {
        return 0.0;
    }
    match current_stats {
        Some(s) if s.is_mastered => 0.0,
        Some(s) if s.has_expanded => 0.2,
        _ => 1.0,
    }
}

/// 1.0 when the candidate has never been practiced (maximally stale);
/// otherwise a ratio of sessions elapsed since last practice, clamped
/// to 1.
fn staleness(candidate_stats: Option<&CompoundStats>, current_session: u64, staleness_sessions: u32) -> f64 {
    let Some(last) = candidate_stats.and_then(|s| s.last_practiced_session) else {
        return 1.0;
    };
    let elapsed = current_session.saturating_sub(last) as f64;
    (elapsed / staleness_sessions as f64).min(1.0)
}

/// Estimated readiness in [0, 1]: direct EMA ratio if the candidate has
/// been attempted, otherwise transferred from related compounds, else a
/// flat prior of 0.3.
fn readiness(
    candidate_stats: Option<&CompoundStats>,
    related: &[RelatedReadiness],
    expansion_npm: u32,
    settings: &Settings,
) -> f64 {
    if let Some(s) = candidate_stats {
        if s.attempts > 0 {
            return (s.ema_npm / expansion_npm as f64).min(1.0);
        }
    }
    if related.is_empty() {
        return 0.3;
    }
    let mean_transferred: f64 = related
        .iter()
        .map(|r| r.ema_npm * settings.compound_scoring.transfer_coefficient(&r.changed_dimension))
        .sum::<f64>()
        / related.len() as f64;
    (mean_transferred / expansion_npm as f64).min(1.0)
}

/// 0 for STAY. For a dimension change, 0 if that dimension appears in
/// the lookback-3 recent-changes list, else 0.5.
fn diversity(changed_dimension: Option<&str>, recent_changed_dimensions: &[String]) -> f64 {
    let Some(dim) = changed_dimension else {
        return 0.0;
    };
    let lookback = recent_changed_dimensions.iter().rev().take(3);
    if lookback.clone().any(|d| d == dim) {
        0.0
    } else {
        0.5
    }
}

/// Weighted sum of the four components, per the configured weights.
#[allow(clippy::too_many_arguments)]
pub fn score_candidate(
    candidate: &Compound,
    changed_dimension: Option<&str>,
    current: &Compound,
    current_stats: Option<&CompoundStats>,
    candidate_stats: Option<&CompoundStats>,
    related: &[RelatedReadiness],
    current_session: u64,
    recent_changed_dimensions: &[String],
    expansion_npm: u32,
    settings: &Settings,
) -> f64 {
    let c = consolidation(candidate, current, current_stats);
    let s = staleness(candidate_stats, current_session, settings.compound_scoring.staleness_sessions);
    let r = readiness(candidate_stats, related, expansion_npm, settings);
    let d = diversity(changed_dimension, recent_changed_dimensions);

    c * settings.compound_scoring.consolidation_weight
        + s * settings.compound_scoring.staleness_weight
        + r * settings.compound_scoring.readiness_weight
        + d * settings.compound_scoring.diversity_weight
}

/// Additive recency boost applied by the generator, before dedup. Zero
/// when fewer than three compounds have been practiced.
pub fn recency_boost(total_practiced_compounds: usize, sessions_since_practice: u64) -> f64 {
    if total_practiced_compounds <= 2 {
        return 0.0;
    }
    (sessions_since_practice as f64 / 10.0).min(0.5)
}

/// Additive struggling boost applied by the generator, before dedup.
pub fn struggling_boost(source_struggling_streak: u32) -> f64 {
    if source_struggling_streak > 0 {
        0.5
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn compound(scale: &str) -> Compound {
        let mut values = BTreeMap::new();
        values.insert(
            "scale".to_string(),
            crate::domain::Signature::Scale { name: scale.to_string() },
        );
        Compound::new(values)
    }

    #[test]
    fn consolidation_only_applies_to_stay_and_zero_when_mastered() {
        let settings = Settings::default();
        let current = compound("pentatonic_minor");
        let mastered = CompoundStats {
            is_mastered: true,
            ..CompoundStats::new("x")
        };
        let score = score_candidate(
            &current,
            None,
            &current,
            Some(&mastered),
            None,
            &[],
            1,
            &[],
            400,
            &settings,
        );
        // consolidation=0, staleness=1 (never attempted as candidate itself has no stats passed), readiness=0.3, diversity=0
        assert!((score - (1.0 * 0.8 + 0.3 * 0.6)).abs() < 1e-9);
    }

    #[test]
    fn diversity_is_zero_for_recently_changed_dimensions() {
        let settings = Settings::default();
        let recent = vec!["scale".to_string()];
        assert_eq!(diversity(Some("scale"), &recent), 0.0);
        assert_eq!(diversity(Some("position"), &recent), 0.5);
        let _ = settings;
    }

    #[test]
    fn readiness_falls_back_to_flat_prior_with_no_data() {
        let settings = Settings::default();
        assert_eq!(readiness(None, &[], 400, &settings), 0.3);
    }
}
