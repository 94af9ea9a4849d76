//! Enumerates every compound reachable from a practiced compound under
//! the 1-dimension-change rule, scores each, and narrows the result to
//! compounds within one dimension change of the current compound.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::Settings;
use crate::dimensions::{Dimension, DimensionRegistry};
use crate::domain::{count_dimension_changes, Compound, CompoundStats};
use crate::scoring::{self, RelatedReadiness};

#[derive(Debug, Clone)]
pub struct Candidate {
    pub compound: Compound,
    pub score: f64,
    /// The practiced compound this candidate was generated from. `None`
    /// only for the all-entry-point fallback with no practice history.
    pub source: Option<Compound>,
    pub changed_dimension: Option<String>,
}

pub struct GeneratorInput<'a> {
    pub registry: &'a DimensionRegistry,
    pub settings: &'a Settings,
    pub current: &'a Compound,
    pub all_stats: &'a [CompoundStats],
    pub current_session: u64,
    /// Most-recently-changed dimensions first; only the last 3 matter.
    pub recent_changed_dimensions: &'a [String],
    pub unlocked_dimensions: &'a HashSet<String>,
}

fn all_entry_point_compound(registry: &DimensionRegistry) -> Compound {
    let mut values = BTreeMap::new();
    values.insert("scale".to_string(), registry.scale().entry_point());
    values.insert("position".to_string(), registry.position().entry_point());
    values.insert("rhythm".to_string(), registry.rhythm().entry_point());
    values.insert(
        "note-pattern".to_string(),
        registry.note_pattern().entry_point(),
    );
    values.insert(
        "articulation".to_string(),
        registry.articulation().entry_point(),
    );
    Compound::new(values)
}

fn related_readiness(candidate_id: &str, candidate: &Compound, all_stats: &[CompoundStats]) -> Vec<RelatedReadiness> {
    all_stats
        .iter()
        .filter(|s| s.compound_id != candidate_id)
        .filter_map(|s| {
            let other = Compound::parse_compound_id(&s.compound_id).ok()?;
            let dim = crate::domain::changed_dimension(candidate, &other)?;
            Some(RelatedReadiness {
                ema_npm: s.ema_npm,
                changed_dimension: dim,
            })
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn score_and_push(
    out: &mut Vec<Candidate>,
    compound: Compound,
    source: Compound,
    changed_dimension: Option<String>,
    input: &GeneratorInput,
    by_id: &HashMap<&str, &CompoundStats>,
    current_stats: Option<&CompoundStats>,
    source_stats: &CompoundStats,
) {
    let candidate_id = compound.compound_id();
    let candidate_stats = by_id.get(candidate_id.as_str()).copied();
    let related = related_readiness(&candidate_id, &compound, input.all_stats);

    let mut score = scoring::score_candidate(
        &compound,
        changed_dimension.as_deref(),
        input.current,
        current_stats,
        candidate_stats,
        &related,
        input.current_session,
        input.recent_changed_dimensions,
        input.settings.progression.expansion_npm,
        input.settings,
    );

    let sessions_since_practice = input
        .current_session
        .saturating_sub(source_stats.last_practiced_session.unwrap_or(input.current_session));
    score += scoring::recency_boost(input.all_stats.len(), sessions_since_practice);
    score += scoring::struggling_boost(source_stats.struggling_streak);

    out.push(Candidate {
        compound,
        score,
        source: Some(source),
        changed_dimension,
    });
}

pub fn generate(input: &GeneratorInput) -> Vec<Candidate> {
    if input.all_stats.is_empty() {
        return vec![Candidate {
            compound: all_entry_point_compound(input.registry),
            score: 1.0,
            source: None,
            changed_dimension: None,
        }];
    }

    let by_id: HashMap<&str, &CompoundStats> = input
        .all_stats
        .iter()
        .map(|s| (s.compound_id.as_str(), s))
        .collect();
    let current_stats = by_id.get(input.current.compound_id().as_str()).copied();

    let mut raw = Vec::new();

    for p_stats in input.all_stats.iter().filter(|s| s.attempts > 0) {
        let Ok(p) = Compound::parse_compound_id(&p_stats.compound_id) else {
            continue;
        };

        if !p_stats.is_mastered {
            score_and_push(
                &mut raw,
                p.clone(),
                p.clone(),
                None,
                input,
                &by_id,
                current_stats,
                p_stats,
            );
        }

        if p_stats.has_expanded {
            for dim in ["scale", "position", "rhythm"] {
                let Some(value) = p.get(dim) else { continue };
                let Some(dimension) = input.registry.by_name(dim) else {
                    continue;
                };
                for neighbor in dimension.neighbors(value) {
                    let candidate_compound = p.with_value(dim, neighbor);
                    let candidate_id = candidate_compound.compound_id();
                    let candidate_mastered = by_id
                        .get(candidate_id.as_str())
                        .map(|s| s.is_mastered)
                        .unwrap_or(false);
                    if candidate_mastered {
                        continue;
                    }
                    score_and_push(
                        &mut raw,
                        candidate_compound,
                        p.clone(),
                        Some(dim.to_string()),
                        input,
                        &by_id,
                        current_stats,
                        p_stats,
                    );
                }
            }
        }

        for dim in input.registry.gated_names() {
            if !input.unlocked_dimensions.contains(dim) {
                continue;
            }
            let Some(value) = p.get(dim) else { continue };
            let Some(dimension) = input.registry.by_name(dim) else {
                continue;
            };
            for neighbor in dimension.neighbors(value) {
                let candidate_compound = p.with_value(dim, neighbor);
                score_and_push(
                    &mut raw,
                    candidate_compound,
                    p.clone(),
                    Some(dim.to_string()),
                    input,
                    &by_id,
                    current_stats,
                    p_stats,
                );
            }
        }
    }

    // Dedup by compound id, keeping the maximum score.
    let mut best: HashMap<String, Candidate> = HashMap::new();
    for candidate in raw {
        let id = candidate.compound.compound_id();
        match best.get(&id) {
            Some(existing) if existing.score >= candidate.score => {}
            _ => {
                best.insert(id, candidate);
            }
        }
    }

    let within_one_change: Vec<Candidate> = best
        .into_values()
        .filter(|c| count_dimension_changes(input.current, &c.compound) <= 1)
        .collect();

    if within_one_change.is_empty() {
        return vec![Candidate {
            compound: all_entry_point_compound(input.registry),
            score: 1.0,
            source: None,
            changed_dimension: None,
        }];
    }

    within_one_change
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_history_yields_a_single_entry_point_candidate() {
        let registry = DimensionRegistry::with_defaults();
        let settings = Settings::default();
        let current = all_entry_point_compound(&registry);
        let recent = vec![];
        let unlocked = HashSet::new();
        let input = GeneratorInput {
            registry: &registry,
            settings: &settings,
            current: &current,
            all_stats: &[],
            current_session: 0,
            recent_changed_dimensions: &recent,
            unlocked_dimensions: &unlocked,
        };
        let candidates = generate(&input);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].compound, current);
        assert_eq!(candidates[0].score, 1.0);
    }

    #[test]
    fn every_candidate_is_within_one_dimension_change_of_current() {
        let registry = DimensionRegistry::with_defaults();
        let settings = Settings::default();
        let current = all_entry_point_compound(&registry);
        let mut stats = CompoundStats::new(current.compound_id());
        stats.attempts = 1;
        stats.has_expanded = true;
        stats.ema_npm = 420.0;
        stats.last_practiced_session = Some(1);
        let all_stats = vec![stats];
        let recent = vec![];
        let unlocked = HashSet::new();
        let input = GeneratorInput {
            registry: &registry,
            settings: &settings,
            current: &current,
            all_stats: &all_stats,
            current_session: 1,
            recent_changed_dimensions: &recent,
            unlocked_dimensions: &unlocked,
        };
        let candidates = generate(&input);
        assert!(!candidates.is_empty());
        for c in &candidates {
            assert!(count_dimension_changes(&current, &c.compound) <= 1);
        }
    }
}
