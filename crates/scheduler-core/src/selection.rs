//! Squared-weight random selection over scored candidates. Randomness is
//! never pulled from a global PRNG: every caller supplies a `rand_unit`
//! closure returning a value in `[0, 1)`, so tests can seed it.

use crate::candidates::Candidate;

/// Picks one candidate. Squares every score to sharpen exploitation
/// without eliminating exploration; falls back to a uniform pick if
/// every squared score is zero.
pub fn select<'a>(candidates: &'a [Candidate], rand_unit: &mut dyn FnMut() -> f64) -> &'a Candidate {
    assert!(!candidates.is_empty(), "candidate set must never be empty");

    let weights: Vec<f64> = candidates.iter().map(|c| c.score * c.score).collect();
    let total: f64 = weights.iter().sum();

    if total <= 0.0 {
        let idx = (rand_unit() * candidates.len() as f64).floor() as usize;
        return &candidates[idx.min(candidates.len() - 1)];
    }

    let target = rand_unit() * total;
    let mut cumulative = 0.0;
    for (candidate, weight) in candidates.iter().zip(weights.iter()) {
        cumulative += weight;
        if target < cumulative {
            return candidate;
        }
    }
    candidates.last().expect("checked non-empty above")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn candidate(score: f64) -> Candidate {
        let mut values = BTreeMap::new();
        values.insert(
            "scale".to_string(),
            crate::domain::Signature::Scale {
                name: "pentatonic_minor".to_string(),
            },
        );
        Candidate {
            compound: crate::domain::Compound::new(values),
            score,
            source: None,
            changed_dimension: None,
        }
    }

    #[test]
    fn zero_sum_falls_back_to_uniform_pick() {
        let candidates = vec![candidate(0.0), candidate(0.0)];
        let mut always_half = || 0.5;
        let picked = select(&candidates, &mut always_half);
        assert_eq!(picked.score, 0.0);
    }

    #[test]
    fn picks_deterministically_for_a_fixed_rand_unit() {
        let candidates = vec![candidate(1.0), candidate(3.0)];
        // squared weights: 1, 9 -> total 10. target = 0.05*10=0.5 < 1 -> first candidate.
        let mut low = || 0.05;
        assert_eq!(select(&candidates, &mut low).score, 1.0);

        // target = 0.95*10=9.5, cumulative after first=1, after second=10 -> second candidate.
        let mut high = || 0.95;
        assert_eq!(select(&candidates, &mut high).score, 3.0);
    }
}
