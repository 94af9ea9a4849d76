use crate::domain::Signature;

use super::Dimension;

/// Tiered graph defined by a tier-to-values map, with no per-value
/// `next`. Neighbors are same-tier (lateral), all of tier-1 (free
/// regression), and only the *first* value of tier+1 (gateway forward).
pub struct NotePatternDimension {
    tiers: Vec<Vec<&'static str>>,
}

impl Default for NotePatternDimension {
    fn default() -> Self {
        Self {
            tiers: vec![
                vec!["stepwise", "skips"],
                vec!["arpeggios", "intervals"],
                vec!["hybrid_picking"],
            ],
        }
    }
}

impl NotePatternDimension {
    fn locate(&self, name: &str) -> Option<(usize, usize)> {
        self.tiers.iter().enumerate().find_map(|(t, values)| {
            values.iter().position(|v| *v == name).map(|i| (t, i))
        })
    }

    fn index_of(&self, s: &Signature) -> Option<(usize, usize)> {
        let Signature::NotePattern { name } = s else {
            return None;
        };
        self.locate(name)
    }

    fn signature(name: &str) -> Signature {
        Signature::NotePattern { name: name.to_string() }
    }
}

impl Dimension for NotePatternDimension {
    fn name(&self) -> &'static str {
        "note-pattern"
    }

    fn entry_point(&self) -> Signature {
        Self::signature(self.tiers[0][0])
    }

    fn signatures(&self) -> Vec<Signature> {
        self.tiers
            .iter()
            .flatten()
            .map(|v| Self::signature(v))
            .collect()
    }

    fn neighbors(&self, s: &Signature) -> Vec<Signature> {
        let Some((tier, idx)) = self.index_of(s) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for (i, v) in self.tiers[tier].iter().enumerate() {
            if i != idx {
                out.push(Self::signature(v));
            }
        }
        if tier > 0 {
            for v in &self.tiers[tier - 1] {
                out.push(Self::signature(v));
            }
        }
        if let Some(next_tier) = self.tiers.get(tier + 1) {
            if let Some(gateway) = next_tier.first() {
                out.push(Self::signature(gateway));
            }
        }
        out
    }

    fn is_forward_neighbor(&self, from: &Signature, to: &Signature) -> bool {
        let (Some((from_tier, _)), Some((to_tier, _))) = (self.index_of(from), self.index_of(to))
        else {
            return false;
        };
        if from_tier == to_tier {
            return true;
        }
        if to_tier != from_tier + 1 {
            return false;
        }
        matches!(to, Signature::NotePattern { name } if self.tiers[to_tier].first() == Some(&name.as_str()))
    }

    fn describe(&self, s: &Signature) -> String {
        match s {
            Signature::NotePattern { name } => name.replace('_', " "),
            _ => "unknown".to_string(),
        }
    }

    fn get_tier(&self, s: &Signature) -> Option<u32> {
        self.index_of(s).map(|(t, _)| t as u32)
    }

    fn prerequisites(&self, s: &Signature) -> Vec<Signature> {
        let Some((tier, _)) = self.index_of(s) else {
            return Vec::new();
        };
        self.tiers[..tier]
            .iter()
            .flatten()
            .map(|v| Self::signature(v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_first_tier_plus_one_value_is_a_gateway() {
        let np = NotePatternDimension::default();
        let stepwise = Signature::NotePattern { name: "stepwise".to_string() };
        let arpeggios = Signature::NotePattern { name: "arpeggios".to_string() };
        let intervals = Signature::NotePattern { name: "intervals".to_string() };

        assert!(np.is_forward_neighbor(&stepwise, &arpeggios));
        assert!(!np.is_forward_neighbor(&stepwise, &intervals));
        // intervals is not even a neighbor of stepwise; arpeggios is the
        // sole gateway into tier 1.
        assert!(!np.neighbors(&stepwise).contains(&intervals));
    }

    #[test]
    fn same_tier_moves_are_lateral_and_forward() {
        let np = NotePatternDimension::default();
        let stepwise = Signature::NotePattern { name: "stepwise".to_string() };
        let skips = Signature::NotePattern { name: "skips".to_string() };
        assert!(np.is_forward_neighbor(&stepwise, &skips));
    }
}
