use crate::domain::Signature;

use super::Dimension;

struct ScaleEntry {
    name: &'static str,
    tier: u32,
    next: &'static [&'static str],
}

/// Tiered graph: each value has a tier and an explicit `next[]` list.
/// Neighbors are all other values in the same tier (lateral), all values
/// in tier-1 (free regression), plus `next[]` entries that lie in
/// tier+1 (gated forward).
pub struct ScaleDimension {
    values: Vec<ScaleEntry>,
}

const VALUES: &[ScaleEntry] = &[
    ScaleEntry {
        name: "pentatonic_minor",
        tier: 0,
        next: &["blues_scale"],
    },
    ScaleEntry {
        name: "major_pentatonic",
        tier: 0,
        next: &["natural_minor"],
    },
    ScaleEntry {
        name: "blues_scale",
        tier: 1,
        next: &["dorian"],
    },
    ScaleEntry {
        name: "natural_minor",
        tier: 1,
        next: &["harmonic_minor"],
    },
    ScaleEntry {
        name: "dorian",
        tier: 2,
        next: &[],
    },
    ScaleEntry {
        name: "harmonic_minor",
        tier: 2,
        next: &[],
    },
];

impl Default for ScaleDimension {
    fn default() -> Self {
        Self {
            values: VALUES
                .iter()
                .map(|e| ScaleEntry {
                    name: e.name,
                    tier: e.tier,
                    next: e.next,
                })
                .collect(),
        }
    }
}

impl ScaleDimension {
    fn index_of(&self, s: &Signature) -> Option<usize> {
        let Signature::Scale { name } = s else {
            return None;
        };
        self.values.iter().position(|e| e.name == name)
    }

    fn signature_at(&self, idx: usize) -> Signature {
        Signature::Scale {
            name: self.values[idx].name.to_string(),
        }
    }
}

impl Dimension for ScaleDimension {
    fn name(&self) -> &'static str {
        "scale"
    }

    fn entry_point(&self) -> Signature {
        self.signature_at(0)
    }

    fn signatures(&self) -> Vec<Signature> {
        (0..self.values.len()).map(|i| self.signature_at(i)).collect()
    }

    fn neighbors(&self, s: &Signature) -> Vec<Signature> {
        let Some(idx) = self.index_of(s) else {
            return Vec::new();
        };
        let tier = self.values[idx].tier;
        let mut out = Vec::new();
        for (i, e) in self.values.iter().enumerate() {
            if i == idx {
                continue;
            }
            if e.tier == tier || e.tier + 1 == tier {
                out.push(self.signature_at(i));
            }
        }
        for n in self.values[idx].next {
            if let Some(j) = self.values.iter().position(|e| e.name == *n) {
                if self.values[j].tier == tier + 1 {
                    out.push(self.signature_at(j));
                }
            }
        }
        out
    }

    fn is_forward_neighbor(&self, from: &Signature, to: &Signature) -> bool {
        let (Some(from_idx), Some(to_idx)) = (self.index_of(from), self.index_of(to)) else {
            return false;
        };
        let from_tier = self.values[from_idx].tier;
        let to_tier = self.values[to_idx].tier;
        if from_tier == to_tier {
            return true;
        }
        to_tier == from_tier + 1
            && self.values[from_idx]
                .next
                .contains(&self.values[to_idx].name)
    }

    fn describe(&self, s: &Signature) -> String {
        match s {
            Signature::Scale { name } => name.replace('_', " "),
            _ => "unknown".to_string(),
        }
    }

    fn get_tier(&self, s: &Signature) -> Option<u32> {
        self.index_of(s).map(|i| self.values[i].tier)
    }

    fn prerequisites(&self, s: &Signature) -> Vec<Signature> {
        let Some(idx) = self.index_of(s) else {
            return Vec::new();
        };
        let tier = self.values[idx].tier;
        (0..self.values.len())
            .filter(|&i| self.values[i].tier < tier)
            .map(|i| self.signature_at(i))
            .collect()
    }
}
