use crate::domain::Signature;

use super::Dimension;

struct PositionEntry {
    name: &'static str,
    next: &'static [&'static str],
}

/// Linear ladder with a gateway forward: of `next`, only the *first*
/// entry is a forward neighbor. All inverse-`next` entries are backward
/// neighbors. `7th -> 9th` is the sole forward gateway out of `7th`;
/// `7th -> 12th-alt` exists in `next` but is not first, exercising the
/// "only first entry is forward" rule.
pub struct PositionDimension {
    ladder: Vec<PositionEntry>,
}

const LADDER: &[PositionEntry] = &[
    PositionEntry {
        name: "E",
        next: &["A"],
    },
    PositionEntry {
        name: "A",
        next: &["C"],
    },
    PositionEntry {
        name: "C",
        next: &["D"],
    },
    PositionEntry {
        name: "D",
        next: &["G"],
    },
    PositionEntry {
        name: "G",
        next: &["7th"],
    },
    PositionEntry {
        name: "7th",
        next: &["9th", "12th-alt"],
    },
    PositionEntry {
        name: "9th",
        next: &[],
    },
    PositionEntry {
        name: "12th-alt",
        next: &[],
    },
];

impl Default for PositionDimension {
    fn default() -> Self {
        Self {
            ladder: LADDER
                .iter()
                .map(|e| PositionEntry {
                    name: e.name,
                    next: e.next,
                })
                .collect(),
        }
    }
}

impl PositionDimension {
    fn index_of(&self, s: &Signature) -> Option<usize> {
        let Signature::Position { name } = s else {
            return None;
        };
        self.ladder.iter().position(|e| e.name == name)
    }

    fn signature_at(&self, idx: usize) -> Signature {
        Signature::Position {
            name: self.ladder[idx].name.to_string(),
        }
    }
}

impl Dimension for PositionDimension {
    fn name(&self) -> &'static str {
        "position"
    }

    fn entry_point(&self) -> Signature {
        self.signature_at(0)
    }

    fn signatures(&self) -> Vec<Signature> {
        (0..self.ladder.len()).map(|i| self.signature_at(i)).collect()
    }

    fn neighbors(&self, s: &Signature) -> Vec<Signature> {
        let Some(idx) = self.index_of(s) else {
            return Vec::new();
        };
        let mut out: Vec<Signature> = self.ladder[idx]
            .next
            .iter()
            .map(|n| Signature::Position { name: n.to_string() })
            .collect();
        for (i, e) in self.ladder.iter().enumerate() {
            if e.next.contains(&self.ladder[idx].name) {
                out.push(self.signature_at(i));
            }
        }
        out
    }

    fn is_forward_neighbor(&self, from: &Signature, to: &Signature) -> bool {
        let Some(from_idx) = self.index_of(from) else {
            return false;
        };
        let Some(gateway) = self.ladder[from_idx].next.first() else {
            return false;
        };
        matches!(to, Signature::Position { name } if name == gateway)
    }

    fn describe(&self, s: &Signature) -> String {
        match s {
            Signature::Position { name } => format!("{name} position"),
            _ => "unknown".to_string(),
        }
    }

    fn get_tier(&self, s: &Signature) -> Option<u32> {
        self.index_of(s).map(|i| i as u32)
    }

    fn prerequisites(&self, s: &Signature) -> Vec<Signature> {
        let Some(idx) = self.index_of(s) else {
            return Vec::new();
        };
        (0..idx).map(|i| self.signature_at(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_first_next_entry_is_a_forward_gateway() {
        let p = PositionDimension::default();
        let seventh = Signature::Position { name: "7th".to_string() };
        let ninth = Signature::Position { name: "9th".to_string() };
        let twelfth_alt = Signature::Position { name: "12th-alt".to_string() };

        assert!(p.is_forward_neighbor(&seventh, &ninth));
        assert!(!p.is_forward_neighbor(&seventh, &twelfth_alt));

        // Both are still neighbors, just not both forward.
        let neighbors = p.neighbors(&seventh);
        assert!(neighbors.contains(&ninth));
        assert!(neighbors.contains(&twelfth_alt));
    }

    #[test]
    fn inverse_next_entries_are_not_forward() {
        let p = PositionDimension::default();
        let a = Signature::Position { name: "A".to_string() };
        let e = Signature::Position { name: "E".to_string() };
        assert!(!p.is_forward_neighbor(&a, &e));
    }
}
