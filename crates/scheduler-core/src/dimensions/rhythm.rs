use crate::domain::Signature;

use super::{Dimension, NotesPerBeat};

struct RhythmEntry {
    name: &'static str,
    pattern: &'static str,
    notes_per_beat: u32,
    next: &'static [(&'static str, &'static str)],
}

/// Linear ladder of `(name, notes_per_beat, next[])`. Neighbors are the
/// union of `next` and the inverse of `next`; every `next` entry (not
/// just the first) counts as a forward step, since rhythm has no
/// single-gateway restriction.
pub struct RhythmDimension {
    ladder: Vec<RhythmEntry>,
}

const LADDER: &[RhythmEntry] = &[
    RhythmEntry {
        name: "8ths",
        pattern: "xx",
        notes_per_beat: 2,
        next: &[("8ths", "swing"), ("8th_triplets", "xxx")],
    },
    RhythmEntry {
        name: "8ths",
        pattern: "swing",
        notes_per_beat: 2,
        next: &[("16ths", "xxxx")],
    },
    RhythmEntry {
        name: "8th_triplets",
        pattern: "xxx",
        notes_per_beat: 3,
        next: &[("16ths", "xxxx")],
    },
    RhythmEntry {
        name: "16ths",
        pattern: "xxxx",
        notes_per_beat: 4,
        next: &[("16th_triplets", "xxxxxx")],
    },
    RhythmEntry {
        name: "16th_triplets",
        pattern: "xxxxxx",
        notes_per_beat: 6,
        next: &[],
    },
];

impl Default for RhythmDimension {
    fn default() -> Self {
        Self {
            ladder: LADDER
                .iter()
                .map(|e| RhythmEntry {
                    name: e.name,
                    pattern: e.pattern,
                    notes_per_beat: e.notes_per_beat,
                    next: e.next,
                })
                .collect(),
        }
    }
}

impl RhythmDimension {
    fn index_of(&self, s: &Signature) -> Option<usize> {
        let Signature::Rhythm { name, pattern } = s else {
            return None;
        };
        self.ladder
            .iter()
            .position(|e| e.name == name && e.pattern == pattern)
    }

    fn signature_at(&self, idx: usize) -> Signature {
        let e = &self.ladder[idx];
        Signature::Rhythm {
            name: e.name.to_string(),
            pattern: e.pattern.to_string(),
        }
    }

    /// BFS depth from the entry point, following `next` edges. Used as
    /// the tier for the lateral/forward classification.
    fn tier_of(&self, idx: usize) -> u32 {
        let mut tier = vec![u32::MAX; self.ladder.len()];
        tier[0] = 0;
        let mut changed = true;
        while changed {
            changed = false;
            for (i, e) in self.ladder.iter().enumerate() {
                if tier[i] == u32::MAX {
                    continue;
                }
                for (n, p) in e.next {
                    if let Some(j) = self
                        .ladder
                        .iter()
                        .position(|x| x.name == *n && x.pattern == *p)
                    {
                        if tier[j] > tier[i] + 1 {
                            tier[j] = tier[i] + 1;
                            changed = true;
                        }
                    }
                }
            }
        }
        tier[idx]
    }
}

impl Dimension for RhythmDimension {
    fn name(&self) -> &'static str {
        "rhythm"
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
        let mut out = Vec::new();
        for (n, p) in self.ladder[idx].next {
            out.push(Signature::Rhythm {
                name: n.to_string(),
                pattern: p.to_string(),
            });
        }
        for (i, e) in self.ladder.iter().enumerate() {
            if e.next.iter().any(|(n, p)| {
                *n == self.ladder[idx].name && *p == self.ladder[idx].pattern
            }) {
                out.push(self.signature_at(i));
            }
        }
        out
    }

    fn is_forward_neighbor(&self, from: &Signature, to: &Signature) -> bool {
        let Some(from_idx) = self.index_of(from) else {
            return false;
        };
        let e = &self.ladder[from_idx];
        matches!(to, Signature::Rhythm { name, pattern } if e.next.iter().any(|(n, p)| n == name && p == pattern))
    }

    fn describe(&self, s: &Signature) -> String {
        match s {
            Signature::Rhythm { name, pattern } => format!("{name} ({pattern})"),
            _ => "unknown".to_string(),
        }
    }

    fn get_tier(&self, s: &Signature) -> Option<u32> {
        self.index_of(s).map(|i| self.tier_of(i))
    }

    fn prerequisites(&self, s: &Signature) -> Vec<Signature> {
        let Some(idx) = self.index_of(s) else {
            return Vec::new();
        };
        let tier = self.tier_of(idx);
        (0..self.ladder.len())
            .filter(|&i| self.tier_of(i) < tier)
            .map(|i| self.signature_at(i))
            .collect()
    }
}

impl NotesPerBeat for RhythmDimension {
    fn notes_per_beat(&self, s: &Signature) -> Option<u32> {
        self.index_of(s).map(|i| self.ladder[i].notes_per_beat)
    }
}
