use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::{Result, SchedulerError};
use super::practice_entry::PracticeEntry;
use super::signature::Signature;

/// A practice item: one value per dimension, keyed by dimension name.
///
/// `values` is a `BTreeMap` rather than a `HashMap` so that `compound_id`
/// is deterministic without a separate sort step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compound {
    values: BTreeMap<String, Signature>,
}

impl Compound {
    pub fn new(values: BTreeMap<String, Signature>) -> Self {
        Self { values }
    }

    pub fn get(&self, dimension: &str) -> Option<&Signature> {
        self.values.get(dimension)
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn values(&self) -> &BTreeMap<String, Signature> {
        &self.values
    }

    /// Returns a copy with `dimension` replaced by `value`.
    ///
    /// The candidate generator is the only caller that should need this;
    /// it is how a one-dimension-change candidate is produced from a base
    /// compound.
    pub fn with_value(&self, dimension: &str, value: Signature) -> Compound {
        let mut values = self.values.clone();
        values.insert(dimension.to_string(), value);
        Compound { values }
    }

    /// Builds the compound practiced in `entry`: one value per dimension
    /// the entry carries, `note-pattern`/`articulation` present only once
    /// the user has actually practiced a value on that dimension.
    pub fn from_practice_entry(entry: &PracticeEntry) -> Compound {
        let mut values = BTreeMap::new();
        values.insert(
            "scale".to_string(),
            Signature::Scale { name: entry.scale.clone() },
        );
        values.insert(
            "position".to_string(),
            Signature::Position { name: entry.position.clone() },
        );
        values.insert(
            "rhythm".to_string(),
            Signature::Rhythm {
                name: entry.rhythm.clone(),
                pattern: entry.rhythm_pattern.clone(),
            },
        );
        if let Some(note_pattern) = &entry.note_pattern {
            values.insert(
                "note-pattern".to_string(),
                Signature::NotePattern { name: note_pattern.clone() },
            );
        }
        if let Some(articulation) = &entry.articulation {
            values.insert(
                "articulation".to_string(),
                Signature::Articulation { name: articulation.clone() },
            );
        }
        Compound { values }
    }

    /// The dimension's value, as a plain name — `None` for `Rhythm`,
    /// whose identity also needs its pattern (see `compound_id`).
    fn dimension_value(&self, dimension: &str) -> Option<&str> {
        match self.values.get(dimension)? {
            Signature::Scale { name }
            | Signature::Position { name }
            | Signature::NotePattern { name }
            | Signature::Articulation { name } => Some(name.as_str()),
            Signature::Rhythm { .. } => None,
        }
    }

    /// Bit-exact, wire-compatible identity string:
    /// `<scale>+<position>+<rhythm>:<rhythm_pattern>[+<note_pattern>[+<articulation>]]`.
    pub fn compound_id(&self) -> String {
        let scale = self.dimension_value("scale").unwrap_or_default();
        let position = self.dimension_value("position").unwrap_or_default();
        let (rhythm_name, rhythm_pattern) = match self.values.get("rhythm") {
            Some(Signature::Rhythm { name, pattern }) => (name.as_str(), pattern.as_str()),
            _ => ("", ""),
        };
        let mut id = format!("{scale}+{position}+{rhythm_name}:{rhythm_pattern}");
        if let Some(note_pattern) = self.dimension_value("note-pattern") {
            id.push('+');
            id.push_str(note_pattern);
        }
        if let Some(articulation) = self.dimension_value("articulation") {
            id.push('+');
            id.push_str(articulation);
        }
        id
    }

    /// Parse a compound id produced by `compound_id` back into a `Compound`.
    pub fn parse_compound_id(id: &str) -> Result<Compound> {
        let parts: Vec<&str> = id.split('+').collect();
        if parts.len() < 3 || parts.len() > 5 {
            return Err(SchedulerError::InvalidInput(format!(
                "malformed compound id: {id}"
            )));
        }
        let scale = parts[0];
        let position = parts[1];
        let (rhythm_name, rhythm_pattern) = parts[2].split_once(':').ok_or_else(|| {
            SchedulerError::InvalidInput(format!("malformed compound id: {id}"))
        })?;
        for value in [scale, position, rhythm_name, rhythm_pattern] {
            validate_value(value)?;
        }

        let mut values = BTreeMap::new();
        values.insert("scale".to_string(), Signature::Scale { name: scale.to_string() });
        values.insert(
            "position".to_string(),
            Signature::Position { name: position.to_string() },
        );
        values.insert(
            "rhythm".to_string(),
            Signature::Rhythm {
                name: rhythm_name.to_string(),
                pattern: rhythm_pattern.to_string(),
            },
        );
        if let Some(note_pattern) = parts.get(3) {
            validate_value(note_pattern)?;
            values.insert(
                "note-pattern".to_string(),
                Signature::NotePattern { name: note_pattern.to_string() },
            );
        }
        if let Some(articulation) = parts.get(4) {
            validate_value(articulation)?;
            if *articulation != "continuous" {
                return Err(SchedulerError::InvalidInput(format!(
                    "articulation is a reserved dimension with no configured values beyond \
                     its entry point: {articulation}"
                )));
            }
            values.insert(
                "articulation".to_string(),
                Signature::Articulation { name: articulation.to_string() },
            );
        }
        Ok(Compound { values })
    }
}

/// Compound-id segments must match `[A-Za-z0-9_-]+`, per the wire grammar.
fn validate_value(value: &str) -> Result<()> {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        Ok(())
    } else {
        Err(SchedulerError::InvalidInput(format!(
            "compound id segment has invalid characters: {value}"
        )))
    }
}

/// True when every dimension value matches. Distinct from `==` only in
/// name: this exists so call sites reading the progression algorithm can
/// say `compounds_equal(a, b)` instead of `a == b`, matching the wording
/// used for the one-dimension-change rule.
pub fn compounds_equal(a: &Compound, b: &Compound) -> bool {
    a.values == b.values
}

/// The single dimension name that differs between `from` and `to`, if
/// exactly one differs. `None` if they are identical or differ in more
/// than one dimension, or if they don't share the same dimension set.
pub fn changed_dimension(from: &Compound, to: &Compound) -> Option<String> {
    if from.values.keys().collect::<Vec<_>>() != to.values.keys().collect::<Vec<_>>() {
        return None;
    }
    let mut changed = None;
    for (dim, from_sig) in &from.values {
        let to_sig = to.values.get(dim)?;
        if from_sig != to_sig {
            if changed.is_some() {
                return None;
            }
            changed = Some(dim.clone());
        }
    }
    changed
}

/// Number of dimensions whose value differs between `from` and `to`.
pub fn count_dimension_changes(from: &Compound, to: &Compound) -> usize {
    from.values
        .iter()
        .filter(|(dim, from_sig)| to.values.get(*dim).map(|s| s != *from_sig).unwrap_or(true))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compound(rhythm: &str, scale: &str) -> Compound {
        let mut values = BTreeMap::new();
        values.insert(
            "rhythm".to_string(),
            Signature::Rhythm {
                name: rhythm.to_string(),
                pattern: "xx".to_string(),
            },
        );
        values.insert(
            "scale".to_string(),
            Signature::Scale {
                name: scale.to_string(),
            },
        );
        values.insert(
            "position".to_string(),
            Signature::Position { name: "E".to_string() },
        );
        Compound::new(values)
    }

    #[test]
    fn compound_id_matches_the_wire_grammar() {
        let c = compound("8ths", "pentatonic_minor");
        assert_eq!(c.compound_id(), "pentatonic_minor+E+8ths:xx");
    }

    #[test]
    fn compound_id_round_trips() {
        let c = compound("8ths", "pentatonic_minor");
        let id = c.compound_id();
        let parsed = Compound::parse_compound_id(&id).unwrap();
        assert!(compounds_equal(&c, &parsed));
    }

    #[test]
    fn compound_id_includes_note_pattern_and_articulation_when_present() {
        let mut values = BTreeMap::new();
        values.insert(
            "scale".to_string(),
            Signature::Scale { name: "pentatonic_minor".to_string() },
        );
        values.insert("position".to_string(), Signature::Position { name: "E".to_string() });
        values.insert(
            "rhythm".to_string(),
            Signature::Rhythm { name: "8ths".to_string(), pattern: "xx".to_string() },
        );
        values.insert(
            "note-pattern".to_string(),
            Signature::NotePattern { name: "stepwise".to_string() },
        );
        values.insert(
            "articulation".to_string(),
            Signature::Articulation { name: "continuous".to_string() },
        );
        let c = Compound::new(values);
        assert_eq!(c.compound_id(), "pentatonic_minor+E+8ths:xx+stepwise+continuous");
        let parsed = Compound::parse_compound_id(&c.compound_id()).unwrap();
        assert!(compounds_equal(&c, &parsed));
    }

    #[test]
    fn parse_compound_id_rejects_malformed_ids() {
        assert!(Compound::parse_compound_id("").is_err());
        assert!(Compound::parse_compound_id("pentatonic_minor+E").is_err());
        assert!(Compound::parse_compound_id("pentatonic_minor+E+8thsxx").is_err());
    }

    #[test]
    fn changed_dimension_detects_exactly_one_diff() {
        let a = compound("8ths", "pentatonic_minor");
        let b = a.with_value(
            "rhythm",
            Signature::Rhythm {
                name: "16ths".to_string(),
                pattern: "xx".to_string(),
            },
        );
        assert_eq!(changed_dimension(&a, &b).as_deref(), Some("rhythm"));
        assert_eq!(count_dimension_changes(&a, &b), 1);
    }

    #[test]
    fn changed_dimension_is_none_for_multi_dimension_diffs() {
        let a = compound("8ths", "pentatonic_minor");
        let b = compound("16ths", "pentatonic_major");
        assert!(changed_dimension(&a, &b).is_none());
        assert_eq!(count_dimension_changes(&a, &b), 2);
    }

    #[test]
    fn changed_dimension_is_none_for_identical_compounds() {
        let a = compound("8ths", "pentatonic_minor");
        let b = compound("8ths", "pentatonic_minor");
        assert!(changed_dimension(&a, &b).is_none());
        assert_eq!(count_dimension_changes(&a, &b), 0);
    }
}
