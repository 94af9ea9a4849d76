use serde::{Deserialize, Serialize};

use super::error::{SchedulerError, Result};

/// A value on a single dimension, tagged by which dimension produced it.
///
/// The discriminator is the variant itself; each variant carries only the
/// fields needed to identify the value (plus, for rhythm, the pattern
/// that makes it a single indivisible unit for dimension-diff purposes).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "dimension", rename_all = "snake_case")]
pub enum Signature {
    Rhythm { name: String, pattern: String },
    Scale { name: String },
    Position { name: String },
    NotePattern { name: String },
    Articulation { name: String },
}

impl Signature {
    /// Canonical string form, used as a map key.
    pub fn sig_id(&self) -> String {
        match self {
            Signature::Rhythm { name, pattern } => format!("rhythm:{name}:{pattern}"),
            Signature::Scale { name } => format!("scale:{name}"),
            Signature::Position { name } => format!("position:{name}"),
            Signature::NotePattern { name } => format!("note-pattern:{name}"),
            Signature::Articulation { name } => format!("articulation:{name}"),
        }
    }

    /// The dimension name this signature belongs to, e.g. `"rhythm"`.
    pub fn dimension_name(&self) -> &'static str {
        match self {
            Signature::Rhythm { .. } => "rhythm",
            Signature::Scale { .. } => "scale",
            Signature::Position { .. } => "position",
            Signature::NotePattern { .. } => "note-pattern",
            Signature::Articulation { .. } => "articulation",
        }
    }

    /// The value name, ignoring a rhythm's pattern — the part a
    /// `Proficiency` declaration is phrased in terms of.
    pub fn value_name(&self) -> &str {
        match self {
            Signature::Rhythm { name, .. }
            | Signature::Scale { name }
            | Signature::Position { name }
            | Signature::NotePattern { name }
            | Signature::Articulation { name } => name,
        }
    }

    /// Parse a signature ID back into a `Signature`. Inverse of `sig_id`.
    pub fn parse(id: &str) -> Result<Signature> {
        let mut parts = id.splitn(2, ':');
        let prefix = parts
            .next()
            .ok_or_else(|| SchedulerError::InvalidInput(format!("empty signature id: {id}")))?;
        let rest = parts
            .next()
            .ok_or_else(|| SchedulerError::InvalidInput(format!("malformed signature id: {id}")))?;

        match prefix {
            "rhythm" => {
                let (name, pattern) = rest.split_once(':').ok_or_else(|| {
                    SchedulerError::InvalidInput(format!("malformed rhythm signature: {id}"))
                })?;
                Ok(Signature::Rhythm {
                    name: name.to_string(),
                    pattern: pattern.to_string(),
                })
            }
            "scale" => Ok(Signature::Scale {
                name: rest.to_string(),
            }),
            "position" => Ok(Signature::Position {
                name: rest.to_string(),
            }),
            "note-pattern" => Ok(Signature::NotePattern {
                name: rest.to_string(),
            }),
            "articulation" => {
                if rest != "continuous" {
                    return Err(SchedulerError::InvalidInput(format!(
                        "articulation is a reserved dimension with no configured values beyond \
                         its entry point: {rest}"
                    )));
                }
                Ok(Signature::Articulation {
                    name: rest.to_string(),
                })
            }
            other => Err(SchedulerError::InvalidInput(format!(
                "unknown signature dimension prefix: {other}"
            ))),
        }
    }
}
