pub mod articulation;
pub mod note_pattern;
pub mod position;
pub mod rhythm;
pub mod scale;

use crate::domain::Signature;

pub use articulation::ArticulationDimension;
pub use note_pattern::NotePatternDimension;
pub use position::PositionDimension;
pub use rhythm::RhythmDimension;
pub use scale::ScaleDimension;

/// The capability set every dimension exposes. Avoid ad-hoc strings;
/// `Signature` values are parsed only at the identity boundary.
pub trait Dimension: Send + Sync {
    fn name(&self) -> &'static str;
    fn entry_point(&self) -> Signature;
    fn signatures(&self) -> Vec<Signature>;
    /// Values reachable from `s` in one step. Never includes `s` itself.
    fn neighbors(&self, s: &Signature) -> Vec<Signature>;
    /// Is `to` a progression step from `from` (as opposed to regression)?
    fn is_forward_neighbor(&self, from: &Signature, to: &Signature) -> bool;
    fn describe(&self, s: &Signature) -> String;
    /// Difficulty tier, lower is easier. `None` for dimensions with no
    /// tiering concept.
    fn get_tier(&self, s: &Signature) -> Option<u32> {
        let _ = s;
        None
    }
    /// All lower-tier values, for UI backfill only; the scheduler ignores
    /// this.
    fn prerequisites(&self, s: &Signature) -> Vec<Signature> {
        let _ = s;
        Vec::new()
    }
}

/// Rhythm-only capability: scalar used for BPM -> NPM conversion. Kept as
/// a separate trait so the registry can expose a typed accessor instead
/// of dispatching through `dyn Dimension` on the BPM conversion hot path.
pub trait NotesPerBeat {
    fn notes_per_beat(&self, s: &Signature) -> Option<u32>;
}

/// Named lookup of the four concrete dimensions, and a factory for the
/// default set used when no configuration overrides them.
pub struct DimensionRegistry {
    rhythm: RhythmDimension,
    position: PositionDimension,
    scale: ScaleDimension,
    note_pattern: NotePatternDimension,
    articulation: ArticulationDimension,
}

impl DimensionRegistry {
    pub fn with_defaults() -> Self {
        Self {
            rhythm: RhythmDimension::default(),
            position: PositionDimension::default(),
            scale: ScaleDimension::default(),
            note_pattern: NotePatternDimension::default(),
            articulation: ArticulationDimension,
        }
    }

    pub fn rhythm(&self) -> &RhythmDimension {
        &self.rhythm
    }

    pub fn position(&self) -> &PositionDimension {
        &self.position
    }

    pub fn scale(&self) -> &ScaleDimension {
        &self.scale
    }

    pub fn note_pattern(&self) -> &NotePatternDimension {
        &self.note_pattern
    }

    pub fn articulation(&self) -> &ArticulationDimension {
        &self.articulation
    }

    pub fn by_name(&self, name: &str) -> Option<&dyn Dimension> {
        match name {
            "rhythm" => Some(&self.rhythm),
            "position" => Some(&self.position),
            "scale" => Some(&self.scale),
            "note-pattern" => Some(&self.note_pattern),
            "articulation" => Some(&self.articulation),
            _ => None,
        }
    }

    /// All dimension names in ascending tier order: tier-0 dimensions
    /// first, then the higher-tier gated ones.
    pub fn all_names(&self) -> [&'static str; 5] {
        ["scale", "position", "rhythm", "note-pattern", "articulation"]
    }

    /// Higher-tier dimensions subject to the unlock gate (tier >= 1).
    pub fn gated_names(&self) -> [&'static str; 2] {
        ["note-pattern", "articulation"]
    }
}

impl Default for DimensionRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
