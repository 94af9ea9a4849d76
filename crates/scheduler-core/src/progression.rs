//! Pure helpers backing the progression controller. The async
//! orchestration (append log, upsert stats, evaluate unlocks, update
//! streak, check achievements) lives in `engine`, which calls these.

use crate::dimensions::DimensionRegistry;
use crate::domain::Compound;

/// Highest tier among dimensions whose value differs from that
/// dimension's entry point in `compound`. Tier-0-only compounds score 0;
/// a compound that has ever varied `note-pattern` scores at least 1.
pub fn max_varied_tier(registry: &DimensionRegistry, compound: &Compound) -> u32 {
    registry
        .all_names()
        .into_iter()
        .filter_map(|name| {
            let dim = registry.by_name(name)?;
            let value = compound.get(name)?;
            if *value == dim.entry_point() {
                return None;
            }
            dim.get_tier(value)
        })
        .max()
        .unwrap_or(0)
}

/// The prerequisite tier a locked dimension's unlock gate is evaluated
/// against: one below the dimension's own tier.
pub fn prerequisite_tier(registry: &DimensionRegistry, dimension: &str) -> Option<u32> {
    let dim = registry.by_name(dimension)?;
    let tier = dim.get_tier(&dim.entry_point())?;
    Some(tier.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimensions::Dimension;
    use std::collections::BTreeMap;

    #[test]
    fn tier_0_only_compound_has_zero_max_varied_tier() {
        let registry = DimensionRegistry::with_defaults();
        let mut values = BTreeMap::new();
        values.insert("scale".to_string(), registry.scale().entry_point());
        values.insert("position".to_string(), registry.position().entry_point());
        values.insert("rhythm".to_string(), registry.rhythm().entry_point());
        values.insert("note-pattern".to_string(), registry.note_pattern().entry_point());
        values.insert("articulation".to_string(), registry.articulation().entry_point());
        let compound = Compound::new(values);
        assert_eq!(max_varied_tier(&registry, &compound), 0);
    }

    #[test]
    fn varying_note_pattern_raises_the_tier() {
        let registry = DimensionRegistry::with_defaults();
        let mut values = BTreeMap::new();
        values.insert("scale".to_string(), registry.scale().entry_point());
        values.insert("position".to_string(), registry.position().entry_point());
        values.insert("rhythm".to_string(), registry.rhythm().entry_point());
        values.insert(
            "note-pattern".to_string(),
            crate::domain::Signature::NotePattern {
                name: "arpeggios".to_string(),
            },
        );
        values.insert("articulation".to_string(), registry.articulation().entry_point());
        let compound = Compound::new(values);
        assert_eq!(max_varied_tier(&registry, &compound), 1);
    }
}
