use crate::domain::Signature;

use super::Dimension;

/// Reserved dimension: declared (tier 2, entry `continuous`) but with no
/// configured value set beyond its entry point. Any attempt to vary it
/// is rejected at the compound/identity layer with `InvalidInput`; this
/// dimension has no neighbors to offer the generator.
#[derive(Default)]
pub struct ArticulationDimension;

impl Dimension for ArticulationDimension {
    fn name(&self) -> &'static str {
        "articulation"
    }

    fn entry_point(&self) -> Signature {
        Signature::Articulation {
            name: "continuous".to_string(),
        }
    }

    fn signatures(&self) -> Vec<Signature> {
        vec![self.entry_point()]
    }

    fn neighbors(&self, _s: &Signature) -> Vec<Signature> {
        Vec::new()
    }

    fn is_forward_neighbor(&self, _from: &Signature, _to: &Signature) -> bool {
        false
    }

    fn describe(&self, s: &Signature) -> String {
        match s {
            Signature::Articulation { name } => name.clone(),
            _ => "unknown".to_string(),
        }
    }

    fn get_tier(&self, _s: &Signature) -> Option<u32> {
        Some(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn articulation_has_no_neighbors_to_vary_into() {
        let a = ArticulationDimension;
        assert!(a.neighbors(&a.entry_point()).is_empty());
    }
}
