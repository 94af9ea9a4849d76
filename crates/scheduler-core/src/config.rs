use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Progression thresholds, in NPM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionSettings {
    pub expansion_npm: u32,
    pub mastery_npm: u32,
    pub mastery_streak: u32,
}

impl Default for ProgressionSettings {
    fn default() -> Self {
        Self {
            expansion_npm: 400,
            mastery_npm: 480,
            mastery_streak: 3,
        }
    }
}

/// Scoring weights and tunables consumed by the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundScoringSettings {
    pub consolidation_weight: f64,
    pub staleness_weight: f64,
    pub readiness_weight: f64,
    pub diversity_weight: f64,
    pub staleness_sessions: u32,
    pub transfer_coefficients: HashMap<String, f64>,
}

impl Default for CompoundScoringSettings {
    fn default() -> Self {
        let mut transfer_coefficients = HashMap::new();
        transfer_coefficients.insert("position".to_string(), 0.8);
        transfer_coefficients.insert("articulation".to_string(), 0.7);
        transfer_coefficients.insert("rhythm".to_string(), 0.6);
        transfer_coefficients.insert("note-pattern".to_string(), 0.5);
        transfer_coefficients.insert("scale".to_string(), 0.4);

        Self {
            consolidation_weight: 1.0,
            staleness_weight: 0.8,
            readiness_weight: 0.6,
            diversity_weight: 0.2,
            staleness_sessions: 10,
            transfer_coefficients,
        }
    }
}

impl CompoundScoringSettings {
    /// Transfer coefficient for `dimension`, falling back to 0.5 for any
    /// dimension not explicitly configured.
    pub fn transfer_coefficient(&self, dimension: &str) -> f64 {
        self.transfer_coefficients
            .get(dimension)
            .copied()
            .unwrap_or(0.5)
    }
}

/// A declared tier for one dimension, and its default entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionTier {
    pub name: String,
    pub tier: u32,
    pub unlock_requirement: Option<u32>,
    pub entry_point: String,
}

/// NPM bands used to classify performance, from slowest to fastest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpmTiers {
    pub struggling: u32,
    pub developing: u32,
    pub progressing: u32,
    pub fast: u32,
    pub very_fast: u32,
    pub super_fast: u32,
}

impl Default for NpmTiers {
    fn default() -> Self {
        Self {
            struggling: 200,
            developing: 280,
            progressing: 400,
            fast: 440,
            very_fast: 480,
            super_fast: 560,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrugglingSettings {
    pub streak_threshold: u32,
}

impl Default for StrugglingSettings {
    fn default() -> Self {
        Self {
            streak_threshold: 1,
        }
    }
}

/// The full typed settings record. An external loader (YAML, env, etc.)
/// is responsible for hydrating overrides; this type only defines the
/// shape and the defaults enumerated alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub ema_alpha: f64,
    pub progression: ProgressionSettings,
    pub compound_scoring: CompoundScoringSettings,
    pub dimension_tiers: Vec<DimensionTier>,
    pub npm_tiers: NpmTiers,
    pub struggling: StrugglingSettings,
    pub keys: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ema_alpha: 0.3,
            progression: ProgressionSettings::default(),
            compound_scoring: CompoundScoringSettings::default(),
            dimension_tiers: vec![
                DimensionTier {
                    name: "scale".to_string(),
                    tier: 0,
                    unlock_requirement: None,
                    entry_point: "pentatonic_minor".to_string(),
                },
                DimensionTier {
                    name: "position".to_string(),
                    tier: 0,
                    unlock_requirement: None,
                    entry_point: "E".to_string(),
                },
                DimensionTier {
                    name: "rhythm".to_string(),
                    tier: 0,
                    unlock_requirement: None,
                    entry_point: "8ths".to_string(),
                },
                DimensionTier {
                    name: "note-pattern".to_string(),
                    tier: 1,
                    unlock_requirement: Some(1),
                    entry_point: "stepwise".to_string(),
                },
                DimensionTier {
                    name: "articulation".to_string(),
                    tier: 2,
                    unlock_requirement: Some(1),
                    entry_point: "continuous".to_string(),
                },
            ],
            npm_tiers: NpmTiers::default(),
            struggling: StrugglingSettings::default(),
            keys: vec![
                "C".to_string(),
                "G".to_string(),
                "D".to_string(),
                "A".to_string(),
                "E".to_string(),
                "Am".to_string(),
                "Em".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_configured_table() {
        let settings = Settings::default();
        assert_eq!(settings.ema_alpha, 0.3);
        assert_eq!(settings.progression.expansion_npm, 400);
        assert_eq!(settings.progression.mastery_npm, 480);
        assert_eq!(settings.compound_scoring.staleness_sessions, 10);
        assert_eq!(settings.compound_scoring.transfer_coefficient("scale"), 0.4);
        assert_eq!(settings.compound_scoring.transfer_coefficient("unknown-dim"), 0.5);
    }
}
