use serde::{Deserialize, Serialize};

/// Per-compound performance state, owned exclusively by the repository.
/// The scheduler only ever receives snapshots of this and returns
/// transition intents; it never mutates one directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundStats {
    pub compound_id: String,
    pub attempts: u32,
    pub best_npm: u32,
    pub ema_npm: f64,
    pub last_npm: u32,
    pub last_bpm: u32,
    pub has_expanded: bool,
    pub mastery_streak: u32,
    pub is_mastered: bool,
    pub struggling_streak: u32,
    pub last_practiced_session: Option<u64>,
    /// Highest dimension tier that differs from its entry point in this
    /// compound, as of its most recent update. Used to disambiguate
    /// tier-0 from tier-1+ expansion when evaluating unlock gates,
    /// since every compound always carries all dimensions populated.
    pub max_varied_tier: u32,
}

impl CompoundStats {
    pub fn new(compound_id: impl Into<String>) -> Self {
        Self {
            compound_id: compound_id.into(),
            attempts: 0,
            best_npm: 0,
            ema_npm: 0.0,
            last_npm: 0,
            last_bpm: 0,
            has_expanded: false,
            mastery_streak: 0,
            is_mastered: false,
            struggling_streak: 0,
            last_practiced_session: None,
            max_varied_tier: 0,
        }
    }

    /// Applies one logged attempt's state-machine transitions in place.
    ///
    /// `has_expanded` and `is_mastered` are write-once latches: once true
    /// they never flip back, regardless of what `npm` says afterward.
    pub fn apply_attempt(
        &mut self,
        npm: u32,
        bpm: u32,
        session: u64,
        alpha: f64,
        expansion_npm: u32,
        mastery_npm: u32,
        mastery_streak_required: u32,
        struggling_npm: u32,
    ) {
        self.attempts += 1;
        self.best_npm = self.best_npm.max(npm);
        self.ema_npm = crate::normalizer::ema(self.ema_npm, npm as f64, alpha);
        self.last_npm = npm;
        self.last_bpm = bpm;
        self.last_practiced_session = Some(session);

        if npm >= expansion_npm {
            self.has_expanded = true;
        }

        if npm >= mastery_npm {
            self.mastery_streak += 1;
        } else {
            self.mastery_streak = 0;
        }
        if self.mastery_streak >= mastery_streak_required {
            self.is_mastered = true;
        }

        if npm < struggling_npm {
            self.struggling_streak += 1;
        } else {
            self.struggling_streak = 0;
        }
    }
}

/// Per-signature (legacy) bookkeeping, retained for backward-compatible
/// display; the candidate generator and scorer never read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureStats {
    pub sig_id: String,
    pub attempts: u32,
    pub best_npm: u32,
    pub ema_npm: f64,
    pub last_npm: u32,
    pub last_seen_session: Option<u64>,
    pub has_expanded: bool,
    pub mastery_streak: u32,
    pub is_mastered: bool,
    pub struggling_streak: u32,
}

impl SignatureStats {
    pub fn new(sig_id: impl Into<String>) -> Self {
        Self {
            sig_id: sig_id.into(),
            attempts: 0,
            best_npm: 0,
            ema_npm: 0.0,
            last_npm: 0,
            last_seen_session: None,
            has_expanded: false,
            mastery_streak: 0,
            is_mastered: false,
            struggling_streak: 0,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn apply_attempt(
        &mut self,
        npm: u32,
        session: u64,
        alpha: f64,
        expansion_npm: u32,
        mastery_npm: u32,
        mastery_streak_required: u32,
        struggling_npm: u32,
    ) {
        self.attempts += 1;
        self.best_npm = self.best_npm.max(npm);
        self.ema_npm = crate::normalizer::ema(self.ema_npm, npm as f64, alpha);
        self.last_npm = npm;
        self.last_seen_session = Some(session);

        if npm >= expansion_npm {
            self.has_expanded = true;
        }
        if npm >= mastery_npm {
            self.mastery_streak += 1;
        } else {
            self.mastery_streak = 0;
        }
        if self.mastery_streak >= mastery_streak_required {
            self.is_mastered = true;
        }

        if npm < struggling_npm {
            self.struggling_streak += 1;
        } else {
            self.struggling_streak = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expansion_and_mastery_latch_and_never_unlatch() {
        let mut s = CompoundStats::new("c1");
        s.apply_attempt(500, 250, 1, 0.3, 400, 480, 3, 200);
        s.apply_attempt(500, 250, 2, 0.3, 400, 480, 3, 200);
        s.apply_attempt(500, 250, 3, 0.3, 400, 480, 3, 200);
        assert!(s.has_expanded);
        assert!(s.is_mastered);
        assert_eq!(s.mastery_streak, 3);

        // A bad attempt afterward must not un-master or un-expand.
        s.apply_attempt(200, 100, 4, 0.3, 400, 480, 3, 200);
        assert!(s.has_expanded);
        assert!(s.is_mastered);
        assert_eq!(s.mastery_streak, 0);
    }

    #[test]
    fn struggling_streak_uses_strict_less_than() {
        let mut s = CompoundStats::new("c1");
        s.apply_attempt(200, 100, 1, 0.3, 400, 480, 3, 200);
        assert_eq!(s.struggling_streak, 0, "npm == threshold must not count");
        s.apply_attempt(199, 100, 2, 0.3, 400, 480, 3, 200);
        assert_eq!(s.struggling_streak, 1);
    }

    #[test]
    fn signature_stats_track_struggling_streak_too() {
        let mut s = SignatureStats::new("scale:pentatonic_minor");
        s.apply_attempt(199, 1, 0.3, 400, 480, 3, 200);
        assert_eq!(s.struggling_streak, 1);
        s.apply_attempt(199, 2, 0.3, 400, 480, 3, 200);
        assert_eq!(s.struggling_streak, 2);
        s.apply_attempt(200, 3, 0.3, 400, 480, 3, 200);
        assert_eq!(s.struggling_streak, 0, "a passing attempt resets the streak");
    }
}
