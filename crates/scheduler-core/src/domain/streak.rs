use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Calendar-day practice streak, with freeze tokens that forgive a single
/// missed day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakInfo {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_practice_date: Option<NaiveDate>,
    pub streak_freezes: u32,
}

impl StreakInfo {
    /// Advances the streak for a practice logged on `date`. `longest_streak`
    /// is monotonically non-decreasing regardless of which branch fires.
    pub fn update(&mut self, date: NaiveDate) {
        let Some(last) = self.last_practice_date else {
            self.current_streak = 1;
            self.longest_streak = self.longest_streak.max(1);
            self.last_practice_date = Some(date);
            return;
        };

        let gap = (date - last).num_days();

        if gap <= 0 {
            // Same day or a backdated entry: no change.
            return;
        } else if gap == 1 {
            self.current_streak += 1;
        } else if gap == 2 && self.streak_freezes > 0 {
            self.current_streak += 1;
            self.streak_freezes -= 1;
        } else {
            self.current_streak = 1;
        }

        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_practice_date = Some(date);
    }

    pub fn add_freezes(&mut self, n: u32) {
        self.streak_freezes += n;
    }
}
