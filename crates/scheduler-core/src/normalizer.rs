//! BPM/NPM conversion and the exponential moving average used by every
//! per-signature and per-compound stat.

/// Notes per minute from a reported tempo and a rhythm's notes-per-beat.
pub fn bpm_to_npm(bpm: u32, notes_per_beat: u32) -> u32 {
    bpm * notes_per_beat
}

/// Exponential moving average update.
///
/// First-observation rule: when `current == 0.0` (no prior observation),
/// `new` becomes the EMA outright rather than being blended toward zero.
pub fn ema(current: f64, new: f64, alpha: f64) -> f64 {
    if current == 0.0 {
        new
    } else {
        alpha * new + (1.0 - alpha) * current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bpm_to_npm_is_an_exact_integer_product() {
        assert_eq!(bpm_to_npm(210, 2), 420);
        assert_eq!(bpm_to_npm(0, 2), 0);
    }

    #[test]
    fn ema_first_observation_is_not_blended_toward_zero() {
        assert_eq!(ema(0.0, 420.0, 0.3), 420.0);
    }

    #[test]
    fn ema_blends_subsequent_observations() {
        let first = ema(0.0, 400.0, 0.3);
        let second = ema(first, 500.0, 0.3);
        assert_eq!(second, 0.3 * 500.0 + 0.7 * 400.0);
    }
}
