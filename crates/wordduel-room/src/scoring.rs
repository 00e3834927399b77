//! Points for one round.
//!
//! ```text
//! guess points = max(0, max_guesses - guesses_used) * 10
//! time bonus   = max(0, 5 - floor(seconds / 30)) * 10   (0 if guess points are 0)
//! ```

/// Points per attempt left unused.
pub const POINTS_PER_SPARE_GUESS: u32 = 10;

/// Length of one time-bonus step, in seconds.
pub const TIME_STEP_SECS: f64 = 30.0;

/// Bonus steps available to a round solved in under [`TIME_STEP_SECS`].
pub const MAX_TIME_STEPS: u32 = 5;

/// Points per remaining time-bonus step.
pub const POINTS_PER_TIME_STEP: u32 = 10;

/// Points for unused attempts.
pub fn guess_points(max_guesses: u32, guesses_used: u32) -> u32 {
    max_guesses
        .saturating_sub(guesses_used)
        .saturating_mul(POINTS_PER_SPARE_GUESS)
}

/// Bonus for answering quickly. Negative and NaN durations count as
/// zero seconds.
pub fn time_bonus(seconds: f64) -> u32 {
    let seconds = if seconds.is_nan() { 0.0 } else { seconds.max(0.0) };
    let elapsed_steps = (seconds / TIME_STEP_SECS).floor();
    let elapsed_steps = if elapsed_steps >= f64::from(MAX_TIME_STEPS) {
        MAX_TIME_STEPS
    } else {
        elapsed_steps as u32
    };
    (MAX_TIME_STEPS - elapsed_steps) * POINTS_PER_TIME_STEP
}

/// Total points for one submitted result.
///
/// A result that earns no guess points earns no time bonus either, so
/// a fast failure is still worth nothing.
pub fn round_points(max_guesses: u32, guesses_used: u32, seconds: f64) -> u32 {
    match guess_points(max_guesses, guesses_used) {
        0 => 0,
        points => points.saturating_add(time_bonus(seconds)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_solve() {
        // 3 spare attempts, under 30 seconds.
        assert_eq!(round_points(6, 3, 10.0), 80);
    }

    #[test]
    fn test_huge_attempt_counts_saturate() {
        assert_eq!(guess_points(u32::MAX, 0), u32::MAX);
        assert_eq!(round_points(500_000_000, 1, 0.0), u32::MAX);
    }

    #[test]
    fn test_exhausted_earns_nothing() {
        assert_eq!(round_points(6, 6, 200.0), 0);
        assert_eq!(round_points(6, 6, 1.0), 0);
        assert_eq!(round_points(6, 7, 1.0), 0);
    }

    #[test]
    fn test_time_bonus_steps() {
        assert_eq!(time_bonus(0.0), 50);
        assert_eq!(time_bonus(29.9), 50);
        assert_eq!(time_bonus(30.0), 40);
        assert_eq!(time_bonus(119.0), 20);
        assert_eq!(time_bonus(149.9), 10);
        assert_eq!(time_bonus(150.0), 0);
        assert_eq!(time_bonus(10_000.0), 0);
    }

    #[test]
    fn test_odd_durations_count_as_zero() {
        assert_eq!(time_bonus(-5.0), 50);
        assert_eq!(time_bonus(f64::NAN), 50);
        assert_eq!(time_bonus(f64::INFINITY), 0);
    }

    #[test]
    fn test_slow_solve_keeps_guess_points() {
        assert_eq!(round_points(6, 1, 400.0), 50);
    }
}
