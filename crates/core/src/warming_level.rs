//! Warming level classification.
//!
//! The warming level is a 1-5 reputation score derived from how long an
//! instance has been warming, how much it has sent, and how often targets
//! reply. It is persisted on the instance row and consumed by the weighted
//! campaign distribution policy. The level never decreases automatically;
//! demotion is an external policy decision.

/// Lowest (initial) warming level.
pub const MIN_LEVEL: i16 = 1;

/// Highest warming level.
pub const MAX_LEVEL: i16 = 5;

/// Classify an instance's warming level from its cumulative counters.
///
/// Thresholds are evaluated from highest to lowest; the first satisfied
/// level wins. Response rate is `total_received / total_sent`, or 0 when
/// nothing has been sent yet.
pub fn classify(current_day: i32, total_sent: i64, total_received: i64) -> i16 {
    let response_rate = if total_sent > 0 {
        total_received as f64 / total_sent as f64
    } else {
        0.0
    };

    if current_day >= 21 && total_sent >= 1000 && response_rate >= 0.30 {
        5
    } else if current_day >= 14 && total_sent >= 500 && response_rate >= 0.25 {
        4
    } else if current_day >= 7 && total_sent >= 200 && response_rate >= 0.20 {
        3
    } else if current_day >= 3 && total_sent >= 50 && response_rate >= 0.10 {
        2
    } else {
        1
    }
}

/// Clamp a stored level into the valid 1-5 range.
///
/// Defensive read-side guard for rows written before a constraint existed.
pub fn clamp_level(level: i16) -> i16 {
    level.clamp(MIN_LEVEL, MAX_LEVEL)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_instance_is_level_one() {
        assert_eq!(classify(1, 0, 0), 1);
    }

    #[test]
    fn level_five_at_all_thresholds() {
        assert_eq!(classify(21, 1000, 300), 5);
    }

    #[test]
    fn day_boundary_is_strict_for_level_five() {
        // Same counters one day earlier only qualify for level 4.
        assert_eq!(classify(20, 1000, 300), 4);
    }

    #[test]
    fn level_four_thresholds() {
        assert_eq!(classify(14, 500, 125), 4);
    }

    #[test]
    fn level_three_thresholds() {
        assert_eq!(classify(7, 200, 40), 3);
    }

    #[test]
    fn level_two_thresholds() {
        assert_eq!(classify(3, 50, 5), 2);
    }

    #[test]
    fn volume_without_response_rate_stays_low() {
        // Plenty of sends but nobody replies: never leaves level 1.
        assert_eq!(classify(21, 5000, 0), 1);
    }

    #[test]
    fn response_rate_without_volume_stays_low() {
        // Great response rate but too little volume for level 2.
        assert_eq!(classify(10, 10, 9), 1);
    }

    #[test]
    fn zero_sent_has_zero_response_rate() {
        // Guard against division by zero: received > 0 with sent = 0.
        assert_eq!(classify(21, 0, 500), 1);
    }

    #[test]
    fn highest_satisfied_level_wins() {
        // Satisfies levels 2..=4 but not 5 (day too low).
        assert_eq!(classify(15, 2000, 600), 4);
    }

    #[test]
    fn clamp_level_bounds() {
        assert_eq!(clamp_level(0), 1);
        assert_eq!(clamp_level(3), 3);
        assert_eq!(clamp_level(9), 5);
    }
}
