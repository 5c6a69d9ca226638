//! Campaign distribution planning.
//!
//! Assigns each recipient of a bulk campaign to one of the selected
//! instances under the chosen sending mode. Planning happens once at
//! campaign start; an assignment is never revisited, even if the instance
//! disconnects later (its slice surfaces as delivery failures instead).
//!
//! The random source is injected so tests can seed it and assert exact
//! assignment vectors.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;
use crate::warming_level::clamp_level;

// ---------------------------------------------------------------------------
// Sending mode
// ---------------------------------------------------------------------------

/// Policy used to spread campaign recipients across instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendingMode {
    /// Strict round-robin in recipient order.
    Sequential,
    /// Independent uniform draw per recipient.
    Random,
    /// Weighted draw per recipient, weight = warming level (1-5).
    Warming,
}

impl SendingMode {
    /// Stable string form used in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Random => "random",
            Self::Warming => "warming",
        }
    }

    /// Parse the database string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sequential" => Some(Self::Sequential),
            "random" => Some(Self::Random),
            "warming" => Some(Self::Warming),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Planner input / preview output
// ---------------------------------------------------------------------------

/// One selected instance as seen by the planner.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct InstanceWeight {
    pub instance_id: DbId,
    /// Current warming level, clamped to 1-5 when used as a weight.
    pub warming_level: i16,
}

/// Expected traffic share for one instance, for preview display.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct InstanceShare {
    pub instance_id: DbId,
    pub weight: i64,
    /// `round(100 * weight / total_weight)`.
    pub percent: i32,
}

fn weight_for(instance: &InstanceWeight, mode: SendingMode) -> i64 {
    match mode {
        SendingMode::Warming => clamp_level(instance.warming_level) as i64,
        // Sequential and random both spread uniformly in expectation.
        SendingMode::Sequential | SendingMode::Random => 1,
    }
}

/// Expected per-instance percentages for a mode, without planning anything.
///
/// Returns an empty list for an empty instance list rather than erroring;
/// preview surfaces simply render nothing.
pub fn expected_shares(instances: &[InstanceWeight], mode: SendingMode) -> Vec<InstanceShare> {
    let total: i64 = instances.iter().map(|i| weight_for(i, mode)).sum();
    if total == 0 {
        return Vec::new();
    }
    instances
        .iter()
        .map(|i| {
            let weight = weight_for(i, mode);
            InstanceShare {
                instance_id: i.instance_id,
                weight,
                percent: (100.0 * weight as f64 / total as f64).round() as i32,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Assignment planning
// ---------------------------------------------------------------------------

/// Plan the instance assignment for every recipient of a campaign.
///
/// Returns one instance id per recipient, in recipient order. Fails with a
/// validation error when no instances are selected.
pub fn plan_assignments<R: Rng + ?Sized>(
    recipient_count: usize,
    instances: &[InstanceWeight],
    mode: SendingMode,
    rng: &mut R,
) -> Result<Vec<DbId>, CoreError> {
    if instances.is_empty() {
        return Err(CoreError::Validation(
            "Cannot plan a campaign with no selected instances".to_string(),
        ));
    }

    let assignments = match mode {
        SendingMode::Sequential => (0..recipient_count)
            .map(|i| instances[i % instances.len()].instance_id)
            .collect(),
        SendingMode::Random => (0..recipient_count)
            .map(|_| instances[rng.random_range(0..instances.len())].instance_id)
            .collect(),
        SendingMode::Warming => {
            let weights: Vec<i64> = instances.iter().map(|i| weight_for(i, mode)).collect();
            let total: i64 = weights.iter().sum();
            (0..recipient_count)
                .map(|_| {
                    let mut draw = rng.random_range(0..total);
                    for (instance, weight) in instances.iter().zip(&weights) {
                        if draw < *weight {
                            return instance.instance_id;
                        }
                        draw -= weight;
                    }
                    // Unreachable: draw < total = sum of weights.
                    instances[instances.len() - 1].instance_id
                })
                .collect()
        }
    };

    Ok(assignments)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn instances(levels: &[i16]) -> Vec<InstanceWeight> {
        levels
            .iter()
            .enumerate()
            .map(|(i, &warming_level)| InstanceWeight {
                instance_id: (i + 1) as DbId,
                warming_level,
            })
            .collect()
    }

    fn counts(assignments: &[DbId]) -> HashMap<DbId, usize> {
        let mut map = HashMap::new();
        for id in assignments {
            *map.entry(*id).or_insert(0) += 1;
        }
        map
    }

    #[test]
    fn sequential_is_strict_round_robin() {
        let mut rng = StdRng::seed_from_u64(0);
        let plan =
            plan_assignments(10, &instances(&[1, 1, 1]), SendingMode::Sequential, &mut rng)
                .unwrap();

        assert_eq!(plan, vec![1, 2, 3, 1, 2, 3, 1, 2, 3, 1]);
        let by_instance = counts(&plan);
        assert_eq!(by_instance[&1], 4);
        assert_eq!(by_instance[&2], 3);
        assert_eq!(by_instance[&3], 3);
    }

    #[test]
    fn sequential_ignores_rng_state() {
        let a = plan_assignments(
            7,
            &instances(&[1, 1]),
            SendingMode::Sequential,
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap();
        let b = plan_assignments(
            7,
            &instances(&[1, 1]),
            SendingMode::Sequential,
            &mut StdRng::seed_from_u64(99),
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn random_is_reproducible_with_same_seed() {
        let a = plan_assignments(
            50,
            &instances(&[1, 1, 1]),
            SendingMode::Random,
            &mut StdRng::seed_from_u64(42),
        )
        .unwrap();
        let b = plan_assignments(
            50,
            &instances(&[1, 1, 1]),
            SendingMode::Random,
            &mut StdRng::seed_from_u64(42),
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn random_covers_all_instances() {
        let mut rng = StdRng::seed_from_u64(7);
        let plan =
            plan_assignments(300, &instances(&[1, 1, 1]), SendingMode::Random, &mut rng).unwrap();
        let by_instance = counts(&plan);
        assert_eq!(by_instance.len(), 3);
    }

    #[test]
    fn weighted_ratio_converges_to_weights() {
        let mut rng = StdRng::seed_from_u64(1234);
        let plan = plan_assignments(
            6000,
            &instances(&[5, 1]),
            SendingMode::Warming,
            &mut rng,
        )
        .unwrap();
        let by_instance = counts(&plan);

        // Expectation: 5000 vs 1000. Allow +-10%.
        let high = by_instance[&1] as f64;
        let low = by_instance[&2] as f64;
        assert!((4500.0..=5500.0).contains(&high), "high share was {high}");
        assert!((500.0..=1500.0).contains(&low), "low share was {low}");
    }

    #[test]
    fn weighted_with_equal_levels_is_uniformish() {
        let mut rng = StdRng::seed_from_u64(5);
        let plan = plan_assignments(
            3000,
            &instances(&[3, 3, 3]),
            SendingMode::Warming,
            &mut rng,
        )
        .unwrap();
        let by_instance = counts(&plan);
        for count in by_instance.values() {
            assert!((800..=1200).contains(count), "count was {count}");
        }
    }

    #[test]
    fn weighted_clamps_out_of_range_levels() {
        // Level 0 is treated as 1, level 9 as 5: both instances get traffic.
        let mut rng = StdRng::seed_from_u64(2);
        let plan = plan_assignments(
            600,
            &instances(&[0, 9]),
            SendingMode::Warming,
            &mut rng,
        )
        .unwrap();
        let by_instance = counts(&plan);
        assert!(by_instance.contains_key(&1));
        assert!(by_instance.contains_key(&2));
    }

    #[test]
    fn empty_instance_list_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let result = plan_assignments(10, &[], SendingMode::Sequential, &mut rng);
        assert!(result.is_err());
    }

    #[test]
    fn zero_recipients_yields_empty_plan() {
        let mut rng = StdRng::seed_from_u64(0);
        let plan =
            plan_assignments(0, &instances(&[1]), SendingMode::Random, &mut rng).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn expected_shares_for_weighted_mode() {
        let shares = expected_shares(&instances(&[5, 1]), SendingMode::Warming);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].percent, 83); // round(100 * 5 / 6)
        assert_eq!(shares[1].percent, 17); // round(100 * 1 / 6)
    }

    #[test]
    fn expected_shares_uniform_for_sequential() {
        let shares = expected_shares(&instances(&[5, 1, 2]), SendingMode::Sequential);
        for share in shares {
            assert_eq!(share.percent, 33);
        }
    }

    #[test]
    fn expected_shares_empty_input() {
        assert!(expected_shares(&[], SendingMode::Warming).is_empty());
    }

    #[test]
    fn sending_mode_round_trips_through_string_form() {
        for mode in [
            SendingMode::Sequential,
            SendingMode::Random,
            SendingMode::Warming,
        ] {
            assert_eq!(SendingMode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(SendingMode::parse("broadcast"), None);
    }
}
