/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

use std::collections::BTreeMap;

use rand::Rng as _;
use serde::{Deserialize, Serialize};

use crate::robot::{Direction, RobotKind, SenseMetric, Strategy};
use crate::room::Location;
use crate::{Float, Result, Rng, SimulationError};

/// How much dust each tile starts with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DustDistribution {
    /// The same amount on every tile. Gives reproducible rooms without touching the rng.
    Fixed(Float),
    /// Drawn independently per tile from `[low, high)`.
    Uniform { low: Float, high: Float },
}

impl DustDistribution {
    pub fn validate(&self) -> Result<()> {
        match *self {
            DustDistribution::Fixed(amount) => {
                if !amount.is_finite() || amount < 0.0 {
                    return Err(invalid(format!(
                        "fixed dust must be finite and non-negative, got {}",
                        amount
                    )));
                }
            }
            DustDistribution::Uniform { low, high } => {
                if !low.is_finite() || !high.is_finite() || low < 0.0 || low > high {
                    return Err(invalid(format!(
                        "uniform dust range must satisfy 0 <= low <= high, got [{}, {})",
                        low, high
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn sample(&self, rng: &mut Rng) -> Float {
        match *self {
            DustDistribution::Fixed(amount) => amount,
            DustDistribution::Uniform { low, high } if high > low => rng.gen_range(low..high),
            DustDistribution::Uniform { low, .. } => low,
        }
    }
}

/// What to do with trials that hit `max_ticks` when computing the mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeoutConvention {
    /// Timed out trials contribute `max_ticks`.
    #[default]
    CountAsMaxTicks,
    /// Timed out trials are left out of the statistics (but still counted).
    Exclude,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub room_width: usize,
    pub room_height: usize,
    pub robot_count: usize,
    /// Relative weight of each robot kind. Counts and fractions both work, robots are handed out
    /// in proportion to the weights.
    pub robot_strategy_mix: BTreeMap<RobotKind, Float>,
    pub clean_rate: Float,
    pub fault_probability: Float,
    pub sense_radius: u32,
    pub sense_metric: SenseMetric,
    pub target_fraction: Float,
    pub max_ticks: u64,
    pub trial_count: usize,
    pub random_seed: u64,
    pub initial_dust: DustDistribution,
    pub clean_threshold: Float,
    /// Every robot starts here if set, otherwise at a random tile.
    pub start_location: Option<Location>,
    /// Every robot starts facing this way if set, otherwise a random direction.
    pub start_direction: Option<Direction>,
    pub timeout_convention: TimeoutConvention,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            room_width: 20,
            room_height: 20,
            robot_count: 1,
            robot_strategy_mix: BTreeMap::from([(RobotKind::Basic, 1.0)]),
            clean_rate: 1.0,
            fault_probability: 0.05,
            sense_radius: 1,
            sense_metric: SenseMetric::Chebyshev,
            target_fraction: 0.8,
            max_ticks: 100_000,
            trial_count: 20,
            random_seed: 42,
            initial_dust: DustDistribution::Fixed(3.0),
            clean_threshold: 0.0,
            start_location: None,
            start_direction: None,
            timeout_convention: TimeoutConvention::CountAsMaxTicks,
        }
    }
}

impl ExperimentConfig {
    /// The same configuration with every robot of `kind`.
    pub fn with_single_strategy(&self, kind: RobotKind) -> Self {
        Self {
            robot_strategy_mix: BTreeMap::from([(kind, 1.0)]),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.room_width == 0 || self.room_height == 0 {
            return Err(invalid(format!(
                "room must be at least 1x1, got {}x{}",
                self.room_width, self.room_height
            )));
        }
        if self.robot_count == 0 {
            return Err(invalid("robot_count must be at least 1".to_string()));
        }
        if self.trial_count == 0 {
            return Err(invalid("trial_count must be at least 1".to_string()));
        }
        if self.max_ticks == 0 {
            return Err(invalid("max_ticks must be at least 1".to_string()));
        }
        if !self.clean_rate.is_finite() || self.clean_rate <= 0.0 {
            return Err(invalid(format!(
                "clean_rate must be positive, got {}",
                self.clean_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.fault_probability) {
            return Err(invalid(format!(
                "fault_probability must be in [0, 1], got {}",
                self.fault_probability
            )));
        }
        if !(0.0..=1.0).contains(&self.target_fraction) {
            return Err(invalid(format!(
                "target_fraction must be in [0, 1], got {}",
                self.target_fraction
            )));
        }
        if !self.clean_threshold.is_finite() || self.clean_threshold < 0.0 {
            return Err(invalid(format!(
                "clean_threshold must be non-negative, got {}",
                self.clean_threshold
            )));
        }
        self.initial_dust.validate()?;

        if self
            .robot_strategy_mix
            .values()
            .any(|weight| !weight.is_finite() || *weight < 0.0)
        {
            return Err(invalid(
                "robot_strategy_mix weights must be finite and non-negative".to_string(),
            ));
        }
        if self.robot_strategy_mix.values().sum::<Float>() <= 0.0 {
            return Err(invalid(
                "robot_strategy_mix must give some robot kind a positive weight".to_string(),
            ));
        }

        if let Some(location) = self.start_location {
            if location.x < 0
                || location.y < 0
                || location.x as usize >= self.room_width
                || location.y as usize >= self.room_height
            {
                return Err(invalid(format!(
                    "start_location {} is outside the {}x{} room",
                    location, self.room_width, self.room_height
                )));
            }
        }
        Ok(())
    }

    /// Splits `robot_count` across the strategy mix with the largest remainder method, so the
    /// counts always add up to `robot_count`. Remainder ties go to the kind that sorts first.
    pub fn robot_counts(&self) -> Vec<(RobotKind, usize)> {
        let weighted: Vec<(RobotKind, Float)> = self
            .robot_strategy_mix
            .iter()
            .filter(|(_, weight)| **weight > 0.0)
            .map(|(kind, weight)| (*kind, *weight))
            .collect();
        let total_weight: Float = weighted.iter().map(|(_, weight)| weight).sum();
        if weighted.is_empty() || total_weight <= 0.0 {
            return Vec::new();
        }

        let quotas: Vec<Float> = weighted
            .iter()
            .map(|(_, weight)| self.robot_count as Float * weight / total_weight)
            .collect();
        let mut counts: Vec<usize> = quotas.iter().map(|quota| quota.floor() as usize).collect();
        let assigned: usize = counts.iter().sum();

        let mut by_remainder: Vec<usize> = (0..weighted.len()).collect();
        by_remainder.sort_by(|&a, &b| {
            let remainder_a = quotas[a] - quotas[a].floor();
            let remainder_b = quotas[b] - quotas[b].floor();
            remainder_b.total_cmp(&remainder_a).then(a.cmp(&b))
        });
        for &i in by_remainder
            .iter()
            .cycle()
            .take(self.robot_count.saturating_sub(assigned))
        {
            counts[i] += 1;
        }

        weighted
            .iter()
            .zip(counts)
            .map(|((kind, _), count)| (*kind, count))
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    pub fn strategy_for(&self, kind: RobotKind) -> Strategy {
        match kind {
            RobotKind::Basic => Strategy::Basic,
            RobotKind::Faulty => Strategy::Faulty {
                fault_probability: self.fault_probability,
            },
            RobotKind::Smart => Strategy::Smart {
                sense_radius: self.sense_radius,
                metric: self.sense_metric,
            },
        }
    }
}

fn invalid(message: String) -> SimulationError {
    SimulationError::InvalidConfiguration(message)
}
