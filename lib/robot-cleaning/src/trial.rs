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

use rand::{Rng as _, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{ExperimentConfig, TimeoutConvention};
use crate::room::Room;
use crate::simulation::{Simulation, SimulationState};
use crate::{Float, Result, Rng};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub trial: usize,
    /// Ticks until the simulation finished. `max_ticks` if it timed out.
    pub ticks: u64,
    pub state: SimulationState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialSummary {
    pub trials: usize,
    pub converged: usize,
    pub timed_out: usize,
    /// How timed out trials were treated in the statistics below.
    pub convention: TimeoutConvention,
    pub mean_ticks: Option<Float>,
    /// Sample standard deviation, 0 for a single trial.
    pub std_dev_ticks: Option<Float>,
    pub min_ticks: Option<u64>,
    pub max_ticks: Option<u64>,
}

impl TrialSummary {
    pub fn from_outcomes(outcomes: &[TrialOutcome], convention: TimeoutConvention) -> Self {
        let converged = outcomes
            .iter()
            .filter(|outcome| outcome.state == SimulationState::Converged)
            .count();
        let timed_out = outcomes
            .iter()
            .filter(|outcome| outcome.state == SimulationState::TimedOut)
            .count();

        let ticks: Vec<u64> = outcomes
            .iter()
            .filter(|outcome| match convention {
                TimeoutConvention::CountAsMaxTicks => true,
                TimeoutConvention::Exclude => outcome.state == SimulationState::Converged,
            })
            .map(|outcome| outcome.ticks)
            .collect();

        let (mean_ticks, std_dev_ticks) = mean_and_std_dev(&ticks).unzip();
        Self {
            trials: outcomes.len(),
            converged,
            timed_out,
            convention,
            mean_ticks,
            std_dev_ticks,
            min_ticks: ticks.iter().copied().min(),
            max_ticks: ticks.iter().copied().max(),
        }
    }
}

fn mean_and_std_dev(values: &[u64]) -> Option<(Float, Float)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as Float;
    let mean = values.iter().map(|&v| v as Float).sum::<Float>() / n;
    if values.len() == 1 {
        return Some((mean, 0.0));
    }
    let variance = values
        .iter()
        .map(|&v| (v as Float - mean).powi(2))
        .sum::<Float>()
        / (n - 1.0);
    Some((mean, variance.sqrt()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    /// One outcome per trial, in trial order.
    pub outcomes: Vec<TrialOutcome>,
    pub summary: TrialSummary,
}

/// Runs the same configuration many times, each trial in a fresh room with fresh robots.
///
/// Every trial gets its own rng, seeded from a per-trial seed that is drawn up front from
/// `random_seed`. Trials therefore share no random state, can run on any thread in any order, and
/// the same config always gives the same outcomes.
#[derive(Debug, Clone)]
pub struct TrialRunner {
    config: ExperimentConfig,
}

impl TrialRunner {
    pub fn new(config: ExperimentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn trial_seeds(&self) -> Vec<u64> {
        let mut rng = Rng::seed_from_u64(self.config.random_seed);
        (0..self.config.trial_count).map(|_| rng.gen()).collect()
    }

    /// Runs every trial on the rayon thread pool.
    pub fn run(&self) -> Result<ExperimentReport> {
        let seeds = self.trial_seeds();
        let outcomes = seeds
            .par_iter()
            .enumerate()
            .map(|(trial, &seed)| self.run_trial(trial, seed))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.report(outcomes))
    }

    /// Same as `run`, on the calling thread.
    pub fn run_sequential(&self) -> Result<ExperimentReport> {
        let outcomes = self
            .trial_seeds()
            .into_iter()
            .enumerate()
            .map(|(trial, seed)| self.run_trial(trial, seed))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.report(outcomes))
    }

    pub fn run_trial(&self, trial: usize, seed: u64) -> Result<TrialOutcome> {
        self.run_trial_with_room(trial, seed)
            .map(|(outcome, _)| outcome)
    }

    /// Runs one trial and also hands back the room as it was when the trial ended.
    pub fn run_trial_with_room(&self, trial: usize, seed: u64) -> Result<(TrialOutcome, Room)> {
        let mut rng = Rng::seed_from_u64(seed);
        let mut simulation = Simulation::from_config(&self.config, &mut rng)?;
        let state = simulation.run(&mut rng)?;
        let outcome = TrialOutcome {
            trial,
            ticks: simulation.ticks(),
            state,
        };
        debug!(trial, ticks = outcome.ticks, ?state, "trial finished");
        Ok((outcome, simulation.into_room()))
    }

    fn report(&self, outcomes: Vec<TrialOutcome>) -> ExperimentReport {
        let summary = TrialSummary::from_outcomes(&outcomes, self.config.timeout_convention);
        if summary.timed_out > 0 {
            warn!(
                timed_out = summary.timed_out,
                trials = summary.trials,
                max_ticks = self.config.max_ticks,
                "some trials never reached the target fraction"
            );
        }
        info!(
            trials = summary.trials,
            converged = summary.converged,
            mean_ticks = ?summary.mean_ticks,
            std_dev_ticks = ?summary.std_dev_ticks,
            "experiment finished"
        );
        ExperimentReport { outcomes, summary }
    }
}
