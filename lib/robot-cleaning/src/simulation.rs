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

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::ExperimentConfig;
use crate::error::SimulationError;
use crate::robot::{random_heading, Robot};
use crate::room::Room;
use crate::{Float, Result, Rng};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulationState {
    Running,
    /// The room reached the target cleanliness fraction.
    Converged,
    /// `max_ticks` ran out first. Not an error, just a trial that never got clean enough.
    TimedOut,
}

impl SimulationState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SimulationState::Running)
    }
}

/// One room and the robots cleaning it, ticked until the room is clean enough or `max_ticks`
/// ticks have passed.
///
/// Robots act in the order they were given, one after the other, so a robot sees the dust left
/// behind by the robots before it in the same tick.
#[derive(Debug, Clone)]
pub struct Simulation {
    room: Room,
    robots: Vec<Robot>,
    ticks: u64,
    target_fraction: Float,
    max_ticks: u64,
    state: SimulationState,
}

impl Simulation {
    /// Fails with `OutOfBounds` if any robot starts outside the room.
    pub fn new(
        room: Room,
        robots: Vec<Robot>,
        target_fraction: Float,
        max_ticks: u64,
    ) -> Result<Self> {
        if let Some(robot) = robots.iter().find(|robot| !room.contains(&robot.location())) {
            let location = robot.location();
            return Err(SimulationError::OutOfBounds {
                x: location.x,
                y: location.y,
                width: room.width(),
                height: room.height(),
            });
        }
        let state = if room.cleanliness_fraction() >= target_fraction {
            SimulationState::Converged
        } else if max_ticks == 0 {
            SimulationState::TimedOut
        } else {
            SimulationState::Running
        };
        Ok(Self {
            room,
            robots,
            ticks: 0,
            target_fraction,
            max_ticks,
            state,
        })
    }

    /// Builds a fresh room and robots for one trial. Initial dust is drawn first, then each
    /// robot's location and heading, all from `rng`. Robots are ordered Basic, Faulty, Smart.
    pub fn from_config(config: &ExperimentConfig, rng: &mut Rng) -> Result<Self> {
        config.validate()?;
        let room = Room::with_distribution(
            config.room_width,
            config.room_height,
            &config.initial_dust,
            rng,
        )?
        .with_clean_threshold(config.clean_threshold);

        let mut robots = Vec::with_capacity(config.robot_count);
        for (kind, count) in config.robot_counts() {
            let strategy = config.strategy_for(kind);
            for _ in 0..count {
                let location = match config.start_location {
                    Some(location) => location,
                    None => room.random_location(rng),
                };
                let heading = match config.start_direction {
                    Some(direction) => direction.heading(),
                    None => random_heading(rng),
                };
                robots.push(Robot::with_heading(
                    location,
                    heading,
                    config.clean_rate,
                    strategy,
                ));
            }
        }

        Self::new(room, robots, config.target_fraction, config.max_ticks)
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn target_fraction(&self) -> Float {
        self.target_fraction
    }

    pub fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Advances one tick. Does nothing once the simulation has finished.
    pub fn step(&mut self, rng: &mut Rng) -> Result<SimulationState> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }

        for robot in self.robots.iter_mut() {
            robot.act(&mut self.room, rng)?;
        }
        self.ticks += 1;

        let fraction = self.room.cleanliness_fraction();
        trace!(tick = self.ticks, fraction, "tick");
        if fraction >= self.target_fraction {
            self.state = SimulationState::Converged;
        } else if self.ticks >= self.max_ticks {
            self.state = SimulationState::TimedOut;
        }
        Ok(self.state)
    }

    /// Steps until Converged or TimedOut and returns the final state. `ticks()` then holds the
    /// terminal tick count, which is `max_ticks` for a timeout.
    pub fn run(&mut self, rng: &mut Rng) -> Result<SimulationState> {
        while !self.state.is_terminal() {
            self.step(rng)?;
        }
        Ok(self.state)
    }

    pub fn into_room(self) -> Room {
        self.room
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;
    use rand::SeedableRng;

    use super::*;
    use crate::config::DustDistribution;
    use crate::robot::{Direction, RobotKind, SenseMetric, Strategy};
    use crate::room::Location;
    use crate::Rng;

    fn faulty(fault_probability: Float) -> Strategy {
        Strategy::Faulty { fault_probability }
    }

    #[test]
    fn test_zero_target_converges_at_tick_zero() {
        let mut rng = Rng::seed_from_u64(42);
        let room = Room::new(5, 5, 1.0).unwrap();
        let robots = vec![Robot::new(
            Location::new(0, 0),
            Direction::East,
            1.0,
            Strategy::Basic,
        )];
        let mut simulation = Simulation::new(room, robots, 0.0, 100).unwrap();
        assert_eq!(simulation.state(), SimulationState::Converged);
        assert_eq!(simulation.run(&mut rng), Ok(SimulationState::Converged));
        assert_eq!(simulation.ticks(), 0);
        assert_eq!(simulation.robots()[0].location(), Location::new(0, 0));
    }

    #[test]
    fn test_all_faulty_robots_at_probability_one_time_out() {
        let mut rng = Rng::seed_from_u64(42);
        let room = Room::new(3, 3, 1.0).unwrap();
        let robots = (0..3)
            .map(|_| Robot::new_random(&room, 1.0, faulty(1.0), &mut rng))
            .collect();
        let mut simulation = Simulation::new(room, robots, 0.1, 200).unwrap();
        assert_eq!(simulation.run(&mut rng), Ok(SimulationState::TimedOut));
        assert_eq!(simulation.ticks(), 200);
        assert!(simulation.room().total_dust() >= 9.0);
    }

    #[test]
    fn test_single_basic_robot_cleans_five_by_five_room() {
        let mut rng = Rng::seed_from_u64(42);
        let room = Room::new(5, 5, 1.0).unwrap();
        let robots = vec![Robot::new(
            Location::new(0, 0),
            Direction::East,
            1.0,
            Strategy::Basic,
        )];
        let mut simulation = Simulation::new(room, robots, 1.0, 10_000).unwrap();

        // Heading due east, so the first row is swept before the robot hits the east wall. After
        // that every bump draws a new random heading and the robot crosses the interior.
        for x in 1..5 {
            simulation.step(&mut rng).unwrap();
            assert_eq!(simulation.robots()[0].location(), Location::new(x, 0));
        }

        assert_eq!(simulation.run(&mut rng), Ok(SimulationState::Converged));
        // Every tile has to be entered once and the start tile is not cleaned on placement.
        assert!(simulation.ticks() >= 25, "ticks: {}", simulation.ticks());
        let room = simulation.into_room();
        for location in room.locations() {
            assert_eq!(room.dust_at(&location), Ok(0.0), "location: {}", location);
        }
    }

    #[test]
    fn test_robot_outside_room_is_rejected() {
        let room = Room::new(3, 3, 1.0).unwrap();
        let robots = vec![
            Robot::new(Location::new(1, 1), Direction::East, 1.0, Strategy::Basic),
            Robot::new(Location::new(10, 10), Direction::East, 1.0, Strategy::Basic),
        ];
        assert_eq!(
            Simulation::new(room, robots, 1.0, 10).map(|_| ()),
            Err(SimulationError::OutOfBounds {
                x: 10,
                y: 10,
                width: 3,
                height: 3,
            })
        );
    }

    #[test]
    fn test_terminal_state_is_sticky() {
        let mut rng = Rng::seed_from_u64(42);
        let room = Room::new(2, 1, 1.0).unwrap();
        let robots = vec![Robot::new(
            Location::new(0, 0),
            Direction::East,
            1.0,
            Strategy::Basic,
        )];
        let mut simulation = Simulation::new(room, robots, 0.5, 10).unwrap();
        assert_eq!(simulation.step(&mut rng), Ok(SimulationState::Converged));
        assert_eq!(simulation.ticks(), 1);
        assert_eq!(simulation.step(&mut rng), Ok(SimulationState::Converged));
        assert_eq!(simulation.ticks(), 1);
        assert_eq!(simulation.robots()[0].location(), Location::new(1, 0));
    }

    #[test]
    fn test_robots_act_in_order_within_a_tick() {
        let mut rng = Rng::seed_from_u64(42);
        let room = Room::from_rows(&[vec![0.0, 1.0, 0.0]]).unwrap();
        let smart = Strategy::Smart {
            sense_radius: 1,
            metric: SenseMetric::Chebyshev,
        };
        let robots = vec![
            Robot::new(Location::new(0, 0), Direction::West, 1.0, smart),
            Robot::new(Location::new(2, 0), Direction::East, 1.0, smart),
        ];
        let mut simulation = Simulation::new(room, robots, 1.0, 10).unwrap();
        assert_eq!(simulation.step(&mut rng), Ok(SimulationState::Converged));
        // The first robot cleaned the middle tile, so the second one found nothing to chase and
        // bumped into the east wall instead.
        assert_eq!(simulation.robots()[0].location(), Location::new(1, 0));
        assert_eq!(simulation.robots()[1].location(), Location::new(2, 0));
    }

    #[test]
    fn test_from_config_places_robots_and_dust() {
        let mut rng = Rng::seed_from_u64(42);
        let config = ExperimentConfig {
            room_width: 6,
            room_height: 4,
            robot_count: 3,
            robot_strategy_mix: BTreeMap::from([(RobotKind::Smart, 1.0), (RobotKind::Basic, 2.0)]),
            start_location: Some(Location::new(5, 3)),
            start_direction: Some(Direction::South),
            initial_dust: DustDistribution::Fixed(2.0),
            clean_threshold: 0.5,
            ..Default::default()
        };
        let simulation = Simulation::from_config(&config, &mut rng).unwrap();
        assert_eq!(simulation.room().width(), 6);
        assert_eq!(simulation.room().height(), 4);
        assert_eq!(simulation.room().clean_threshold(), 0.5);
        let kinds: Vec<RobotKind> = simulation.robots().iter().map(Robot::kind).collect();
        assert_eq!(kinds, vec![RobotKind::Basic, RobotKind::Basic, RobotKind::Smart]);
        for robot in simulation.robots() {
            assert_eq!(robot.location(), Location::new(5, 3));
            assert_eq!(robot.direction(), Direction::South);
        }
        assert_eq!(simulation.state(), SimulationState::Running);
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let mut rng = Rng::seed_from_u64(42);
        let config = ExperimentConfig {
            trial_count: 0,
            ..Default::default()
        };
        assert!(Simulation::from_config(&config, &mut rng).is_err());
    }

    proptest! {
        #[test]
        fn test_cleanliness_never_decreases_without_faulty_robots(
            seed in any::<u64>(),
            basic in 0..3usize,
            smart in 0..3usize,
        ) {
            prop_assume!(basic + smart > 0);
            let config = ExperimentConfig {
                room_width: 6,
                room_height: 5,
                robot_count: basic + smart,
                robot_strategy_mix: BTreeMap::from([
                    (RobotKind::Basic, basic as Float),
                    (RobotKind::Smart, smart as Float),
                ]),
                initial_dust: DustDistribution::Uniform { low: 0.0, high: 3.0 },
                target_fraction: 1.0,
                max_ticks: 300,
                ..Default::default()
            };
            let mut rng = Rng::seed_from_u64(seed);
            let mut simulation = Simulation::from_config(&config, &mut rng).unwrap();
            let mut previous = simulation.room().cleanliness_fraction();
            while !simulation.state().is_terminal() {
                simulation.step(&mut rng).unwrap();
                let current = simulation.room().cleanliness_fraction();
                prop_assert!(current >= previous);
                previous = current;
            }
            prop_assert!(simulation.ticks() <= 300);
        }
    }
}
