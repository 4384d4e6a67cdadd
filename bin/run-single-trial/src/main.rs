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

use rand::SeedableRng;
use robot_cleaning::{
    DustDistribution, ExperimentConfig, Rng, RobotKind, Simulation, SimulationError,
};
use std::collections::BTreeMap;
use tracing::info;

// Runs one simulation of a Basic and a Smart robot and prints the room before and after.
fn main() -> Result<(), SimulationError> {
    tracing_subscriber::fmt::init();

    let config = ExperimentConfig {
        room_width: 8,
        room_height: 6,
        robot_count: 2,
        robot_strategy_mix: BTreeMap::from([(RobotKind::Basic, 1.0), (RobotKind::Smart, 1.0)]),
        sense_radius: 2,
        initial_dust: DustDistribution::Uniform {
            low: 0.0,
            high: 3.0,
        },
        target_fraction: 0.9,
        max_ticks: 1_000,
        ..Default::default()
    };

    let mut rng = Rng::seed_from_u64(config.random_seed);
    let mut simulation = Simulation::from_config(&config, &mut rng)?;
    println!("before:\n{}\n", simulation.room());
    let state = simulation.run(&mut rng)?;
    info!(ticks = simulation.ticks(), ?state, "simulation finished");

    println!("after:\n{}\n", simulation.room());
    for robot in simulation.robots() {
        println!(
            "{} at {} facing {:?}",
            robot.kind(),
            robot.location(),
            robot.direction()
        );
    }
    println!(
        "{:?} after {} ticks, {:.1}% clean",
        state,
        simulation.ticks(),
        simulation.room().cleanliness_fraction() * 100.0
    );
    Ok(())
}
