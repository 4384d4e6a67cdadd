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

// Cleaning robots in a dusty room.
//
// A Room holds dust on a grid of tiles. Robots move around the room one tile per tick and clean
// (or, if faulty, soil) the tile they land on. A Simulation ticks a single room until enough of it
// is clean, and a TrialRunner repeats that many times to measure how long each strategy takes.

pub mod config;
pub mod error;
pub mod experiments;
pub mod robot;
pub mod room;
pub mod simulation;
pub mod trial;

pub use config::{DustDistribution, ExperimentConfig, TimeoutConvention};
pub use error::{Result, SimulationError};
pub use robot::{Direction, Robot, RobotKind, SenseMetric, Strategy};
pub use room::{Location, Room};
pub use simulation::{Simulation, SimulationState};
pub use trial::{ExperimentReport, TrialOutcome, TrialRunner, TrialSummary};

pub type Int = i32;
pub type Float = f64;
pub type Rng = rand_pcg::Pcg64;
