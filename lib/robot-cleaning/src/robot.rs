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

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt::{Display, Formatter};

use rand::Rng as _;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::room::{Location, Room};
use crate::{Float, Int, Result, Rng};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// North is +y and East is +x.
    pub fn delta(&self) -> (Int, Int) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// Heading in radians, counterclockwise from East.
    pub fn heading(&self) -> Float {
        match self {
            Direction::East => 0.0,
            Direction::North => FRAC_PI_2,
            Direction::West => PI,
            Direction::South => 3.0 * FRAC_PI_2,
        }
    }

    /// The direction closest to `heading`, East or West when it sits exactly between two.
    pub fn from_heading(heading: Float) -> Self {
        nearest_direction(heading.cos(), heading.sin())
    }
}

fn nearest_direction(x: Float, y: Float) -> Direction {
    if x.abs() >= y.abs() {
        if x >= 0.0 {
            Direction::East
        } else {
            Direction::West
        }
    } else if y >= 0.0 {
        Direction::North
    } else {
        Direction::South
    }
}

/// Uniform over the full circle.
pub fn random_heading(rng: &mut Rng) -> Float {
    rng.gen_range(0.0..TAU)
}

/// The kind of robot, without its parameters. Ordered Basic, Faulty, Smart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RobotKind {
    Basic,
    Faulty,
    Smart,
}

impl RobotKind {
    pub const ALL: [RobotKind; 3] = [RobotKind::Basic, RobotKind::Faulty, RobotKind::Smart];
}

impl Display for RobotKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RobotKind::Basic => write!(f, "BasicRobot"),
            RobotKind::Faulty => write!(f, "FaultyRobot"),
            RobotKind::Smart => write!(f, "SmartRobot"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SenseMetric {
    /// A square of side 2r+1 around the robot.
    #[default]
    Chebyshev,
    /// A disc of radius r around the robot.
    Euclidean,
}

/// How a robot picks where to go and what it does when it gets there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Strategy {
    /// Drive straight; on hitting a wall stay put and pick a random heading.
    Basic,
    /// Drive like Basic, but with probability `fault_probability` drop dust instead of cleaning.
    Faulty { fault_probability: Float },
    /// Head for the dirtiest tile within `sense_radius`, one tile per tick.
    Smart { sense_radius: u32, metric: SenseMetric },
}

impl Strategy {
    pub fn kind(&self) -> RobotKind {
        match self {
            Strategy::Basic => RobotKind::Basic,
            Strategy::Faulty { .. } => RobotKind::Faulty,
            Strategy::Smart { .. } => RobotKind::Smart,
        }
    }
}

/// A robot at a tile of a Room, travelling along a heading.
///
/// The heading is an angle, so a robot driving straight traces a line across the grid at any
/// slope. Each tick it still moves a single tile North, South, East or West: whichever keeps it
/// closest to that line. `direction` is the step it took last (or will take next, before it has
/// moved).
///
/// The robot does not hold on to the Room; the Simulation owns both and hands the room to `act`
/// once per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Robot {
    location: Location,
    direction: Direction,
    heading: Float,
    // How far the tiles walked so far lag behind the ideal line, in tiles.
    drift: (Float, Float),
    clean_rate: Float,
    strategy: Strategy,
}

impl Robot {
    pub fn new(
        location: Location,
        direction: Direction,
        clean_rate: Float,
        strategy: Strategy,
    ) -> Self {
        Self::with_heading(location, direction.heading(), clean_rate, strategy)
    }

    pub fn with_heading(
        location: Location,
        heading: Float,
        clean_rate: Float,
        strategy: Strategy,
    ) -> Self {
        Self {
            location,
            direction: Direction::from_heading(heading),
            heading,
            drift: (0.0, 0.0),
            clean_rate,
            strategy,
        }
    }

    /// A robot on a random tile of `room` with a random heading.
    pub fn new_random(room: &Room, clean_rate: Float, strategy: Strategy, rng: &mut Rng) -> Self {
        let location = room.random_location(rng);
        let heading = random_heading(rng);
        Self::with_heading(location, heading, clean_rate, strategy)
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn heading(&self) -> Float {
        self.heading
    }

    pub fn clean_rate(&self) -> Float {
        self.clean_rate
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn kind(&self) -> RobotKind {
        self.strategy.kind()
    }

    /// One tick: pick a tile, move (at most one step), then clean or soil the tile under the
    /// robot. The robot never leaves the room, and a robot that was placed outside it gets
    /// `OutOfBounds` rather than a quiet no-op.
    pub fn act(&mut self, room: &mut Room, rng: &mut Rng) -> Result<()> {
        room.dust_at(&self.location)?;
        match self.strategy {
            Strategy::Basic => self.act_basic(room, rng),
            Strategy::Faulty { fault_probability } => {
                self.act_faulty(room, rng, fault_probability)
            }
            Strategy::Smart {
                sense_radius,
                metric,
            } => self.act_smart(room, rng, sense_radius, metric),
        }
    }

    fn act_basic(&mut self, room: &mut Room, rng: &mut Rng) -> Result<()> {
        if self.try_step(room, rng) {
            room.clean(&self.location, self.clean_rate)?;
        }
        Ok(())
    }

    fn act_faulty(&mut self, room: &mut Room, rng: &mut Rng, fault_probability: Float) -> Result<()> {
        if !self.try_step(room, rng) {
            return Ok(());
        }
        if rng.gen::<Float>() < fault_probability {
            trace!(location = %self.location, "faulty robot dropped dust");
            room.soil(&self.location, self.clean_rate)
        } else {
            room.clean(&self.location, self.clean_rate).map(|_| ())
        }
    }

    fn act_smart(
        &mut self,
        room: &mut Room,
        rng: &mut Rng,
        sense_radius: u32,
        metric: SenseMetric,
    ) -> Result<()> {
        match sense_dirtiest(room, &self.location, sense_radius, metric)? {
            Some(target) => {
                self.step_toward(&target);
                room.clean(&self.location, self.clean_rate)?;
                Ok(())
            }
            None => self.act_basic(room, rng),
        }
    }

    fn set_heading(&mut self, heading: Float) {
        self.heading = heading;
        self.direction = Direction::from_heading(heading);
        self.drift = (0.0, 0.0);
    }

    // Returns whether the robot moved. A blocked robot stays put and draws one new random
    // heading, which is tried on the next tick.
    fn try_step(&mut self, room: &Room, rng: &mut Rng) -> bool {
        // Scaled so every tick adds exactly one tile of travel, which the step then takes back.
        let (cos, sin) = (self.heading.cos(), self.heading.sin());
        let norm = cos.abs() + sin.abs();
        let drift_x = self.drift.0 + cos / norm;
        let drift_y = self.drift.1 + sin / norm;

        let direction = nearest_direction(drift_x, drift_y);
        let (dx, dy) = direction.delta();
        let next = self.location.offset(dx, dy);
        if room.contains(&next) {
            self.location = next;
            self.direction = direction;
            self.drift = (drift_x - dx as Float, drift_y - dy as Float);
            true
        } else {
            self.set_heading(random_heading(rng));
            false
        }
    }

    // Moves one tile along the axis with the larger distance to go, x on a tie.
    fn step_toward(&mut self, target: &Location) {
        let dx = target.x - self.location.x;
        let dy = target.y - self.location.y;
        if dx == 0 && dy == 0 {
            return;
        }
        let direction = nearest_direction(dx as Float, dy as Float);
        self.set_heading(direction.heading());
        let (step_x, step_y) = direction.delta();
        self.location = self.location.offset(step_x, step_y);
    }
}

/// Looks at every tile within `radius` of `origin` and returns the dirtiest one that is not yet
/// clean. Ties go to the tile nearest `origin` (Euclidean), then to the lowest y, then the lowest
/// x. Returns None when everything in range is clean.
pub fn sense_dirtiest(
    room: &Room,
    origin: &Location,
    radius: u32,
    metric: SenseMetric,
) -> Result<Option<Location>> {
    let radius = radius.min(Int::MAX as u32 / 2) as Int;
    let min_y = (origin.y - radius).max(0);
    let max_y = (origin.y + radius).min(room.height() as Int - 1);
    let min_x = (origin.x - radius).max(0);
    let max_x = (origin.x + radius).min(room.width() as Int - 1);

    let mut best: Option<(Location, Float, i64)> = None;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let candidate = Location::new(x, y);
            let distance = candidate.squared_distance(origin);
            if metric == SenseMetric::Euclidean && distance > i64::from(radius).pow(2) {
                continue;
            }
            let dust = room.dust_at(&candidate)?;
            if dust <= room.clean_threshold() {
                continue;
            }
            // Candidates arrive in raster order, so only a strictly better one replaces the best.
            let is_better = match best {
                None => true,
                Some((_, best_dust, best_distance)) => {
                    dust > best_dust || (dust == best_dust && distance < best_distance)
                }
            };
            if is_better {
                best = Some((candidate, dust, distance));
            }
        }
    }
    Ok(best.map(|(location, _, _)| location))
}
