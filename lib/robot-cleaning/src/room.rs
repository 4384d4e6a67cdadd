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

use std::fmt::{Display, Formatter};

use rand::Rng as _;
use serde::{Deserialize, Serialize};

use crate::config::DustDistribution;
use crate::{Float, Int, Result, Rng, SimulationError};

/// A tile coordinate. Signed so that a step off the edge of the room is representable; the Room
/// decides whether a Location is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub x: Int,
    pub y: Int,
}

impl Location {
    pub fn new(x: Int, y: Int) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: Int, dy: Int) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn squared_distance(&self, other: &Location) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }

    pub fn chebyshev_distance(&self, other: &Location) -> Int {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A rectangular room of width * height tiles, each holding a non-negative amount of dust.
///
/// A tile counts as clean once its dust is at or below `clean_threshold`, which is 0 unless set
/// otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    width: usize,
    height: usize,
    dust: Vec<Float>,
    clean_threshold: Float,
}

impl Room {
    /// Creates a room with `dust_amount` on every tile.
    pub fn new(width: usize, height: usize, dust_amount: Float) -> Result<Self> {
        check_dimensions(width, height)?;
        check_dust_amount(dust_amount)?;
        Ok(Self {
            width,
            height,
            dust: vec![dust_amount; width * height],
            clean_threshold: 0.0,
        })
    }

    /// Creates a room whose initial dust is drawn tile by tile, in raster order, from
    /// `distribution`.
    pub fn with_distribution(
        width: usize,
        height: usize,
        distribution: &DustDistribution,
        rng: &mut Rng,
    ) -> Result<Self> {
        check_dimensions(width, height)?;
        distribution.validate()?;
        let dust = (0..width * height)
            .map(|_| distribution.sample(rng))
            .collect();
        Ok(Self {
            width,
            height,
            dust,
            clean_threshold: 0.0,
        })
    }

    /// Creates a room from explicit rows of dust, indexed as `rows[y][x]`.
    pub fn from_rows(rows: &[Vec<Float>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        check_dimensions(width, height)?;
        if rows.iter().any(|row| row.len() != width) {
            return Err(SimulationError::InvalidConfiguration(
                "dust rows must all have the same width".to_string(),
            ));
        }
        let mut dust = Vec::with_capacity(width * height);
        for amount in rows.iter().flatten() {
            check_dust_amount(*amount)?;
            dust.push(*amount);
        }
        Ok(Self {
            width,
            height,
            dust,
            clean_threshold: 0.0,
        })
    }

    pub fn with_clean_threshold(mut self, clean_threshold: Float) -> Self {
        self.clean_threshold = clean_threshold;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clean_threshold(&self) -> Float {
        self.clean_threshold
    }

    pub fn tile_count(&self) -> usize {
        self.width * self.height
    }

    pub fn contains(&self, location: &Location) -> bool {
        location.x >= 0
            && location.y >= 0
            && (location.x as usize) < self.width
            && (location.y as usize) < self.height
    }

    fn index(&self, location: &Location) -> Result<usize> {
        if !self.contains(location) {
            return Err(SimulationError::OutOfBounds {
                x: location.x,
                y: location.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(location.y as usize * self.width + location.x as usize)
    }

    pub fn dust_at(&self, location: &Location) -> Result<Float> {
        let index = self.index(location)?;
        Ok(self.dust[index])
    }

    /// Removes up to `amount` dust from the tile and returns how much was actually removed. Dust
    /// never drops below zero.
    pub fn clean(&mut self, location: &Location, amount: Float) -> Result<Float> {
        let index = self.index(location)?;
        let removed = amount.max(0.0).min(self.dust[index]);
        self.dust[index] -= removed;
        Ok(removed)
    }

    /// Drops `amount` dust on the tile. There is no upper bound.
    pub fn soil(&mut self, location: &Location, amount: Float) -> Result<()> {
        let index = self.index(location)?;
        self.dust[index] += amount.max(0.0);
        Ok(())
    }

    pub fn is_tile_clean(&self, location: &Location) -> Result<bool> {
        Ok(self.dust_at(location)? <= self.clean_threshold)
    }

    pub fn clean_tile_count(&self) -> usize {
        self.dust
            .iter()
            .filter(|&&amount| amount <= self.clean_threshold)
            .count()
    }

    /// Fraction of tiles that are clean, in [0, 1]. Walks the whole grid.
    pub fn cleanliness_fraction(&self) -> Float {
        self.clean_tile_count() as Float / self.tile_count() as Float
    }

    pub fn total_dust(&self) -> Float {
        self.dust.iter().sum()
    }

    pub fn random_location(&self, rng: &mut Rng) -> Location {
        Location {
            x: rng.gen_range(0..self.width) as Int,
            y: rng.gen_range(0..self.height) as Int,
        }
    }

    /// Every in-bounds location, lowest y first and then lowest x.
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| Location::new(x as Int, y as Int))
        })
    }

    /// Dust values as rows, `rows[y][x]`, for whoever wants to draw the room.
    pub fn dust_grid(&self) -> Vec<Vec<Float>> {
        self.dust
            .chunks(self.width)
            .map(|row| row.to_vec())
            .collect()
    }
}

// Highest y is printed first so that North points up.
impl Display for Room {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, row) in self.dust.chunks(self.width).rev().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let cells: Vec<String> = row.iter().map(|amount| format!("{:5.2}", amount)).collect();
            write!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(SimulationError::InvalidConfiguration(format!(
            "room must be at least 1x1, got {}x{}",
            width, height
        )));
    }
    if width > Int::MAX as usize || height > Int::MAX as usize {
        return Err(SimulationError::InvalidConfiguration(format!(
            "room {}x{} is too large",
            width, height
        )));
    }
    Ok(())
}

fn check_dust_amount(amount: Float) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(SimulationError::InvalidConfiguration(format!(
            "dust amount must be finite and non-negative, got {}",
            amount
        )));
    }
    Ok(())
}
