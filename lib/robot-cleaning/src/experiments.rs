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

// Parameter sweeps for comparing strategies: how long does each kind of robot take as the number
// of robots grows, and as the room gets longer and thinner at a fixed number of tiles. Each point
// is a full TrialRunner experiment; plotting the series is left to the caller.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ExperimentConfig;
use crate::robot::RobotKind;
use crate::trial::{TrialRunner, TrialSummary};
use crate::{Float, Result};

pub const DEFAULT_ROBOT_COUNTS: [usize; 5] = [1, 2, 3, 4, 5];
pub const DEFAULT_ROOM_WIDTHS: [usize; 4] = [10, 20, 25, 50];
pub const DEFAULT_ROOM_AREA: usize = 300;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub kind: RobotKind,
    /// The swept value: robot count, or width / height for room shapes.
    pub x: Float,
    pub room_width: usize,
    pub room_height: usize,
    pub robot_count: usize,
    pub summary: TrialSummary,
}

/// For every kind, runs `base` with each robot count in turn. Points are grouped by kind, in the
/// order given.
pub fn sweep_robot_counts(
    base: &ExperimentConfig,
    kinds: &[RobotKind],
    robot_counts: &[usize],
) -> Result<Vec<SweepPoint>> {
    let mut points = Vec::with_capacity(kinds.len() * robot_counts.len());
    for &kind in kinds {
        for &robot_count in robot_counts {
            info!(%kind, robot_count, "running robot count sweep point");
            let config = ExperimentConfig {
                robot_count,
                ..base.with_single_strategy(kind)
            };
            points.push(run_point(kind, robot_count as Float, config)?);
        }
    }
    Ok(points)
}

/// For every kind, runs `base` in rooms `width` wide and `area / width` high (rounded down), so
/// the tile count stays roughly constant while the aspect ratio changes.
pub fn sweep_room_shapes(
    base: &ExperimentConfig,
    kinds: &[RobotKind],
    widths: &[usize],
    area: usize,
) -> Result<Vec<SweepPoint>> {
    let mut points = Vec::with_capacity(kinds.len() * widths.len());
    for &kind in kinds {
        for &room_width in widths {
            let room_height = area.checked_div(room_width).unwrap_or(0);
            info!(%kind, room_width, room_height, "running room shape sweep point");
            let config = ExperimentConfig {
                room_width,
                room_height,
                ..base.with_single_strategy(kind)
            };
            let aspect_ratio = room_width as Float / room_height as Float;
            points.push(run_point(kind, aspect_ratio, config)?);
        }
    }
    Ok(points)
}

fn run_point(kind: RobotKind, x: Float, config: ExperimentConfig) -> Result<SweepPoint> {
    let runner = TrialRunner::new(config)?;
    let report = runner.run()?;
    let config = runner.config();
    Ok(SweepPoint {
        kind,
        x,
        room_width: config.room_width,
        room_height: config.room_height,
        robot_count: config.robot_count,
        summary: report.summary,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::SimulationError;

    fn quick_config() -> ExperimentConfig {
        ExperimentConfig {
            room_width: 5,
            room_height: 5,
            trial_count: 3,
            max_ticks: 2_000,
            ..Default::default()
        }
    }

    #[test]
    fn test_robot_count_sweep_covers_every_kind_and_count() {
        let points = sweep_robot_counts(&quick_config(), &RobotKind::ALL, &[1, 3]).unwrap();
        let keys: Vec<(RobotKind, usize)> =
            points.iter().map(|p| (p.kind, p.robot_count)).collect();
        assert_eq!(
            keys,
            vec![
                (RobotKind::Basic, 1),
                (RobotKind::Basic, 3),
                (RobotKind::Faulty, 1),
                (RobotKind::Faulty, 3),
                (RobotKind::Smart, 1),
                (RobotKind::Smart, 3),
            ]
        );
        for point in &points {
            assert_eq!(point.x, point.robot_count as Float);
            assert_eq!(point.summary.trials, 3);
        }
    }

    #[test]
    fn test_room_shape_sweep_keeps_area() {
        let points =
            sweep_room_shapes(&quick_config(), &[RobotKind::Basic], &[2, 4, 6], 24).unwrap();
        let shapes: Vec<(usize, usize)> = points
            .iter()
            .map(|p| (p.room_width, p.room_height))
            .collect();
        assert_eq!(shapes, vec![(2, 12), (4, 6), (6, 4)]);
        assert_abs_diff_eq!(points[0].x, 2.0 / 12.0);
        assert_abs_diff_eq!(points[2].x, 1.5);
    }

    #[test]
    fn test_room_shape_sweep_rejects_width_wider_than_area() {
        let result = sweep_room_shapes(&quick_config(), &[RobotKind::Basic], &[30], 24);
        assert!(matches!(
            result,
            Err(SimulationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_sweeps_are_deterministic() {
        let first = sweep_robot_counts(&quick_config(), &[RobotKind::Smart], &[2]).unwrap();
        let second = sweep_robot_counts(&quick_config(), &[RobotKind::Smart], &[2]).unwrap();
        assert_eq!(first, second);
    }
}
