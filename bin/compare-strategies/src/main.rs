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

#![warn(missing_docs)]

//! Compares Basic, Faulty and Smart robots: time to clean 80% of a 20x20 room for 1 to 5 robots,
//! and time to clean 80% of a 300 tile room of various shapes with 2 robots.

use robot_cleaning::experiments::{
    sweep_robot_counts, sweep_room_shapes, SweepPoint, DEFAULT_ROBOT_COUNTS, DEFAULT_ROOM_AREA,
    DEFAULT_ROOM_WIDTHS,
};
use robot_cleaning::{DustDistribution, ExperimentConfig, RobotKind};
use tracing::info;

const OUTPUT_PATH: &str = "/tmp/robot_cleaning_sweeps.json";

fn print_table(title: &str, x_label: &str, points: &[SweepPoint]) {
    println!("{}", title);
    println!(
        "{:<12} {:>10} {:>12} {:>12} {:>10}",
        "robot", x_label, "mean ticks", "std dev", "timed out"
    );
    for point in points {
        println!(
            "{:<12} {:>10.3} {:>12.1} {:>12.1} {:>10}",
            point.kind.to_string(),
            point.x,
            point.summary.mean_ticks.unwrap_or(f64::NAN),
            point.summary.std_dev_ticks.unwrap_or(f64::NAN),
            point.summary.timed_out
        );
    }
    println!();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let base = ExperimentConfig {
        room_width: 20,
        room_height: 20,
        initial_dust: DustDistribution::Fixed(3.0),
        target_fraction: 0.8,
        trial_count: 20,
        ..Default::default()
    };

    let start = std::time::Instant::now();
    let by_robot_count = sweep_robot_counts(&base, &RobotKind::ALL, &DEFAULT_ROBOT_COUNTS)?;
    print_table(
        "Time to clean 80% of a 20x20 room, for various numbers of robots",
        "robots",
        &by_robot_count,
    );

    let shape_base = ExperimentConfig {
        robot_count: 2,
        trial_count: 200,
        ..base
    };
    let by_room_shape = sweep_room_shapes(
        &shape_base,
        &RobotKind::ALL,
        &DEFAULT_ROOM_WIDTHS,
        DEFAULT_ROOM_AREA,
    )?;
    print_table(
        "Time to clean 80% of a 300-tile room for various room shapes",
        "aspect",
        &by_room_shape,
    );
    info!(elapsed = ?start.elapsed(), "sweeps finished");

    let output = serde_json::json!({
        "robot_count": by_robot_count,
        "room_shape": by_room_shape,
    });
    std::fs::write(OUTPUT_PATH, serde_json::to_string_pretty(&output)?)?;
    println!("wrote {}", OUTPUT_PATH);
    Ok(())
}
