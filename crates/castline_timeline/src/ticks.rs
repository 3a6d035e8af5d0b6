// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ruler ticks and time labels.

use crate::scale::TimeScale;
use serde::Serialize;

/// Candidate tick intervals, smallest first
pub const TICK_LADDER_MS: [i64; 16] = [
    1_000, 2_000, 5_000, 10_000, 15_000, 30_000,
    60_000, 120_000, 300_000, 600_000, 900_000, 1_800_000,
    3_600_000, 7_200_000, 21_600_000, 43_200_000,
];

/// Every n-th multiple of the interval is a major tick
pub const MAJOR_TICK_EVERY: i64 = 5;

/// Minimum pixel distance between neighbouring ticks
pub const DEFAULT_TICK_SPACING_PX: f64 = 80.0;

const MS_PER_SECOND: i64 = 1_000;
const SECONDS_PER_HOUR: i64 = 3_600;

/// A tick on the ruler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tick {
    /// Tick time
    pub time_ms: i64,
    /// Whether this is a labelled major tick
    pub is_major: bool,
}

/// A tick placed on screen
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RulerTick {
    /// Tick time
    pub time_ms: i64,
    /// Screen x position
    pub x: f64,
    /// Whether this is a major tick
    pub is_major: bool,
    /// Compact label, major ticks only
    pub label: Option<String>,
}

/// Smallest ladder interval whose on-screen spacing reaches `target_px_spacing`.
///
/// Falls back to the largest rung when even that is too dense.
pub fn tick_interval(ms_per_px: f64, target_px_spacing: f64) -> i64 {
    TICK_LADDER_MS
        .iter()
        .copied()
        .find(|&interval| interval as f64 / ms_per_px >= target_px_spacing)
        .unwrap_or(TICK_LADDER_MS[TICK_LADDER_MS.len() - 1])
}

/// Ticks at every multiple of `interval_ms` inside `[start_ms, end_ms]`
pub fn generate_ticks(start_ms: i64, end_ms: i64, interval_ms: i64) -> Vec<Tick> {
    if interval_ms <= 0 || end_ms < start_ms {
        return Vec::new();
    }

    let mut index = start_ms.div_euclid(interval_ms);
    if index * interval_ms < start_ms {
        index += 1;
    }

    let mut ticks = Vec::new();
    loop {
        let time_ms = index * interval_ms;
        if time_ms > end_ms {
            break;
        }
        ticks.push(Tick {
            time_ms,
            is_major: index.rem_euclid(MAJOR_TICK_EVERY) == 0,
        });
        index += 1;
    }
    ticks
}

/// Ticks covering the visible range of `scale`, positioned and labelled
pub fn ruler_ticks(scale: &TimeScale, target_px_spacing: f64) -> Vec<RulerTick> {
    let interval = tick_interval(scale.ms_per_px(), target_px_spacing);
    let (start, end) = scale.visible_range();
    generate_ticks(start, end, interval)
        .into_iter()
        .map(|tick| RulerTick {
            time_ms: tick.time_ms,
            x: scale.x_of(tick.time_ms),
            is_major: tick.is_major,
            label: tick.is_major.then(|| format_tick_label(tick.time_ms)),
        })
        .collect()
}

fn split_hms(ms: i64) -> (i64, i64, i64) {
    let total = ms.max(0) / MS_PER_SECOND;
    (total / SECONDS_PER_HOUR, (total % SECONDS_PER_HOUR) / 60, total % 60)
}

/// `M:SS` below one hour, `H:MM:SS` from one hour on
pub fn format_time(ms: i64) -> String {
    let (hours, minutes, seconds) = split_hms(ms);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Compact ruler label, never longer than [`format_time`] for the same time
pub fn format_tick_label(ms: i64) -> String {
    let (hours, minutes, seconds) = split_hms(ms);
    match (hours, minutes, seconds) {
        (0, 0, s) => format!("{}s", s),
        (0, m, 0) => format!("{}m", m),
        (0, m, s) => format!("{}:{:02}", m, s),
        (h, 0, 0) => format!("{}h", h),
        (h, m, 0) => format!("{}h{:02}m", h, m),
        _ => format_time(ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_interval_picks_smallest_fitting_rung() {
        assert_eq!(tick_interval(100.0, 80.0), 10_000);
        assert_eq!(tick_interval(1.0, 80.0), 1_000);
        assert_eq!(tick_interval(37.5, 80.0), 5_000);
        assert_eq!(tick_interval(1_000_000.0, 80.0), 43_200_000);
    }

    #[test]
    fn test_generate_ticks_is_deterministic() {
        let interval = tick_interval(100.0, 80.0);
        let first = generate_ticks(0, 30_000, interval);
        let second = generate_ticks(0, 30_000, interval);
        assert_eq!(first, second);
        assert!(first.iter().all(|t| t.time_ms % interval == 0));
        let times: Vec<_> = first.iter().map(|t| t.time_ms).collect();
        assert_eq!(times, vec![0, 10_000, 20_000, 30_000]);
        assert!(first[0].is_major);
        assert!(!first[1].is_major);
    }

    #[test]
    fn test_generate_ticks_major_every_fifth_multiple() {
        let ticks = generate_ticks(3_000, 12_500, 1_000);
        assert_eq!(ticks.first().map(|t| t.time_ms), Some(3_000));
        assert_eq!(ticks.last().map(|t| t.time_ms), Some(12_000));
        let majors: Vec<_> = ticks.iter().filter(|t| t.is_major).map(|t| t.time_ms).collect();
        assert_eq!(majors, vec![5_000, 10_000]);
    }

    #[test]
    fn test_generate_ticks_degenerate_inputs() {
        assert!(generate_ticks(0, 10_000, 0).is_empty());
        assert!(generate_ticks(10_000, 0, 1_000).is_empty());
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(65_000), "1:05");
        assert_eq!(format_time(3_599_999), "59:59");
        assert_eq!(format_time(3_600_000), "1:00:00");
        assert_eq!(format_time(3_725_000), "1:02:05");
    }

    #[test]
    fn test_tick_label_never_longer_than_time() {
        assert_eq!(format_tick_label(5_000), "5s");
        assert_eq!(format_tick_label(65_000), "1:05");
        assert_eq!(format_tick_label(120_000), "2m");
        assert_eq!(format_tick_label(3_600_000), "1h");
        assert_eq!(format_tick_label(5_400_000), "1h30m");
        for ms in (0..50_000_000).step_by(7_919) {
            assert!(format_tick_label(ms).len() <= format_time(ms).len(), "{ms}");
        }
    }

    #[test]
    fn test_ruler_ticks_label_majors() {
        let scale = TimeScale::new(100.0, 0, 0.0, 800.0).unwrap();
        let ticks = ruler_ticks(&scale, DEFAULT_TICK_SPACING_PX);
        assert_eq!(ticks.len(), 9);
        assert_eq!(ticks[1].x, 100.0);
        assert_eq!(ticks[0].label.as_deref(), Some("0s"));
        assert!(ticks[1].label.is_none());
        assert_eq!(ticks[5].label.as_deref(), Some("50s"));
    }
}
