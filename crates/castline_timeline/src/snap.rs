// SPDX-License-Identifier: MIT OR Apache-2.0
//! Snapping of candidate times to nearby significant times.

use crate::clip::ClipId;
use crate::scale::TimeScale;
use crate::ticks::tick_interval;
use crate::timeline::Timeline;
use serde::{Deserialize, Serialize};

/// Default snap distance in pixels
pub const DEFAULT_SNAP_THRESHOLD_PX: f64 = 8.0;

/// Which candidate families take part in snapping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    /// Master switch
    pub enabled: bool,
    /// Snap distance in pixels
    pub threshold_px: f64,
    /// Snap to ruler grid points
    pub to_grid: bool,
    /// Snap to clip starts and ends
    pub to_clips: bool,
    /// Snap to the playhead
    pub to_playhead: bool,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_px: DEFAULT_SNAP_THRESHOLD_PX,
            to_grid: true,
            to_clips: true,
            to_playhead: true,
        }
    }
}

/// Snap query over one timeline state and one scale
pub struct Snapper<'a> {
    timeline: &'a Timeline,
    scale: &'a TimeScale,
    settings: &'a SnapSettings,
    tick_spacing_px: f64,
    playhead_ms: Option<i64>,
    exclude: Option<&'a ClipId>,
}

impl<'a> Snapper<'a> {
    /// Create a snapper without playhead candidate
    pub fn new(
        timeline: &'a Timeline,
        scale: &'a TimeScale,
        settings: &'a SnapSettings,
        tick_spacing_px: f64,
    ) -> Self {
        Self {
            timeline,
            scale,
            settings,
            tick_spacing_px,
            playhead_ms: None,
            exclude: None,
        }
    }

    /// Offer the playhead as a candidate
    pub fn with_playhead(mut self, playhead_ms: i64) -> Self {
        self.playhead_ms = Some(playhead_ms);
        self
    }

    /// Skip the boundaries of one clip (the one being dragged)
    pub fn excluding(mut self, id: &'a ClipId) -> Self {
        self.exclude = Some(id);
        self
    }

    /// Snap distance converted to milliseconds
    pub fn threshold_ms(&self) -> f64 {
        self.scale.px_to_ms(self.settings.threshold_px)
    }

    /// All candidate times for `near_ms`, ascending and deduplicated
    pub fn candidates(&self, near_ms: i64) -> Vec<i64> {
        let mut candidates = vec![0];

        if self.settings.to_grid {
            let interval = tick_interval(self.scale.ms_per_px(), self.tick_spacing_px);
            let below = near_ms.div_euclid(interval).saturating_mul(interval);
            candidates.push(below);
            candidates.push(below.saturating_add(interval));
        }
        if self.settings.to_clips {
            candidates.extend(self.timeline.boundaries(self.exclude));
        }
        if self.settings.to_playhead {
            candidates.extend(self.playhead_ms);
        }

        candidates.sort_unstable();
        candidates.dedup();
        candidates
    }

    /// Nearest candidate within the threshold, or `candidate_ms` unchanged.
    ///
    /// Equal distances resolve to the smaller time.
    pub fn snap_time(&self, candidate_ms: i64) -> i64 {
        if !self.settings.enabled {
            return candidate_ms;
        }

        let threshold = self.threshold_ms();
        let mut best = candidate_ms;
        let mut best_dist = f64::INFINITY;
        for candidate in self.candidates(candidate_ms) {
            let dist = candidate.abs_diff(candidate_ms) as f64;
            if dist <= threshold && dist < best_dist {
                best = candidate;
                best_dist = dist;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::{Clip, ClipKind};
    use crate::track::{Track, TrackKind};

    fn timeline() -> Timeline {
        let mut timeline = Timeline::new();
        timeline.add_track(Track::new("Cameras", TrackKind::Video).with_id("video")).unwrap();
        timeline
            .add_clip(Clip::new("video", ClipKind::Video, "cam-1", 2_130, 4_000).with_id("c1"))
            .unwrap();
        timeline
    }

    // 10 ms per pixel, 8 px threshold -> 80 ms
    fn scale() -> TimeScale {
        TimeScale::new(10.0, 0, 0.0, 800.0).unwrap()
    }

    #[test]
    fn test_snaps_to_clip_boundary() {
        let timeline = timeline();
        let scale = scale();
        let settings = SnapSettings::default();
        let snapper = Snapper::new(&timeline, &scale, &settings, 80.0);
        assert_eq!(snapper.threshold_ms(), 80.0);
        assert_eq!(snapper.snap_time(2_100), 2_130);
        assert_eq!(snapper.snap_time(6_190), 6_130);
    }

    #[test]
    fn test_outside_threshold_is_unchanged() {
        let timeline = timeline();
        let scale = scale();
        let settings = SnapSettings::default();
        let snapper = Snapper::new(&timeline, &scale, &settings, 80.0);
        assert_eq!(snapper.snap_time(2_500), 2_500);
    }

    #[test]
    fn test_snaps_to_grid_zero_and_playhead() {
        let timeline = Timeline::new();
        let scale = scale();
        let settings = SnapSettings::default();
        let snapper = Snapper::new(&timeline, &scale, &settings, 80.0).with_playhead(4_444);
        // grid interval is 1s at 10 ms/px
        assert_eq!(snapper.snap_time(1_040), 1_000);
        assert_eq!(snapper.snap_time(30), 0);
        assert_eq!(snapper.snap_time(4_400), 4_444);
    }

    #[test]
    fn test_tie_prefers_smaller_time() {
        let timeline = Timeline::new();
        let scale = scale();
        let settings = SnapSettings {
            to_grid: false,
            ..SnapSettings::default()
        };
        let snapper = Snapper::new(&timeline, &scale, &settings, 80.0).with_playhead(100);
        assert_eq!(snapper.snap_time(50), 0);
    }

    #[test]
    fn test_excluded_clip_is_not_a_candidate() {
        let timeline = timeline();
        let scale = scale();
        let settings = SnapSettings::default();
        let id = ClipId::from("c1");
        let snapper = Snapper::new(&timeline, &scale, &settings, 80.0).excluding(&id);
        assert_eq!(snapper.snap_time(2_100), 2_100);
    }

    #[test]
    fn test_disabled_snapping() {
        let timeline = timeline();
        let scale = scale();
        let settings = SnapSettings {
            enabled: false,
            ..SnapSettings::default()
        };
        let snapper = Snapper::new(&timeline, &scale, &settings, 80.0);
        assert_eq!(snapper.snap_time(2_100), 2_100);
    }

    #[test]
    fn test_snap_is_idempotent() {
        let timeline = timeline();
        let scale = scale();
        let settings = SnapSettings::default();
        let snapper = Snapper::new(&timeline, &scale, &settings, 80.0).with_playhead(7_777);
        for t in (0..12_000).step_by(37) {
            let once = snapper.snap_time(t);
            assert_eq!(snapper.snap_time(once), once, "{t}");
        }
    }

    #[test]
    fn test_extreme_times_do_not_overflow() {
        let timeline = timeline();
        let scale = scale();
        let settings = SnapSettings::default();
        let snapper = Snapper::new(&timeline, &scale, &settings, 80.0).with_playhead(0);
        assert_eq!(snapper.snap_time(i64::MAX), i64::MAX);
        assert_eq!(snapper.snap_time(i64::MIN), i64::MIN);
    }
}
