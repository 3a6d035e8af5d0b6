// SPDX-License-Identifier: MIT OR Apache-2.0
//! Drag state and the pure span computations behind move and resize.
//!
//! Each function maps the snapshot taken at pointer-down plus the accumulated
//! pointer delta to a new span, or `None` when the result would be shorter
//! than [`MIN_DURATION_MS`] and the move event is skipped.

use crate::clip::{clamp_time, Clip, ClipRef, MAX_TIMELINE_MS, MIN_DURATION_MS};
use serde::{Deserialize, Serialize};

/// What a drag is changing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DragType {
    /// Move a clip in time
    Clip,
    /// Move the start, keeping the end
    ResizeLeft,
    /// Move the end, keeping the start
    ResizeRight,
    /// Move the playhead
    Playhead,
}

/// The single in-progress drag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragState {
    /// Kind of drag
    pub drag_type: DragType,
    /// Dragged clip, absent for playhead drags
    pub target: Option<ClipRef>,
    /// Pointer x at pointer-down
    pub start_x: f64,
    /// Time under the pointer (or playhead time) at pointer-down
    pub start_value: i64,
    /// Clip start at pointer-down
    pub original_start_ms: Option<i64>,
    /// Clip duration at pointer-down
    pub original_duration_ms: Option<i64>,
}

impl DragState {
    /// Start a move or resize of `clip`
    pub fn for_clip(drag_type: DragType, target: ClipRef, clip: &Clip, start_x: f64, start_value: i64) -> Self {
        Self {
            drag_type,
            target: Some(target),
            start_x,
            start_value,
            original_start_ms: Some(clip.start_ms),
            original_duration_ms: Some(clip.duration_ms),
        }
    }

    /// Start a playhead drag from `current_time_ms`
    pub fn for_playhead(start_x: f64, current_time_ms: i64) -> Self {
        Self {
            drag_type: DragType::Playhead,
            target: None,
            start_x,
            start_value: current_time_ms,
            original_start_ms: None,
            original_duration_ms: None,
        }
    }

    /// Pointer travel since pointer-down, in whole milliseconds
    pub fn delta_ms(&self, x: f64, ms_per_px: f64) -> i64 {
        ((x - self.start_x) * ms_per_px).round() as i64
    }

    /// Original span of the dragged clip
    pub fn original_span(&self) -> Option<SpanEdit> {
        Some(SpanEdit {
            start_ms: self.original_start_ms?,
            duration_ms: self.original_duration_ms?,
        })
    }
}

/// New start and duration for the dragged clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanEdit {
    /// Start time
    pub start_ms: i64,
    /// Duration
    pub duration_ms: i64,
}

/// Shift the whole clip; duration never changes
pub fn move_clip(original: SpanEdit, delta_ms: i64, snap: impl Fn(i64) -> i64) -> SpanEdit {
    let latest_start = (MAX_TIMELINE_MS - original.duration_ms).max(0);
    let start_ms = original.start_ms.saturating_add(delta_ms).clamp(0, latest_start);
    SpanEdit {
        start_ms: snap(start_ms).clamp(0, latest_start),
        duration_ms: original.duration_ms,
    }
}

/// Move the start edge; the end stays fixed
pub fn resize_left(original: SpanEdit, delta_ms: i64, snap: impl Fn(i64) -> i64) -> Option<SpanEdit> {
    let end_ms = original.start_ms.saturating_add(original.duration_ms);
    let start_ms = snap(clamp_time(original.start_ms.saturating_add(delta_ms))).max(0);
    let duration_ms = end_ms.saturating_sub(start_ms);
    (duration_ms >= MIN_DURATION_MS).then_some(SpanEdit { start_ms, duration_ms })
}

/// Move the end edge; the start stays fixed
pub fn resize_right(original: SpanEdit, delta_ms: i64, snap: impl Fn(i64) -> i64) -> Option<SpanEdit> {
    let raw = original.duration_ms.saturating_add(delta_ms).max(MIN_DURATION_MS);
    let end_ms = snap(clamp_time(original.start_ms.saturating_add(raw))).min(MAX_TIMELINE_MS);
    let duration_ms = end_ms.saturating_sub(original.start_ms);
    (duration_ms >= MIN_DURATION_MS).then_some(SpanEdit {
        start_ms: original.start_ms,
        duration_ms,
    })
}

/// New playhead time for a playhead drag
pub fn drag_playhead(start_value: i64, delta_ms: i64, snap: impl Fn(i64) -> i64) -> i64 {
    clamp_time(snap(clamp_time(start_value.saturating_add(delta_ms))))
}

/// Dispatch a clip drag to the matching span computation.
///
/// Returns `None` for playhead drags and for skipped move events.
pub fn apply_drag(drag: &DragState, delta_ms: i64, snap: impl Fn(i64) -> i64) -> Option<SpanEdit> {
    let original = drag.original_span()?;
    match drag.drag_type {
        DragType::Clip => Some(move_clip(original, delta_ms, snap)),
        DragType::ResizeLeft => resize_left(original, delta_ms, snap),
        DragType::ResizeRight => resize_right(original, delta_ms, snap),
        DragType::Playhead => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_snap(t: i64) -> i64 {
        t
    }

    fn span(start_ms: i64, duration_ms: i64) -> SpanEdit {
        SpanEdit { start_ms, duration_ms }
    }

    #[test]
    fn test_move_keeps_duration() {
        let moved = move_clip(span(2000, 8000), 1500, no_snap);
        assert_eq!(moved, span(3500, 8000));
    }

    #[test]
    fn test_move_clamps_at_zero() {
        assert_eq!(move_clip(span(2000, 8000), -5000, no_snap), span(0, 8000));
    }

    #[test]
    fn test_resize_left_keeps_end() {
        let resized = resize_left(span(5000, 3000), -6000, no_snap).unwrap();
        assert_eq!(resized, span(0, 8000));
        assert_eq!(resized.start_ms + resized.duration_ms, 8000);
    }

    #[test]
    fn test_resize_left_skips_below_minimum() {
        assert!(resize_left(span(5000, 3000), 2600, no_snap).is_none());
        assert_eq!(resize_left(span(5000, 3000), 2500, no_snap), Some(span(7500, 500)));
    }

    #[test]
    fn test_resize_right_clamps_to_minimum() {
        assert_eq!(resize_right(span(1000, 3000), -9000, no_snap), Some(span(1000, 500)));
        assert_eq!(resize_right(span(1000, 3000), 1000, no_snap), Some(span(1000, 4000)));
    }

    #[test]
    fn test_resize_right_skips_when_snap_pulls_below_minimum() {
        let snap_back = |_t: i64| 1200;
        assert!(resize_right(span(1000, 3000), -2600, snap_back).is_none());
    }

    #[test]
    fn test_snap_applies_to_moved_edge() {
        let snap_to_grid = |t: i64| (t + 500) / 1000 * 1000;
        assert_eq!(move_clip(span(2000, 8000), 1400, snap_to_grid), span(3000, 8000));
        assert_eq!(resize_right(span(0, 2000), 950, snap_to_grid), Some(span(0, 3000)));
    }

    #[test]
    fn test_drag_playhead_never_negative() {
        assert_eq!(drag_playhead(4000, 1000, no_snap), 5000);
        assert_eq!(drag_playhead(4000, -9000, no_snap), 0);
    }

    #[test]
    fn test_apply_drag_dispatch() {
        let clip = Clip::new("v", crate::clip::ClipKind::Video, "cam", 2000, 8000);
        let drag = DragState::for_clip(DragType::Clip, ClipRef::Clip(clip.id.clone()), &clip, 100.0, 2000);
        assert_eq!(drag.delta_ms(140.0, 37.5), 1500);
        assert_eq!(apply_drag(&drag, 1500, no_snap), Some(span(3500, 8000)));

        let playhead = DragState::for_playhead(10.0, 0);
        assert_eq!(apply_drag(&playhead, 1500, no_snap), None);
    }

    #[test]
    fn test_huge_pointer_travel_stays_in_range() {
        let clip = Clip::new("v", crate::clip::ClipKind::Video, "cam", 2000, 8000);
        let drag = DragState::for_clip(DragType::Clip, ClipRef::Clip(clip.id.clone()), &clip, 0.0, 2000);
        let delta = drag.delta_ms(1e300, 37.5);
        assert_eq!(delta, i64::MAX);

        assert_eq!(move_clip(span(2000, 8000), delta, no_snap), span(MAX_TIMELINE_MS - 8000, 8000));
        assert_eq!(move_clip(span(2000, 8000), i64::MIN, no_snap), span(0, 8000));
        assert_eq!(resize_left(span(2000, 8000), i64::MIN, no_snap), Some(span(0, 10_000)));
        assert!(resize_left(span(2000, 8000), delta, no_snap).is_none());
        assert_eq!(
            resize_right(span(2000, 8000), delta, no_snap),
            Some(span(2000, MAX_TIMELINE_MS - 2000))
        );
        assert_eq!(resize_right(span(2000, 8000), i64::MIN, no_snap), Some(span(2000, 500)));
        assert_eq!(drag_playhead(4000, delta, no_snap), MAX_TIMELINE_MS);
        assert_eq!(drag_playhead(4000, i64::MIN, no_snap), 0);
    }
}
