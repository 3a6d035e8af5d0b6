// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pointer and keyboard handling.
//!
//! The interaction state machine is `idle -> dragging -> idle`. A pointer-down
//! on a clip, edge handle, playhead or ruler starts a drag; pointer-move
//! applies it; pointer-up commits it; Escape reverts it. Events can be handled
//! directly or queued and drained in order.

use crate::clip::{Clip, ClipId, ClipRef};
use crate::edit::DragType;
use crate::editor::TimelineEditor;
use crate::error::Result;
use crate::snap::Snapper;
use crate::track::TrackId;
use serde::{Deserialize, Serialize};

/// Region of a clip under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClipPart {
    /// Clip body, moves the clip
    Body,
    /// Start handle, resizes from the left
    LeftEdge,
    /// End handle, resizes from the right
    RightEdge,
}

impl ClipPart {
    /// Drag started by pressing this part
    pub fn drag_type(&self) -> DragType {
        match self {
            Self::Body => DragType::Clip,
            Self::LeftEdge => DragType::ResizeLeft,
            Self::RightEdge => DragType::ResizeRight,
        }
    }
}

/// What a pointer-down landed on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HitTarget {
    /// A regular clip
    Clip {
        /// Clip id
        id: ClipId,
        /// Pressed region
        part: ClipPart,
    },
    /// An effect clip
    EffectClip {
        /// Effect clip id
        id: ClipId,
        /// Pressed region
        part: ClipPart,
    },
    /// A point on a track, resolved with [`TimelineEditor::hit_test`]
    Track {
        /// Track id
        track: TrackId,
    },
    /// The playhead handle
    Playhead,
    /// The time ruler
    Ruler,
    /// Empty track space
    Empty,
}

/// Pointer input
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    /// Button pressed
    Down {
        /// Pointer x
        x: f64,
        /// What was pressed
        target: HitTarget,
    },
    /// Pointer moved
    Move {
        /// Pointer x
        x: f64,
    },
    /// Button released
    Up,
}

/// Keys the timeline reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Step the playhead back
    ArrowLeft,
    /// Step the playhead forward
    ArrowRight,
    /// Jump to zero
    Home,
    /// Jump to the programme end
    End,
    /// Cancel the active drag
    Escape,
    /// Remove the selection
    Delete,
    /// Remove the selection
    Backspace,
    /// Any other key
    #[serde(other)]
    Other,
}

/// Key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Pressed key
    pub key: Key,
    /// Whether Shift was held
    pub shift: bool,
}

impl KeyEvent {
    /// Key press without modifiers
    pub fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    /// Key press with Shift held
    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

/// Any input the editor consumes, in the JSON form used by event scripts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorEvent {
    /// Pointer pressed
    PointerDown {
        /// Pointer x
        x: f64,
        /// What was pressed
        target: HitTarget,
    },
    /// Pointer moved
    PointerMove {
        /// Pointer x
        x: f64,
    },
    /// Pointer released
    PointerUp,
    /// Key pressed
    KeyDown {
        /// Pressed key
        key: Key,
        /// Whether Shift was held
        #[serde(default)]
        shift: bool,
    },
    /// A text field gained or lost focus
    TextFocus {
        /// New focus state
        focused: bool,
    },
}

impl From<PointerEvent> for EditorEvent {
    fn from(event: PointerEvent) -> Self {
        match event {
            PointerEvent::Down { x, target } => Self::PointerDown { x, target },
            PointerEvent::Move { x } => Self::PointerMove { x },
            PointerEvent::Up => Self::PointerUp,
        }
    }
}

impl From<KeyEvent> for EditorEvent {
    fn from(event: KeyEvent) -> Self {
        Self::KeyDown {
            key: event.key,
            shift: event.shift,
        }
    }
}

impl TimelineEditor {
    /// Resolve a pointer position on a track to a clip part or empty space.
    ///
    /// Edge handles are `edge_handle_px` wide, at most a third of the clip's
    /// on-screen width.
    pub fn hit_test(&self, track_id: &TrackId, x: f64) -> HitTarget {
        let Some(track) = self.timeline.track(track_id) else {
            return HitTarget::Empty;
        };

        let part_at = |clip: &Clip| -> Option<ClipPart> {
            let left = self.scale.x_of(clip.start_ms);
            let right = self.scale.x_of(clip.end_ms());
            if x < left || x >= right {
                return None;
            }
            let handle = self.config.edge_handle_px.min((right - left) / 3.0);
            Some(if x < left + handle {
                ClipPart::LeftEdge
            } else if x >= right - handle {
                ClipPart::RightEdge
            } else {
                ClipPart::Body
            })
        };

        // later clips draw on top
        let effect_hit = track
            .effect_clips()
            .iter()
            .rev()
            .find_map(|e| part_at(&e.clip).map(|part| (e.id().clone(), part)));
        if let Some((id, part)) = effect_hit {
            return HitTarget::EffectClip { id, part };
        }

        track
            .clips()
            .iter()
            .rev()
            .find_map(|c| part_at(c).map(|part| HitTarget::Clip { id: c.id.clone(), part }))
            .unwrap_or(HitTarget::Empty)
    }

    /// Handle one pointer event
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<()> {
        match event {
            PointerEvent::Down { x, target } => self.pointer_down(x, target),
            PointerEvent::Move { x } => self.update_drag(x),
            PointerEvent::Up => self.end_drag(),
        }
    }

    fn pointer_down(&mut self, x: f64, target: HitTarget) -> Result<()> {
        if self.is_dragging() {
            tracing::debug!("Ignoring pointer-down during an active drag");
            return Ok(());
        }

        match target {
            HitTarget::Track { track } => {
                let resolved = self.hit_test(&track, x);
                self.pointer_down(x, resolved)
            }
            HitTarget::Clip { id, part } => {
                self.start_drag(part.drag_type(), Some(ClipRef::Clip(id)), x)?;
                Ok(())
            }
            HitTarget::EffectClip { id, part } => {
                self.start_drag(part.drag_type(), Some(ClipRef::Effect(id)), x)?;
                Ok(())
            }
            HitTarget::Playhead => {
                self.start_drag(DragType::Playhead, None, x)?;
                Ok(())
            }
            HitTarget::Ruler => {
                let seek = Snapper::new(&self.timeline, &self.scale, &self.config.snap, self.config.tick_spacing_px)
                    .snap_time(self.scale.time_at(x));
                let before_seek = self.current_time_ms;
                self.set_current_time(seek);
                if self.start_drag(DragType::Playhead, None, x)? {
                    if let Some(drag) = self.drag.as_mut() {
                        drag.revert_time_ms = before_seek;
                    }
                }
                Ok(())
            }
            HitTarget::Empty => {
                self.clear_selection();
                Ok(())
            }
        }
    }

    /// Handle one key press; ignored while a text field has focus
    pub fn handle_key(&mut self, event: KeyEvent) -> Result<()> {
        if self.text_input_focused {
            return Ok(());
        }

        let keyboard = self.config.keyboard;
        let step = if event.shift {
            keyboard.nudge_shift_ms
        } else {
            keyboard.nudge_ms
        };

        match event.key {
            Key::ArrowLeft => self.set_current_time(self.current_time_ms.saturating_sub(step)),
            Key::ArrowRight => self.set_current_time(self.current_time_ms.saturating_add(step)),
            Key::Home => self.set_current_time(0),
            Key::End => {
                let end = self.project_duration_ms().unwrap_or(keyboard.end_fallback_ms);
                self.set_current_time(end);
            }
            Key::Escape => self.cancel_drag()?,
            Key::Delete | Key::Backspace => self.delete_selection()?,
            Key::Other => {}
        }
        Ok(())
    }

    fn delete_selection(&mut self) -> Result<()> {
        if self.is_dragging() {
            return Ok(());
        }
        if let Some(id) = self.selection.clip.clone() {
            self.remove_clip(&id)?;
        } else if let Some(id) = self.selection.effect_clip.clone() {
            self.remove_effect_clip(&id)?;
        }
        Ok(())
    }

    /// Handle any event
    pub fn handle_event(&mut self, event: EditorEvent) -> Result<()> {
        match event {
            EditorEvent::PointerDown { x, target } => self.handle_pointer(PointerEvent::Down { x, target }),
            EditorEvent::PointerMove { x } => self.handle_pointer(PointerEvent::Move { x }),
            EditorEvent::PointerUp => self.handle_pointer(PointerEvent::Up),
            EditorEvent::KeyDown { key, shift } => self.handle_key(KeyEvent { key, shift }),
            EditorEvent::TextFocus { focused } => {
                self.set_text_input_focused(focused);
                Ok(())
            }
        }
    }

    /// Queue an event for [`Self::process_events`]
    pub fn push_event(&mut self, event: impl Into<EditorEvent>) {
        self.events.push_back(event.into());
    }

    /// Number of queued events
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Handle queued events in order, returning how many succeeded.
    ///
    /// A failing event is logged and does not stop the queue.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.events.pop_front() {
            match self.handle_event(event) {
                Ok(()) => handled += 1,
                Err(err) => tracing::warn!("Event rejected: {}", err),
            }
        }
        handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::{ClipKind, EffectClip};
    use crate::config::EditorConfig;
    use crate::track::{Track, TrackKind};

    // 37.5 ms per pixel: c1 spans x 53.3..266.7
    fn editor() -> TimelineEditor {
        let mut config = EditorConfig::default();
        config.snap.enabled = false;
        let mut editor = TimelineEditor::new(config);
        editor.add_track(Track::new("Cameras", TrackKind::Video).with_id("video")).unwrap();
        editor.add_track(Track::new("Effects", TrackKind::Effect).with_id("fx")).unwrap();
        editor
            .add_clip(Clip::new("video", ClipKind::Video, "cam-1", 2000, 8000).with_id("c1"))
            .unwrap();
        editor
            .add_effect_clip(EffectClip::new("fx", "fade", 20_000, 2000).with_id("e1"))
            .unwrap();
        editor
    }

    fn on_track(track: &str, x: f64) -> PointerEvent {
        PointerEvent::Down {
            x,
            target: HitTarget::Track { track: track.into() },
        }
    }

    fn start_of(editor: &TimelineEditor, id: &str) -> i64 {
        editor.timeline().clip(&id.into()).map(|c| c.start_ms).unwrap()
    }

    #[test]
    fn test_playhead_nudge() {
        let mut editor = editor();
        editor.handle_key(KeyEvent::shifted(Key::ArrowRight)).unwrap();
        assert_eq!(editor.current_time_ms(), 5000);
        editor.handle_key(KeyEvent::new(Key::ArrowLeft)).unwrap();
        assert_eq!(editor.current_time_ms(), 4000);
        editor.handle_key(KeyEvent::shifted(Key::ArrowLeft)).unwrap();
        assert_eq!(editor.current_time_ms(), 0);
    }

    #[test]
    fn test_playhead_nudge_stops_at_timeline_limit() {
        let mut editor = editor();
        editor.set_current_time(crate::clip::MAX_TIMELINE_MS);
        editor.handle_key(KeyEvent::shifted(Key::ArrowRight)).unwrap();
        assert_eq!(editor.current_time_ms(), crate::clip::MAX_TIMELINE_MS);
    }

    #[test]
    fn test_home_and_end() {
        let mut editor = editor();
        editor.handle_key(KeyEvent::new(Key::End)).unwrap();
        assert_eq!(editor.current_time_ms(), 600_000);
        editor.set_project_duration(1_800_000);
        editor.handle_key(KeyEvent::new(Key::End)).unwrap();
        assert_eq!(editor.current_time_ms(), 1_800_000);
        editor.handle_key(KeyEvent::new(Key::Home)).unwrap();
        assert_eq!(editor.current_time_ms(), 0);
    }

    #[test]
    fn test_text_focus_suppresses_keys() {
        let mut editor = editor();
        editor.set_text_input_focused(true);
        editor.handle_key(KeyEvent::new(Key::ArrowRight)).unwrap();
        assert_eq!(editor.current_time_ms(), 0);
    }

    #[test]
    fn test_hit_test_parts() {
        let editor = editor();
        let video = TrackId::from("video");
        let clip = |part| HitTarget::Clip { id: "c1".into(), part };
        assert_eq!(editor.hit_test(&video, 55.0), clip(ClipPart::LeftEdge));
        assert_eq!(editor.hit_test(&video, 150.0), clip(ClipPart::Body));
        assert_eq!(editor.hit_test(&video, 262.0), clip(ClipPart::RightEdge));
        assert_eq!(editor.hit_test(&video, 300.0), HitTarget::Empty);
        assert_eq!(editor.hit_test(&"missing".into(), 150.0), HitTarget::Empty);
    }

    #[test]
    fn test_hit_test_narrow_clip_keeps_a_body() {
        let mut editor = editor();
        // 500 ms = 13.3 px, so each handle is 4.4 px
        editor
            .add_clip(Clip::new("video", ClipKind::Video, "cam-2", 30_000, 500).with_id("short"))
            .unwrap();
        let video = TrackId::from("video");
        let left = editor.scale().x_of(30_000);
        assert_eq!(
            editor.hit_test(&video, left + 6.0),
            HitTarget::Clip { id: "short".into(), part: ClipPart::Body }
        );
        assert_eq!(
            editor.hit_test(&video, left + 1.0),
            HitTarget::Clip { id: "short".into(), part: ClipPart::LeftEdge }
        );
    }

    #[test]
    fn test_drag_through_event_queue() {
        let mut editor = editor();
        editor.push_event(on_track("video", 150.0));
        editor.push_event(PointerEvent::Move { x: 170.0 });
        editor.push_event(PointerEvent::Move { x: 190.0 });
        editor.push_event(PointerEvent::Up);
        assert_eq!(editor.pending_events(), 4);
        assert_eq!(editor.process_events(), 4);
        assert_eq!(start_of(&editor, "c1"), 3500);
        assert_eq!(editor.selection().clip, Some("c1".into()));
        assert!(!editor.is_dragging());
    }

    #[test]
    fn test_resize_from_edge_handle() {
        let mut editor = editor();
        editor.handle_pointer(on_track("video", 262.0)).unwrap();
        assert_eq!(editor.drag_state().map(|d| d.drag_type), Some(DragType::ResizeRight));
        editor.handle_pointer(PointerEvent::Move { x: 302.0 }).unwrap();
        editor.handle_pointer(PointerEvent::Up).unwrap();
        let clip = editor.timeline().clip(&"c1".into()).unwrap();
        assert_eq!((clip.start_ms, clip.duration_ms), (2000, 9500));
    }

    #[test]
    fn test_escape_reverts_drag() {
        let mut editor = editor();
        editor.handle_pointer(on_track("video", 150.0)).unwrap();
        editor.handle_pointer(PointerEvent::Move { x: 250.0 }).unwrap();
        assert_eq!(start_of(&editor, "c1"), 5750);
        editor.handle_key(KeyEvent::new(Key::Escape)).unwrap();
        assert_eq!(start_of(&editor, "c1"), 2000);
        assert!(!editor.is_dragging());
        // release after cancel is a no-op
        editor.handle_pointer(PointerEvent::Up).unwrap();
        assert_eq!(editor.history().undo_description(), Some("Add effect"));
    }

    #[test]
    fn test_delete_removes_selection() {
        let mut editor = editor();
        editor.select_clip(Some("c1".into())).unwrap();
        editor.select_effect_clip(Some("e1".into())).unwrap();

        editor.handle_key(KeyEvent::new(Key::Delete)).unwrap();
        assert!(editor.timeline().clip(&"c1".into()).is_none());
        assert!(editor.timeline().effect_clip(&"e1".into()).is_some());

        editor.handle_key(KeyEvent::new(Key::Backspace)).unwrap();
        assert!(editor.timeline().effect_clip(&"e1".into()).is_none());
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn test_ruler_seeks_and_drags_playhead() {
        let mut editor = editor();
        editor
            .handle_pointer(PointerEvent::Down { x: 160.0, target: HitTarget::Ruler })
            .unwrap();
        assert_eq!(editor.current_time_ms(), 6000);
        assert_eq!(editor.drag_state().map(|d| d.drag_type), Some(DragType::Playhead));
        editor.handle_pointer(PointerEvent::Move { x: 200.0 }).unwrap();
        assert_eq!(editor.current_time_ms(), 7500);
        editor.handle_pointer(PointerEvent::Up).unwrap();
        assert!(!editor.is_dragging());
    }

    #[test]
    fn test_escape_after_ruler_seek_restores_playhead() {
        let mut editor = editor();
        editor.set_current_time(1000);
        editor
            .handle_pointer(PointerEvent::Down { x: 160.0, target: HitTarget::Ruler })
            .unwrap();
        editor.handle_pointer(PointerEvent::Move { x: 200.0 }).unwrap();
        assert_eq!(editor.current_time_ms(), 7500);

        editor.handle_key(KeyEvent::new(Key::Escape)).unwrap();
        assert!(!editor.is_dragging());
        assert_eq!(editor.current_time_ms(), 1000);
    }

    #[test]
    fn test_empty_space_clears_selection() {
        let mut editor = editor();
        editor.handle_pointer(on_track("video", 150.0)).unwrap();
        editor.handle_pointer(PointerEvent::Up).unwrap();
        assert_eq!(editor.selection().clip, Some("c1".into()));
        editor.handle_pointer(on_track("video", 600.0)).unwrap();
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn test_press_without_move_selects_effect_clip() {
        let mut editor = editor();
        let x = editor.scale().x_of(21_000);
        editor.handle_pointer(on_track("fx", x)).unwrap();
        editor.handle_pointer(PointerEvent::Up).unwrap();
        assert_eq!(editor.selection().effect_clip, Some("e1".into()));
        assert_eq!(editor.timeline().effect_clip(&"e1".into()).map(|e| e.clip.start_ms), Some(20_000));
    }

    #[test]
    fn test_events_from_json() {
        let script = r#"[
            { "type": "pointerDown", "x": 150.0, "target": { "kind": "track", "track": "video" } },
            { "type": "pointerMove", "x": 190.0 },
            { "type": "pointerUp" },
            { "type": "keyDown", "key": "ArrowRight", "shift": true },
            { "type": "keyDown", "key": "F5" }
        ]"#;
        let events: Vec<EditorEvent> = serde_json::from_str(script).unwrap();
        assert_eq!(events[4], EditorEvent::KeyDown { key: Key::Other, shift: false });

        let mut editor = editor();
        for event in events {
            editor.push_event(event);
        }
        assert_eq!(editor.process_events(), 5);
        assert_eq!(start_of(&editor, "c1"), 3500);
        assert_eq!(editor.current_time_ms(), 5000);
    }
}
