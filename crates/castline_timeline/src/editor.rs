// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editing context for one open document.
//!
//! [`TimelineEditor`] owns the model together with the transient editing
//! state (selection, drag, playhead, viewport) and exposes the command
//! surface used by hosts. Pointer and keyboard handling lives in
//! [`crate::interaction`].

use crate::clip::{clamp_time, Clip, ClipId, ClipRef, ClipUpdate, EffectClip, EffectClipUpdate};
use crate::config::{EditorConfig, OverlapPolicy};
use crate::document::{DocumentError, DocumentMetadata, HostFields, TimelineDocument};
use crate::edit::{apply_drag, drag_playhead, DragState, DragType};
use crate::effect::EffectAsset;
use crate::error::{ConfigurationError, EntityKind, NotFoundError, Result, ValidationError};
use crate::history::{History, HistoryError, StateSnapshot};
use crate::interaction::EditorEvent;
use crate::runtime::{BroadcastRuntime, RuntimeError};
use crate::scale::{TimeScale, Viewport, DEFAULT_VIEWPORT_WIDTH_PX};
use crate::snap::Snapper;
use crate::ticks::{ruler_ticks, RulerTick};
use crate::timeline::Timeline;
use crate::track::{Track, TrackId, TrackKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;

/// Currently selected clip and effect clip
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Selected clip
    pub clip: Option<ClipId>,
    /// Selected effect clip
    pub effect_clip: Option<ClipId>,
}

impl Selection {
    /// Whether nothing is selected
    pub fn is_empty(&self) -> bool {
        self.clip.is_none() && self.effect_clip.is_none()
    }
}

/// Track summary for renderers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    /// Track id
    pub id: TrackId,
    /// Display name
    pub name: String,
    /// Track kind
    pub kind: TrackKind,
    /// Muted flag
    pub muted: bool,
    /// Locked flag
    pub locked: bool,
    /// Display color
    pub color: [u8; 3],
    /// Clips and effect clips on the track
    pub clip_count: usize,
}

impl From<&Track> for TrackInfo {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            name: track.name.clone(),
            kind: track.kind,
            muted: track.muted,
            locked: track.locked,
            color: track.effective_color(),
            clip_count: track.clip_count(),
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadModel {
    /// Tracks in display order
    pub tracks: Vec<TrackInfo>,
    /// All clips
    pub clips: Vec<Clip>,
    /// All effect clips
    pub effect_clips: Vec<EffectClip>,
    /// Effect catalog
    pub effect_assets: Vec<EffectAsset>,
    /// Selection
    pub selection: Selection,
    /// In-progress drag
    pub drag_state: Option<DragState>,
    /// Playhead
    pub current_time_ms: i64,
    /// View parameters
    pub viewport: Viewport,
    /// Whether undo is available
    pub can_undo: bool,
    /// Whether redo is available
    pub can_redo: bool,
}

/// Drag plus the model state it started from
#[derive(Debug)]
pub(crate) struct ActiveDrag {
    pub(crate) state: DragState,
    before: Option<StateSnapshot>,
    /// Playhead restored on cancel
    pub(crate) revert_time_ms: i64,
}

/// Editing state for one open timeline document
#[derive(Debug)]
pub struct TimelineEditor {
    pub(crate) timeline: Timeline,
    metadata: DocumentMetadata,
    assets: Vec<Value>,
    api_configs: Vec<Value>,
    host_fields: HostFields,
    pub(crate) scale: TimeScale,
    pub(crate) selection: Selection,
    pub(crate) drag: Option<ActiveDrag>,
    pub(crate) current_time_ms: i64,
    pub(crate) config: EditorConfig,
    history: History,
    pub(crate) text_input_focused: bool,
    pub(crate) events: VecDeque<EditorEvent>,
}

impl TimelineEditor {
    /// Create an editor over an empty timeline
    pub fn new(config: EditorConfig) -> Self {
        Self::with_timeline(Timeline::new(), config)
    }

    /// Create an editor over an existing timeline
    pub fn with_timeline(timeline: Timeline, config: EditorConfig) -> Self {
        let scale = TimeScale::default()
            .set_visible_duration(config.default_visible_duration_ms, DEFAULT_VIEWPORT_WIDTH_PX)
            .unwrap_or_else(|err| {
                tracing::warn!("Invalid default visible duration, using defaults: {}", err);
                TimeScale::default()
            });

        Self {
            timeline,
            metadata: DocumentMetadata::default(),
            assets: Vec::new(),
            api_configs: Vec::new(),
            host_fields: HostFields::default(),
            scale,
            selection: Selection::default(),
            drag: None,
            current_time_ms: 0,
            history: History::with_max_depth(config.history_depth),
            config,
            text_input_focused: false,
            events: VecDeque::new(),
        }
    }

    /// Open a persisted document
    pub fn from_document(document: &TimelineDocument, config: EditorConfig) -> std::result::Result<Self, DocumentError> {
        let mut editor = Self::new(config);
        editor.open_document(document)?;
        Ok(editor)
    }

    /// Replace the open document.
    ///
    /// Selection, drag, playhead, queued events and history start fresh. On
    /// error the current document stays open.
    pub fn open_document(&mut self, document: &TimelineDocument) -> std::result::Result<(), DocumentError> {
        self.timeline = document.to_timeline()?;
        self.metadata = document.metadata.clone();
        self.assets = document.assets.clone();
        self.api_configs = document.api_configs.clone();
        self.host_fields = HostFields::from_document(document);
        self.selection = Selection::default();
        self.drag = None;
        self.current_time_ms = 0;
        self.events.clear();
        self.history.clear();
        tracing::info!(
            "Opened document {} with {} tracks",
            self.metadata.id,
            self.timeline.track_count()
        );
        Ok(())
    }

    /// Export the current state as a document
    pub fn to_document(&self) -> TimelineDocument {
        TimelineDocument::from_timeline(
            &self.timeline,
            self.metadata.clone(),
            self.assets.clone(),
            self.api_configs.clone(),
        )
        .with_host_fields(&self.host_fields)
    }

    /// The model
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Document metadata
    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// Settings in effect
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Current selection
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// In-progress drag, if any
    pub fn drag_state(&self) -> Option<&DragState> {
        self.drag.as_ref().map(|d| &d.state)
    }

    /// Whether a drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Playhead position
    pub fn current_time_ms(&self) -> i64 {
        self.current_time_ms
    }

    /// Current time scale
    pub fn scale(&self) -> &TimeScale {
        &self.scale
    }

    /// Current view parameters
    pub fn viewport(&self) -> Viewport {
        self.scale.into()
    }

    /// Undo history
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Keyboard shortcuts are ignored while a text field has focus
    pub fn set_text_input_focused(&mut self, focused: bool) {
        self.text_input_focused = focused;
    }

    /// Planned programme length, when the document declares one
    pub fn project_duration_ms(&self) -> Option<i64> {
        (self.metadata.duration > 0).then_some(self.metadata.duration)
    }

    /// Set the planned programme length (0 clears it)
    pub fn set_project_duration(&mut self, duration_ms: i64) {
        self.metadata.duration = duration_ms.max(0);
    }

    // ------------------------------------------------------------------
    // Tracks
    // ------------------------------------------------------------------

    /// Add a track
    pub fn add_track(&mut self, track: Track) -> Result<TrackId> {
        self.record("Add track", |timeline| timeline.add_track(track))
    }

    /// Remove a track and its clips
    pub fn remove_track(&mut self, track_id: &TrackId) -> Result<Track> {
        self.cancel_drag_on_track(track_id);
        let track = self.record("Remove track", |timeline| timeline.remove_track(track_id))?;
        self.prune_selection();
        Ok(track)
    }

    /// Lock or unlock a track
    pub fn set_track_locked(&mut self, track_id: &TrackId, locked: bool) -> Result<()> {
        self.record("Lock track", |timeline| timeline.set_track_locked(track_id, locked))
    }

    /// Mute or unmute a track
    pub fn set_track_muted(&mut self, track_id: &TrackId, muted: bool) -> Result<()> {
        self.record("Mute track", |timeline| timeline.set_track_muted(track_id, muted))
    }

    // ------------------------------------------------------------------
    // Clips
    // ------------------------------------------------------------------

    /// Add a clip
    pub fn add_clip(&mut self, clip: Clip) -> Result<ClipId> {
        self.check_overlap(&clip)?;
        self.record("Add clip", |timeline| timeline.add_clip(clip))
    }

    /// Merge a partial update into a clip
    pub fn update_clip(&mut self, id: &ClipId, update: &ClipUpdate) -> Result<Clip> {
        let merged = self.timeline.merged_clip(id, update)?;
        self.check_overlap(&merged)?;
        self.record("Update clip", |timeline| timeline.update_clip(id, update).cloned())
    }

    /// Remove a clip, clearing its selection
    pub fn remove_clip(&mut self, id: &ClipId) -> Result<Clip> {
        self.cancel_drag_on(id);
        let clip = self.record("Remove clip", |timeline| timeline.remove_clip(id))?;
        if self.selection.clip.as_ref() == Some(id) {
            self.selection.clip = None;
        }
        Ok(clip)
    }

    /// Split a clip, returning the id of the right half
    pub fn split_clip(&mut self, id: &ClipId, at_ms: i64) -> Result<ClipId> {
        self.record("Split clip", |timeline| timeline.split_clip(id, at_ms))
    }

    /// Add an effect clip
    pub fn add_effect_clip(&mut self, effect_clip: EffectClip) -> Result<ClipId> {
        self.check_overlap(&effect_clip.clip)?;
        self.record("Add effect", |timeline| timeline.add_effect_clip(effect_clip))
    }

    /// Merge a partial update into an effect clip
    pub fn update_effect_clip(&mut self, id: &ClipId, update: &EffectClipUpdate) -> Result<EffectClip> {
        let merged = self.timeline.merged_effect_clip(id, update)?;
        self.check_overlap(&merged.clip)?;
        self.record("Update effect", |timeline| timeline.update_effect_clip(id, update).cloned())
    }

    /// Remove an effect clip, clearing its selection
    pub fn remove_effect_clip(&mut self, id: &ClipId) -> Result<EffectClip> {
        self.cancel_drag_on(id);
        let effect_clip = self.record("Remove effect", |timeline| timeline.remove_effect_clip(id))?;
        if self.selection.effect_clip.as_ref() == Some(id) {
            self.selection.effect_clip = None;
        }
        Ok(effect_clip)
    }

    /// Split an effect clip, returning the id of the right half
    pub fn split_effect_clip(&mut self, id: &ClipId, at_ms: i64) -> Result<ClipId> {
        self.record("Split effect", |timeline| timeline.split_effect_clip(id, at_ms))
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Select a clip, or clear the clip slot with `None`
    pub fn select_clip(&mut self, id: Option<ClipId>) -> Result<()> {
        if let Some(id) = &id {
            if self.timeline.clip(id).is_none() {
                return Err(NotFoundError::new(EntityKind::Clip, id).into());
            }
        }
        self.selection.clip = id;
        Ok(())
    }

    /// Select an effect clip, or clear the effect slot with `None`
    pub fn select_effect_clip(&mut self, id: Option<ClipId>) -> Result<()> {
        if let Some(id) = &id {
            if self.timeline.effect_clip(id).is_none() {
                return Err(NotFoundError::new(EntityKind::EffectClip, id).into());
            }
        }
        self.selection.effect_clip = id;
        Ok(())
    }

    /// Clear both selection slots
    pub fn clear_selection(&mut self) {
        self.selection = Selection::default();
    }

    // ------------------------------------------------------------------
    // Dragging
    // ------------------------------------------------------------------

    /// Begin a drag at pointer position `x`.
    ///
    /// Pressing a clip selects it. Returns `false` without starting when a
    /// drag is already in progress or the clip sits on a locked track.
    pub fn start_drag(&mut self, drag_type: DragType, target: Option<ClipRef>, x: f64) -> Result<bool> {
        if self.drag.is_some() {
            tracing::debug!("Ignoring pointer-down during an active drag");
            return Ok(false);
        }

        let state = match (drag_type, target) {
            (DragType::Playhead, _) => DragState::for_playhead(x, self.current_time_ms),
            (_, None) => {
                tracing::warn!("Clip drag requested without a target");
                return Ok(false);
            }
            (_, Some(target)) => {
                let clip = self.timeline.placement(&target).cloned().ok_or_else(|| {
                    let kind = match &target {
                        ClipRef::Clip(_) => EntityKind::Clip,
                        ClipRef::Effect(_) => EntityKind::EffectClip,
                    };
                    NotFoundError::new(kind, target.id())
                })?;

                match &target {
                    ClipRef::Clip(id) => self.selection.clip = Some(id.clone()),
                    ClipRef::Effect(id) => self.selection.effect_clip = Some(id.clone()),
                }

                let locked = self.timeline.track(&clip.track_id).is_some_and(|t| t.locked);
                if locked {
                    tracing::debug!("Track {} is locked, not dragging {}", clip.track_id, clip.id);
                    return Ok(false);
                }
                DragState::for_clip(drag_type, target, &clip, x, self.scale.time_at(x))
            }
        };

        let before = match state.drag_type {
            DragType::Playhead => None,
            _ => self.snapshot(),
        };
        self.drag = Some(ActiveDrag {
            state,
            before,
            revert_time_ms: self.current_time_ms,
        });
        Ok(true)
    }

    /// Apply pointer movement to the active drag
    pub fn update_drag(&mut self, x: f64) -> Result<()> {
        let Some(drag) = self.drag.as_ref().map(|d| d.state.clone()) else {
            return Ok(());
        };
        let delta_ms = drag.delta_ms(x, self.scale.ms_per_px());

        match (&drag.drag_type, &drag.target) {
            (DragType::Playhead, _) => {
                let snapper = Snapper::new(&self.timeline, &self.scale, &self.config.snap, self.config.tick_spacing_px);
                self.current_time_ms = drag_playhead(drag.start_value, delta_ms, |t| snapper.snap_time(t));
            }
            (_, Some(target)) => {
                let span = {
                    let snapper = Snapper::new(&self.timeline, &self.scale, &self.config.snap, self.config.tick_spacing_px)
                        .with_playhead(self.current_time_ms)
                        .excluding(target.id());
                    apply_drag(&drag, delta_ms, |t| snapper.snap_time(t))
                };
                if let Some(span) = span {
                    self.timeline.set_span(target, span.start_ms, span.duration_ms)?;
                }
            }
            (_, None) => {}
        }
        Ok(())
    }

    /// Finish the active drag and commit it as one history entry
    pub fn end_drag(&mut self) -> Result<()> {
        let Some(ActiveDrag { state, before, .. }) = self.drag.take() else {
            return Ok(());
        };
        let Some(target) = &state.target else {
            return Ok(());
        };

        if self.config.overlap_policy == OverlapPolicy::Reject {
            let overlapping = self.timeline.overlapping(target);
            if let Some(other) = overlapping.first() {
                tracing::warn!("Drag of {} ends over {}, reverting", target.id(), other);
                return self.revert_span(&state);
            }
        }

        let description = match state.drag_type {
            DragType::Clip => "Move clip",
            _ => "Resize clip",
        };
        if let (Some(before), Some(after)) = (before, self.snapshot()) {
            self.history.record(description, before, after);
        }
        if let Some(clip) = self.timeline.placement(target) {
            tracing::info!(
                "{} {} to {}ms +{}ms",
                description,
                clip.id,
                clip.start_ms,
                clip.duration_ms
            );
        }
        Ok(())
    }

    /// Abort the active drag, restoring the state from pointer-down
    pub fn cancel_drag(&mut self) -> Result<()> {
        let Some(ActiveDrag {
            state, revert_time_ms, ..
        }) = self.drag.take()
        else {
            return Ok(());
        };
        if state.drag_type == DragType::Playhead {
            self.current_time_ms = revert_time_ms;
            return Ok(());
        }
        tracing::debug!("Drag cancelled");
        self.revert_span(&state)
    }

    fn revert_span(&mut self, state: &DragState) -> Result<()> {
        if let (Some(target), Some(span)) = (&state.target, state.original_span()) {
            self.timeline.set_span(target, span.start_ms, span.duration_ms)?;
        }
        Ok(())
    }

    fn cancel_drag_on(&mut self, id: &ClipId) {
        let dragged = self
            .drag
            .as_ref()
            .and_then(|d| d.state.target.as_ref())
            .is_some_and(|t| t.id() == id);
        if dragged {
            self.drag = None;
        }
    }

    fn cancel_drag_on_track(&mut self, track_id: &TrackId) {
        let dragged = self
            .drag
            .as_ref()
            .and_then(|d| d.state.target.as_ref())
            .and_then(|t| self.timeline.placement(t))
            .is_some_and(|c| &c.track_id == track_id);
        if dragged {
            self.drag = None;
        }
    }

    // ------------------------------------------------------------------
    // Playhead and viewport
    // ------------------------------------------------------------------

    /// Move the playhead, clamped to the timeline range
    pub fn set_current_time(&mut self, time_ms: i64) {
        self.current_time_ms = clamp_time(time_ms);
    }

    /// Snap a candidate time against the current model, view and playhead
    pub fn snap_time(&self, candidate_ms: i64) -> i64 {
        Snapper::new(&self.timeline, &self.scale, &self.config.snap, self.config.tick_spacing_px)
            .with_playhead(self.current_time_ms)
            .snap_time(candidate_ms)
    }

    /// Scroll by a pixel distance
    pub fn pan(&mut self, delta_px: f64) {
        self.scale = self.scale.pan_by_pixels(delta_px);
    }

    /// Show `duration_ms` across the viewport width (zoom presets)
    pub fn zoom_to(&mut self, duration_ms: i64) {
        let scaled = self
            .scale
            .set_visible_duration(duration_ms, self.scale.viewport_width_px());
        self.apply_scale(scaled);
    }

    /// Zoom by `factor` around a pointer position
    pub fn zoom_around(&mut self, anchor_px: f64, factor: f64) {
        let scaled = self.scale.zoom_around(anchor_px, factor);
        self.apply_scale(scaled);
    }

    /// Resize the viewport, keeping `ms_per_px`
    pub fn set_viewport_width(&mut self, width_px: f64) {
        let scaled = TimeScale::new(
            self.scale.ms_per_px(),
            self.scale.view_start_ms(),
            self.scale.content_offset_px(),
            width_px,
        );
        self.apply_scale(scaled);
    }

    /// Scroll so that `time_ms` is visible, centring it when it was off screen
    pub fn reveal_time(&mut self, time_ms: i64) {
        if self.scale.contains(time_ms) {
            return;
        }
        let half = (self.scale.visible_duration_ms() / 2.0).round() as i64;
        self.scale = self.scale.with_view_start(clamp_time(time_ms).saturating_sub(half));
    }

    /// Ruler ticks for the current view
    pub fn ruler_ticks(&self) -> Vec<RulerTick> {
        ruler_ticks(&self.scale, self.config.tick_spacing_px)
    }

    /// Invalid scales are programming errors: panic in debug builds and keep
    /// the previous scale otherwise.
    fn apply_scale(&mut self, scaled: std::result::Result<TimeScale, ConfigurationError>) {
        match scaled {
            Ok(scale) => self.scale = scale,
            Err(err) => {
                if cfg!(debug_assertions) {
                    panic!("invalid time scale: {}", err);
                }
                tracing::warn!("Keeping previous time scale: {}", err);
            }
        }
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Undo the last edit
    pub fn undo(&mut self) -> std::result::Result<(), HistoryError> {
        self.cancel_drag_for_history();
        let before = self.history.undo()?.before.clone();
        self.restore(&before)
    }

    /// Redo the last undone edit
    pub fn redo(&mut self) -> std::result::Result<(), HistoryError> {
        self.cancel_drag_for_history();
        let after = self.history.redo()?.after.clone();
        self.restore(&after)
    }

    fn cancel_drag_for_history(&mut self) {
        if let Err(err) = self.cancel_drag() {
            tracing::warn!("Failed to revert drag before history step: {}", err);
        }
    }

    fn restore(&mut self, snapshot: &StateSnapshot) -> std::result::Result<(), HistoryError> {
        self.timeline = snapshot.to_value()?;
        self.prune_selection();
        Ok(())
    }

    fn snapshot(&self) -> Option<StateSnapshot> {
        match StateSnapshot::from_value(&self.timeline) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::warn!("Failed to snapshot timeline, edit will not be undoable: {}", err);
                None
            }
        }
    }

    /// Run a model mutation and record it as one history entry
    fn record<T>(&mut self, description: &str, mutate: impl FnOnce(&mut Timeline) -> Result<T>) -> Result<T> {
        let before = self.snapshot();
        let value = mutate(&mut self.timeline)?;
        if let (Some(before), Some(after)) = (before, self.snapshot()) {
            self.history.record(description, before, after);
        }
        Ok(value)
    }

    fn check_overlap(&self, candidate: &Clip) -> Result<()> {
        if self.config.overlap_policy == OverlapPolicy::Allow {
            return Ok(());
        }
        match self.timeline.find_overlap(candidate) {
            Some(other) => {
                tracing::warn!("Rejected {}: overlaps {}", candidate.id, other);
                Err(ValidationError::Overlap {
                    clip: candidate.id.clone(),
                    other,
                }
                .into())
            }
            None => Ok(()),
        }
    }

    fn prune_selection(&mut self) {
        if let Some(id) = &self.selection.clip {
            if self.timeline.clip(id).is_none() {
                self.selection.clip = None;
            }
        }
        if let Some(id) = &self.selection.effect_clip {
            if self.timeline.effect_clip(id).is_none() {
                self.selection.effect_clip = None;
            }
        }
    }

    // ------------------------------------------------------------------
    // Read model and runtime
    // ------------------------------------------------------------------

    /// Snapshot of everything a renderer needs
    pub fn read_model(&self) -> ReadModel {
        ReadModel {
            tracks: self.timeline.tracks().map(TrackInfo::from).collect(),
            clips: self.timeline.clips().cloned().collect(),
            effect_clips: self.timeline.effect_clips().cloned().collect(),
            effect_assets: self.timeline.effect_assets().cloned().collect(),
            selection: self.selection.clone(),
            drag_state: self.drag_state().cloned(),
            current_time_ms: self.current_time_ms,
            viewport: self.viewport(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }

    /// Hand the current document to the playout runtime
    pub fn start_broadcast(
        &self,
        runtime: &mut dyn BroadcastRuntime,
        segment_id: &str,
    ) -> std::result::Result<(), RuntimeError> {
        let document = self.to_document();
        tracing::info!("Starting segment {} from document {}", segment_id, document.metadata.id);
        runtime.start(segment_id, &document)
    }

    /// Stop a running segment
    pub fn stop_broadcast(
        &self,
        runtime: &mut dyn BroadcastRuntime,
        segment_id: &str,
    ) -> std::result::Result<(), RuntimeError> {
        runtime.stop(segment_id)
    }
}

impl Default for TimelineEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
