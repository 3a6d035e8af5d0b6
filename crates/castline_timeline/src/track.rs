// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track definitions for the timeline.

use crate::clip::{Clip, ClipId, ClipKind, EffectClip};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a track
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub String);

impl TrackId {
    /// Create a new random track ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TrackId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Type of track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    /// Camera and video feeds
    Video,
    /// Graphic overlays
    Overlay,
    /// Audio
    Audio,
    /// Advertisement breaks
    Ad,
    /// Visual effects
    Effect,
}

impl TrackKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Video => "Video",
            Self::Overlay => "Overlay",
            Self::Audio => "Audio",
            Self::Ad => "Ad",
            Self::Effect => "Effect",
        }
    }

    /// Get the track color
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Video => [100, 150, 255],
            Self::Overlay => [150, 255, 100],
            Self::Audio => [200, 100, 255],
            Self::Ad => [255, 200, 100],
            Self::Effect => [255, 100, 150],
        }
    }

    /// Whether clips of `kind` may be placed on this track.
    ///
    /// Ad clips follow the overlay rules, so ad and overlay tracks accept both.
    pub fn accepts(&self, kind: ClipKind) -> bool {
        matches!(
            (self, kind),
            (Self::Video, ClipKind::Video)
                | (Self::Overlay | Self::Ad, ClipKind::Overlay | ClipKind::Ad)
                | (Self::Audio, ClipKind::Audio)
                | (Self::Effect, ClipKind::Effect)
        )
    }
}

/// A lane on the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Unique track ID
    pub id: TrackId,
    /// Track name
    pub name: String,
    /// Track type
    pub kind: TrackKind,
    /// Whether the track is muted
    pub muted: bool,
    /// Whether the track refuses pointer edits
    pub locked: bool,
    /// Clips ordered by start time
    pub(crate) clips: Vec<Clip>,
    /// Effect clips ordered by start time (effect tracks only)
    pub(crate) effect_clips: Vec<EffectClip>,
}

impl Track {
    /// Create a new empty track
    pub fn new(name: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: TrackId::new(),
            name: name.into(),
            kind,
            muted: false,
            locked: false,
            clips: Vec::new(),
            effect_clips: Vec::new(),
        }
    }

    /// Set an explicit id
    pub fn with_id(mut self, id: impl Into<TrackId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the locked flag
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Clips ordered by start time
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    /// Effect clips ordered by start time
    pub fn effect_clips(&self) -> &[EffectClip] {
        &self.effect_clips
    }

    /// Number of clips of both collections
    pub fn clip_count(&self) -> usize {
        self.clips.len() + self.effect_clips.len()
    }

    /// Whether the track holds no clips
    pub fn is_empty(&self) -> bool {
        self.clip_count() == 0
    }

    /// End of the last clip
    pub fn duration(&self) -> i64 {
        self.spans().map(|(_, _, end)| end).max().unwrap_or(0)
    }

    /// Get the effective color for this track
    pub fn effective_color(&self) -> [u8; 3] {
        self.kind.color()
    }

    /// `(id, start, end)` of every clip and effect clip on the track
    pub fn spans(&self) -> impl Iterator<Item = (&ClipId, i64, i64)> {
        self.clips
            .iter()
            .map(|c| (&c.id, c.start_ms, c.end_ms()))
            .chain(
                self.effect_clips
                    .iter()
                    .map(|e| (&e.clip.id, e.clip.start_ms, e.clip.end_ms())),
            )
    }

    /// Clips covering a time
    pub fn clips_at(&self, time_ms: i64) -> Vec<&Clip> {
        self.clips.iter().filter(|c| c.contains(time_ms)).collect()
    }

    /// First clip of the same kind that shares time with `candidate`, ignoring `candidate` itself
    pub fn find_overlap(&self, candidate: &Clip) -> Option<&ClipId> {
        let plain = self.clips.iter();
        let effects = self.effect_clips.iter().map(|e| &e.clip);
        plain
            .chain(effects)
            .find(|c| c.id != candidate.id && c.kind == candidate.kind && c.overlaps(candidate))
            .map(|c| &c.id)
    }

    pub(crate) fn clip(&self, id: &ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| &c.id == id)
    }

    pub(crate) fn effect_clip(&self, id: &ClipId) -> Option<&EffectClip> {
        self.effect_clips.iter().find(|e| &e.clip.id == id)
    }

    pub(crate) fn contains_id(&self, id: &ClipId) -> bool {
        self.spans().any(|(clip_id, _, _)| clip_id == id)
    }

    pub(crate) fn insert_clip(&mut self, clip: Clip) {
        self.clips.push(clip);
        self.sort_clips();
    }

    pub(crate) fn insert_effect_clip(&mut self, effect_clip: EffectClip) {
        self.effect_clips.push(effect_clip);
        self.sort_clips();
    }

    /// Replace a clip in place, keeping start-time order
    pub(crate) fn replace_clip(&mut self, clip: Clip) {
        if let Some(slot) = self.clips.iter_mut().find(|c| c.id == clip.id) {
            *slot = clip;
        }
        self.sort_clips();
    }

    pub(crate) fn replace_effect_clip(&mut self, effect_clip: EffectClip) {
        if let Some(slot) = self.effect_clips.iter_mut().find(|e| e.clip.id == effect_clip.clip.id) {
            *slot = effect_clip;
        }
        self.sort_clips();
    }

    pub(crate) fn remove_clip(&mut self, id: &ClipId) -> Option<Clip> {
        let idx = self.clips.iter().position(|c| &c.id == id)?;
        Some(self.clips.remove(idx))
    }

    pub(crate) fn remove_effect_clip(&mut self, id: &ClipId) -> Option<EffectClip> {
        let idx = self.effect_clips.iter().position(|e| &e.clip.id == id)?;
        Some(self.effect_clips.remove(idx))
    }

    /// Sort both collections by start time (id breaks ties)
    fn sort_clips(&mut self) {
        self.clips
            .sort_by(|a, b| a.start_ms.cmp(&b.start_ms).then_with(|| a.id.cmp(&b.id)));
        self.effect_clips.sort_by(|a, b| {
            a.clip
                .start_ms
                .cmp(&b.clip.start_ms)
                .then_with(|| a.clip.id.cmp(&b.clip.id))
        });
    }
}
