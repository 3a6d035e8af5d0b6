// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clip definitions for the timeline.

use crate::effect::EffectAssetId;
use crate::error::ValidationError;
use crate::track::TrackId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Shortest clip the engine allows, in milliseconds
pub const MIN_DURATION_MS: i64 = 500;

/// Latest time any clip may end at or the playhead may reach (7 days)
pub const MAX_TIMELINE_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Clamp a time into `[0, MAX_TIMELINE_MS]`
pub fn clamp_time(time_ms: i64) -> i64 {
    time_ms.clamp(0, MAX_TIMELINE_MS)
}

/// Largest opacity value
pub const MAX_OPACITY: u8 = 100;

/// Unique identifier for a clip or effect clip
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(pub String);

impl ClipId {
    /// Create a new random clip ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClipId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ClipId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Kind of content a clip places on the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipKind {
    /// Live camera or recorded video
    Video,
    /// Graphic overlay
    Overlay,
    /// Audio source
    Audio,
    /// Advertisement, placed by the overlay rules
    Ad,
    /// Effect applied over a time range
    Effect,
}

impl ClipKind {
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
}

/// Reference to either collection of clips
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "collection", content = "id", rename_all = "camelCase")]
pub enum ClipRef {
    /// A regular clip
    Clip(ClipId),
    /// An effect clip
    Effect(ClipId),
}

impl ClipRef {
    /// The referenced id
    pub fn id(&self) -> &ClipId {
        match self {
            Self::Clip(id) | Self::Effect(id) => id,
        }
    }
}

/// A time-bounded placement of a source on a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    /// Unique clip ID
    pub id: ClipId,
    /// Owning track
    pub track_id: TrackId,
    /// Content kind
    pub kind: ClipKind,
    /// Opaque source reference (camera, asset, API feed)
    pub source_id: String,
    /// Start time in milliseconds
    pub start_ms: i64,
    /// Duration in milliseconds
    pub duration_ms: i64,
    /// Display name
    pub name: String,
    /// Whether the clip contributes to output
    pub enabled: bool,
    /// Opacity percentage (0-100)
    pub opacity: u8,
}

impl Clip {
    /// Create a new enabled, fully opaque clip
    pub fn new(
        track_id: impl Into<TrackId>,
        kind: ClipKind,
        source_id: impl Into<String>,
        start_ms: i64,
        duration_ms: i64,
    ) -> Self {
        let source_id = source_id.into();
        Self {
            id: ClipId::new(),
            track_id: track_id.into(),
            kind,
            name: source_id.clone(),
            source_id,
            start_ms,
            duration_ms,
            enabled: true,
            opacity: MAX_OPACITY,
        }
    }

    /// Set an explicit id
    pub fn with_id(mut self, id: impl Into<ClipId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set opacity
    pub fn with_opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }

    /// End time (exclusive) in milliseconds
    pub fn end_ms(&self) -> i64 {
        self.start_ms.saturating_add(self.duration_ms)
    }

    /// Whether `time_ms` falls inside `[start, end)`
    pub fn contains(&self, time_ms: i64) -> bool {
        time_ms >= self.start_ms && time_ms < self.end_ms()
    }

    /// Whether the two clips share any time
    pub fn overlaps(&self, other: &Clip) -> bool {
        self.start_ms < other.end_ms() && other.start_ms < self.end_ms()
    }

    /// Check the per-clip invariants
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.start_ms < 0 {
            return Err(ValidationError::NegativeStart(self.start_ms));
        }
        if self.duration_ms < MIN_DURATION_MS {
            return Err(ValidationError::DurationTooShort {
                duration_ms: self.duration_ms,
                min_ms: MIN_DURATION_MS,
            });
        }
        match self.start_ms.checked_add(self.duration_ms) {
            Some(end_ms) if end_ms <= MAX_TIMELINE_MS => {}
            _ => {
                return Err(ValidationError::EndOutOfRange {
                    start_ms: self.start_ms,
                    duration_ms: self.duration_ms,
                    max_ms: MAX_TIMELINE_MS,
                });
            }
        }
        if self.opacity > MAX_OPACITY {
            return Err(ValidationError::OpacityOutOfRange(self.opacity));
        }
        Ok(())
    }
}

/// A clip that applies a catalog effect on an effect track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectClip {
    /// Placement data (kind is always [`ClipKind::Effect`])
    pub clip: Clip,
    /// Applied effect
    pub effect_asset_id: EffectAssetId,
}

impl EffectClip {
    /// Create a new effect clip; the source id mirrors the asset id
    pub fn new(
        track_id: impl Into<TrackId>,
        effect_asset_id: impl Into<EffectAssetId>,
        start_ms: i64,
        duration_ms: i64,
    ) -> Self {
        let effect_asset_id = effect_asset_id.into();
        Self {
            clip: Clip::new(track_id, ClipKind::Effect, effect_asset_id.as_str(), start_ms, duration_ms),
            effect_asset_id,
        }
    }

    /// Set an explicit id
    pub fn with_id(mut self, id: impl Into<ClipId>) -> Self {
        self.clip.id = id.into();
        self
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.clip.name = name.into();
        self
    }

    /// Clip id
    pub fn id(&self) -> &ClipId {
        &self.clip.id
    }
}

/// Partial clip update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClipUpdate {
    /// Move to another track
    pub track_id: Option<TrackId>,
    /// New source reference
    pub source_id: Option<String>,
    /// New start time
    pub start_ms: Option<i64>,
    /// New duration
    pub duration_ms: Option<i64>,
    /// New name
    pub name: Option<String>,
    /// New enabled flag
    pub enabled: Option<bool>,
    /// New opacity
    pub opacity: Option<u8>,
}

impl ClipUpdate {
    /// Update only the start time
    pub fn start(start_ms: i64) -> Self {
        Self {
            start_ms: Some(start_ms),
            ..Self::default()
        }
    }

    /// Update start time and duration together
    pub fn span(start_ms: i64, duration_ms: i64) -> Self {
        Self {
            start_ms: Some(start_ms),
            duration_ms: Some(duration_ms),
            ..Self::default()
        }
    }

    /// Set the target track
    pub fn with_track(mut self, track_id: impl Into<TrackId>) -> Self {
        self.track_id = Some(track_id.into());
        self
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the enabled flag
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Set the opacity
    pub fn with_opacity(mut self, opacity: u8) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Merge into a copy of `clip`
    pub fn apply_to(&self, clip: &Clip) -> Clip {
        let mut merged = clip.clone();
        if let Some(track_id) = &self.track_id {
            merged.track_id = track_id.clone();
        }
        if let Some(source_id) = &self.source_id {
            merged.source_id = source_id.clone();
        }
        if let Some(start_ms) = self.start_ms {
            merged.start_ms = start_ms;
        }
        if let Some(duration_ms) = self.duration_ms {
            merged.duration_ms = duration_ms;
        }
        if let Some(name) = &self.name {
            merged.name = name.clone();
        }
        if let Some(enabled) = self.enabled {
            merged.enabled = enabled;
        }
        if let Some(opacity) = self.opacity {
            merged.opacity = opacity;
        }
        merged
    }
}

/// Partial effect clip update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EffectClipUpdate {
    /// Placement fields
    pub clip: ClipUpdate,
    /// Swap the applied effect
    pub effect_asset_id: Option<EffectAssetId>,
}

impl EffectClipUpdate {
    /// Merge into a copy of `effect_clip`
    pub fn apply_to(&self, effect_clip: &EffectClip) -> EffectClip {
        EffectClip {
            clip: self.clip.apply_to(&effect_clip.clip),
            effect_asset_id: self
                .effect_asset_id
                .clone()
                .unwrap_or_else(|| effect_clip.effect_asset_id.clone()),
        }
    }
}

impl From<ClipUpdate> for EffectClipUpdate {
    fn from(clip: ClipUpdate) -> Self {
        Self {
            clip,
            effect_asset_id: None,
        }
    }
}
