// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline model: tracks, clips, effect clips and the effect catalog.
//!
//! Every mutation validates its complete result before writing anything, so a
//! failed call leaves the model exactly as it was.

use crate::clip::{Clip, ClipId, ClipKind, ClipRef, ClipUpdate, EffectClip, EffectClipUpdate, MIN_DURATION_MS};
use crate::effect::{EffectAsset, EffectAssetId};
use crate::error::{EntityKind, NotFoundError, Result, TimelineError, ValidationError};
use crate::track::{Track, TrackId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The canonical project state for one open document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Tracks in display order
    tracks: IndexMap<TrackId, Track>,
    /// Read-only effect catalog
    effect_assets: IndexMap<EffectAssetId, EffectAsset>,
}

impl Timeline {
    /// Create an empty timeline with the built-in effect catalog
    pub fn new() -> Self {
        let mut timeline = Self::empty();
        for asset in EffectAsset::builtin_catalog() {
            timeline.effect_assets.insert(asset.id.clone(), asset);
        }
        timeline
    }

    /// Create a timeline with no tracks and an empty catalog
    pub fn empty() -> Self {
        Self {
            tracks: IndexMap::new(),
            effect_assets: IndexMap::new(),
        }
    }

    // ------------------------------------------------------------------
    // Tracks
    // ------------------------------------------------------------------

    /// Add a track.
    ///
    /// Clips carried by `track` are validated and inserted one by one; if any
    /// is rejected the track is removed again and the error returned.
    pub fn add_track(&mut self, mut track: Track) -> Result<TrackId> {
        if self.tracks.contains_key(&track.id) {
            return Err(ValidationError::DuplicateTrackId(track.id).into());
        }

        let clips = std::mem::take(&mut track.clips);
        let effect_clips = std::mem::take(&mut track.effect_clips);
        let id = track.id.clone();
        self.tracks.insert(id.clone(), track);

        let populated = clips
            .into_iter()
            .try_for_each(|clip| self.add_clip(clip).map(drop))
            .and_then(|()| {
                effect_clips
                    .into_iter()
                    .try_for_each(|fx| self.add_effect_clip(fx).map(drop))
            });

        if let Err(err) = populated {
            self.tracks.shift_remove(&id);
            return Err(err);
        }

        tracing::debug!("Added track {}", id);
        Ok(id)
    }

    /// Remove a track together with its clips
    pub fn remove_track(&mut self, track_id: &TrackId) -> Result<Track> {
        let track = self
            .tracks
            .shift_remove(track_id)
            .ok_or_else(|| NotFoundError::new(EntityKind::Track, track_id))?;
        tracing::debug!("Removed track {} with {} clips", track_id, track.clip_count());
        Ok(track)
    }

    /// Get a track
    pub fn track(&self, track_id: &TrackId) -> Option<&Track> {
        self.tracks.get(track_id)
    }

    /// Set the locked flag of a track
    pub fn set_track_locked(&mut self, track_id: &TrackId, locked: bool) -> Result<()> {
        let track = self
            .tracks
            .get_mut(track_id)
            .ok_or_else(|| NotFoundError::new(EntityKind::Track, track_id))?;
        track.locked = locked;
        Ok(())
    }

    /// Set the muted flag of a track
    pub fn set_track_muted(&mut self, track_id: &TrackId, muted: bool) -> Result<()> {
        let track = self
            .tracks
            .get_mut(track_id)
            .ok_or_else(|| NotFoundError::new(EntityKind::Track, track_id))?;
        track.muted = muted;
        Ok(())
    }

    /// Get all tracks in display order
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Get track count
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    // ------------------------------------------------------------------
    // Effect catalog
    // ------------------------------------------------------------------

    /// Register an additional catalog entry
    pub fn register_effect_asset(&mut self, asset: EffectAsset) -> Result<()> {
        if self.effect_assets.contains_key(&asset.id) {
            return Err(ValidationError::DuplicateEffectAsset(asset.id).into());
        }
        self.effect_assets.insert(asset.id.clone(), asset);
        Ok(())
    }

    /// Get a catalog entry
    pub fn effect_asset(&self, id: &EffectAssetId) -> Option<&EffectAsset> {
        self.effect_assets.get(id)
    }

    /// Get the whole catalog
    pub fn effect_assets(&self) -> impl Iterator<Item = &EffectAsset> {
        self.effect_assets.values()
    }

    // ------------------------------------------------------------------
    // Clips
    // ------------------------------------------------------------------

    /// Add a clip to its track
    pub fn add_clip(&mut self, clip: Clip) -> Result<ClipId> {
        if clip.kind == ClipKind::Effect {
            return Err(self.incompatible(&clip));
        }
        self.validate_placement(&clip)?;
        if self.contains_id(&clip.id) {
            return Err(ValidationError::DuplicateClipId(clip.id).into());
        }

        let id = clip.id.clone();
        tracing::debug!("Adding clip {} on {} at {}ms", id, clip.track_id, clip.start_ms);
        self.track_entry(&clip.track_id)?.insert_clip(clip);
        Ok(id)
    }

    /// Preview the result of an update without applying it
    pub fn merged_clip(&self, id: &ClipId, update: &ClipUpdate) -> Result<Clip> {
        let current = self
            .clip(id)
            .ok_or_else(|| NotFoundError::new(EntityKind::Clip, id))?;
        Ok(update.apply_to(current))
    }

    /// Merge an update into a clip, re-validating the result
    pub fn update_clip(&mut self, id: &ClipId, update: &ClipUpdate) -> Result<&Clip> {
        let current_track = self
            .clip(id)
            .map(|c| c.track_id.clone())
            .ok_or_else(|| NotFoundError::new(EntityKind::Clip, id))?;
        let merged = self.merged_clip(id, update)?;
        self.validate_placement(&merged)?;

        let target_track = merged.track_id.clone();
        if target_track == current_track {
            self.track_entry(&current_track)?.replace_clip(merged);
        } else {
            self.track_entry(&current_track)?.remove_clip(id);
            self.track_entry(&target_track)?.insert_clip(merged);
            tracing::debug!("Moved clip {} from {} to {}", id, current_track, target_track);
        }

        self.clip(id)
            .ok_or_else(|| NotFoundError::new(EntityKind::Clip, id).into())
    }

    /// Remove a clip; absent ids are reported as [`NotFoundError`]
    pub fn remove_clip(&mut self, id: &ClipId) -> Result<Clip> {
        let removed = self.tracks.values_mut().find_map(|t| t.remove_clip(id));
        let clip = removed.ok_or_else(|| NotFoundError::new(EntityKind::Clip, id))?;
        tracing::debug!("Removed clip {}", id);
        Ok(clip)
    }

    /// Get a clip by id
    pub fn clip(&self, id: &ClipId) -> Option<&Clip> {
        self.tracks.values().find_map(|t| t.clip(id))
    }

    /// All clips, track by track
    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.tracks.values().flat_map(|t| t.clips.iter())
    }

    /// Split a clip at `at_ms`, returning the id of the new right half
    pub fn split_clip(&mut self, id: &ClipId, at_ms: i64) -> Result<ClipId> {
        let clip = self
            .clip(id)
            .cloned()
            .ok_or_else(|| NotFoundError::new(EntityKind::Clip, id))?;
        let (left, right) = split_span(&clip, at_ms)?;

        let track = self.track_entry(&clip.track_id)?;
        let right_id = right.id.clone();
        track.replace_clip(left);
        track.insert_clip(right);
        tracing::debug!("Split clip {} at {}ms into {}", id, at_ms, right_id);
        Ok(right_id)
    }

    // ------------------------------------------------------------------
    // Effect clips
    // ------------------------------------------------------------------

    /// Add an effect clip to an effect track
    pub fn add_effect_clip(&mut self, effect_clip: EffectClip) -> Result<ClipId> {
        self.validate_effect(&effect_clip)?;
        if self.contains_id(effect_clip.id()) {
            return Err(ValidationError::DuplicateClipId(effect_clip.clip.id).into());
        }

        let id = effect_clip.id().clone();
        tracing::debug!(
            "Adding effect clip {} ({}) on {}",
            id,
            effect_clip.effect_asset_id,
            effect_clip.clip.track_id
        );
        let track_id = effect_clip.clip.track_id.clone();
        self.track_entry(&track_id)?.insert_effect_clip(effect_clip);
        Ok(id)
    }

    /// Preview the result of an effect clip update without applying it
    pub fn merged_effect_clip(&self, id: &ClipId, update: &EffectClipUpdate) -> Result<EffectClip> {
        let current = self
            .effect_clip(id)
            .ok_or_else(|| NotFoundError::new(EntityKind::EffectClip, id))?;
        Ok(update.apply_to(current))
    }

    /// Merge an update into an effect clip, re-validating the result
    pub fn update_effect_clip(&mut self, id: &ClipId, update: &EffectClipUpdate) -> Result<&EffectClip> {
        let current_track = self
            .effect_clip(id)
            .map(|e| e.clip.track_id.clone())
            .ok_or_else(|| NotFoundError::new(EntityKind::EffectClip, id))?;
        let merged = self.merged_effect_clip(id, update)?;
        self.validate_effect(&merged)?;

        let target_track = merged.clip.track_id.clone();
        if target_track == current_track {
            self.track_entry(&current_track)?.replace_effect_clip(merged);
        } else {
            self.track_entry(&current_track)?.remove_effect_clip(id);
            self.track_entry(&target_track)?.insert_effect_clip(merged);
        }

        self.effect_clip(id)
            .ok_or_else(|| NotFoundError::new(EntityKind::EffectClip, id).into())
    }

    /// Remove an effect clip; absent ids are reported as [`NotFoundError`]
    pub fn remove_effect_clip(&mut self, id: &ClipId) -> Result<EffectClip> {
        let removed = self.tracks.values_mut().find_map(|t| t.remove_effect_clip(id));
        let effect_clip = removed.ok_or_else(|| NotFoundError::new(EntityKind::EffectClip, id))?;
        tracing::debug!("Removed effect clip {}", id);
        Ok(effect_clip)
    }

    /// Get an effect clip by id
    pub fn effect_clip(&self, id: &ClipId) -> Option<&EffectClip> {
        self.tracks.values().find_map(|t| t.effect_clip(id))
    }

    /// All effect clips, track by track
    pub fn effect_clips(&self) -> impl Iterator<Item = &EffectClip> {
        self.tracks.values().flat_map(|t| t.effect_clips.iter())
    }

    /// Split an effect clip at `at_ms`, returning the id of the new right half
    pub fn split_effect_clip(&mut self, id: &ClipId, at_ms: i64) -> Result<ClipId> {
        let effect_clip = self
            .effect_clip(id)
            .cloned()
            .ok_or_else(|| NotFoundError::new(EntityKind::EffectClip, id))?;
        let (left, right) = split_span(&effect_clip.clip, at_ms)?;

        let track = self.track_entry(&left.track_id)?;
        let right_id = right.id.clone();
        track.replace_effect_clip(EffectClip {
            clip: left,
            effect_asset_id: effect_clip.effect_asset_id.clone(),
        });
        track.insert_effect_clip(EffectClip {
            clip: right,
            effect_asset_id: effect_clip.effect_asset_id,
        });
        Ok(right_id)
    }

    // ------------------------------------------------------------------
    // Either collection
    // ------------------------------------------------------------------

    /// Placement data of a clip or effect clip
    pub fn placement(&self, clip_ref: &ClipRef) -> Option<&Clip> {
        match clip_ref {
            ClipRef::Clip(id) => self.clip(id),
            ClipRef::Effect(id) => self.effect_clip(id).map(|e| &e.clip),
        }
    }

    /// Set start and duration of a clip or effect clip
    pub fn set_span(&mut self, clip_ref: &ClipRef, start_ms: i64, duration_ms: i64) -> Result<()> {
        let update = ClipUpdate::span(start_ms, duration_ms);
        match clip_ref {
            ClipRef::Clip(id) => self.update_clip(id, &update).map(drop),
            ClipRef::Effect(id) => self.update_effect_clip(id, &update.into()).map(drop),
        }
    }

    /// Ids of clips of the same kind on the same track that share time with `clip_ref`
    pub fn overlapping(&self, clip_ref: &ClipRef) -> Vec<ClipId> {
        let Some(clip) = self.placement(clip_ref) else {
            return Vec::new();
        };
        let Some(track) = self.tracks.get(&clip.track_id) else {
            return Vec::new();
        };
        track
            .clips
            .iter()
            .chain(track.effect_clips.iter().map(|e| &e.clip))
            .filter(|c| c.id != clip.id && c.kind == clip.kind && c.overlaps(clip))
            .map(|c| c.id.clone())
            .collect()
    }

    /// First clip the candidate would overlap on its track
    pub fn find_overlap(&self, candidate: &Clip) -> Option<ClipId> {
        self.tracks
            .get(&candidate.track_id)
            .and_then(|t| t.find_overlap(candidate))
            .cloned()
    }

    /// Regular clips covering a time, across all tracks
    pub fn clips_at(&self, time_ms: i64) -> Vec<&Clip> {
        self.tracks.values().flat_map(|t| t.clips_at(time_ms)).collect()
    }

    /// Start and end times of every clip, optionally skipping one id
    pub fn boundaries<'a>(&'a self, exclude: Option<&'a ClipId>) -> impl Iterator<Item = i64> + 'a {
        self.tracks
            .values()
            .flat_map(|t| t.spans())
            .filter(move |(id, _, _)| Some(*id) != exclude)
            .flat_map(|(_, start, end)| [start, end])
    }

    /// End of the last clip on any track
    pub fn content_duration_ms(&self) -> i64 {
        self.tracks.values().map(Track::duration).max().unwrap_or(0)
    }

    /// Whether any clip or effect clip uses `id`
    pub fn contains_id(&self, id: &ClipId) -> bool {
        self.tracks.values().any(|t| t.contains_id(id))
    }

    // ------------------------------------------------------------------
    // Validation helpers
    // ------------------------------------------------------------------

    fn track_entry(&mut self, track_id: &TrackId) -> Result<&mut Track> {
        self.tracks
            .get_mut(track_id)
            .ok_or_else(|| ValidationError::UnknownTrack(track_id.clone()).into())
    }

    fn incompatible(&self, clip: &Clip) -> TimelineError {
        match self.tracks.get(&clip.track_id) {
            Some(track) => ValidationError::IncompatibleKind {
                track_kind: track.kind,
                clip_kind: clip.kind,
            }
            .into(),
            None => ValidationError::UnknownTrack(clip.track_id.clone()).into(),
        }
    }

    /// Per-clip invariants plus track existence and kind compatibility
    fn validate_placement(&self, clip: &Clip) -> Result<()> {
        clip.validate()?;
        let track = self
            .tracks
            .get(&clip.track_id)
            .ok_or_else(|| ValidationError::UnknownTrack(clip.track_id.clone()))?;
        if !track.kind.accepts(clip.kind) {
            return Err(ValidationError::IncompatibleKind {
                track_kind: track.kind,
                clip_kind: clip.kind,
            }
            .into());
        }
        Ok(())
    }

    fn validate_effect(&self, effect_clip: &EffectClip) -> Result<()> {
        if effect_clip.clip.kind != ClipKind::Effect {
            return Err(self.incompatible(&effect_clip.clip));
        }
        self.validate_placement(&effect_clip.clip)?;
        if !self.effect_assets.contains_key(&effect_clip.effect_asset_id) {
            return Err(ValidationError::UnknownEffectAsset(effect_clip.effect_asset_id.clone()).into());
        }
        Ok(())
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Cut a clip in two at an interior time
fn split_span(clip: &Clip, at_ms: i64) -> Result<(Clip, Clip)> {
    let left_duration = at_ms.saturating_sub(clip.start_ms);
    let right_duration = clip.end_ms().saturating_sub(at_ms);
    if left_duration < MIN_DURATION_MS || right_duration < MIN_DURATION_MS {
        return Err(ValidationError::SplitTooShort {
            at_ms,
            min_ms: MIN_DURATION_MS,
        }
        .into());
    }

    let mut left = clip.clone();
    left.duration_ms = left_duration;

    let mut right = clip.clone();
    right.id = ClipId::new();
    right.start_ms = at_ms;
    right.duration_ms = right_duration;

    Ok((left, right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::TrackKind;

    fn sample() -> Timeline {
        let mut timeline = Timeline::new();
        timeline.add_track(Track::new("Cameras", TrackKind::Video).with_id("video")).unwrap();
        timeline.add_track(Track::new("Graphics", TrackKind::Overlay).with_id("overlay")).unwrap();
        timeline.add_track(Track::new("Effects", TrackKind::Effect).with_id("fx")).unwrap();
        timeline
            .add_clip(Clip::new("video", ClipKind::Video, "cam-1", 2000, 8000).with_id("c1"))
            .unwrap();
        timeline
    }

    #[test]
    fn test_add_clip_rejects_short_duration() {
        let mut timeline = sample();
        let err = timeline
            .add_clip(Clip::new("video", ClipKind::Video, "cam-2", 0, 100))
            .unwrap_err();
        assert!(matches!(err, TimelineError::Validation(ValidationError::DurationTooShort { .. })));
    }

    #[test]
    fn test_add_clip_rejects_unknown_track_and_wrong_kind() {
        let mut timeline = sample();
        let err = timeline
            .add_clip(Clip::new("nope", ClipKind::Video, "cam-2", 0, 1000))
            .unwrap_err();
        assert!(matches!(err, TimelineError::Validation(ValidationError::UnknownTrack(_))));

        let err = timeline
            .add_clip(Clip::new("video", ClipKind::Audio, "mic", 0, 1000))
            .unwrap_err();
        assert!(matches!(err, TimelineError::Validation(ValidationError::IncompatibleKind { .. })));

        let err = timeline
            .add_clip(Clip::new("fx", ClipKind::Effect, "blur", 0, 1000))
            .unwrap_err();
        assert!(matches!(err, TimelineError::Validation(ValidationError::IncompatibleKind { .. })));
    }

    #[test]
    fn test_ad_clips_share_overlay_track() {
        let mut timeline = sample();
        timeline
            .add_clip(Clip::new("overlay", ClipKind::Ad, "spot-30", 0, 30_000))
            .unwrap();
        assert_eq!(timeline.track(&"overlay".into()).unwrap().clip_count(), 1);
    }

    #[test]
    fn test_duplicate_clip_id_rejected() {
        let mut timeline = sample();
        let err = timeline
            .add_clip(Clip::new("video", ClipKind::Video, "cam-2", 20_000, 1000).with_id("c1"))
            .unwrap_err();
        assert_eq!(err, TimelineError::from(ValidationError::DuplicateClipId("c1".into())));
    }

    #[test]
    fn test_update_missing_clip_is_not_found() {
        let mut timeline = sample();
        let err = timeline
            .update_clip(&"missing-id".into(), &ClipUpdate::start(0))
            .unwrap_err();
        assert!(matches!(err, TimelineError::NotFound(NotFoundError { kind: EntityKind::Clip, .. })));
    }

    #[test]
    fn test_failed_update_leaves_model_unchanged() {
        let mut timeline = sample();
        let before = timeline.clone();
        let err = timeline
            .update_clip(&"c1".into(), &ClipUpdate::span(-5, 8000))
            .unwrap_err();
        assert_eq!(err, TimelineError::from(ValidationError::NegativeStart(-5)));
        assert_eq!(timeline, before);
    }

    #[test]
    fn test_update_can_move_between_tracks() {
        let mut timeline = sample();
        timeline.add_track(Track::new("Backup", TrackKind::Video).with_id("video-2")).unwrap();
        let clip = timeline
            .update_clip(&"c1".into(), &ClipUpdate::default().with_track("video-2"))
            .unwrap();
        assert_eq!(clip.track_id.as_str(), "video-2");
        assert!(timeline.track(&"video".into()).unwrap().is_empty());

        let err = timeline
            .update_clip(&"c1".into(), &ClipUpdate::default().with_track("overlay"))
            .unwrap_err();
        assert!(matches!(err, TimelineError::Validation(ValidationError::IncompatibleKind { .. })));
    }

    #[test]
    fn test_remove_clip_reports_missing() {
        let mut timeline = sample();
        assert_eq!(timeline.remove_clip(&"c1".into()).unwrap().id.as_str(), "c1");
        let err = timeline.remove_clip(&"c1".into()).unwrap_err();
        assert!(matches!(err, TimelineError::NotFound(_)));
    }

    #[test]
    fn test_effect_clip_requires_known_asset() {
        let mut timeline = sample();
        let err = timeline
            .add_effect_clip(EffectClip::new("fx", "no-such-effect", 0, 1000))
            .unwrap_err();
        assert!(matches!(err, TimelineError::Validation(ValidationError::UnknownEffectAsset(_))));

        let id = timeline.add_effect_clip(EffectClip::new("fx", "blur", 0, 1000)).unwrap();
        let update = EffectClipUpdate {
            effect_asset_id: Some("fade".into()),
            ..EffectClipUpdate::default()
        };
        let fx = timeline.update_effect_clip(&id, &update).unwrap();
        assert_eq!(fx.effect_asset_id.as_str(), "fade");

        let err = timeline
            .add_effect_clip(EffectClip::new("video", "blur", 0, 1000))
            .unwrap_err();
        assert!(matches!(err, TimelineError::Validation(ValidationError::IncompatibleKind { .. })));
    }

    #[test]
    fn test_split_clip() {
        let mut timeline = sample();
        let right = timeline.split_clip(&"c1".into(), 6000).unwrap();
        let left = timeline.clip(&"c1".into()).unwrap();
        assert_eq!((left.start_ms, left.duration_ms), (2000, 4000));
        let right = timeline.clip(&right).unwrap();
        assert_eq!((right.start_ms, right.duration_ms), (6000, 4000));

        let err = timeline.split_clip(&"c1".into(), 2200).unwrap_err();
        assert!(matches!(err, TimelineError::Validation(ValidationError::SplitTooShort { .. })));
    }

    #[test]
    fn test_add_track_rolls_back_on_invalid_clip() {
        let mut timeline = sample();
        let mut track = Track::new("Broken", TrackKind::Audio).with_id("audio");
        track.clips.push(Clip::new("audio", ClipKind::Audio, "mic", 0, 10));
        assert!(timeline.add_track(track).is_err());
        assert!(timeline.track(&"audio".into()).is_none());
    }

    #[test]
    fn test_overlapping_and_boundaries() {
        let mut timeline = sample();
        timeline
            .add_clip(Clip::new("video", ClipKind::Video, "cam-2", 9000, 2000).with_id("c2"))
            .unwrap();
        assert_eq!(timeline.overlapping(&ClipRef::Clip("c1".into())), vec![ClipId::from("c2")]);

        let excluded = ClipId::from("c1");
        let mut bounds: Vec<_> = timeline.boundaries(Some(&excluded)).collect();
        bounds.sort_unstable();
        assert_eq!(bounds, vec![9000, 11_000]);
        assert_eq!(timeline.content_duration_ms(), 11_000);
    }
}
