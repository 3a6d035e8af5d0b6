// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for timeline mutations and time scale construction.

use crate::clip::{ClipId, ClipKind};
use crate::effect::EffectAssetId;
use crate::track::{TrackId, TrackKind};
use std::fmt;

/// A mutation was rejected because its result would break a model invariant
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Duration below the minimum clip length
    #[error("Clip duration {duration_ms}ms is below the {min_ms}ms minimum")]
    DurationTooShort {
        /// Requested duration
        duration_ms: i64,
        /// Minimum allowed duration
        min_ms: i64,
    },

    /// Negative start time
    #[error("Clip start {0}ms is negative")]
    NegativeStart(i64),

    /// Clip would end past the last representable timeline time
    #[error("Clip at {start_ms}ms +{duration_ms}ms ends past the {max_ms}ms timeline limit")]
    EndOutOfRange {
        /// Requested start
        start_ms: i64,
        /// Requested duration
        duration_ms: i64,
        /// Latest allowed end
        max_ms: i64,
    },

    /// Opacity outside `0..=100`
    #[error("Opacity {0} is outside 0..=100")]
    OpacityOutOfRange(u8),

    /// Target track does not exist
    #[error("Unknown track: {0}")]
    UnknownTrack(TrackId),

    /// Clip kind cannot live on the target track
    #[error("{} clips cannot be placed on {} tracks", clip_kind.name(), track_kind.name())]
    IncompatibleKind {
        /// Kind of the target track
        track_kind: TrackKind,
        /// Kind of the rejected clip
        clip_kind: ClipKind,
    },

    /// Clip id already used somewhere on the timeline
    #[error("Duplicate clip id: {0}")]
    DuplicateClipId(ClipId),

    /// Track id already used
    #[error("Duplicate track id: {0}")]
    DuplicateTrackId(TrackId),

    /// Effect asset is not in the catalog
    #[error("Unknown effect asset: {0}")]
    UnknownEffectAsset(EffectAssetId),

    /// Effect asset id already registered
    #[error("Duplicate effect asset id: {0}")]
    DuplicateEffectAsset(EffectAssetId),

    /// Split point leaves a part shorter than the minimum
    #[error("Splitting at {at_ms}ms leaves a part shorter than {min_ms}ms")]
    SplitTooShort {
        /// Requested split time
        at_ms: i64,
        /// Minimum allowed duration
        min_ms: i64,
    },

    /// Clip would overlap another clip of the same kind on its track
    #[error("Clip {clip} overlaps {other}")]
    Overlap {
        /// Clip being placed
        clip: ClipId,
        /// Clip already occupying the range
        other: ClipId,
    },
}

/// Kind of entity a lookup failed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Regular clip
    Clip,
    /// Effect clip
    EffectClip,
    /// Track
    Track,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clip => "Clip",
            Self::EffectClip => "Effect clip",
            Self::Track => "Track",
        })
    }
}

/// An operation targeted an id that is not in the model
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} not found: {id}")]
pub struct NotFoundError {
    /// What was looked up
    pub kind: EntityKind,
    /// The missing id
    pub id: String,
}

impl NotFoundError {
    /// Create a not-found error for any displayable id
    pub fn new(kind: EntityKind, id: impl fmt::Display) -> Self {
        Self {
            kind,
            id: id.to_string(),
        }
    }
}

/// Malformed time scale parameters
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    /// Milliseconds per pixel must be finite and positive
    #[error("ms per pixel must be finite and positive, got {0}")]
    InvalidMsPerPx(f64),

    /// Viewport width must be positive
    #[error("viewport width must be positive, got {0}px")]
    InvalidViewportWidth(f64),

    /// Content offset must be finite and non-negative
    #[error("content offset must be finite and non-negative, got {0}px")]
    InvalidContentOffset(f64),

    /// Visible duration must be positive
    #[error("visible duration must be positive, got {0}ms")]
    InvalidDuration(i64),

    /// Zoom factor must be finite and positive
    #[error("zoom factor must be finite and positive, got {0}")]
    InvalidZoomFactor(f64),
}

/// Error returned by timeline commands
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimelineError {
    /// Invalid mutation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Unknown id
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Invalid time scale parameters
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Result type for timeline operations
pub type Result<T> = std::result::Result<T, TimelineError>;
