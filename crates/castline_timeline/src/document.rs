// SPDX-License-Identifier: MIT OR Apache-2.0
//! Persisted timeline document and document storage.
//!
//! The document is camelCase JSON shared with the hosting application:
//!
//! ```json
//! { "version": 1,
//!   "metadata": { "id": "...", "name": "...", "duration": 0, "created": "", "updated": "" },
//!   "tracks": [ { "id": "...", "kind": "video", "clips": [ ... ] } ],
//!   "assets": [], "apiConfigs": [] }
//! ```
//!
//! `assets` and `apiConfigs` are owned by other services and kept verbatim.
//! Keys the engine does not model, at any level, are collected into `extra`
//! maps and written back on export.

use crate::clip::{Clip, ClipId, ClipKind, EffectClip};
use crate::effect::EffectAssetId;
use crate::error::TimelineError;
use crate::timeline::Timeline;
use crate::track::{Track, TrackId, TrackKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Current document format version
pub const DOCUMENT_FORMAT_VERSION: u32 = 1;

/// Document file extension used by [`JsonFileStore`]
pub const DOCUMENT_EXTENSION: &str = "json";

/// Unmodelled keys of a JSON object
pub type ExtraFields = Map<String, Value>;

/// Document errors
#[derive(Debug, Error)]
pub enum DocumentError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document is not valid JSON for the schema
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Document was written by a newer version
    #[error("Document version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the document
        found: u32,
        /// Newest readable version
        supported: u32,
    },

    /// Document content breaks a model invariant
    #[error("Invalid document: {0}")]
    Invalid(#[from] TimelineError),

    /// Id cannot be used as a file name
    #[error("Invalid document id: {0:?}")]
    InvalidId(String),

    /// No document with this id in the store
    #[error("Document not found: {0}")]
    NotFound(String),
}

/// Document metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Document id
    pub id: String,
    /// Display name
    pub name: String,
    /// Planned programme length in milliseconds, 0 when unknown
    #[serde(default)]
    pub duration: i64,
    /// Creation timestamp, as written by the host
    #[serde(default)]
    pub created: String,
    /// Last update timestamp, as written by the host
    #[serde(default)]
    pub updated: String,
    /// Host keys
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl DocumentMetadata {
    /// Create metadata with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            duration: 0,
            created: String::new(),
            updated: String::new(),
            extra: ExtraFields::new(),
        }
    }
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Serialized clip or effect clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipRecord {
    /// Clip id
    pub id: ClipId,
    /// Content kind
    pub kind: ClipKind,
    /// Source reference
    pub source_id: String,
    /// Start time
    pub start_ms: i64,
    /// Duration
    pub duration_ms: i64,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Whether the clip contributes to output
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Opacity percentage
    #[serde(default = "default_opacity")]
    pub opacity: u8,
    /// Applied effect, effect clips only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_asset_id: Option<EffectAssetId>,
    /// Host keys
    #[serde(flatten)]
    pub extra: ExtraFields,
}

fn default_enabled() -> bool {
    true
}

fn default_opacity() -> u8 {
    crate::clip::MAX_OPACITY
}

impl ClipRecord {
    fn from_clip(clip: &Clip, effect_asset_id: Option<EffectAssetId>) -> Self {
        Self {
            id: clip.id.clone(),
            kind: clip.kind,
            source_id: clip.source_id.clone(),
            start_ms: clip.start_ms,
            duration_ms: clip.duration_ms,
            name: clip.name.clone(),
            enabled: clip.enabled,
            opacity: clip.opacity,
            effect_asset_id,
            extra: ExtraFields::new(),
        }
    }

    fn to_clip(&self, track_id: &TrackId) -> Clip {
        Clip {
            id: self.id.clone(),
            track_id: track_id.clone(),
            kind: self.kind,
            source_id: self.source_id.clone(),
            start_ms: self.start_ms,
            duration_ms: self.duration_ms,
            name: self.name.clone(),
            enabled: self.enabled,
            opacity: self.opacity,
        }
    }
}

/// Serialized track with its clips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    /// Track id
    pub id: TrackId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Track kind
    pub kind: TrackKind,
    /// Muted flag
    #[serde(default)]
    pub muted: bool,
    /// Locked flag
    #[serde(default)]
    pub locked: bool,
    /// Clips and effect clips
    #[serde(default)]
    pub clips: Vec<ClipRecord>,
    /// Host keys
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Host keys of tracks and clips, kept beside the model by id.
///
/// The model is snapshotted with `bincode`, which cannot carry arbitrary JSON,
/// so unmodelled keys are split off on load and merged back on export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostFields {
    document: ExtraFields,
    tracks: HashMap<TrackId, ExtraFields>,
    clips: HashMap<ClipId, ExtraFields>,
}

impl HostFields {
    /// Collect the host keys of a document
    pub fn from_document(document: &TimelineDocument) -> Self {
        let mut host = Self {
            document: document.extra.clone(),
            ..Self::default()
        };
        for track in &document.tracks {
            if !track.extra.is_empty() {
                host.tracks.insert(track.id.clone(), track.extra.clone());
            }
            for clip in &track.clips {
                if !clip.extra.is_empty() {
                    host.clips.insert(clip.id.clone(), clip.extra.clone());
                }
            }
        }
        host
    }

    /// Host keys of a track
    pub fn track(&self, id: &TrackId) -> Option<&ExtraFields> {
        self.tracks.get(id)
    }

    /// Host keys of a clip or effect clip
    pub fn clip(&self, id: &ClipId) -> Option<&ExtraFields> {
        self.clips.get(id)
    }

    /// Whether nothing was collected
    pub fn is_empty(&self) -> bool {
        self.document.is_empty() && self.tracks.is_empty() && self.clips.is_empty()
    }
}

/// The persisted form of one timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineDocument {
    /// Format version
    pub version: u32,
    /// Metadata
    pub metadata: DocumentMetadata,
    /// Tracks in display order
    #[serde(default)]
    pub tracks: Vec<TrackRecord>,
    /// Opaque asset entries
    #[serde(default)]
    pub assets: Vec<Value>,
    /// Opaque API feed configurations
    #[serde(default)]
    pub api_configs: Vec<Value>,
    /// Host keys
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl TimelineDocument {
    /// Create an empty document
    pub fn new(metadata: DocumentMetadata) -> Self {
        Self {
            version: DOCUMENT_FORMAT_VERSION,
            metadata,
            tracks: Vec::new(),
            assets: Vec::new(),
            api_configs: Vec::new(),
            extra: ExtraFields::new(),
        }
    }

    /// Export a timeline with its metadata and opaque collections
    pub fn from_timeline(
        timeline: &Timeline,
        metadata: DocumentMetadata,
        assets: Vec<Value>,
        api_configs: Vec<Value>,
    ) -> Self {
        let tracks = timeline
            .tracks()
            .map(|track| TrackRecord {
                id: track.id.clone(),
                name: track.name.clone(),
                kind: track.kind,
                muted: track.muted,
                locked: track.locked,
                clips: track
                    .clips()
                    .iter()
                    .map(|c| ClipRecord::from_clip(c, None))
                    .chain(
                        track
                            .effect_clips()
                            .iter()
                            .map(|e| ClipRecord::from_clip(&e.clip, Some(e.effect_asset_id.clone()))),
                    )
                    .collect(),
                extra: ExtraFields::new(),
            })
            .collect();

        Self {
            version: DOCUMENT_FORMAT_VERSION,
            metadata,
            tracks,
            assets,
            api_configs,
            extra: ExtraFields::new(),
        }
    }

    /// Merge previously collected host keys back into the records
    pub fn with_host_fields(mut self, host: &HostFields) -> Self {
        self.extra.extend(host.document.clone());
        for track in &mut self.tracks {
            if let Some(extra) = host.track(&track.id) {
                track.extra.extend(extra.clone());
            }
            for clip in &mut track.clips {
                if let Some(extra) = host.clip(&clip.id) {
                    clip.extra.extend(extra.clone());
                }
            }
        }
        self
    }

    /// Rebuild the model, validating every track and clip
    pub fn to_timeline(&self) -> Result<Timeline, DocumentError> {
        let mut timeline = Timeline::new();
        for record in &self.tracks {
            let mut track = Track::new(record.name.clone(), record.kind).with_id(record.id.clone());
            track.muted = record.muted;
            track.locked = record.locked;
            timeline.add_track(track)?;

            for clip in &record.clips {
                let placed = clip.to_clip(&record.id);
                match &clip.effect_asset_id {
                    Some(asset_id) => {
                        timeline.add_effect_clip(EffectClip {
                            clip: placed,
                            effect_asset_id: asset_id.clone(),
                        })?;
                    }
                    None => {
                        timeline.add_clip(placed)?;
                    }
                }
            }
        }
        Ok(timeline)
    }

    /// Parse a document, rejecting newer format versions
    pub fn from_json(content: &str) -> Result<Self, DocumentError> {
        let document: TimelineDocument = serde_json::from_str(content)?;
        if document.version > DOCUMENT_FORMAT_VERSION {
            return Err(DocumentError::UnsupportedVersion {
                found: document.version,
                supported: DOCUMENT_FORMAT_VERSION,
            });
        }
        Ok(document)
    }

    /// Encode as pretty JSON
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a document file
    pub fn load_file(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        let document = Self::from_json(&content)?;
        tracing::info!("Loaded document {} from {:?}", document.metadata.id, path);
        Ok(document)
    }

    /// Save a document file
    pub fn save_file(&self, path: &Path) -> Result<(), DocumentError> {
        std::fs::write(path, self.to_json_pretty()?)?;
        tracing::info!("Saved document {} to {:?}", self.metadata.id, path);
        Ok(())
    }
}

/// Persistence seam for timeline documents
pub trait DocumentStore {
    /// Load a document by id
    fn load(&self, id: &str) -> Result<TimelineDocument, DocumentError>;

    /// Create or overwrite the document with `document.metadata.id`
    fn save(&self, document: &TimelineDocument) -> Result<(), DocumentError>;

    /// Ids of all stored documents, sorted
    fn list(&self) -> Result<Vec<String>, DocumentError>;

    /// Delete a document by id
    fn delete(&self, id: &str) -> Result<(), DocumentError>;
}

/// Stores each document as `<id>.json` inside one directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `root`; the directory is created on first save
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the documents
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for a document id
    pub fn path_for(&self, id: &str) -> Result<PathBuf, DocumentError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(DocumentError::InvalidId(id.to_string()));
        }
        Ok(self.root.join(format!("{}.{}", id, DOCUMENT_EXTENSION)))
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self, id: &str) -> Result<TimelineDocument, DocumentError> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Err(DocumentError::NotFound(id.to_string()));
        }
        TimelineDocument::load_file(&path)
    }

    fn save(&self, document: &TimelineDocument) -> Result<(), DocumentError> {
        let path = self.path_for(&document.metadata.id)?;
        std::fs::create_dir_all(&self.root)?;
        document.save_file(&path)
    }

    fn list(&self) -> Result<Vec<String>, DocumentError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn delete(&self, id: &str) -> Result<(), DocumentError> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Err(DocumentError::NotFound(id.to_string()));
        }
        std::fs::remove_file(&path)?;
        tracing::info!("Deleted document {}", id);
        Ok(())
    }
}
