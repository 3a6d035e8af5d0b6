// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline editing engine for Castline.
//!
//! This crate provides the non-linear broadcast timeline:
//! - Millisecond/pixel time scale with zoom and pan
//! - Ruler tick generation and time formatting
//! - Tracks, clips, effect clips and the effect catalog
//! - Snapping to grid, clip boundaries and the playhead
//! - Drag/resize edit operations and the pointer/keyboard state machine
//! - Undo/redo history, editor configuration and the persisted document
//!
//! ## Architecture
//!
//! All state for one open document lives in a [`TimelineEditor`]. UI events
//! enter as [`EditorEvent`] values, are turned into edit operations, and
//! mutate the [`Timeline`] model. Renderers read a [`ReadModel`] snapshot and
//! convert times with the current [`TimeScale`].

pub mod clip;
pub mod config;
pub mod document;
pub mod edit;
pub mod editor;
pub mod effect;
pub mod error;
pub mod history;
pub mod interaction;
pub mod runtime;
pub mod scale;
pub mod shared;
pub mod snap;
pub mod ticks;
pub mod timeline;
pub mod track;

pub use clip::{
    clamp_time, Clip, ClipId, ClipKind, ClipRef, ClipUpdate, EffectClip, EffectClipUpdate, MAX_TIMELINE_MS,
    MIN_DURATION_MS,
};
pub use config::{ConfigError, EditorConfig, KeyboardSettings, OverlapPolicy};
pub use document::{
    ClipRecord, DocumentError, DocumentMetadata, DocumentStore, ExtraFields, HostFields, JsonFileStore,
    TimelineDocument, TrackRecord,
};
pub use edit::{DragState, DragType, SpanEdit};
pub use editor::{ReadModel, Selection, TimelineEditor, TrackInfo};
pub use effect::{EffectAsset, EffectAssetId, EffectKind};
pub use error::{ConfigurationError, EntityKind, NotFoundError, Result, TimelineError, ValidationError};
pub use history::{History, HistoryError, HistoryStats, StateSnapshot};
pub use interaction::{ClipPart, EditorEvent, HitTarget, Key, KeyEvent, PointerEvent};
pub use runtime::{BroadcastRuntime, LocalRuntime, RuntimeError};
pub use scale::{TimeScale, Viewport, ZoomPreset};
pub use shared::SharedEditor;
pub use snap::{SnapSettings, Snapper};
pub use ticks::{format_tick_label, format_time, generate_ticks, ruler_ticks, tick_interval, RulerTick, Tick};
pub use timeline::Timeline;
pub use track::{Track, TrackId, TrackKind};
