// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless editing session: open, replay, export.

use crate::cli::Options;
use crate::error::{AppError, Result};
use castline_timeline::{EditorConfig, EditorEvent, TimelineDocument, TimelineEditor};
use serde::Serialize;
use std::path::Path;

/// Outcome of a replay
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaySummary {
    /// Events in the script
    pub events: usize,
    /// Events handled without error
    pub handled: usize,
    /// Clips after the replay
    pub clips: usize,
    /// Effect clips after the replay
    pub effect_clips: usize,
    /// Playhead after the replay
    pub current_time_ms: i64,
}

impl ReplaySummary {
    /// Events that were rejected
    pub fn rejected(&self) -> usize {
        self.events - self.handled
    }
}

/// Parse an event script
pub fn parse_events(content: &str) -> Result<Vec<EditorEvent>> {
    Ok(serde_json::from_str(content)?)
}

/// Queue and process every event in order
pub fn replay(editor: &mut TimelineEditor, events: Vec<EditorEvent>) -> ReplaySummary {
    let count = events.len();
    for event in events {
        editor.push_event(event);
    }
    let handled = editor.process_events();

    // an unfinished gesture is committed like a pointer release
    if editor.is_dragging() {
        tracing::warn!("Event script ended mid-drag, committing");
        if let Err(err) = editor.end_drag() {
            tracing::warn!("Failed to commit trailing drag: {}", err);
        }
    }

    let timeline = editor.timeline();
    ReplaySummary {
        events: count,
        handled,
        clips: timeline.clips().count(),
        effect_clips: timeline.effect_clips().count(),
        current_time_ms: editor.current_time_ms(),
    }
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    match path {
        Some(path) => Ok(EditorConfig::load(path)?),
        None => Ok(EditorConfig::default()),
    }
}

/// Run the session described by `options`, returning the text to print
pub fn run(options: &Options) -> Result<Option<String>> {
    let config = load_config(options.config.as_deref())?;

    if let Some(path) = &options.write_config {
        config.save(path)?;
        return Ok(None);
    }

    let path = options.document.as_deref().ok_or(AppError::NoDocument)?;
    let document = TimelineDocument::load_file(path)?;
    let mut editor = TimelineEditor::from_document(&document, config)?;

    if let Some(path) = &options.events {
        let events = parse_events(&std::fs::read_to_string(path)?)?;
        let summary = replay(&mut editor, events);
        tracing::info!(
            "Replayed {} events ({} rejected), {} clips, playhead at {}ms",
            summary.events,
            summary.rejected(),
            summary.clips,
            summary.current_time_ms
        );
    }

    if options.print_model {
        return Ok(Some(serde_json::to_string_pretty(&editor.read_model())?));
    }

    let edited = editor.to_document();
    match &options.output {
        Some(path) => {
            edited.save_file(path)?;
            Ok(None)
        }
        None => Ok(Some(edited.to_json_pretty()?)),
    }
}
