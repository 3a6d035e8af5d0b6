// SPDX-License-Identifier: MIT OR Apache-2.0
//! Hand-off of finished documents to the playout runtime.

use crate::document::TimelineDocument;
use indexmap::IndexMap;
use thiserror::Error;

/// Runtime errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Segment is already on air
    #[error("Segment {0} is already running")]
    AlreadyRunning(String),

    /// Segment is not on air
    #[error("Segment {0} is not running")]
    NotRunning(String),

    /// The runtime refused the document
    #[error("Runtime rejected segment {segment}: {reason}")]
    Rejected {
        /// Segment id
        segment: String,
        /// Reason given by the runtime
        reason: String,
    },
}

/// Executes timeline documents as broadcast segments
pub trait BroadcastRuntime {
    /// Put a segment on air
    fn start(&mut self, segment_id: &str, document: &TimelineDocument) -> Result<(), RuntimeError>;

    /// Take a segment off air
    fn stop(&mut self, segment_id: &str) -> Result<(), RuntimeError>;
}

/// In-process runtime that only tracks which segments are running
#[derive(Debug, Default)]
pub struct LocalRuntime {
    running: IndexMap<String, TimelineDocument>,
}

impl LocalRuntime {
    /// Create an idle runtime
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a segment is on air
    pub fn is_running(&self, segment_id: &str) -> bool {
        self.running.contains_key(segment_id)
    }

    /// Document a running segment was started with
    pub fn document(&self, segment_id: &str) -> Option<&TimelineDocument> {
        self.running.get(segment_id)
    }

    /// Running segment ids in start order
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.running.keys().map(String::as_str)
    }
}

impl BroadcastRuntime for LocalRuntime {
    fn start(&mut self, segment_id: &str, document: &TimelineDocument) -> Result<(), RuntimeError> {
        if self.running.contains_key(segment_id) {
            return Err(RuntimeError::AlreadyRunning(segment_id.to_string()));
        }
        if document.tracks.iter().all(|t| t.clips.is_empty()) {
            return Err(RuntimeError::Rejected {
                segment: segment_id.to_string(),
                reason: "document has no clips".to_string(),
            });
        }
        self.running.insert(segment_id.to_string(), document.clone());
        tracing::info!("Segment {} on air ({})", segment_id, document.metadata.name);
        Ok(())
    }

    fn stop(&mut self, segment_id: &str) -> Result<(), RuntimeError> {
        self.running
            .shift_remove(segment_id)
            .ok_or_else(|| RuntimeError::NotRunning(segment_id.to_string()))?;
        tracing::info!("Segment {} off air", segment_id);
        Ok(())
    }
}
