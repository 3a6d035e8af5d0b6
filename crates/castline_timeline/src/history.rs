// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history built on serialized timeline snapshots.
//!
//! Every completed edit records the model state before and after it. Undo
//! restores the `before` snapshot, redo the `after` snapshot.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Default undo history depth
pub const MAX_HISTORY: usize = 100;

/// History errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Nothing to undo
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Nothing to redo
    #[error("Nothing to redo")]
    NothingToRedo,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Serialized model state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Serialized state
    pub data: Vec<u8>,
    /// Timestamp when snapshot was taken
    pub timestamp: u64,
}

impl StateSnapshot {
    /// Create a new state snapshot
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            timestamp: now_secs(),
        }
    }

    /// Create from serializable value
    pub fn from_value<T: Serialize>(value: &T) -> Result<Self> {
        let data = bincode::serialize(value)?;
        Ok(Self::new(data))
    }

    /// Deserialize to value
    pub fn to_value<T: for<'de> Deserialize<'de>>(&self) -> Result<T> {
        Ok(bincode::deserialize(&self.data)?)
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// One undoable edit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Human-readable description
    pub description: String,
    /// State before the edit
    pub before: StateSnapshot,
    /// State after the edit
    pub after: StateSnapshot,
}

impl Operation {
    /// Get memory size of this operation
    pub fn memory_size(&self) -> usize {
        self.before.size() + self.after.size()
    }
}

/// History statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStats {
    /// Entries on the undo stack
    pub undo_count: usize,
    /// Entries on the redo stack
    pub redo_count: usize,
    /// Bytes held by both stacks
    pub memory_used: usize,
    /// Maximum history depth
    pub max_depth: usize,
}

/// Undo/redo history manager
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<Operation>,
    redo_stack: VecDeque<Operation>,
    max_depth: usize,
}

impl History {
    /// Create a new history manager
    pub fn new() -> Self {
        Self::with_max_depth(MAX_HISTORY)
    }

    /// Create with custom maximum depth
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record an edit. Identical before/after states are not recorded.
    pub fn record(&mut self, description: impl Into<String>, before: StateSnapshot, after: StateSnapshot) {
        if before.data == after.data {
            return;
        }

        self.redo_stack.clear();
        self.undo_stack.push_back(Operation {
            description: description.into(),
            before,
            after,
        });

        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }

    /// Pop the last edit; the caller restores its `before` snapshot
    pub fn undo(&mut self) -> Result<&Operation> {
        let operation = self.undo_stack.pop_back().ok_or(HistoryError::NothingToUndo)?;
        self.redo_stack.push_back(operation);
        self.redo_stack.back().ok_or(HistoryError::NothingToUndo)
    }

    /// Re-apply the last undone edit; the caller restores its `after` snapshot
    pub fn redo(&mut self) -> Result<&Operation> {
        let operation = self.redo_stack.pop_back().ok_or(HistoryError::NothingToRedo)?;
        self.undo_stack.push_back(operation);
        self.undo_stack.back().ok_or(HistoryError::NothingToRedo)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Get history statistics
    pub fn stats(&self) -> HistoryStats {
        let memory_used = self
            .undo_stack
            .iter()
            .chain(self.redo_stack.iter())
            .map(Operation::memory_size)
            .sum();
        HistoryStats {
            undo_count: self.undo_stack.len(),
            redo_count: self.redo_stack.len(),
            memory_used,
            max_depth: self.max_depth,
        }
    }

    /// Get description of next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|op| op.description.as_str())
    }

    /// Get description of next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|op| op.description.as_str())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(value: u32) -> StateSnapshot {
        StateSnapshot::from_value(&value).unwrap()
    }

    #[test]
    fn test_snapshot_round_trip() {
        let snap = StateSnapshot::from_value(&vec![1_i64, 2, 3]).unwrap();
        let back: Vec<i64> = snap.to_value().unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }

    #[test]
    fn test_undo_redo() {
        let mut history = History::new();
        history.record("Move clip", snapshot(1), snapshot(2));
        assert!(history.can_undo());
        assert_eq!(history.undo_description(), Some("Move clip"));

        let op = history.undo().unwrap();
        assert_eq!(op.before.to_value::<u32>().unwrap(), 1);
        assert!(history.can_redo());

        let op = history.redo().unwrap();
        assert_eq!(op.after.to_value::<u32>().unwrap(), 2);
        assert!(matches!(history.redo(), Err(HistoryError::NothingToRedo)));
    }

    #[test]
    fn test_new_record_clears_redo() {
        let mut history = History::new();
        history.record("a", snapshot(1), snapshot(2));
        history.undo().unwrap();
        history.record("b", snapshot(1), snapshot(3));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_unchanged_state_not_recorded() {
        let mut history = History::new();
        history.record("noop", snapshot(7), snapshot(7));
        assert!(matches!(history.undo(), Err(HistoryError::NothingToUndo)));
    }

    #[test]
    fn test_depth_limit() {
        let mut history = History::with_max_depth(3);
        for i in 0..10 {
            history.record(format!("edit {i}"), snapshot(i), snapshot(i + 1));
        }
        let stats = history.stats();
        assert_eq!(stats.undo_count, 3);
        assert_eq!(stats.max_depth, 3);
        assert_eq!(history.undo_description(), Some("edit 9"));
    }
}
