// SPDX-License-Identifier: MIT OR Apache-2.0
//! Thread-safe handle to one editor.

use crate::editor::{ReadModel, TimelineEditor};
use crate::interaction::EditorEvent;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Cloneable handle serializing all access to one [`TimelineEditor`]
#[derive(Debug, Clone)]
pub struct SharedEditor {
    inner: Arc<Mutex<TimelineEditor>>,
}

impl SharedEditor {
    /// Wrap an editor
    pub fn new(editor: TimelineEditor) -> Self {
        Self {
            inner: Arc::new(Mutex::new(editor)),
        }
    }

    /// Lock the editor for a sequence of calls
    pub fn lock(&self) -> MutexGuard<'_, TimelineEditor> {
        self.inner.lock()
    }

    /// Run a closure with exclusive access
    pub fn with<R>(&self, f: impl FnOnce(&mut TimelineEditor) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Queue an event without processing it
    pub fn push_event(&self, event: impl Into<EditorEvent>) {
        self.inner.lock().push_event(event);
    }

    /// Drain the event queue
    pub fn process_events(&self) -> usize {
        self.inner.lock().process_events()
    }

    /// Current read model
    pub fn read_model(&self) -> ReadModel {
        self.inner.lock().read_model()
    }
}

impl From<TimelineEditor> for SharedEditor {
    fn from(editor: TimelineEditor) -> Self {
        Self::new(editor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{Key, KeyEvent};
    use std::thread;

    #[test]
    fn test_events_from_many_threads() {
        let shared = SharedEditor::new(TimelineEditor::default());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..5 {
                        shared.push_event(KeyEvent::new(Key::ArrowRight));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.process_events(), 20);
        assert_eq!(shared.read_model().current_time_ms, 20_000);
        assert_eq!(shared.with(|editor| editor.pending_events()), 0);
    }
}
