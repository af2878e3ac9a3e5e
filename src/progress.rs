//! Progress events emitted while filling.

use serde::Serialize;
use std::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProgressState {
    Running,
    Done,
}

/// Step names reported in [`ProgressEvent::step`].
pub mod step {
    pub const BEFORE: &str = "before";
    pub const RESET: &str = "reset";
    pub const GENERATE: &str = "generate";
    pub const AFTER: &str = "after";
    pub const DONE: &str = "done";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub current_table: String,
    pub step: String,
    pub current_value: u64,
    pub max: u64,
    pub state: ProgressState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ProgressEvent {
    pub fn running(table: &str, step: &str, current_value: u64, max: u64) -> Self {
        Self {
            current_table: table.to_string(),
            step: step.to_string(),
            current_value,
            max,
            state: ProgressState::Running,
            comment: None,
        }
    }

    pub fn done(table: &str, current_value: u64, max: u64) -> Self {
        Self {
            state: ProgressState::Done,
            ..Self::running(table, step::DONE, current_value, max)
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Receives progress events from the filler.
pub trait ProgressListener: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

/// Logs progress through `tracing`.
///
/// A new table or step is logged at info level, updates within a step at
/// debug level.
#[derive(Debug, Default)]
pub struct LogProgress {
    last: Mutex<Option<(String, String)>>,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressListener for LogProgress {
    fn on_progress(&self, event: &ProgressEvent) {
        let key = (event.current_table.clone(), event.step.clone());
        let changed = match self.last.lock() {
            Ok(mut last) => last.replace(key.clone()).as_ref() != Some(&key),
            Err(_) => true,
        };
        let comment = event.comment.as_deref().unwrap_or("");
        if changed || event.state == ProgressState::Done {
            info!(
                "{} | {:<8} | {}/{} {comment}",
                event.current_table, event.step, event.current_value, event.max
            );
        } else {
            debug!(
                "{} | {:<8} | {}/{} {comment}",
                event.current_table,
                event.step,
                event.current_value,
                event.max
            );
        }
    }
}

/// Keeps every event, for tests and embedding.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ProgressListener for RecordingProgress {
    fn on_progress(&self, event: &ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
