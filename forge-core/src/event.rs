//! Editor events published by the dual-mode controller

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{ForgeError, Result};
use crate::mode::EditorMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorEvent {
    /// The active sub-editor changed its value; carries the recomputed canonical form
    ContentChanged { canonical: String },
    ModeChanged { mode: EditorMode },
    /// A toolbar block was inserted at the caret
    BlockInserted { tag: String },
    /// The editing surface was emptied and re-seeded on blur
    Reseeded,
    Imported { file_name: String },
    Exported { file_name: String, bytes: usize },
}

impl EditorEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &str {
        match self {
            EditorEvent::ContentChanged { .. } => "content_changed",
            EditorEvent::ModeChanged { .. } => "mode_changed",
            EditorEvent::BlockInserted { .. } => "block_inserted",
            EditorEvent::Reseeded => "reseeded",
            EditorEvent::Imported { .. } => "imported",
            EditorEvent::Exported { .. } => "exported",
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| ForgeError::generic(format!("Failed to serialize editor event: {}", e)))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ForgeError::generic(format!("Failed to deserialize editor event: {}", e)))
    }
}

/// Receiver of editor events
pub trait EditorEventHandler {
    fn handle_editor_event(&self, event: &EditorEvent) -> Result<()>;

    /// Get handler name for debugging
    fn handler_name(&self) -> &str {
        "UnnamedEditorEventHandler"
    }
}

/// Records every event it receives. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<EditorEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events
    pub fn events(&self) -> Vec<EditorEvent> {
        self.events.borrow().clone()
    }

    /// Event type names in arrival order
    pub fn event_types(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .map(|event| event.event_type().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl EditorEventHandler for EventLog {
    fn handle_editor_event(&self, event: &EditorEvent) -> Result<()> {
        self.events.borrow_mut().push(event.clone());
        Ok(())
    }

    fn handler_name(&self) -> &str {
        "EventLog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_types() {
        assert_eq!(EditorEvent::Reseeded.event_type(), "reseeded");
        assert_eq!(
            EditorEvent::ModeChanged {
                mode: EditorMode::Source
            }
            .event_type(),
            "mode_changed"
        );
    }

    #[test]
    fn test_event_json() {
        let event = EditorEvent::Exported {
            file_name: "cipher.html".to_string(),
            bytes: 42,
        };
        let json = event.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"type":"exported","file_name":"cipher.html","bytes":42}"#
        );
        assert_eq!(EditorEvent::from_json(&json).unwrap(), event);
        assert!(EditorEvent::from_json("{\"type\":\"unknown\"}").is_err());
    }

    #[test]
    fn test_event_log_shares_records() {
        let log = EventLog::new();
        let subscriber = log.clone();
        subscriber
            .handle_editor_event(&EditorEvent::BlockInserted {
                tag: "p".to_string(),
            })
            .unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.event_types(), vec!["block_inserted"]);
        log.clear();
        assert!(subscriber.is_empty());
    }
}
