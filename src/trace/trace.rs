use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::events::event::{Reaction, UiEvent};

/// One line of the JSONL event trace: which component saw which event,
/// and what it did about it.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub step: u64,

    pub component: String,
    pub event: String,
    pub target: Option<usize>,

    pub reaction: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl TraceEvent {
    pub fn now(step: u64, component: &str, event: &UiEvent) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            step,
            component: component.to_string(),
            event: event.kind().to_string(),
            target: Some(event.target().index()),
            reaction: format!("{:?}", Reaction::Ignored),
            detail: None,
        }
    }

    pub fn with_reaction(mut self, reaction: Reaction) -> Self {
        self.reaction = format!("{:?}", reaction);
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}
