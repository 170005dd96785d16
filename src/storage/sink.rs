use serde::{Deserialize, Serialize};

use crate::core::Event;
use crate::ScraperResult;

/// Ordered events of one provider, in the order they were recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventSink {
    events: Vec<Event>,
}

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn contains_issue(&self, issue: &str) -> bool {
        self.events.iter().any(|e| e.issue == issue)
    }

    /// Pretty-printed JSON array, one object per event.
    pub fn to_json(&self) -> ScraperResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> ScraperResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<Vec<Event>> for EventSink {
    fn from(events: Vec<Event>) -> Self {
        Self { events }
    }
}
