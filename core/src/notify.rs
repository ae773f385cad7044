//! Toast notifications
//!
//! Fire-and-forget messages posted by whoever performs a persistence side
//! effect. The host decides how they are shown and when they expire.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    #[default]
    Info,
    Success,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "success",
            NotificationLevel::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, title, message)
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, title, message)
    }
}

/// Write-only toast channel. Posting never blocks and never fails.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sink that drops everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _notification: Notification) {}
}

/// Sink that keeps every notification in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    posted: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posted(&self) -> Vec<Notification> {
        self.posted.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        if let Ok(mut posted) = self.posted.lock() {
            posted.push(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_wire_format() {
        let n = Notification::success("Saved", "Schema saved successfully");
        let value = serde_json::to_value(&n).unwrap();
        assert_eq!(value["level"], "success");
        assert_eq!(n.level.to_string(), "success");
    }

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.notify(Notification::info("a", "1"));
        sink.notify(Notification::error("b", "2"));
        let posted = sink.posted();
        assert_eq!(posted.len(), 2);
        assert_eq!(posted[1].level, NotificationLevel::Error);
    }
}
